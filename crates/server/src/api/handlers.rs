use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: String,
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Hello, world!".to_string(),
    })
}
