use axum::{Json, Router, routing::post};
use serde::{Deserialize, Serialize};

use crate::web::AppState;

const CHAT_TEMPLATE: &str = "This is a demo AI chat response for prompt: ";
const IMAGE_BASE: &str = "https://via.placeholder.com/800x400.png?text=";
const IMAGE_FALLBACK_TEXT: &str = "AI+Image";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/ai/chat", post(chat))
        .route("/api/ai/image", post(image))
}

#[derive(Debug, Default, Deserialize)]
struct PromptRequest {
    #[serde(default)]
    prompt: String,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Serialize)]
struct ImageResponse {
    data: Vec<String>,
}

/// Canned stand-in for a chat model. Pure function of the prompt.
async fn chat(Json(request): Json<PromptRequest>) -> Json<ChatResponse> {
    Json(ChatResponse {
        reply: chat_reply(&request.prompt),
    })
}

/// Placeholder image URL with the prompt encoded into the text overlay.
async fn image(Json(request): Json<PromptRequest>) -> Json<ImageResponse> {
    Json(ImageResponse {
        data: vec![image_url(&request.prompt)],
    })
}

fn chat_reply(prompt: &str) -> String {
    format!("{CHAT_TEMPLATE}{prompt}")
}

fn image_url(prompt: &str) -> String {
    let text = if prompt.is_empty() {
        IMAGE_FALLBACK_TEXT
    } else {
        prompt
    };
    format!("{IMAGE_BASE}{}", urlencoding::encode(text))
}
