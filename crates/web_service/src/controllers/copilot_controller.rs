use std::sync::Arc;

use actix_web::{web, HttpResponse};
use bytes::Bytes;
use copilot_client::{AuthOutcome, ChatCompletionRequest};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::{AppError, Result};
use crate::server::AppState;

async fn auth_start(state: web::Data<AppState>) -> Result<HttpResponse> {
    let device_code = state.copilot.auth().start_device_auth().await?;
    Ok(HttpResponse::Ok().json(device_code))
}

#[derive(Deserialize)]
struct CheckAuthRequest {
    device_code: String,
}

async fn auth_check(
    state: web::Data<AppState>,
    payload: web::Json<CheckAuthRequest>,
) -> Result<HttpResponse> {
    let outcome = state
        .copilot
        .auth()
        .check_device_auth(&payload.device_code)
        .await?;
    let body = match outcome {
        AuthOutcome::Success => json!({
            "status": "success",
            "access_token": "Saved internally",
        }),
        AuthOutcome::Pending { reason } => json!({
            "status": "pending",
            "error": reason,
        }),
    };
    Ok(HttpResponse::Ok().json(body))
}

/// Relays Copilot's completion stream as plain content deltas.
async fn chat(
    state: web::Data<AppState>,
    payload: web::Json<ChatCompletionRequest>,
) -> Result<HttpResponse> {
    let response = state.copilot.send_chat_completion(&payload).await?;

    let (tx, rx) = mpsc::channel(32);
    let copilot = Arc::clone(&state.copilot);
    tokio::spawn(async move {
        copilot.relay_content_deltas(response, tx).await;
    });

    let stream = ReceiverStream::new(rx).map(|delta| {
        delta
            .map(Bytes::from)
            .map_err(AppError::Upstream)
    });
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .streaming(stream))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/start").route(web::get().to(auth_start)))
        .service(web::resource("/auth/check").route(web::post().to(auth_check)))
        .service(web::resource("/chat").route(web::post().to(chat)));
}
