use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::Result;
use crate::server::AppState;

#[derive(Deserialize)]
struct AuthRequest {
    secure_1psid: String,
    secure_1psidts: String,
    secure_1psidcc: String,
}

async fn auth(state: web::Data<AppState>, payload: web::Json<AuthRequest>) -> Result<HttpResponse> {
    state
        .gemini
        .set_cookies(
            &payload.secure_1psid,
            &payload.secure_1psidts,
            &payload.secure_1psidcc,
        )
        .await?;
    Ok(HttpResponse::Ok().json(json!({
        "status": "success",
        "message": "Cookies saved",
    })))
}

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
}

async fn chat(state: web::Data<AppState>, payload: web::Json<ChatRequest>) -> Result<HttpResponse> {
    let response = state.gemini.chat(&payload.message).await?;
    Ok(HttpResponse::Ok().json(json!({ "response": response })))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth").route(web::post().to(auth)))
        .service(web::resource("/chat").route(web::post().to(chat)));
}
