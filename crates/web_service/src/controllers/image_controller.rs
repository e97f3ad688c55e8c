use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse};
use gateway_core::UpstreamError;
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::services::image_service;

#[derive(MultipartForm)]
struct UploadForm {
    #[multipart(limit = "20MB")]
    file: TempFile,
}

fn require_provider(state: &AppState) -> Result<()> {
    if !image_service::provider_configured(&state.settings) {
        return Err(AppError::ServiceUnavailable(
            "Background removal provider not configured. Set REMOVEBG_API_KEY.".to_string(),
        ));
    }
    Ok(())
}

async fn remove_bg(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<HttpResponse> {
    require_provider(&state)?;

    let filename = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "upload.png".to_string());
    let raw = std::fs::read(form.file.file.path())?;

    let png = image_service::remove_background(&state.http, &state.settings, raw, &filename)
        .await
        .map_err(classify)?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

#[derive(Deserialize)]
struct ByUrlQuery {
    image_url: String,
}

async fn remove_bg_by_url(
    state: web::Data<AppState>,
    query: web::Query<ByUrlQuery>,
) -> Result<HttpResponse> {
    require_provider(&state)?;

    let source = state
        .http
        .get(&query.image_url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::BadRequest(format!("Could not fetch image: {e}")))?;
    let raw = source
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(format!("Could not read image: {e}")))?;

    let png = image_service::remove_background(
        &state.http,
        &state.settings,
        raw.to_vec(),
        "download.png",
    )
    .await
    .map_err(classify)?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

/// The provider rejecting an image means the input was bad, not our auth.
fn classify(err: UpstreamError) -> AppError {
    match err {
        UpstreamError::Rejected { status, message } if status < 500 => {
            AppError::BadRequest(message)
        }
        other => AppError::Upstream(other),
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/remove-bg").route(web::post().to(remove_bg)))
        .service(web::resource("/remove-bg-by-url").route(web::get().to(remove_bg_by_url)));
}
