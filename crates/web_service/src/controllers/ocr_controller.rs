use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::text::Text;
use actix_multipart::form::MultipartForm;
use actix_web::{web, Either, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::server::AppState;
use crate::services::ocr_service;

#[derive(MultipartForm)]
struct KtpForm {
    #[multipart(limit = "20MB")]
    file: Option<TempFile>,
    file_url: Option<Text<String>>,
}

#[derive(Deserialize)]
struct KtpUrlRequest {
    file_url: Option<String>,
}

/// Accepts either a direct URL (JSON body or multipart field) or an
/// uploaded image; uploads are staged on the temp file host first because
/// the OCR provider only takes URLs.
async fn extract_ktp(
    state: web::Data<AppState>,
    payload: Either<MultipartForm<KtpForm>, web::Json<KtpUrlRequest>>,
) -> Result<HttpResponse> {
    let file_url = match payload {
        Either::Left(form) => {
            let form = form.into_inner();
            if let Some(url) = form.file_url {
                Some(url.into_inner())
            } else if let Some(file) = form.file {
                let filename = file
                    .file_name
                    .clone()
                    .unwrap_or_else(|| "upload.jpg".to_string());
                let raw = std::fs::read(file.file.path())?;
                Some(ocr_service::upload_temp(&state.http, &state.settings, raw, &filename).await?)
            } else {
                None
            }
        }
        Either::Right(json) => json.into_inner().file_url,
    };

    let file_url = file_url
        .ok_or_else(|| AppError::BadRequest("Provide either 'file_url' or 'file'".to_string()))?;

    let result = ocr_service::extract_ktp(&state.http, &state.settings, &file_url).await?;
    Ok(HttpResponse::Ok().json(result))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ktp").route(web::post().to(extract_ktp)));
}
