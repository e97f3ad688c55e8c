use actix_multipart::form::tempfile::TempFile;
use actix_multipart::form::MultipartForm;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};

use crate::error::Result;
use crate::server::AppState;
use crate::services::converter_service;

const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(MultipartForm)]
struct UploadForm {
    #[multipart(limit = "200MB")]
    file: TempFile,
}

fn download_name(form: &UploadForm, ext: &str) -> String {
    let base = form
        .file
        .file_name
        .clone()
        .unwrap_or_else(|| "converted".to_string());
    format!("{base}.{ext}")
}

async fn respond_with_file(
    output: std::path::PathBuf,
    media_type: &str,
    filename: String,
) -> Result<HttpResponse> {
    let body = tokio::fs::read(&output).await?;
    converter_service::cleanup(vec![output]);
    Ok(HttpResponse::Ok()
        .content_type(media_type)
        .insert_header(ContentDisposition {
            disposition: DispositionType::Attachment,
            parameters: vec![DispositionParam::Filename(filename)],
        })
        .body(body))
}

async fn pdf_to_word(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<HttpResponse> {
    let input = form.file.file.path().to_path_buf();
    let outdir = input
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(std::env::temp_dir);

    let output = converter_service::pdf_to_docx(&state.settings.soffice_bin, &input, &outdir).await?;
    respond_with_file(output, DOCX_MEDIA_TYPE, download_name(&form, "docx")).await
}

async fn audio_extract(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<HttpResponse> {
    let input = form.file.file.path().to_path_buf();
    let output = converter_service::extract_audio(&state.settings.ffmpeg_bin, &input).await?;
    respond_with_file(output, "audio/mpeg", download_name(&form, "mp3")).await
}

async fn video_to_gif(
    state: web::Data<AppState>,
    form: MultipartForm<UploadForm>,
) -> Result<HttpResponse> {
    let input = form.file.file.path().to_path_buf();
    let output = converter_service::video_to_gif(&state.settings.ffmpeg_bin, &input).await?;
    respond_with_file(output, "image/gif", download_name(&form, "gif")).await
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/pdf-to-word").route(web::post().to(pdf_to_word)))
        .service(web::resource("/audio-extract").route(web::post().to(audio_extract)))
        .service(web::resource("/video-to-gif").route(web::post().to(video_to_gif)));
}
