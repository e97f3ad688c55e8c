//! Background removal, delegated to an external provider (remove.bg by
//! default). The gateway only marshals the image across.

use bytes::Bytes;
use gateway_core::UpstreamError;
use reqwest::multipart::{Form, Part};

use crate::config::Settings;

pub fn provider_configured(settings: &Settings) -> bool {
    settings.removebg_api_key.is_some()
}

pub async fn remove_background(
    http: &reqwest::Client,
    settings: &Settings,
    image: Vec<u8>,
    filename: &str,
) -> Result<Bytes, UpstreamError> {
    let api_key = settings
        .removebg_api_key
        .as_deref()
        .ok_or(UpstreamError::NotAuthenticated)?;

    let form = Form::new()
        .part(
            "image_file",
            Part::bytes(image).file_name(filename.to_string()),
        )
        .text("size", "auto")
        .text("format", "png");

    let response = http
        .post(&settings.removebg_url)
        .header("X-Api-Key", api_key)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::rejected(status.as_u16(), body));
    }
    Ok(response.bytes().await?)
}
