//! KTP (Indonesian identity card) extraction via an external OCR provider.
//!
//! Uploaded files are first pushed to a temporary file host to obtain a
//! public URL, because the provider only accepts URLs.

use gateway_core::UpstreamError;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

use crate::config::Settings;

/// Uploads bytes to the temp file host and returns the public link. Files
/// there expire after a day.
pub async fn upload_temp(
    http: &reqwest::Client,
    settings: &Settings,
    content: Vec<u8>,
    filename: &str,
) -> Result<String, UpstreamError> {
    let form = Form::new()
        .part("file", Part::bytes(content).file_name(filename.to_string()))
        .text("expires", "1d");

    let response = http
        .post(&settings.ocr_upload_url)
        .multipart(form)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::rejected(
            status.as_u16(),
            format!("Failed to upload to temp storage: {body}"),
        ));
    }

    let data: Value = response.json().await?;
    if !data.get("success").and_then(Value::as_bool).unwrap_or(false) {
        return Err(UpstreamError::rejected(
            502,
            "Temp storage service reported failure".to_string(),
        ));
    }
    data.get("link")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| UpstreamError::rejected(502, "Temp storage returned no link".to_string()))
}

pub async fn extract_ktp(
    http: &reqwest::Client,
    settings: &Settings,
    file_url: &str,
) -> Result<Value, UpstreamError> {
    let response = http
        .post(&settings.ocr_extract_url)
        .header("x-app-id", &settings.ocr_app_id)
        .json(&json!({
            "file_url": file_url,
            "json_schema": ktp_schema(),
        }))
        .timeout(std::time::Duration::from_secs(60))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UpstreamError::rejected(
            status.as_u16(),
            format!("OCR Provider Error: {body}"),
        ));
    }
    Ok(response.json().await?)
}

fn ktp_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "nik": { "type": "string", "description": "Nomor Induk Kependudukan (16 digit)" },
            "nama": { "type": "string", "description": "Nama lengkap sesuai KTP" },
            "tempat_tanggal_lahir": { "type": "string", "description": "Tempat dan tanggal lahir, misal: Bandung, 23 Januari 1999" },
            "jenis_kelamin": { "type": "string", "description": "Jenis kelamin, misal: Laki-laki atau Perempuan" },
            "golongan_darah": { "type": "string", "description": "Golongan darah, misal: A, B, AB, O" },
            "alamat": { "type": "string", "description": "Alamat lengkap" },
            "rt_rw": { "type": "string", "description": "RT dan RW, misal: 001/002" },
            "kel_desa": { "type": "string", "description": "Kelurahan atau desa" },
            "kecamatan": { "type": "string", "description": "Kecamatan" },
            "agama": { "type": "string", "description": "Agama" },
            "status_perkawinan": { "type": "string", "description": "Status perkawinan" },
            "pekerjaan": { "type": "string", "description": "Pekerjaan" },
            "kewarganegaraan": { "type": "string", "description": "Kewarganegaraan, misal: WNI atau WNA" },
            "berlaku_hingga": { "type": "string", "description": "Masa berlaku KTP, biasanya Seumur Hidup" }
        }
    })
}
