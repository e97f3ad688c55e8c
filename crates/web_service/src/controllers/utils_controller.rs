use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use md5::Md5;
use serde::Deserialize;
use serde_json::json;
use sha1::Sha1;
use sha2::{Digest, Sha256};

use crate::error::{AppError, Result};

#[derive(Deserialize)]
struct HashQuery {
    text: String,
    #[serde(default = "default_algo")]
    algo: String,
}

fn default_algo() -> String {
    "sha256".to_string()
}

fn digest_hex(algo: &str, text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    match algo {
        "md5" => Some(hex::encode(Md5::digest(bytes))),
        "sha1" => Some(hex::encode(Sha1::digest(bytes))),
        "sha256" => Some(hex::encode(Sha256::digest(bytes))),
        _ => None,
    }
}

async fn hash_text(query: web::Query<HashQuery>) -> Result<HttpResponse> {
    let digest = digest_hex(&query.algo, &query.text).ok_or_else(|| {
        AppError::BadRequest(format!(
            "Unsupported algo '{}', expected md5, sha1 or sha256",
            query.algo
        ))
    })?;
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "algo": query.algo, "digest": digest })))
}

#[derive(Deserialize)]
struct TextQuery {
    text: String,
}

async fn b64_encode(query: web::Query<TextQuery>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "ok": true, "base64": STANDARD.encode(&query.text) }))
}

#[derive(Deserialize)]
struct B64Query {
    b64: String,
}

async fn b64_decode(query: web::Query<B64Query>) -> Result<HttpResponse> {
    let raw = STANDARD
        .decode(&query.b64)
        .map_err(|e| AppError::BadRequest(format!("Invalid base64: {e}")))?;
    let text = String::from_utf8_lossy(&raw).into_owned();
    Ok(HttpResponse::Ok().json(json!({ "ok": true, "text": text })))
}

const QR_MODULE_SCALE: u32 = 8;
const QR_QUIET_MODULES: u32 = 4;

fn qr_png(text: &str) -> anyhow::Result<Vec<u8>> {
    let code = qrcode::QrCode::new(text.as_bytes())?;
    let width = code.width();
    let colors = code.to_colors();

    let dim = (width as u32 + 2 * QR_QUIET_MODULES) * QR_MODULE_SCALE;
    let mut img = image::GrayImage::from_pixel(dim, dim, image::Luma([255u8]));
    for y in 0..width {
        for x in 0..width {
            if colors[y * width + x] == qrcode::Color::Dark {
                let px = (x as u32 + QR_QUIET_MODULES) * QR_MODULE_SCALE;
                let py = (y as u32 + QR_QUIET_MODULES) * QR_MODULE_SCALE;
                for dy in 0..QR_MODULE_SCALE {
                    for dx in 0..QR_MODULE_SCALE {
                        img.put_pixel(px + dx, py + dy, image::Luma([0u8]));
                    }
                }
            }
        }
    }

    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

async fn qr(query: web::Query<TextQuery>) -> Result<HttpResponse> {
    let png = qr_png(&query.text)?;
    Ok(HttpResponse::Ok().content_type("image/png").body(png))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/hash").route(web::get().to(hash_text)))
        .service(web::resource("/base64/encode").route(web::get().to(b64_encode)))
        .service(web::resource("/base64/decode").route(web::get().to(b64_decode)))
        .service(web::resource("/qr").route(web::get().to(qr)));
}
