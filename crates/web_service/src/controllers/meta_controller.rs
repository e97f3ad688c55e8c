use actix_web::http::header;
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;

async fn root() -> impl Responder {
    HttpResponse::Found()
        .insert_header((header::LOCATION, "/health"))
        .finish()
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({ "ok": true, "status": "up" }))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/").route(web::get().to(root)))
        .service(web::resource("/health").route(web::get().to(health)));
}
