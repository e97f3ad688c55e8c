use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::Result;
use crate::server::AppState;
use crate::services::islamic_service;

async fn surahs(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = islamic_service::all_surahs(&state.http, &state.settings).await?;
    Ok(HttpResponse::Ok().json(data))
}

async fn surah_detail(state: web::Data<AppState>, path: web::Path<u32>) -> Result<HttpResponse> {
    let data = islamic_service::surah_detail(&state.http, &state.settings, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(data))
}

async fn hadith_editions(state: web::Data<AppState>) -> Result<HttpResponse> {
    let data = islamic_service::hadith_editions(&state.http, &state.settings).await?;
    Ok(HttpResponse::Ok().json(data))
}

async fn hadith_sections(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let data =
        islamic_service::hadith_sections(&state.http, &state.settings, &path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(data))
}

#[derive(Deserialize)]
struct PrayerQuery {
    lat: f64,
    long: f64,
    /// DD-MM-YYYY, defaults to today.
    date: Option<String>,
}

async fn prayer_times(
    state: web::Data<AppState>,
    query: web::Query<PrayerQuery>,
) -> Result<HttpResponse> {
    let data = islamic_service::prayer_times(
        &state.http,
        &state.settings,
        query.lat,
        query.long,
        query.date.clone(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(data))
}

async fn tahlil() -> HttpResponse {
    HttpResponse::Ok().json(islamic_service::tahlil())
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/quran").route(web::get().to(surahs)))
        .service(web::resource("/quran/{nomor}").route(web::get().to(surah_detail)))
        .service(web::resource("/hadith").route(web::get().to(hadith_editions)))
        .service(web::resource("/hadith/{book}").route(web::get().to(hadith_sections)))
        .service(web::resource("/prayer-times").route(web::get().to(prayer_times)))
        .service(web::resource("/tahlil").route(web::get().to(tahlil)));
}
