use actix_web::{web, HttpResponse};
use gateway_core::fetch_with_cache;

use crate::dto::{envelope, envelope_with_source};
use crate::error::Result;
use crate::server::AppState;
use crate::services::bmkg_service;

async fn autogempa(state: web::Data<AppState>) -> Result<HttpResponse> {
    let fetched = fetch_with_cache(
        &state.bmkg_cache,
        "autogempa",
        state.settings.bmkg_cache_ttl,
        || bmkg_service::fetch_autogempa(&state.http, &state.settings.bmkg_autogempa_url),
    )
    .await?;

    let body = if fetched.cached {
        envelope(fetched.value, true)
    } else {
        envelope_with_source(fetched.value, false, "BMKG")
    };
    Ok(HttpResponse::Ok().json(body))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/autogempa").route(web::get().to(autogempa)));
}
