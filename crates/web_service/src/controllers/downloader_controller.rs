use actix_web::{web, HttpResponse};
use gateway_core::fetch_with_cache;
use serde::Deserialize;

use crate::dto::envelope;
use crate::error::Result;
use crate::server::AppState;
use crate::services::ytdlp_service;

#[derive(Deserialize)]
struct MediaQuery {
    /// TikTok/Instagram/YouTube/X/etc. URL.
    url: String,
}

async fn info(state: web::Data<AppState>, query: web::Query<MediaQuery>) -> Result<HttpResponse> {
    let key = format!("info:{}", query.url);
    let fetched = fetch_with_cache(
        &state.ytdlp_cache,
        &key,
        state.settings.ytdlp_cache_ttl,
        || ytdlp_service::extract_media_info(&state.settings.ytdlp_bin, &query.url),
    )
    .await?;
    Ok(HttpResponse::Ok().json(envelope(fetched.value, fetched.cached)))
}

async fn direct(state: web::Data<AppState>, query: web::Query<MediaQuery>) -> Result<HttpResponse> {
    let key = format!("direct:{}", query.url);
    let fetched = fetch_with_cache(
        &state.ytdlp_cache,
        &key,
        state.settings.ytdlp_cache_ttl,
        || async {
            let info =
                ytdlp_service::extract_media_info(&state.settings.ytdlp_bin, &query.url).await?;
            Ok(ytdlp_service::build_direct_links(&info))
        },
    )
    .await?;
    Ok(HttpResponse::Ok().json(envelope(fetched.value, fetched.cached)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/info").route(web::get().to(info)))
        .service(web::resource("/direct").route(web::get().to(direct)));
}
