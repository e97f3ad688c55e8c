use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use copilot_client::CopilotClient;
use gateway_core::TtlCache;
use gemini_web::{CookieStore, GeminiWebClient};
use log::{error, info};
use serde_json::Value;

use crate::config::Settings;
use crate::controllers::{
    bmkg_controller, converter_controller, copilot_controller, downloader_controller,
    gemini_controller, image_controller, islamic_controller, meta_controller, ocr_controller,
    utils_controller,
};
use crate::middleware::{RequestTracing, RequireApiKey};

const DEFAULT_WORKER_COUNT: usize = 10;
const GEMINI_COOKIE_FILE_NAME: &str = ".gemini_cookies.json";

pub struct AppState {
    pub settings: Settings,
    pub http: reqwest::Client,
    pub bmkg_cache: TtlCache<Value>,
    pub ytdlp_cache: TtlCache<Value>,
    pub copilot: Arc<CopilotClient>,
    pub gemini: Arc<GeminiWebClient>,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .connect_timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("http client");
        let copilot = Arc::new(CopilotClient::new(settings.data_dir.clone()));
        let gemini = Arc::new(GeminiWebClient::new(CookieStore::new(
            settings.data_dir.join(GEMINI_COOKIE_FILE_NAME),
        )));
        AppState {
            settings,
            http,
            bmkg_cache: TtlCache::new(),
            ytdlp_cache: TtlCache::new(),
            copilot,
            gemini,
        }
    }
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.configure(meta_controller::config).service(
        web::scope("/api")
            .service(
                web::scope("/bmkg")
                    .wrap(RequireApiKey)
                    .configure(bmkg_controller::config),
            )
            .service(
                web::scope("/dl")
                    .wrap(RequireApiKey)
                    .configure(downloader_controller::config),
            )
            .service(
                web::scope("/img")
                    .wrap(RequireApiKey)
                    .configure(image_controller::config),
            )
            .service(
                web::scope("/utils")
                    .wrap(RequireApiKey)
                    .configure(utils_controller::config),
            )
            .service(web::scope("/islamic").configure(islamic_controller::config))
            .service(web::scope("/convert").configure(converter_controller::config))
            .service(web::scope("/ocr").configure(ocr_controller::config))
            .service(web::scope("/copilot").configure(copilot_controller::config))
            .service(web::scope("/gemini-web").configure(gemini_controller::config)),
    );
}

fn build_cors(settings: &Settings) -> Cors {
    let origins = settings.cors_origins_list();
    if origins.iter().any(|o| o == "*") {
        return Cors::permissive();
    }
    let mut cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);
    for origin in origins {
        cors = cors.allowed_origin(&origin);
    }
    cors
}

pub async fn run(settings: Settings, port: u16) -> Result<(), String> {
    info!("Starting gateway...");

    if !settings.api_key_configured() {
        error!("API_KEY is not configured; protected routes will refuse requests");
    }

    let app_state = web::Data::new(AppState::new(settings));

    let server = HttpServer::new(move || {
        let cors = build_cors(&app_state.settings);
        App::new()
            .app_data(app_state.clone())
            .wrap(cors)
            .wrap(RequestTracing)
            .configure(app_config)
    })
    .workers(DEFAULT_WORKER_COUNT)
    .bind(format!("127.0.0.1:{port}"))
    .map_err(|e| format!("Failed to bind server: {e}"))?
    .run();

    info!("Gateway listening on http://127.0.0.1:{port}");

    if let Err(e) = server.await {
        error!("Web server error: {e}");
        return Err(format!("Web server error: {e}"));
    }

    Ok(())
}
