use actix_http::Request;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use serde_json::Value;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use web_service::config::Settings;
use web_service::server::{app_config, AppState};

fn test_settings(data_dir: &TempDir) -> Settings {
    let mut settings = Settings::from_env();
    settings.api_key = "test-secret".to_string();
    settings.data_dir = data_dir.path().to_path_buf();
    settings
}

async fn create_test_app(
    settings: Settings,
) -> impl Service<Request, Response = ServiceResponse, Error = Error> {
    let app_state = web::Data::new(AppState::new(settings));
    test::init_service(App::new().app_data(app_state).configure(app_config)).await
}

#[actix_web::test]
async fn health_reports_up() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], true);
    assert_eq!(body["status"], "up");
}

#[actix_web::test]
async fn root_redirects_to_health() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 302);
    assert_eq!(resp.headers().get("location").unwrap(), "/health");
}

#[actix_web::test]
async fn protected_route_requires_key() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get()
        .uri("/api/utils/hash?text=abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Missing X-API-Key");
}

#[actix_web::test]
async fn protected_route_rejects_wrong_key() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get()
        .uri("/api/utils/hash?text=abc")
        .insert_header(("X-API-Key", "wrong"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid API key");
}

#[actix_web::test]
async fn unconfigured_server_key_fails_closed() {
    let dir = TempDir::new().unwrap();
    let mut settings = test_settings(&dir);
    settings.api_key = web_service::config::API_KEY_PLACEHOLDER.to_string();
    let app = create_test_app(settings).await;

    let req = test::TestRequest::get()
        .uri("/api/utils/hash?text=abc")
        .insert_header(("X-API-Key", "anything"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 500);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Server API_KEY not configured");
}

#[actix_web::test]
async fn hash_endpoint_digests_with_valid_key() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get()
        .uri("/api/utils/hash?text=abc&algo=sha256")
        .insert_header(("X-API-Key", "test-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["digest"],
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

#[actix_web::test]
async fn base64_decode_rejects_garbage() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get()
        .uri("/api/utils/base64/decode?b64=%21%21%21")
        .insert_header(("X-API-Key", "test-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
}

#[actix_web::test]
async fn autogempa_serves_fresh_then_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/autogempa.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "Infogempa": { "gempa": { "Magnitude": "4.8" } }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut settings = test_settings(&dir);
    settings.bmkg_autogempa_url = format!("{}/autogempa.json", server.uri());
    let app = create_test_app(settings).await;

    let req = test::TestRequest::get()
        .uri("/api/bmkg/autogempa")
        .insert_header(("X-API-Key", "test-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cached"], false);
    assert_eq!(body["source"], "BMKG");
    assert_eq!(body["data"]["Infogempa"]["gempa"]["Magnitude"], "4.8");

    // Second hit inside the TTL is served from the cache, without the
    // upstream attribution. The mock's expect(1) enforces a single fetch.
    let req = test::TestRequest::get()
        .uri("/api/bmkg/autogempa")
        .insert_header(("X-API-Key", "test-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["cached"], true);
    assert!(body.get("source").is_none());
}

#[actix_web::test]
async fn upstream_outage_maps_to_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/autogempa.json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut settings = test_settings(&dir);
    settings.bmkg_autogempa_url = format!("{}/autogempa.json", server.uri());
    let app = create_test_app(settings).await;

    let req = test::TestRequest::get()
        .uri("/api/bmkg/autogempa")
        .insert_header(("X-API-Key", "test-secret"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 502);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["ok"], false);
}

#[actix_web::test]
async fn islamic_routes_are_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/surat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [{ "nomor": 1, "namaLatin": "Al-Fatihah" }]
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let mut settings = test_settings(&dir);
    settings.quran_base_url = server.uri();
    let app = create_test_app(settings).await;

    // No X-API-Key on purpose.
    let req = test::TestRequest::get().uri("/api/islamic/quran").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());
}

#[actix_web::test]
async fn tahlil_is_served_statically() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::get()
        .uri("/api/islamic/tahlil")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert!(body["data"].as_array().map(|a| !a.is_empty()).unwrap_or(false));
}

#[actix_web::test]
async fn copilot_chat_without_auth_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::post()
        .uri("/api/copilot/chat")
        .set_json(serde_json::json!({
            "messages": [{ "role": "user", "content": "hi" }]
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn gemini_chat_without_cookies_is_unauthorized() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::post()
        .uri("/api/gemini-web/chat")
        .set_json(serde_json::json!({ "message": "hi" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_web::test]
async fn gemini_auth_persists_cookies() {
    let dir = TempDir::new().unwrap();
    let app = create_test_app(test_settings(&dir)).await;

    let req = test::TestRequest::post()
        .uri("/api/gemini-web/auth")
        .set_json(serde_json::json!({
            "secure_1psid": "a",
            "secure_1psidts": "b",
            "secure_1psidcc": "c"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "success");
    assert!(dir.path().join(".gemini_cookies.json").exists());
}
