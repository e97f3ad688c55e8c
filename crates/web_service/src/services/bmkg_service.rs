use gateway_core::UpstreamError;
use serde_json::Value;

/// Latest-earthquake feed from BMKG. Plain JSON passthrough.
pub async fn fetch_autogempa(http: &reqwest::Client, url: &str) -> Result<Value, UpstreamError> {
    let response = http.get(url).send().await?.error_for_status()?;
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn passes_feed_json_through() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/autogempa.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Infogempa": { "gempa": { "Magnitude": "5.0" } }
            })))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/autogempa.json", server.uri());
        let data = fetch_autogempa(&http, &url).await.expect("fetch");
        assert_eq!(data["Infogempa"]["gempa"]["Magnitude"], "5.0");
    }

    #[tokio::test]
    async fn upstream_error_status_is_classified_as_rejection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/autogempa.json"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let http = reqwest::Client::new();
        let url = format!("{}/autogempa.json", server.uri());
        let err = fetch_autogempa(&http, &url).await.expect_err("must fail");
        assert!(matches!(err, UpstreamError::Rejected { status: 503, .. }));
    }
}
