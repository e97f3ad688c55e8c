use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use eventsource_stream::Eventsource;
use futures_util::StreamExt;
use gateway_core::UpstreamError;
use log::{debug, warn};
use reqwest::{Client, Response, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::Sender;

use crate::auth::CopilotAuth;
use crate::config::{self, CopilotEndpoints};
use crate::vault::TokenVault;

pub const DEFAULT_MODEL: &str = "gpt-4o";

const CHAT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);
const TOKEN_FILE_NAME: &str = ".copilot_token";

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatCompletionRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
}

/// Copilot chat proxy: device-auth lifecycle plus a streaming completions
/// relay. One instance is shared by all requests.
pub struct CopilotClient {
    client: Arc<ClientWithMiddleware>,
    auth: CopilotAuth,
    endpoints: CopilotEndpoints,
}

impl CopilotClient {
    pub fn new(data_dir: PathBuf) -> Self {
        Self::with_endpoints(data_dir, CopilotEndpoints::default())
    }

    pub fn with_endpoints(data_dir: PathBuf, endpoints: CopilotEndpoints) -> Self {
        let client = Arc::new(Self::build_retry_client());
        let vault = TokenVault::new(data_dir.join(TOKEN_FILE_NAME));
        let auth = CopilotAuth::new(Arc::clone(&client), endpoints.clone(), vault);
        CopilotClient {
            client,
            auth,
            endpoints,
        }
    }

    fn build_retry_client() -> ClientWithMiddleware {
        let retry_policy = ExponentialBackoff::builder()
            .retry_bounds(Duration::from_millis(100), Duration::from_secs(5))
            .build_with_max_retries(3);
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .build()
            .expect("copilot http client");
        ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build()
    }

    pub fn auth(&self) -> &CopilotAuth {
        &self.auth
    }

    /// Sends the completions request with a fresh-enough chat token. An
    /// auth-class refusal drops the in-memory token so the next request
    /// re-derives it; the on-disk access token is left alone.
    pub async fn send_chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<Response, UpstreamError> {
        let token = self.auth.chat_token().await?;
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let response = self
            .client
            .post(&self.endpoints.chat_completions_url)
            .timeout(CHAT_REQUEST_TIMEOUT)
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .header("Editor-Version", config::CHAT_EDITOR_VERSION)
            .header("Editor-Plugin-Version", config::CHAT_EDITOR_PLUGIN_VERSION)
            .header("Openai-Intent", "conversation-panel")
            .header("X-Github-Api-Version", "2023-07-07")
            .json(&serde_json::json!({
                "messages": request.messages,
                "model": model,
                "temperature": 0,
                "stream": true,
                "n": 1,
            }))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("chat completion refused with {status}, dropping cached chat token");
            self.auth.invalidate_chat_token().await;
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::rejected(status.as_u16(), body));
        }
        Ok(response)
    }

    /// Relays the SSE stream as plain content deltas into `tx`. Chunks that
    /// fail to parse are skipped, matching the provider's keep-alive noise.
    pub async fn relay_content_deltas(
        &self,
        response: Response,
        tx: Sender<Result<String, UpstreamError>>,
    ) {
        let mut stream = response.bytes_stream().eventsource();
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => {
                    if event.data.trim() == "[DONE]" {
                        break;
                    }
                    if let Some(content) = delta_content(&event.data) {
                        if tx.send(Ok(content)).await.is_err() {
                            debug!("chat stream receiver dropped, stopping relay");
                            break;
                        }
                    }
                }
                Err(e) => {
                    let _ = tx
                        .send(Err(UpstreamError::Unreachable(e.to_string())))
                        .await;
                    break;
                }
            }
        }
    }
}

/// Pulls `choices[0].delta.content` out of one SSE data payload.
fn delta_content(data: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(data).ok()?;
    let content = value
        .get("choices")?
        .get(0)?
        .get("delta")?
        .get("content")?
        .as_str()?;
    if content.is_empty() {
        None
    } else {
        Some(content.to_string())
    }
}
