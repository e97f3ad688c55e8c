use std::sync::Arc;
use std::time::{Duration, Instant};

use gateway_core::UpstreamError;
use log::{info, warn};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::config::{self, CopilotEndpoints};
use crate::vault::TokenVault;

/// The chat token GitHub hands out lives ~30 minutes; we refresh after 25
/// so a request never goes out with a token about to lapse.
const CHAT_TOKEN_TTL: Duration = Duration::from_secs(25 * 60);

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeviceCodeResponse {
    pub device_code: String,
    pub user_code: String,
    pub verification_uri: String,
    pub expires_in: u64,
    pub interval: u64,
}

#[derive(Debug, Deserialize)]
struct AccessTokenPoll {
    access_token: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenExchangeResponse {
    token: String,
}

/// Outcome of a single device-auth poll. Re-polling on the provider's
/// interval is the caller's responsibility.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Success,
    Pending { reason: String },
}

#[derive(Debug, Clone)]
struct DerivedToken {
    token: String,
    expires_at: Instant,
}

/// Device-code OAuth flow plus chat-token refresh.
///
/// Holds the long-lived access token in the on-disk vault and the derived
/// chat token in memory only. The mutex is held across the exchange call so
/// concurrent requests do not race a refresh.
pub struct CopilotAuth {
    client: Arc<ClientWithMiddleware>,
    endpoints: CopilotEndpoints,
    vault: TokenVault,
    derived: Mutex<Option<DerivedToken>>,
}

impl CopilotAuth {
    pub fn new(
        client: Arc<ClientWithMiddleware>,
        endpoints: CopilotEndpoints,
        vault: TokenVault,
    ) -> Self {
        CopilotAuth {
            client,
            endpoints,
            vault,
            derived: Mutex::new(None),
        }
    }

    pub fn vault(&self) -> &TokenVault {
        &self.vault
    }

    pub fn is_authenticated(&self) -> bool {
        self.vault.load().is_some()
    }

    /// Step 1: ask GitHub for a device code and verification URL. Safe to
    /// call again at any time; each call starts a fresh session.
    pub async fn start_device_auth(&self) -> Result<DeviceCodeResponse, UpstreamError> {
        let response = self
            .client
            .post(&self.endpoints.device_code_url)
            .header("accept", "application/json")
            .header("editor-version", config::EDITOR_VERSION)
            .header("editor-plugin-version", config::EDITOR_PLUGIN_VERSION)
            .header("user-agent", config::USER_AGENT)
            .json(&serde_json::json!({
                "client_id": config::CLIENT_ID,
                "scope": config::SCOPE,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::rejected(status.as_u16(), body));
        }
        Ok(response.json::<DeviceCodeResponse>().await?)
    }

    /// Step 2: poll the token endpoint once. No retry loop here; the caller
    /// re-polls on the interval returned by `start_device_auth`. A denied or
    /// expired device code is an error, not a pending outcome: re-polling it
    /// can never succeed.
    pub async fn check_device_auth(&self, device_code: &str) -> Result<AuthOutcome, UpstreamError> {
        let response = self
            .client
            .post(&self.endpoints.access_token_url)
            .header("accept", "application/json")
            .header("editor-version", config::EDITOR_VERSION)
            .header("editor-plugin-version", config::EDITOR_PLUGIN_VERSION)
            .header("user-agent", config::USER_AGENT)
            .json(&serde_json::json!({
                "client_id": config::CLIENT_ID,
                "device_code": device_code,
                "grant_type": "urn:ietf:params:oauth:grant-type:device_code",
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::rejected(status.as_u16(), body));
        }

        let poll = response.json::<AccessTokenPoll>().await?;
        if let Some(token) = poll.access_token {
            self.vault
                .store(&token)
                .map_err(|e| UpstreamError::TokenExchangeFailed(format!(
                    "failed to persist access token: {e}"
                )))?;
            info!("device auth complete, access token stored");
            return Ok(AuthOutcome::Success);
        }
        if let Some(error) = poll.error {
            let reason = poll.error_description.unwrap_or_else(|| error.clone());
            // Only genuinely-pending codes are worth re-polling; a denied or
            // expired device code means the flow must be restarted.
            return match error.as_str() {
                "authorization_pending" | "slow_down" => Ok(AuthOutcome::Pending { reason }),
                _ => Err(UpstreamError::AuthPending(reason)),
            };
        }
        Err(UpstreamError::rejected(
            502,
            "unrecognized token response from provider",
        ))
    }

    /// Returns a chat token, exchanging the stored access token for a fresh
    /// one only when the in-memory token is absent or past its refresh
    /// deadline. The access token on disk is never removed here: a failed
    /// exchange must not force the user back through device auth.
    pub async fn chat_token(&self) -> Result<String, UpstreamError> {
        let mut derived = self.derived.lock().await;
        if let Some(cached) = derived.as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.token.clone());
            }
        }

        let access_token = self.vault.load().ok_or(UpstreamError::NotAuthenticated)?;

        let response = self
            .client
            .get(&self.endpoints.token_exchange_url)
            .header("authorization", format!("token {access_token}"))
            .header("editor-version", config::EDITOR_VERSION)
            .header("editor-plugin-version", config::EDITOR_PLUGIN_VERSION)
            .header("user-agent", config::USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("chat token exchange failed with {status}");
            return Err(UpstreamError::TokenExchangeFailed(format!("{status}: {body}")));
        }

        let exchanged = response.json::<TokenExchangeResponse>().await?;
        *derived = Some(DerivedToken {
            token: exchanged.token.clone(),
            expires_at: Instant::now() + CHAT_TOKEN_TTL,
        });
        Ok(exchanged.token)
    }

    /// Drops the in-memory chat token so the next call re-derives it. Called
    /// after an auth-class failure from the chat endpoint.
    pub async fn invalidate_chat_token(&self) {
        let mut derived = self.derived.lock().await;
        *derived = None;
    }

    /// Removes both credentials. Only an explicit logout touches the vault.
    pub async fn logout(&self) -> std::io::Result<()> {
        let mut derived = self.derived.lock().await;
        *derived = None;
        self.vault.clear()
    }
}
