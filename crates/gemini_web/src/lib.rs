//! Cookie-authenticated client for the Gemini web app.
//!
//! There is no official API behind this: authentication is three browser
//! cookies supplied by the user, and each session needs the `SNlM0e`
//! anti-CSRF value scraped from the app page before the chat RPC accepts
//! requests. Cookies persist on disk; the initialized session lives in
//! memory only and is dropped on auth-class failures.

pub mod cookies;

pub use cookies::CookieStore;

use std::time::Duration;

use gateway_core::UpstreamError;
use log::{info, warn};
use regex::Regex;
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
struct Session {
    snlm0e: String,
}

/// Base URLs, overridable for tests.
#[derive(Debug, Clone)]
pub struct GeminiEndpoints {
    pub app_url: String,
    pub generate_url: String,
}

impl Default for GeminiEndpoints {
    fn default() -> Self {
        GeminiEndpoints {
            app_url: "https://gemini.google.com/app".to_string(),
            generate_url: "https://gemini.google.com/_/BardChatUi/data/\
                           assistant.lamda.BardFrontendService/StreamGenerate"
                .to_string(),
        }
    }
}

impl GeminiEndpoints {
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        GeminiEndpoints {
            app_url: format!("{base}/app"),
            generate_url: format!("{base}/stream-generate"),
        }
    }
}

pub struct GeminiWebClient {
    http: Client,
    endpoints: GeminiEndpoints,
    cookies: CookieStore,
    session: Mutex<Option<Session>>,
}

impl GeminiWebClient {
    pub fn new(cookies: CookieStore) -> Self {
        Self::with_endpoints(cookies, GeminiEndpoints::default())
    }

    pub fn with_endpoints(cookies: CookieStore, endpoints: GeminiEndpoints) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(USER_AGENT)
            .build()
            .expect("gemini http client");
        GeminiWebClient {
            http,
            endpoints,
            cookies,
            session: Mutex::new(None),
        }
    }

    /// Stores new cookies and drops any live session so the next chat
    /// re-initializes with them.
    pub async fn set_cookies(
        &self,
        psid: &str,
        psidts: &str,
        psidcc: &str,
    ) -> std::io::Result<()> {
        self.cookies.store(psid, psidts, psidcc)?;
        let mut session = self.session.lock().await;
        *session = None;
        info!("gemini cookies updated, session reset");
        Ok(())
    }

    pub fn is_authenticated(&self) -> bool {
        self.cookies.load().is_some()
    }

    async fn init_session(&self, cookie_header: &str) -> Result<Session, UpstreamError> {
        let response = self
            .http
            .get(&self.endpoints.app_url)
            .header("Cookie", cookie_header)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::TokenExchangeFailed(format!(
                "app page returned {status}"
            )));
        }

        let body = response.text().await?;
        let snlm0e = scrape_snlm0e(&body).ok_or_else(|| {
            UpstreamError::TokenExchangeFailed(
                "SNlM0e token not found, cookies are likely stale".to_string(),
            )
        })?;
        Ok(Session { snlm0e })
    }

    /// Sends one chat turn and returns the reply text. Auth-class refusals
    /// drop the in-memory session; the cookie file is never touched here.
    pub async fn chat(&self, message: &str) -> Result<String, UpstreamError> {
        let cookies = self.cookies.load().ok_or(UpstreamError::NotAuthenticated)?;
        let cookie_header = cookies.header_value();

        let mut session = self.session.lock().await;
        if session.is_none() {
            *session = Some(self.init_session(&cookie_header).await?);
        }
        let snlm0e = session.as_ref().map(|s| s.snlm0e.clone()).unwrap_or_default();

        let f_req = serde_json::json!([
            null,
            serde_json::json!([[message], null, [null, null, null]]).to_string(),
        ])
        .to_string();

        let response = self
            .http
            .post(&self.endpoints.generate_url)
            .header("Cookie", &cookie_header)
            .query(&[("bl", "boq_assistant-bard-web-server_20240519.16_p0"), ("rt", "c")])
            .form(&[("at", snlm0e.as_str()), ("f.req", f_req.as_str())])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            warn!("gemini chat refused with {status}, dropping session");
            *session = None;
            return Err(UpstreamError::rejected(status.as_u16(), "cookies rejected"));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::rejected(status.as_u16(), body));
        }

        let body = response.text().await?;
        parse_chat_response(&body).ok_or_else(|| {
            UpstreamError::Unreachable("could not parse Gemini response envelope".to_string())
        })
    }
}

fn scrape_snlm0e(body: &str) -> Option<String> {
    let re = Regex::new(r#""SNlM0e":"(.*?)""#).ok()?;
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// The StreamGenerate body is a `)]}'`-prefixed batchexecute envelope:
/// length-prefixed lines where each payload line is a JSON array whose
/// `[0][2]` slot holds another JSON document with the reply at
/// `[4][0][1][0]`.
fn parse_chat_response(body: &str) -> Option<String> {
    for line in body.lines() {
        let trimmed = line.trim();
        if !trimmed.starts_with('[') {
            continue;
        }
        let Ok(outer) = serde_json::from_str::<serde_json::Value>(trimmed) else {
            continue;
        };
        let Some(inner_raw) = outer
            .get(0)
            .and_then(|v| v.get(2))
            .and_then(|v| v.as_str())
        else {
            continue;
        };
        let Ok(inner) = serde_json::from_str::<serde_json::Value>(inner_raw) else {
            continue;
        };
        if let Some(text) = inner
            .get(4)
            .and_then(|v| v.get(0))
            .and_then(|v| v.get(1))
            .and_then(|v| v.get(0))
            .and_then(|v| v.as_str())
        {
            return Some(text.to_string());
        }
    }
    None
}
