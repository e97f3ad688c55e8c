use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// The three browser cookies Gemini needs. Stored as plain JSON: unlike the
/// Copilot token these are user-supplied values the user already has in
/// their browser, so there is nothing to hide from them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeminiCookies {
    #[serde(rename = "__Secure-1PSID")]
    pub psid: String,
    #[serde(rename = "__Secure-1PSIDTS")]
    pub psidts: String,
    #[serde(rename = "__Secure-1PSIDCC")]
    pub psidcc: String,
}

impl GeminiCookies {
    pub fn header_value(&self) -> String {
        format!(
            "__Secure-1PSID={}; __Secure-1PSIDTS={}; __Secure-1PSIDCC={}",
            self.psid, self.psidts, self.psidcc
        )
    }
}

#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CookieStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Option<GeminiCookies> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str(&content).ok()
    }

    pub fn store(&self, psid: &str, psidts: &str, psidcc: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let cookies = GeminiCookies {
            psid: psid.to_string(),
            psidts: psidts.to_string(),
            psidcc: psidcc.to_string(),
        };
        let serialized = serde_json::to_string(&cookies)?;
        fs::write(&self.path, serialized)
    }
}
