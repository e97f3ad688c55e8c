//! Configuration for the gateway.
//!
//! Everything comes from environment variables with fallback to defaults.
//! Upstream base URLs live here too so tests can point services at a mock
//! server.

use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Shared secret expected in `X-API-Key` on protected routes. The
    /// placeholder default counts as unconfigured and makes protected
    /// routes fail closed.
    pub api_key: String,
    pub cors_allow_origins: String,

    pub bmkg_cache_ttl: Duration,
    pub ytdlp_cache_ttl: Duration,

    /// Where the Copilot token and Gemini cookie files live.
    pub data_dir: PathBuf,

    pub ytdlp_bin: String,
    pub ffmpeg_bin: String,
    pub soffice_bin: String,

    pub bmkg_autogempa_url: String,
    pub quran_base_url: String,
    pub hadith_base_url: String,
    pub prayer_base_url: String,
    pub removebg_url: String,
    pub removebg_api_key: Option<String>,
    pub ocr_upload_url: String,
    pub ocr_extract_url: String,
    pub ocr_app_id: String,
}

pub const API_KEY_PLACEHOLDER: &str = "CHANGE-ME";

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_secs_or(name: &str, default: u64) -> Duration {
    Duration::from_secs(
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default),
    )
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_env()
    }
}

impl Settings {
    /// Environment variables:
    /// - `API_KEY`: shared secret for protected routes
    /// - `CORS_ALLOW_ORIGINS`: comma-separated origin list, `*` for any
    /// - `BMKG_CACHE_TTL_SECONDS` (default 30)
    /// - `YTDLP_CACHE_TTL_SECONDS` (default 15)
    /// - `DATA_DIR`: credential file directory (default `.`)
    /// - `YTDLP_BIN` / `FFMPEG_BIN` / `SOFFICE_BIN`: converter executables
    /// - `REMOVEBG_API_KEY`: enables the background-removal endpoints
    pub fn from_env() -> Self {
        Settings {
            api_key: env_or("API_KEY", API_KEY_PLACEHOLDER),
            cors_allow_origins: env_or("CORS_ALLOW_ORIGINS", "*"),
            bmkg_cache_ttl: env_secs_or("BMKG_CACHE_TTL_SECONDS", 30),
            ytdlp_cache_ttl: env_secs_or("YTDLP_CACHE_TTL_SECONDS", 15),
            data_dir: PathBuf::from(env_or("DATA_DIR", ".")),
            ytdlp_bin: env_or("YTDLP_BIN", "yt-dlp"),
            ffmpeg_bin: env_or("FFMPEG_BIN", "ffmpeg"),
            soffice_bin: env_or("SOFFICE_BIN", "soffice"),
            bmkg_autogempa_url: env_or(
                "BMKG_AUTOGEMPA_URL",
                "https://data.bmkg.go.id/DataMKG/TEWS/autogempa.json",
            ),
            quran_base_url: env_or("QURAN_BASE_URL", "https://equran.id/api/v2"),
            hadith_base_url: env_or(
                "HADITH_BASE_URL",
                "https://cdn.jsdelivr.net/gh/fawazahmed0/hadith-api@1",
            ),
            prayer_base_url: env_or("PRAYER_BASE_URL", "https://api.aladhan.com/v1"),
            removebg_url: env_or("REMOVEBG_URL", "https://api.remove.bg/v1.0/removebg"),
            removebg_api_key: std::env::var("REMOVEBG_API_KEY").ok(),
            ocr_upload_url: env_or("OCR_UPLOAD_URL", "https://file.io"),
            ocr_extract_url: env_or(
                "OCR_EXTRACT_URL",
                "https://base44.app/api/apps/68eeb6171a0e2bf341b93443/integration-endpoints/Core/ExtractDataFromUploadedFile",
            ),
            ocr_app_id: env_or("OCR_APP_ID", "68eeab16253a1b0a823884ad"),
        }
    }

    pub fn api_key_configured(&self) -> bool {
        !self.api_key.is_empty() && self.api_key != API_KEY_PLACEHOLDER
    }

    pub fn cors_origins_list(&self) -> Vec<String> {
        let raw = self.cors_allow_origins.trim();
        if raw.is_empty() || raw == "*" {
            return vec!["*".to_string()];
        }
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::from_env();
        assert!(settings.bmkg_cache_ttl.as_secs() > 0);
        assert!(settings.ytdlp_cache_ttl.as_secs() > 0);
        assert!(!settings.ytdlp_bin.is_empty());
    }

    #[test]
    fn placeholder_api_key_counts_as_unconfigured() {
        let mut settings = Settings::from_env();
        settings.api_key = API_KEY_PLACEHOLDER.to_string();
        assert!(!settings.api_key_configured());
        settings.api_key = "secret".to_string();
        assert!(settings.api_key_configured());
    }

    #[test]
    fn cors_origin_list_splits_and_trims() {
        let mut settings = Settings::from_env();
        settings.cors_allow_origins = "*".to_string();
        assert_eq!(settings.cors_origins_list(), vec!["*"]);

        settings.cors_allow_origins = "https://a.test, https://b.test ,".to_string();
        assert_eq!(
            settings.cors_origins_list(),
            vec!["https://a.test", "https://b.test"]
        );
    }
}
