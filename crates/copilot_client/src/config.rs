pub const CLIENT_ID: &str = "Iv1.b507a08c87ecfe98";
pub const SCOPE: &str = "read:user";

pub const USER_AGENT: &str = "GithubCopilot/1.155.0";
pub const EDITOR_VERSION: &str = "Neovim/0.6.1";
pub const EDITOR_PLUGIN_VERSION: &str = "copilot.vim/1.16.0";

pub const CHAT_EDITOR_VERSION: &str = "vscode/1.95.3";
pub const CHAT_EDITOR_PLUGIN_VERSION: &str = "copilot-chat/0.22.4";

/// Provider URLs, overridable so tests can point the client at a mock
/// server.
#[derive(Debug, Clone)]
pub struct CopilotEndpoints {
    pub device_code_url: String,
    pub access_token_url: String,
    pub token_exchange_url: String,
    pub chat_completions_url: String,
}

impl Default for CopilotEndpoints {
    fn default() -> Self {
        CopilotEndpoints {
            device_code_url: "https://github.com/login/device/code".to_string(),
            access_token_url: "https://github.com/login/oauth/access_token".to_string(),
            token_exchange_url: "https://api.github.com/copilot_internal/v2/token".to_string(),
            chat_completions_url: "https://api.individual.githubcopilot.com/chat/completions"
                .to_string(),
        }
    }
}

impl CopilotEndpoints {
    /// All four endpoints rooted at one base URL. Used by tests against a
    /// single mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        CopilotEndpoints {
            device_code_url: format!("{base}/login/device/code"),
            access_token_url: format!("{base}/login/oauth/access_token"),
            token_exchange_url: format!("{base}/copilot_internal/v2/token"),
            chat_completions_url: format!("{base}/chat/completions"),
        }
    }
}
