pub mod auth;
pub mod chat;
pub mod config;
pub mod vault;

pub use auth::{AuthOutcome, CopilotAuth, DeviceCodeResponse};
pub use chat::{ChatCompletionRequest, ChatMessage, CopilotClient};
pub use config::CopilotEndpoints;
