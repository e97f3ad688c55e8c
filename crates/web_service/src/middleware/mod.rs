pub mod api_key;
pub mod request_tracing;

pub use api_key::RequireApiKey;
pub use request_tracing::RequestTracing;
