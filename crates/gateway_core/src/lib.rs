pub mod cache;
pub mod error;
pub mod fetch;

pub use cache::TtlCache;
pub use error::UpstreamError;
pub use fetch::{fetch_with_cache, Fetched};
