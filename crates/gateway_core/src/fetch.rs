use std::future::Future;
use std::time::Duration;

use log::debug;

use crate::cache::TtlCache;
use crate::error::UpstreamError;

/// Result of a cache-wrapped fetch, tagging whether the value was served
/// from cache or pulled fresh from the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<V> {
    pub value: V,
    pub cached: bool,
}

/// The shared shape of every proxying endpoint: check the cache under a
/// caller-derived key, call the upstream on a miss, populate on success.
///
/// Failures never populate the cache, so a bad upstream answer is retried
/// on the next request. There is no coalescing of concurrent misses: two
/// simultaneous misses for the same key both call the upstream and the last
/// write wins.
pub async fn fetch_with_cache<V, F, Fut>(
    cache: &TtlCache<V>,
    key: &str,
    ttl: Duration,
    fetch_fn: F,
) -> Result<Fetched<V>, UpstreamError>
where
    V: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<V, UpstreamError>>,
{
    if let Some(value) = cache.get(key) {
        debug!("cache hit for {key}");
        return Ok(Fetched {
            value,
            cached: true,
        });
    }

    debug!("cache miss for {key}, calling upstream");
    let value = fetch_fn().await?;
    cache.set(key, value.clone(), ttl);
    Ok(Fetched {
        value,
        cached: false,
    })
}
