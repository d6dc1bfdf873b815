//! In-memory cache for GET responses.
//!
//! Entries are keyed by path plus sorted query string. Any successful write
//! to a collection drops every cached read from that collection, so a cart
//! read after `PUT /carts/{id}` always goes to the API.

use std::time::Duration;

use moka::future::Cache;
use tracing::warn;

use super::ApiResponse;

/// Maximum number of cached responses.
const MAX_CAPACITY: u64 = 1000;

/// GET response cache shared by every visitor.
#[derive(Clone)]
pub struct ResponseCache {
    cache: Cache<String, ApiResponse>,
}

impl ResponseCache {
    /// Create a cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(MAX_CAPACITY)
            .time_to_live(ttl)
            .support_invalidation_closures()
            .build();

        Self { cache }
    }

    /// Whether a GET on `path` may be cached.
    ///
    /// Paths with a `:` segment (`/:sessions/:current`, `/accounts/:login`)
    /// are resolved per visitor by the API and never cached.
    pub fn is_cacheable(path: &str) -> bool {
        !path.split('/').any(|segment| segment.starts_with(':'))
    }

    /// Build the cache key for a GET.
    pub fn key(path: &str, query: &[(String, String)]) -> String {
        if query.is_empty() {
            return path.to_string();
        }

        let mut pairs: Vec<String> = query.iter().map(|(k, v)| format!("{k}={v}")).collect();
        pairs.sort();
        format!("{path}?{}", pairs.join("&"))
    }

    /// Look up a cached response.
    pub async fn get(&self, key: &str) -> Option<ApiResponse> {
        self.cache.get(key).await
    }

    /// Store a response. Error-bearing responses are not cached.
    pub async fn insert(&self, key: String, response: &ApiResponse) {
        if response.is_errors() {
            return;
        }
        self.cache.insert(key, response.clone()).await;
    }

    /// Drop every cached read from the collection `path` belongs to.
    pub fn invalidate_collection(&self, path: &str) {
        let collection = collection_of(path).to_string();
        if let Err(e) = self
            .cache
            .invalidate_entries_if(move |key, _| collection_of(key) == collection)
        {
            warn!(error = %e, "Failed to invalidate cached responses");
        }
    }
}

/// The first path segment: `/carts/c1/items` -> `carts`.
fn collection_of(path: &str) -> &str {
    path.trim_start_matches('/')
        .split(['/', '?'])
        .next()
        .unwrap_or_default()
}
