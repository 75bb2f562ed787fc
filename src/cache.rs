use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::error::Result;

/// Expiration horizon for cached stargazer pages: 30 days.
pub const PAGE_TTL: Duration = Duration::from_secs(2_592_000);

/// Key-value store for fetched pages, keyed by the exact request URL.
///
/// The store is treated as an external collaborator: a failed lookup is a
/// cache miss, not an error, and callers degrade to the network.
#[allow(async_fn_in_trait)]
pub trait PageCache {
    /// Look up a page's raw timestamp strings. Expired entries read as absent.
    async fn read(&self, key: &str) -> Result<Option<Vec<String>>>;

    /// Store a page's raw timestamp strings with the given expiration horizon.
    async fn write(&self, key: &str, timestamps: &[String], ttl: Duration) -> Result<()>;
}

/// A cached page: the serialized timestamp list plus its write instant.
#[derive(Debug, Clone)]
struct CachedPage {
    payload: String,
    cached_at: DateTime<Utc>,
    ttl: Duration,
}

impl CachedPage {
    fn is_expired(&self) -> bool {
        let elapsed = Utc::now()
            .signed_duration_since(self.cached_at)
            .to_std()
            .unwrap_or(Duration::MAX);
        elapsed > self.ttl
    }
}

/// In-process implementation of [`PageCache`].
#[derive(Debug, Default)]
pub struct MemoryPageCache {
    entries: RwLock<HashMap<String, CachedPage>>,
}

impl MemoryPageCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageCache for MemoryPageCache {
    async fn read(&self, key: &str) -> Result<Option<Vec<String>>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                let timestamps: Vec<String> = serde_json::from_str(&entry.payload)?;
                Ok(Some(timestamps))
            }
            _ => Ok(None),
        }
    }

    async fn write(&self, key: &str, timestamps: &[String], ttl: Duration) -> Result<()> {
        let entry = CachedPage {
            payload: serde_json::to_string(timestamps)?,
            cached_at: Utc::now(),
            ttl,
        };
        self.entries.write().await.insert(key.to_string(), entry);
        Ok(())
    }
}
