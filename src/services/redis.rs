//! Redis integration service implementation
//!
//! This service handles the shared Redis client, prefixed JSON caching with
//! TTL, and pattern invalidation of cached listings.

use std::sync::Arc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use tokio::sync::OnceCell;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};
use crate::config::settings::Settings;
use crate::utils::errors::Result;

/// Cache key for the university list
pub const UNIVERSITIES_KEY: &str = "universities:all";
/// Key prefix for cached club directory pages
pub const CLUB_DIRECTORY_PREFIX: &str = "clubs:directory:";

/// Reconnect attempts before a cache call gives up and falls back
pub(crate) const CONNECT_RETRIES: usize = 1;

/// Redis service for caching and state management
#[derive(Clone)]
pub struct RedisService {
    client: Client,
    /// Shared by every clone; created on first use
    connection_manager: Arc<OnceCell<ConnectionManager>>,
    settings: Settings,
}

impl RedisService {
    /// Create a new RedisService instance; no connection is made until first use
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::open(settings.redis.url.as_str())?;
        Ok(Self {
            client,
            connection_manager: Arc::new(OnceCell::new()),
            settings,
        })
    }

    /// Handle on the shared connection manager, connecting on first call.
    /// A failed connect is not cached, so the next call retries.
    async fn get_connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection_manager
            .get_or_try_init(|| ConnectionManager::new_with_backoff(self.client.clone(), 2, 100, CONNECT_RETRIES))
            .await?;
        Ok(manager.clone())
    }

    fn full_key(&self, key: &str) -> String {
        format!("{}{}", self.settings.redis.prefix, key)
    }

    /// Set a value in Redis with TTL
    pub async fn set<T>(&self, key: &str, value: &T, ttl_seconds: Option<u64>) -> Result<()>
    where
        T: Serialize,
    {
        let mut conn = self.get_connection().await?;
        let serialized = serde_json::to_string(value)?;
        let full_key = self.full_key(key);
        let ttl = ttl_seconds.unwrap_or(self.settings.redis.ttl_seconds);

        let _: () = conn.set_ex(&full_key, serialized, ttl).await?;

        debug!(key = %full_key, ttl = ttl, "Value set in Redis");
        Ok(())
    }

    /// Get a value from Redis
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let result: Option<String> = conn.get(&full_key).await?;

        match result {
            Some(data) => {
                let deserialized = serde_json::from_str::<T>(&data)?;
                debug!(key = %full_key, "Value retrieved from Redis");
                Ok(Some(deserialized))
            }
            None => {
                debug!(key = %full_key, "Key not found in Redis");
                Ok(None)
            }
        }
    }

    /// Delete a key from Redis
    pub async fn delete(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let deleted: i64 = conn.del(&full_key).await?;

        debug!(key = %full_key, deleted = deleted > 0, "Key deletion attempted");
        Ok(deleted > 0)
    }

    /// Check if a key exists in Redis
    pub async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.get_connection().await?;
        let full_key = self.full_key(key);

        let exists: bool = conn.exists(&full_key).await?;
        Ok(exists)
    }

    /// Delete all keys matching a pattern, scanning instead of `KEYS`
    pub async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.get_connection().await?;
        let full_pattern = self.full_key(pattern);

        let mut keys: Vec<String> = Vec::new();
        {
            let mut iter = conn.scan_match::<_, String>(&full_pattern).await?;
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
        }

        if keys.is_empty() {
            return Ok(0);
        }

        let deleted: u64 = conn.del(&keys).await?;
        info!(pattern = %full_pattern, deleted = deleted, "Keys deleted by pattern");
        Ok(deleted)
    }

    /// Read through the cache; Redis failures fall back to the loader
    pub async fn cached<T, F, Fut>(&self, key: &str, ttl_seconds: Option<u64>, load: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        match self.get::<T>(key).await {
            Ok(Some(hit)) => return Ok(hit),
            Ok(None) => {}
            Err(e) => warn!(key = %key, error = %e, "Cache read failed"),
        }

        let value = load().await?;
        if let Err(e) = self.set(key, &value, ttl_seconds).await {
            warn!(key = %key, error = %e, "Cache write failed");
        }
        Ok(value)
    }

    /// Drop a cached key, logging instead of failing
    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.delete(key).await {
            warn!(key = %key, error = %e, "Cache invalidation failed");
        }
    }

    /// Drop every cached key under a prefix, logging instead of failing
    pub async fn invalidate_prefix(&self, prefix: &str) {
        if let Err(e) = self.delete_pattern(&format!("{}*", prefix)).await {
            warn!(prefix = %prefix, error = %e, "Cache invalidation failed");
        }
    }

    /// Health check for Redis connection
    pub async fn health_check(&self) -> Result<bool> {
        match self.get_connection().await {
            Ok(mut conn) => {
                let result: RedisResult<String> = redis::cmd("PING").query_async(&mut conn).await;
                match result {
                    Ok(response) => {
                        debug!(response = %response, "Redis health check successful");
                        Ok(response == "PONG")
                    }
                    Err(e) => {
                        warn!(error = %e, "Redis health check failed");
                        Ok(false)
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Redis connection failed");
                Ok(false)
            }
        }
    }
}

/// Stable cache key for one page of the club directory
pub fn club_directory_key(university_id: Option<i64>, category: Option<&str>, search: Option<&str>, page: u32, page_size: u32) -> String {
    format!(
        "{}u={}|c={}|q={}|p={}|s={}",
        CLUB_DIRECTORY_PREFIX,
        university_id.map(|id| id.to_string()).unwrap_or_default(),
        category.unwrap_or_default().to_lowercase(),
        urlencoding::encode(&search.unwrap_or_default().trim().to_lowercase()),
        page,
        page_size
    )
}
