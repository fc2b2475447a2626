//! Wizard state storage
//!
//! Persists wizard contexts in Redis as JSON, one key per user. The key TTL
//! follows the context's own expiry so abandoned wizards disappear on their own.

use std::sync::Arc;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use tokio::sync::OnceCell;
use tracing::{debug, error, warn};
use crate::config::settings::RedisConfig;
use crate::services::redis::CONNECT_RETRIES;
use crate::utils::errors::Result;
use super::context::WizardContext;

/// Shortest TTL written for a context, in seconds
const MIN_TTL_SECONDS: i64 = 60;

/// Redis-based state storage
#[derive(Clone)]
pub struct StateStorage {
    client: Client,
    connection_manager: Arc<OnceCell<ConnectionManager>>,
    config: RedisConfig,
}

impl StateStorage {
    /// Create a storage handle; no connection is made until first use
    pub fn new(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        Ok(Self {
            client,
            connection_manager: Arc::new(OnceCell::new()),
            config,
        })
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection_manager
            .get_or_try_init(|| ConnectionManager::new_with_backoff(self.client.clone(), 2, 100, CONNECT_RETRIES))
            .await?;
        Ok(manager.clone())
    }

    pub fn context_key(&self, user_id: i64) -> String {
        format!("{}wizard:{}", self.config.prefix, user_id)
    }

    fn ttl_for(&self, context: &WizardContext) -> u64 {
        match context.expires_at {
            Some(expires_at) => (expires_at - chrono::Utc::now()).num_seconds().max(MIN_TTL_SECONDS) as u64,
            None => self.config.ttl_seconds,
        }
    }

    pub async fn save_context(&self, context: &WizardContext) -> Result<()> {
        let key = self.context_key(context.user_id);
        let serialized = serde_json::to_string(context)?;
        let ttl_seconds = self.ttl_for(context);

        let mut conn = self.connection().await?;
        match conn.set_ex::<_, _, ()>(&key, serialized, ttl_seconds).await {
            Ok(()) => {
                debug!(user_id = context.user_id, step = ?context.step, ttl_seconds = ttl_seconds, "Wizard context saved");
                Ok(())
            }
            Err(e) => {
                error!(user_id = context.user_id, error = %e, "Failed to save wizard context");
                Err(e.into())
            }
        }
    }

    /// Load a context; an expired one is removed and reported as absent
    pub async fn load_context(&self, user_id: i64) -> Result<Option<WizardContext>> {
        let key = self.context_key(user_id);
        let mut conn = self.connection().await?;

        let serialized: Option<String> = conn.get(&key).await?;
        let Some(data) = serialized else {
            debug!(user_id = user_id, "No wizard context stored");
            return Ok(None);
        };

        let context = match serde_json::from_str::<WizardContext>(&data) {
            Ok(context) => context,
            Err(e) => {
                warn!(user_id = user_id, error = %e, "Discarding unreadable wizard context");
                self.delete_context(user_id).await?;
                return Ok(None);
            }
        };

        if context.is_expired() {
            warn!(user_id = user_id, expires_at = ?context.expires_at, "Wizard context has expired, removing");
            self.delete_context(user_id).await?;
            return Ok(None);
        }

        Ok(Some(context))
    }

    pub async fn delete_context(&self, user_id: i64) -> Result<bool> {
        let key = self.context_key(user_id);
        let mut conn = self.connection().await?;
        let deleted: u32 = conn.del(&key).await?;
        debug!(user_id = user_id, deleted = deleted, "Wizard context deleted");
        Ok(deleted > 0)
    }
}
