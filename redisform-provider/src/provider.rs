/// Provider-level configuration
///
/// The provider block is read once at startup and turned into a
/// `ProviderConfig`, which owns the shared connection handle. Every resource
/// receives its own clone of that value at construction time.
///
/// # Example
///
/// ```no_run
/// use redisform_provider::provider::{ProviderConfig, ProviderSettings};
///
/// # async fn example() -> anyhow::Result<()> {
/// let settings = ProviderSettings {
///     redis_url: Some("redis://localhost:6379".to_string()),
/// };
/// let provider = ProviderConfig::configure(settings).await?;
/// println!("Using backend {}", provider.backend_name());
/// # Ok(())
/// # }
/// ```

use crate::error::ProviderResult;
use redis::{RedisResult, Value};
use redisform_shared::redis::{
    CommandBackend, RedisClient, RedisClientError, RedisCommand, RedisConfig,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use validator::Validate;

/// Attributes of the provider block
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct ProviderSettings {
    /// Connection URL; `REDIS_URL` is used when absent
    #[serde(default)]
    #[validate(length(min = 1))]
    pub redis_url: Option<String>,
}

impl ProviderSettings {
    /// Resolves the Redis client configuration
    ///
    /// An explicit `redis_url` wins. Otherwise the `REDIS_URL` environment
    /// variable (or `.env`) is consulted.
    pub fn redis_config(&self) -> ProviderResult<RedisConfig> {
        self.validate()?;
        match &self.redis_url {
            Some(url) => Ok(RedisConfig::new(url.clone())),
            None => Ok(RedisConfig::from_env()?),
        }
    }
}

/// Shared configuration handed to every resource
#[derive(Clone)]
pub struct ProviderConfig {
    backend: Arc<dyn CommandBackend>,
}

impl ProviderConfig {
    /// Wraps an existing backend
    pub fn new(backend: Arc<dyn CommandBackend>) -> Self {
        Self { backend }
    }

    /// Connects to Redis and verifies the connection with PING
    ///
    /// # Errors
    ///
    /// Fails if the URL is invalid, the connection cannot be established,
    /// or the server does not answer PING.
    pub async fn configure(settings: ProviderSettings) -> ProviderResult<Self> {
        let redis_config = settings.redis_config()?;
        let client = RedisClient::new(redis_config).await?;
        if !client.ping().await? {
            return Err(RedisClientError::HealthCheckFailed(
                "server did not answer PING with PONG".to_string(),
            )
            .into());
        }

        tracing::info!(url = %client.config().sanitized_url(), "Provider configured");

        Ok(Self::new(Arc::new(client)))
    }

    /// Issues one command through the backend
    pub async fn execute(&self, command: &RedisCommand) -> RedisResult<Value> {
        self.backend.execute(command).await
    }

    /// Name of the backend, for logging
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("backend", &self.backend.name())
            .finish()
    }
}
