/// Redis client wrapper used as the provider's connection handle
///
/// This module provides the production `CommandBackend`:
/// - A single multiplexed connection via redis::aio::ConnectionManager
/// - Automatic reconnection on failure
/// - Health checks (PING command)
/// - Configuration from environment variables
///
/// The handle is read-only after construction. Cloning it is cheap and every
/// clone shares the same underlying connection.
///
/// # Example
///
/// ```no_run
/// use redisform_shared::redis::client::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// // Health check
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

use crate::redis::command::{CommandBackend, RedisCommand};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{Client, RedisError, RedisResult, Value};
use serde::{Deserialize, Serialize};
use std::env;
use std::sync::Arc;
use thiserror::Error;

/// Redis client errors
#[derive(Error, Debug)]
pub enum RedisClientError {
    /// Connection error
    #[error("Redis connection error: {0}")]
    ConnectionError(String),

    /// Configuration error
    #[error("Redis configuration error: {0}")]
    ConfigError(String),

    /// Health check failed
    #[error("Redis health check failed: {0}")]
    HealthCheckFailed(String),
}

/// Redis configuration
///
/// Can be loaded from environment variables or constructed manually.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RedisConfig {
    /// Redis connection URL
    ///
    /// Format: redis://[username:password@]host:port[/db]
    /// Example: redis://localhost:6379
    pub url: String,
}

impl RedisConfig {
    /// Creates a configuration for the given URL
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Creates a new Redis configuration from environment variables
    ///
    /// # Environment Variables
    ///
    /// - `REDIS_URL`: Redis connection URL (required)
    ///
    /// # Errors
    ///
    /// Returns an error if REDIS_URL is not set.
    pub fn from_env() -> Result<Self, RedisClientError> {
        // Load .env if present
        dotenvy::dotenv().ok();

        let url = env::var("REDIS_URL").map_err(|_| {
            RedisClientError::ConfigError("REDIS_URL environment variable is required".to_string())
        })?;

        Ok(Self { url })
    }

    /// Returns the URL with credentials masked, for logging
    pub fn sanitized_url(&self) -> String {
        sanitize_url(&self.url)
    }
}

/// Redis client with connection management
///
/// Wraps the redis crate's ConnectionManager to provide:
/// - Automatic reconnection on connection loss
/// - Health checking
/// - Thread-safe cloning (uses Arc internally)
#[derive(Clone)]
pub struct RedisClient {
    manager: ConnectionManager,
    config: Arc<RedisConfig>,
}

impl RedisClient {
    /// Creates a new Redis client with the given configuration
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The Redis URL is invalid
    /// - Connection to Redis fails
    pub async fn new(config: RedisConfig) -> Result<Self, RedisClientError> {
        let client = Client::open(config.url.as_str()).map_err(|e| {
            RedisClientError::ConfigError(format!("Invalid Redis URL: {}", e))
        })?;

        // Create connection manager (handles reconnection automatically)
        let manager = ConnectionManager::new(client).await.map_err(|e| {
            RedisClientError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        tracing::info!(
            "Redis client connected successfully to {}",
            config.sanitized_url()
        );

        Ok(Self {
            manager,
            config: Arc::new(config),
        })
    }

    /// Performs a health check by sending a PING command
    ///
    /// # Returns
    ///
    /// Returns `true` if Redis responds with PONG, `false` otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the PING command fails.
    pub async fn ping(&self) -> Result<bool, RedisClientError> {
        let mut conn = self.manager.clone();

        let result: Result<String, RedisError> = redis::cmd("PING").query_async(&mut conn).await;

        match result {
            Ok(pong) if pong == "PONG" => {
                tracing::debug!("Redis health check: PONG received");
                Ok(true)
            }
            Ok(other) => {
                tracing::warn!("Redis health check: unexpected response: {}", other);
                Ok(false)
            }
            Err(e) => {
                tracing::error!("Redis health check failed: {}", e);
                Err(RedisClientError::HealthCheckFailed(e.to_string()))
            }
        }
    }

    /// Gets the Redis configuration
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }
}

#[async_trait]
impl CommandBackend for RedisClient {
    fn name(&self) -> &str {
        "redis"
    }

    async fn execute(&self, command: &RedisCommand) -> RedisResult<Value> {
        let mut conn = self.manager.clone();

        tracing::debug!(command = %command, "Executing Redis command");

        let result = command.to_cmd().query_async::<_, Value>(&mut conn).await;
        if let Err(e) = &result {
            tracing::debug!(command = %command, error = %e, "Redis command failed");
        }
        result
    }
}

/// Sanitizes a Redis URL by removing credentials
///
/// Replaces username:password with ***:*** for logging.
fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(scheme_end) = url.find("://") {
            let scheme = &url[..scheme_end + 3];
            let host = &url[at_pos + 1..];
            return format!("{}***:***@{}", scheme, host);
        }
    }
    url.to_string()
}
