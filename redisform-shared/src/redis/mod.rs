/// Redis integration for declarative resource management
///
/// This module provides the pieces every resource operation goes through:
/// - A command model that renders itself with secrets redacted
/// - A `CommandBackend` trait so resources never talk to a socket directly
/// - A production client built on `redis::aio::ConnectionManager`
///
/// # Architecture
///
/// ```text
/// ┌──────────────┐   RedisCommand   ┌────────────────┐
/// │   Resource   │ ───────────────> │ CommandBackend │
/// └──────────────┘ <─────────────── └────────────────┘
///                     redis::Value        │
///                                         ├─> RedisClient (ConnectionManager)
///                                         └─> InMemoryBackend (tests)
/// ```
///
/// # Example
///
/// ```no_run
/// use redisform_shared::redis::{CommandBackend, RedisClient, RedisCommand, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// let reply = client.execute(&RedisCommand::new("GET").arg("greeting")).await?;
/// println!("GET greeting -> {:?}", reply);
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod command;

// Re-export common types for convenience
pub use client::{RedisClient, RedisClientError, RedisConfig};
pub use command::{CommandBackend, RedisCommand};
