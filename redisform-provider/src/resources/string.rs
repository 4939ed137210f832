/// `redis_string` resource
///
/// Manages a single Redis string key.
///
/// # Commands
///
/// | operation | commands |
/// |-----------|----------|
/// | create    | `EXISTS key`, `SET key value`, `GET key` |
/// | read      | `GET key` |
/// | update    | `SET key value`, `GET key` |
/// | delete    | none (state-only) |
/// | import    | `GET key` |
///
/// The EXISTS check and the SET in `create` are separate round trips. Two
/// concurrent creators of the same key can both pass the check.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::ProviderConfig;
use crate::resources::Resource;
use crate::schema;
use async_trait::async_trait;
use redisform_shared::redis::RedisCommand;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Declared state of a string key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RedisString {
    /// Key name, also the resource identity
    #[validate(length(min = 1))]
    pub key: String,

    /// Value stored under the key
    pub value: String,

    /// Allow `create` to overwrite a key that already exists
    #[serde(default)]
    pub overridable: bool,
}

impl RedisString {
    /// Creates a non-overridable declaration
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            overridable: false,
        }
    }

    /// Sets the overridable flag
    pub fn overridable(mut self, overridable: bool) -> Self {
        self.overridable = overridable;
        self
    }
}

/// String resource implementation
#[derive(Debug, Clone)]
pub struct StringResource {
    provider: ProviderConfig,
}

impl StringResource {
    /// Creates the resource bound to a provider configuration
    pub fn new(provider: ProviderConfig) -> Self {
        Self { provider }
    }

    async fn exists(&self, key: &str) -> ProviderResult<bool> {
        let reply = self
            .provider
            .execute(&RedisCommand::new("EXISTS").arg(key))
            .await?;
        let count: i64 = redis::from_redis_value(&reply)?;
        Ok(count > 0)
    }

    async fn set(&self, key: &str, value: &str) -> ProviderResult<()> {
        self.provider
            .execute(&RedisCommand::new("SET").arg(key).arg(value))
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> ProviderResult<Option<String>> {
        let reply = self
            .provider
            .execute(&RedisCommand::new("GET").arg(key))
            .await?;
        Ok(redis::from_redis_value(&reply)?)
    }

    /// Writes the value and reads the stored state back
    async fn write(&self, desired: RedisString) -> ProviderResult<RedisString> {
        self.set(&desired.key, &desired.value).await?;

        let key = desired.key.clone();
        self.read(desired)
            .await?
            .ok_or_else(|| ProviderError::key_not_found(key))
    }
}

#[async_trait]
impl Resource for StringResource {
    type Model = RedisString;

    fn type_name(&self) -> &'static str {
        schema::REDIS_STRING
    }

    fn id(&self, model: &RedisString) -> String {
        model.key.clone()
    }

    async fn create(&self, desired: RedisString) -> ProviderResult<RedisString> {
        desired.validate()?;

        if self.exists(&desired.key).await? {
            if !desired.overridable {
                return Err(ProviderError::AlreadyExists(desired.key));
            }
            tracing::info!(key = %desired.key, "Overwriting existing Redis key");
        }

        let state = self.write(desired).await?;
        tracing::info!(key = %state.key, "Created redis_string");
        Ok(state)
    }

    async fn read(&self, current: RedisString) -> ProviderResult<Option<RedisString>> {
        match self.get(&current.key).await? {
            Some(value) => Ok(Some(RedisString { value, ..current })),
            None => {
                tracing::warn!(key = %current.key, "Redis key no longer exists");
                Ok(None)
            }
        }
    }

    async fn update(&self, desired: RedisString) -> ProviderResult<RedisString> {
        desired.validate()?;

        let state = self.write(desired).await?;
        tracing::info!(key = %state.key, "Updated redis_string");
        Ok(state)
    }

    async fn delete(&self, current: &RedisString) -> ProviderResult<()> {
        // State-only removal: the key stays in Redis.
        tracing::info!(key = %current.key, "Removed redis_string from state; key left in Redis");
        Ok(())
    }

    async fn import(&self, id: &str) -> ProviderResult<RedisString> {
        let value = self
            .get(id)
            .await?
            .ok_or_else(|| ProviderError::key_not_found(id))?;

        tracing::info!(key = %id, "Imported redis_string");
        Ok(RedisString::new(id, value))
    }
}
