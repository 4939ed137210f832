/// Declarative Redis resources
///
/// This module defines the resource contract and the two resource kinds the
/// provider serves.
///
/// # Resource Contract
///
/// Every resource:
/// 1. Implements the `Resource` trait (async)
/// 2. Works on one strongly typed model, decoded once at the host boundary
/// 3. Issues its commands through the `ProviderConfig` it was built with
/// 4. Reports absence from `read` as `Ok(None)`, never as an error
/// 5. Never retries; server errors surface verbatim
///
/// # Lifecycle
///
/// ```text
/// host ──create──> Resource ──> state
///      ──read────> Resource ──> Some(state) | None (identity cleared)
///      ──update──> Resource ──> state
///      ──delete──> Resource ──> ()
///      ──import──> Resource ──> state (host calls read afterwards)
/// ```
///
/// # Example
///
/// ```no_run
/// use redisform_provider::provider::{ProviderConfig, ProviderSettings};
/// use redisform_provider::resources::{RedisString, Resource, StringResource};
///
/// # async fn example() -> anyhow::Result<()> {
/// let provider = ProviderConfig::configure(ProviderSettings::default()).await?;
/// let strings = StringResource::new(provider);
///
/// let state = strings.create(RedisString::new("app:motd", "hello")).await?;
/// assert_eq!(state.value, "hello");
/// # Ok(())
/// # }
/// ```

pub mod acl;
pub mod string;
pub mod user;

// Re-export main types
pub use string::{RedisString, StringResource};
pub use user::{RedisUser, UserResource};

use crate::error::ProviderResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use validator::Validate;

/// Core resource trait
///
/// All resource kinds must implement this trait.
#[async_trait]
pub trait Resource: Send + Sync {
    /// Typed model of the declared and computed attributes
    type Model: Serialize + DeserializeOwned + Validate + Clone + Send + Sync;

    /// Returns the resource type name (e.g. `redis_string`)
    ///
    /// Used for registry lookup and logging.
    fn type_name(&self) -> &'static str;

    /// Returns the identity of a model (key or username)
    fn id(&self, model: &Self::Model) -> String;

    /// Creates the resource and returns the state read back from the server
    async fn create(&self, desired: Self::Model) -> ProviderResult<Self::Model>;

    /// Refreshes the state from the server
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the resource no longer exists
    async fn read(&self, current: Self::Model) -> ProviderResult<Option<Self::Model>>;

    /// Applies changed attributes and returns the refreshed state
    async fn update(&self, desired: Self::Model) -> ProviderResult<Self::Model>;

    /// Removes the resource
    async fn delete(&self, current: &Self::Model) -> ProviderResult<()>;

    /// Adopts an existing server-side object by identity
    async fn import(&self, id: &str) -> ProviderResult<Self::Model>;
}
