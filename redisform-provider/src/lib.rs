//! # redisform Provider
//!
//! Declarative management of Redis string keys and ACL users.
//!
//! ## Modules
//!
//! - `provider`: provider block settings and the shared connection handle
//! - `resources`: the `redis_string` and `redis_user` resources
//! - `schema`: attribute schemas exposed to the host
//! - `registry`: JSON host boundary dispatching by resource type name
//! - `backend`: in-memory command backend for tests and dry runs
//!
//! ## Example
//!
//! ```
//! use redisform_provider::backend::InMemoryBackend;
//! use redisform_provider::provider::ProviderConfig;
//! use redisform_provider::registry::ResourceRegistry;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = ProviderConfig::new(Arc::new(InMemoryBackend::new()));
//! let registry = ResourceRegistry::new(provider);
//!
//! let state = registry
//!     .create("redis_string", serde_json::json!({"key": "k", "value": "v"}))
//!     .await?;
//! assert_eq!(state["id"], "k");
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod error;
pub mod provider;
pub mod registry;
pub mod reply;
pub mod resources;
pub mod schema;

pub use error::{ProviderError, ProviderResult};
pub use provider::{ProviderConfig, ProviderSettings};
pub use registry::ResourceRegistry;
