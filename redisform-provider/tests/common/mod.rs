/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - In-memory backend wired into a registry
/// - Optional live Redis connection (from REDIS_URL)
/// - Unique names so live runs do not collide

use redisform_provider::backend::InMemoryBackend;
use redisform_provider::provider::{ProviderConfig, ProviderSettings};
use redisform_provider::registry::ResourceRegistry;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Test context containing all necessary resources
#[allow(dead_code)]
pub struct TestContext {
    pub backend: Arc<InMemoryBackend>,
    pub provider: ProviderConfig,
    pub registry: ResourceRegistry,
}

#[allow(dead_code)]
impl TestContext {
    /// Creates a context backed by a fresh in-memory server
    pub fn new() -> Self {
        let backend = Arc::new(InMemoryBackend::new());
        let provider = ProviderConfig::new(backend.clone());
        let registry = ResourceRegistry::new(provider.clone());
        Self {
            backend,
            provider,
            registry,
        }
    }

    /// Commands received so far, rendered with passwords redacted
    pub fn rendered_commands(&self) -> Vec<String> {
        self.backend.commands().iter().map(|c| c.to_string()).collect()
    }
}

/// Connects to the Redis named by REDIS_URL
#[allow(dead_code)]
pub async fn live_registry() -> anyhow::Result<ResourceRegistry> {
    let url = std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    let provider = ProviderConfig::configure(ProviderSettings {
        redis_url: Some(url),
    })
    .await?;
    Ok(ResourceRegistry::new(provider))
}

/// Returns a name unique to this test process
#[allow(dead_code)]
pub fn unique_name(prefix: &str) -> String {
    format!(
        "{}:{}:{}",
        prefix,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}
