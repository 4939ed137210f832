/// Tests against a real Redis server
///
/// These tests require a running Redis 6+ with ACL support.
/// Run with: cargo test --test live_redis_test -- --ignored --test-threads=1
///
/// Redis URL should be set via REDIS_URL environment variable:
/// export REDIS_URL="redis://localhost:6379"

mod common;

use common::{live_registry, unique_name};
use serde_json::json;

#[tokio::test]
#[ignore] // Requires Redis
async fn test_live_string_lifecycle() {
    let registry = live_registry().await.unwrap();
    let key = unique_name("redisform:test");

    let state = registry
        .create("redis_string", json!({"key": key, "value": "v1"}))
        .await
        .unwrap();
    assert_eq!(state["value"], "v1");

    let err = registry
        .create("redis_string", json!({"key": key, "value": "v2"}))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));

    let state = registry
        .update("redis_string", json!({"key": key, "value": "v2"}))
        .await
        .unwrap();
    assert_eq!(state["value"], "v2");

    let imported = registry.import("redis_string", &key).await.unwrap().unwrap();
    assert_eq!(imported["value"], "v2");
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_live_user_lifecycle() {
    let registry = live_registry().await.unwrap();
    let username = unique_name("redisform-user");

    let state = registry
        .create(
            "redis_user",
            json!({
                "username": username,
                "password": "s3cret",
                "keys": ["test:*"],
                "commands": ["+@read"],
            }),
        )
        .await
        .unwrap();
    assert_eq!(state["enabled"], true);
    assert_eq!(state["keys"], json!(["test:*"]));
    assert!(state["acl_string"].as_str().unwrap().contains("~test:*"));

    let state = registry
        .update(
            "redis_user",
            json!({"username": username, "enabled": false, "keys": ["other:*"], "reset_keys": true}),
        )
        .await
        .unwrap();
    assert_eq!(state["enabled"], false);
    assert_eq!(state["keys"], json!(["other:*"]));

    registry.delete("redis_user", state.clone()).await.unwrap();
    assert!(registry.read("redis_user", state).await.unwrap().is_none());
}

#[tokio::test]
#[ignore] // Requires Redis
async fn test_live_default_user_is_protected() {
    let registry = live_registry().await.unwrap();
    let err = registry
        .delete("redis_user", json!({"username": "default"}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Cannot delete the 'default' user");
}
