/// Command execution
///
/// Each subcommand maps onto one registry operation. The result is a JSON
/// value for stdout; absence (a read of a deleted resource) and successful
/// deletes print `null`.

use crate::cli::Command;
use redisform_provider::error::ProviderResult;
use redisform_provider::provider::ProviderConfig;
use redisform_provider::registry::ResourceRegistry;
use redisform_provider::schema;
use redisform_shared::redis::RedisCommand;
use serde_json::{json, Value as JsonValue};

/// Runs one command against the configured provider
pub async fn execute(command: Command, provider: &ProviderConfig) -> ProviderResult<JsonValue> {
    let registry = ResourceRegistry::new(provider.clone());

    match command {
        Command::Schema => schema_json(),
        Command::Ping => ping(provider).await,
        Command::Create {
            resource_type,
            attrs,
        } => registry.create(&resource_type, parse_object(&attrs)?).await,
        Command::Read {
            resource_type,
            state,
        } => Ok(registry
            .read(&resource_type, parse_object(&state)?)
            .await?
            .unwrap_or(JsonValue::Null)),
        Command::Update {
            resource_type,
            attrs,
        } => registry.update(&resource_type, parse_object(&attrs)?).await,
        Command::Delete {
            resource_type,
            state,
        } => {
            registry.delete(&resource_type, parse_object(&state)?).await?;
            Ok(JsonValue::Null)
        }
        Command::Import { resource_type, id } => Ok(registry
            .import(&resource_type, &id)
            .await?
            .unwrap_or(JsonValue::Null)),
    }
}

/// Prints the schema without connecting anywhere
pub fn schema_json() -> ProviderResult<JsonValue> {
    Ok(serde_json::to_value(schema::provider_schema())?)
}

async fn ping(provider: &ProviderConfig) -> ProviderResult<JsonValue> {
    let reply = provider.execute(&RedisCommand::new("PING")).await?;
    let reply: String = redis::from_redis_value(&reply)?;

    tracing::info!(backend = provider.backend_name(), "Redis is reachable");

    Ok(json!({
        "status": "ok",
        "backend": provider.backend_name(),
        "reply": reply,
    }))
}

fn parse_object(raw: &str) -> ProviderResult<JsonValue> {
    Ok(serde_json::from_str(raw)?)
}
