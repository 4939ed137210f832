//! Host boundary: JSON attribute maps in, typed resources inside.
//!
//! The host speaks loosely typed attribute maps keyed by resource type name.
//! `ResourceRegistry` decodes each map exactly once into the resource's typed
//! model (applying defaults, rejecting unknown attributes, running
//! validation), calls the typed operation, and encodes the result back to
//! JSON with an `id` attribute added.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::ProviderConfig;
use crate::resources::{Resource, StringResource, UserResource};
use crate::schema;
use serde_json::{Map, Value as JsonValue};
use validator::Validate;

/// Attribute carrying the resource identity in host-facing JSON
pub const ID_ATTRIBUTE: &str = "id";

/// Operation requested by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create from declared attributes
    Create,
    /// Refresh recorded state from the server
    Read,
    /// Apply changed attributes
    Update,
    /// Remove the resource
    Delete,
}

/// Dispatches host requests to the typed resources
#[derive(Debug, Clone)]
pub struct ResourceRegistry {
    strings: StringResource,
    users: UserResource,
}

impl ResourceRegistry {
    /// Builds every resource against the same provider configuration
    pub fn new(provider: ProviderConfig) -> Self {
        Self {
            strings: StringResource::new(provider.clone()),
            users: UserResource::new(provider),
        }
    }

    /// Runs create, read, update or delete for a resource type
    ///
    /// # Returns
    ///
    /// - create/update: `Some(state)`
    /// - read: `Some(state)`, or `None` if the resource is gone
    /// - delete: `None`
    pub async fn apply(
        &self,
        type_name: &str,
        operation: Operation,
        attributes: JsonValue,
    ) -> ProviderResult<Option<JsonValue>> {
        match type_name {
            schema::REDIS_STRING => run(&self.strings, operation, attributes).await,
            schema::REDIS_USER => run(&self.users, operation, attributes).await,
            other => Err(ProviderError::UnknownResourceType(other.to_string())),
        }
    }

    /// Creates a resource and returns its state
    pub async fn create(&self, type_name: &str, attributes: JsonValue) -> ProviderResult<JsonValue> {
        self.apply(type_name, Operation::Create, attributes)
            .await
            .map(|state| state.unwrap_or(JsonValue::Null))
    }

    /// Returns `None` when the resource no longer exists
    pub async fn read(&self, type_name: &str, state: JsonValue) -> ProviderResult<Option<JsonValue>> {
        self.apply(type_name, Operation::Read, state).await
    }

    /// Updates a resource and returns its refreshed state
    pub async fn update(&self, type_name: &str, attributes: JsonValue) -> ProviderResult<JsonValue> {
        self.apply(type_name, Operation::Update, attributes)
            .await
            .map(|state| state.unwrap_or(JsonValue::Null))
    }

    /// Deletes a resource given its recorded state
    pub async fn delete(&self, type_name: &str, state: JsonValue) -> ProviderResult<()> {
        self.apply(type_name, Operation::Delete, state).await.map(|_| ())
    }

    /// Imports by identity, then reads the full state as the host would
    pub async fn import(&self, type_name: &str, id: &str) -> ProviderResult<Option<JsonValue>> {
        match type_name {
            schema::REDIS_STRING => import_then_read(&self.strings, id).await,
            schema::REDIS_USER => import_then_read(&self.users, id).await,
            other => Err(ProviderError::UnknownResourceType(other.to_string())),
        }
    }
}

async fn run<R: Resource>(
    resource: &R,
    operation: Operation,
    attributes: JsonValue,
) -> ProviderResult<Option<JsonValue>> {
    tracing::debug!(resource = resource.type_name(), ?operation, "Dispatching resource operation");

    let model = decode::<R::Model>(attributes)?;

    match operation {
        Operation::Create => {
            let state = resource.create(model).await?;
            Ok(Some(encode(resource, &state)?))
        }
        Operation::Read => match resource.read(model).await? {
            Some(state) => Ok(Some(encode(resource, &state)?)),
            None => Ok(None),
        },
        Operation::Update => {
            let state = resource.update(model).await?;
            Ok(Some(encode(resource, &state)?))
        }
        Operation::Delete => {
            resource.delete(&model).await?;
            Ok(None)
        }
    }
}

async fn import_then_read<R: Resource>(resource: &R, id: &str) -> ProviderResult<Option<JsonValue>> {
    tracing::debug!(resource = resource.type_name(), id, "Importing resource");

    let imported = resource.import(id).await?;
    match resource.read(imported).await? {
        Some(state) => Ok(Some(encode(resource, &state)?)),
        None => Ok(None),
    }
}

/// Decodes host attributes into a typed model
///
/// The `id` attribute is dropped, and computed attributes supplied by the
/// host are accepted since they round-trip through state.
pub fn decode<T>(attributes: JsonValue) -> ProviderResult<T>
where
    T: serde::de::DeserializeOwned + Validate,
{
    let mut map = match attributes {
        JsonValue::Object(map) => map,
        other => {
            return Err(ProviderError::InvalidDeclaration(format!(
                "expected an object of attributes, got {}",
                json_kind(&other)
            )))
        }
    };
    map.remove(ID_ATTRIBUTE);
    // Null means "not set"; let serde apply the default
    map.retain(|_, v| !v.is_null());

    let model: T = serde_json::from_value(JsonValue::Object(map))
        .map_err(|e| ProviderError::InvalidDeclaration(e.to_string()))?;
    model.validate()?;
    Ok(model)
}

/// Encodes a typed model for the host, adding the `id` attribute
pub fn encode<R: Resource>(resource: &R, model: &R::Model) -> ProviderResult<JsonValue> {
    let mut map = match serde_json::to_value(model)? {
        JsonValue::Object(map) => map,
        _ => Map::new(),
    };
    map.insert(ID_ATTRIBUTE.to_string(), JsonValue::String(resource.id(model)));
    Ok(JsonValue::Object(map))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a bool",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::{RedisString, RedisUser};
    use serde_json::json;

    #[test]
    fn test_decode_applies_defaults_and_drops_id() {
        let user: RedisUser = decode(json!({"id": "alice", "username": "alice", "password": null})).unwrap();
        assert_eq!(user, RedisUser::new("alice"));
    }

    #[test]
    fn test_decode_rejects_unknown_attribute() {
        let err = decode::<RedisString>(json!({"key": "k", "value": "v", "ttl": 5})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDeclaration(_)));
        assert!(err.to_string().contains("ttl"));
    }

    #[test]
    fn test_decode_rejects_wrong_type() {
        let err = decode::<RedisUser>(json!({"username": "a", "enabled": "yes"})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDeclaration(_)));
    }

    #[test]
    fn test_decode_rejects_non_object() {
        let err = decode::<RedisString>(json!(["k", "v"])).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_decode_validates_identity() {
        let err = decode::<RedisUser>(json!({"username": ""})).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidDeclaration(_)));
    }
}
