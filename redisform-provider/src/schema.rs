//! Attribute schemas for the provider block and each resource type.
//!
//! The host uses these to validate configuration, plan replacements
//! (`force_new`), and hide sensitive values. Defaults here must agree with
//! the serde defaults on the typed models.

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

/// Type name of the string resource
pub const REDIS_STRING: &str = "redis_string";

/// Type name of the user resource
pub const REDIS_USER: &str = "redis_user";

/// Attribute value type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeType {
    String,
    Bool,
    /// Ordered list of strings
    List,
}

/// One attribute of a resource or of the provider block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
}

impl Attribute {
    fn new(name: &'static str, kind: AttributeType) -> Self {
        Self {
            name,
            kind,
            required: false,
            optional: true,
            computed: false,
            force_new: false,
            sensitive: false,
            default: None,
            description: None,
        }
    }

    /// Optional string attribute
    pub fn string(name: &'static str) -> Self {
        Self::new(name, AttributeType::String)
    }

    /// Optional bool attribute
    pub fn bool(name: &'static str) -> Self {
        Self::new(name, AttributeType::Bool)
    }

    /// Optional list-of-strings attribute
    pub fn list(name: &'static str) -> Self {
        Self::new(name, AttributeType::List)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self.optional = false;
        self
    }

    /// Server-derived, never set by the user
    pub fn computed(mut self) -> Self {
        self.computed = true;
        self.optional = false;
        self
    }

    /// Changing the attribute requires replacing the resource
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    pub fn default_value(mut self, value: JsonValue) -> Self {
        self.default = Some(value);
        self
    }

    pub fn description(mut self, text: &'static str) -> Self {
        self.description = Some(text);
        self
    }
}

/// Schema of one resource type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub attributes: Vec<Attribute>,
}

/// Full provider schema
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSchema {
    pub provider: Vec<Attribute>,
    pub resources: BTreeMap<&'static str, ResourceSchema>,
}

/// Schema of the provider block
pub fn provider_block_schema() -> Vec<Attribute> {
    vec![Attribute::string("redis_url")
        .sensitive()
        .description("Redis connection URL; falls back to REDIS_URL")]
}

/// Schema of `redis_string`
pub fn redis_string_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: REDIS_STRING,
        attributes: vec![
            Attribute::string("key").required().force_new(),
            Attribute::string("value").required(),
            Attribute::bool("overridable")
                .default_value(JsonValue::Bool(false))
                .description("Allow creation to overwrite an existing key"),
        ],
    }
}

/// Schema of `redis_user`
pub fn redis_user_schema() -> ResourceSchema {
    ResourceSchema {
        type_name: REDIS_USER,
        attributes: vec![
            Attribute::string("username").required().force_new(),
            Attribute::string("password").sensitive(),
            Attribute::bool("enabled").default_value(JsonValue::Bool(true)),
            Attribute::list("keys").description("Key patterns the user can access (e.g. 'cache:*')"),
            Attribute::list("commands")
                .description("Commands or command categories the user can execute"),
            Attribute::list("channels").description("Pub/Sub channel patterns the user can access"),
            Attribute::bool("reset_keys")
                .default_value(JsonValue::Bool(false))
                .description("Whether to reset keys before applying new ones"),
            Attribute::bool("reset_channels")
                .default_value(JsonValue::Bool(false))
                .description("Whether to reset channels before applying new ones"),
            Attribute::bool("reset_commands")
                .default_value(JsonValue::Bool(false))
                .description("Whether to reset commands before applying new ones"),
            Attribute::string("acl_string")
                .computed()
                .description("The full ACL string for the user"),
        ],
    }
}

/// Schema of the provider and every resource it serves
pub fn provider_schema() -> ProviderSchema {
    let resources = [redis_string_schema(), redis_user_schema()]
        .into_iter()
        .map(|s| (s.type_name, s))
        .collect();

    ProviderSchema {
        provider: provider_block_schema(),
        resources,
    }
}
