/// `redis_user` resource
///
/// Manages a Redis ACL user. Every create and update rebuilds the complete
/// rule set and sends it in a single `ACL SETUSER`; there is no diffing
/// against the server's current rules. After the write, a full read refreshes
/// the state so the caller sees the server's interpretation of the rules.
///
/// # Commands
///
/// | operation | commands |
/// |-----------|----------|
/// | create    | `ACL LIST`, `ACL SETUSER user` (if absent), apply |
/// | read      | `ACL GETUSER user`, `ACL LIST` |
/// | update    | apply |
/// | delete    | `ACL DELUSER user` |
/// | import    | `ACL GETUSER user`, `ACL LIST` |
///
/// where apply is `ACL SETUSER user <rules...>` followed by read.
///
/// The password is write-only. It is sent with every apply and carried over
/// from the prior state on read, never fetched from the server.

use crate::error::{ProviderError, ProviderResult};
use crate::provider::ProviderConfig;
use crate::reply::is_user_not_found;
use crate::resources::acl::{find_acl_string, list_contains_user, parse_getuser, setuser_rules};
use crate::resources::Resource;
use crate::schema;
use async_trait::async_trait;
use redis::Value;
use redisform_shared::redis::RedisCommand;
use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// The built-in user that may never be deleted
pub const DEFAULT_USER: &str = "default";

fn default_enabled() -> bool {
    true
}

/// Declared state of an ACL user
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RedisUser {
    /// Username, also the resource identity
    #[validate(length(min = 1))]
    pub username: String,

    /// Password; `nopass` is applied when absent or empty
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Whether the user may authenticate
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Key patterns (e.g. `cache:*`)
    #[serde(default)]
    pub keys: Vec<String>,

    /// Commands or command categories
    #[serde(default)]
    pub commands: Vec<String>,

    /// Pub/Sub channel patterns
    #[serde(default)]
    pub channels: Vec<String>,

    /// Send `resetkeys` before the key patterns
    #[serde(default)]
    pub reset_keys: bool,

    /// Send `resetchannels` before the channel patterns
    #[serde(default)]
    pub reset_channels: bool,

    /// Send `resetcommands` before the command rules
    #[serde(default)]
    pub reset_commands: bool,

    /// Full rule string as reported by `ACL LIST` (computed)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_string: Option<String>,
}

impl RedisUser {
    /// Creates an enabled user with no password and no permissions
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: None,
            enabled: default_enabled(),
            keys: Vec::new(),
            commands: Vec::new(),
            channels: Vec::new(),
            reset_keys: false,
            reset_channels: false,
            reset_commands: false,
            acl_string: None,
        }
    }
}

impl fmt::Debug for RedisUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisUser")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("enabled", &self.enabled)
            .field("keys", &self.keys)
            .field("commands", &self.commands)
            .field("channels", &self.channels)
            .field("reset_keys", &self.reset_keys)
            .field("reset_channels", &self.reset_channels)
            .field("reset_commands", &self.reset_commands)
            .field("acl_string", &self.acl_string)
            .finish()
    }
}

/// User resource implementation
#[derive(Debug, Clone)]
pub struct UserResource {
    provider: ProviderConfig,
}

impl UserResource {
    /// Creates the resource bound to a provider configuration
    pub fn new(provider: ProviderConfig) -> Self {
        Self { provider }
    }

    async fn acl_list(&self) -> ProviderResult<Vec<String>> {
        let reply = self
            .provider
            .execute(&RedisCommand::new("ACL").arg("LIST"))
            .await?;
        Ok(redis::from_redis_value(&reply)?)
    }

    /// Fetches `ACL GETUSER`, mapping an unknown user to `None`
    async fn get_user(&self, username: &str) -> ProviderResult<Option<Value>> {
        let result = self
            .provider
            .execute(&RedisCommand::new("ACL").arg("GETUSER").arg(username))
            .await;

        match result {
            Ok(Value::Nil) => Ok(None),
            Ok(reply) => Ok(Some(reply)),
            Err(e) if is_user_not_found(&e) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Sends the full rule set in one `ACL SETUSER`, then refreshes state
    async fn apply_acl(&self, desired: RedisUser) -> ProviderResult<RedisUser> {
        let command = RedisCommand::new("ACL")
            .arg("SETUSER")
            .arg(desired.username.as_str())
            .args(setuser_rules(&desired));

        self.provider
            .execute(&command)
            .await
            .map_err(|source| ProviderError::UserUpdateFailed {
                username: desired.username.clone(),
                source,
            })?;

        tracing::debug!(username = %desired.username, "Applied ACL rules");

        let username = desired.username.clone();
        self.read(desired)
            .await?
            .ok_or_else(|| ProviderError::user_not_found(username))
    }
}

#[async_trait]
impl Resource for UserResource {
    type Model = RedisUser;

    fn type_name(&self) -> &'static str {
        schema::REDIS_USER
    }

    fn id(&self, model: &RedisUser) -> String {
        model.username.clone()
    }

    async fn create(&self, desired: RedisUser) -> ProviderResult<RedisUser> {
        desired.validate()?;

        let users = self.acl_list().await?;
        if !list_contains_user(&users, &desired.username) {
            // Create with minimal permissions
            self.provider
                .execute(&RedisCommand::new("ACL").arg("SETUSER").arg(desired.username.as_str()))
                .await
                .map_err(|source| ProviderError::UserCreateFailed {
                    username: desired.username.clone(),
                    source,
                })?;
            tracing::info!(username = %desired.username, "Created Redis user");
        }

        let state = self.apply_acl(desired).await?;
        tracing::info!(username = %state.username, "Created redis_user");
        Ok(state)
    }

    async fn read(&self, current: RedisUser) -> ProviderResult<Option<RedisUser>> {
        let Some(reply) = self.get_user(&current.username).await? else {
            tracing::warn!(username = %current.username, "Redis user no longer exists");
            return Ok(None);
        };

        let info = parse_getuser(&reply);
        let lines = self.acl_list().await?;
        let acl_string = find_acl_string(&lines, &current.username);

        Ok(Some(RedisUser {
            enabled: info.enabled,
            keys: info.keys,
            commands: info.commands,
            channels: info.channels,
            acl_string,
            ..current
        }))
    }

    async fn update(&self, desired: RedisUser) -> ProviderResult<RedisUser> {
        desired.validate()?;

        let state = self.apply_acl(desired).await?;
        tracing::info!(username = %state.username, "Updated redis_user");
        Ok(state)
    }

    async fn delete(&self, current: &RedisUser) -> ProviderResult<()> {
        if current.username == DEFAULT_USER {
            return Err(ProviderError::ProtectedUser(current.username.clone()));
        }

        self.provider
            .execute(&RedisCommand::new("ACL").arg("DELUSER").arg(current.username.as_str()))
            .await?;

        tracing::info!(username = %current.username, "Deleted redis_user");
        Ok(())
    }

    async fn import(&self, id: &str) -> ProviderResult<RedisUser> {
        // Any GETUSER failure counts as "not found" here
        match self.get_user(id).await {
            Ok(Some(_)) => {}
            Ok(None) | Err(_) => return Err(ProviderError::user_not_found(id)),
        }

        let mut state = RedisUser::new(id);
        match self.acl_list().await {
            Ok(lines) => state.acl_string = find_acl_string(&lines, id),
            Err(e) => {
                tracing::warn!(username = %id, error = %e, "Could not read ACL LIST during import");
            }
        }

        tracing::info!(username = %id, "Imported redis_user");
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::InMemoryBackend;
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryBackend>, UserResource) {
        let backend = Arc::new(InMemoryBackend::new());
        let resource = UserResource::new(ProviderConfig::new(backend.clone()));
        (backend, resource)
    }

    fn rendered(backend: &InMemoryBackend) -> Vec<String> {
        backend.commands().iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_deserialize_defaults() {
        let user: RedisUser =
            serde_json::from_value(serde_json::json!({"username": "alice"})).unwrap();
        assert_eq!(user, RedisUser::new("alice"));
        assert!(user.enabled);
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut user = RedisUser::new("alice");
        user.password = Some("hunter2".to_string());
        let debug = format!("{:?}", user);
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("***"));
    }

    #[tokio::test]
    async fn test_create_new_user_command_sequence() {
        let (backend, resource) = setup();

        let mut desired = RedisUser::new("alice");
        desired.password = Some("pw".to_string());
        desired.keys = vec!["test:*".to_string()];
        desired.commands = vec!["+@read".to_string()];

        let state = resource.create(desired).await.unwrap();
        assert_eq!(state.keys, vec!["test:*"]);
        assert_eq!(state.commands, vec!["+@read"]);
        assert_eq!(state.password.as_deref(), Some("pw"));

        assert_eq!(
            rendered(&backend),
            vec![
                "ACL LIST",
                "ACL SETUSER alice",
                "ACL SETUSER alice on >*** ~test:* +@read",
                "ACL GETUSER alice",
                "ACL LIST",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_existing_user_skips_bare_setuser() {
        let (backend, resource) = setup();
        backend.insert_user("alice", &["on", "nopass", "~old:*"]);

        resource.create(RedisUser::new("alice")).await.unwrap();

        let setusers = backend
            .commands()
            .iter()
            .filter(|c| c.arguments().first().map(String::as_str) == Some("SETUSER"))
            .count();
        assert_eq!(setusers, 1);
    }

    #[tokio::test]
    async fn test_read_unknown_user_clears_identity() {
        let (_backend, resource) = setup();
        assert!(resource.read(RedisUser::new("ghost")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_disabled_user() {
        let (backend, resource) = setup();
        backend.insert_user("bob", &["off", "nopass", "~a:*", "&ch", "+get"]);

        let state = resource.read(RedisUser::new("bob")).await.unwrap().unwrap();
        assert!(!state.enabled);
        assert_eq!(state.keys, vec!["a:*"]);
        assert_eq!(state.channels, vec!["ch"]);
        assert_eq!(state.commands, vec!["+get"]);
        assert_eq!(state.acl_string.as_deref(), Some("off nopass ~a:* &ch +get"));
    }

    #[tokio::test]
    async fn test_read_preserves_write_only_fields() {
        let (backend, resource) = setup();
        backend.insert_user("bob", &["on", ">pw"]);

        let mut current = RedisUser::new("bob");
        current.password = Some("pw".to_string());
        current.reset_keys = true;

        let state = resource.read(current).await.unwrap().unwrap();
        assert_eq!(state.password.as_deref(), Some("pw"));
        assert!(state.reset_keys);
    }

    #[tokio::test]
    async fn test_update_failure_is_wrapped() {
        let (backend, resource) = setup();
        backend.insert_user("bob", &["on", "nopass"]);

        let mut desired = RedisUser::new("bob");
        desired.commands = vec!["+@nosuchcategory".to_string()];
        backend.fail_next("ACL", "Error in ACL SETUSER modifier '+@nosuchcategory'");

        let err = resource.update(desired).await.unwrap_err();
        assert!(matches!(err, ProviderError::UserUpdateFailed { .. }));
        assert!(err.to_string().starts_with("Failed to update Redis user 'bob'"));
    }

    #[tokio::test]
    async fn test_delete_default_user_issues_no_command() {
        let (backend, resource) = setup();

        let err = resource.delete(&RedisUser::new("default")).await.unwrap_err();
        assert!(matches!(err, ProviderError::ProtectedUser(_)));
        assert!(backend.commands().is_empty());
        assert!(backend.has_user("default"));
    }

    #[tokio::test]
    async fn test_delete_removes_user() {
        let (backend, resource) = setup();
        backend.insert_user("bob", &["on", "nopass"]);

        resource.delete(&RedisUser::new("bob")).await.unwrap();
        assert!(!backend.has_user("bob"));
        assert_eq!(rendered(&backend), vec!["ACL DELUSER bob"]);
    }

    #[tokio::test]
    async fn test_import_sets_identity_and_acl_string_only() {
        let (backend, resource) = setup();
        backend.insert_user("carol", &["on", "nopass", "~k:*", "+@read"]);

        let state = resource.import("carol").await.unwrap();
        assert_eq!(state.username, "carol");
        assert_eq!(state.acl_string.as_deref(), Some("on nopass ~k:* resetchannels +@read"));
        assert!(state.keys.is_empty());
    }

    #[tokio::test]
    async fn test_import_missing_user_fails() {
        let (_backend, resource) = setup();
        let err = resource.import("ghost").await.unwrap_err();
        assert_eq!(err.to_string(), "Redis user 'ghost' not found");
    }

    #[tokio::test]
    async fn test_read_user_not_found_error_clears_identity() {
        let (backend, resource) = setup();
        backend.fail_next("ACL GETUSER", "ERR User not found");

        let state = resource.read(RedisUser::new("ghost")).await.unwrap();
        assert!(state.is_none());
        assert_eq!(rendered(&backend), vec!["ACL GETUSER ghost"]);
    }

    #[tokio::test]
    async fn test_read_other_getuser_error_propagates() {
        let (backend, resource) = setup();
        backend.fail_next("ACL GETUSER", "NOPERM this user has no permissions");

        let err = resource.read(RedisUser::new("ghost")).await.unwrap_err();
        assert!(matches!(err, ProviderError::Redis(_)));
    }

    #[tokio::test]
    async fn test_import_tolerates_acl_list_failure() {
        let (backend, resource) = setup();
        backend.insert_user("carol", &["on", "nopass", "~k:*"]);
        backend.fail_next("ACL LIST", "NOPERM this user has no permissions to run the 'acl|list' command");

        let state = resource.import("carol").await.unwrap();
        assert_eq!(state.username, "carol");
        assert!(state.acl_string.is_none());
        assert_eq!(rendered(&backend), vec!["ACL GETUSER carol", "ACL LIST"]);
    }
}
