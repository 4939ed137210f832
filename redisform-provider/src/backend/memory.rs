/// In-memory command backend
///
/// Emulates the Redis commands the resources issue, with enough fidelity for
/// behavioral tests:
/// - Strings: `EXISTS`, `SET`, `GET`
/// - ACL: `LIST`, `GETUSER`, `SETUSER`, `DELUSER`
/// - `PING`
///
/// Every command is recorded, including ones that fail, so tests can assert
/// the exact sequence sent. Failures can be injected with `fail_next`.
///
/// Replies follow the Redis 6 RESP2 shapes: `ACL GETUSER` returns a flat
/// field/value array with `keys` and `channels` as arrays, and returns nil
/// for unknown users. `ACL LIST` lines start with the `user` marker.
///
/// Command rules are not compacted the way a server does it. A real server
/// reports a new user granted `+@read` as `-@all +@read`, keeping the
/// implicit `-@all` of a fresh user; this backend reports only the rules it
/// was sent (`+@read`), and `-@all` only when no rule is set.
///
/// # Example
///
/// ```
/// use redisform_provider::backend::InMemoryBackend;
/// use redisform_provider::provider::ProviderConfig;
/// use std::sync::Arc;
///
/// let backend = Arc::new(InMemoryBackend::new());
/// backend.insert_string("greeting", "hello");
///
/// let provider = ProviderConfig::new(backend.clone());
/// assert_eq!(provider.backend_name(), "in-memory");
/// assert!(backend.has_user("default"));
/// ```

use async_trait::async_trait;
use redis::{ErrorKind, RedisError, RedisResult, Value};
use redisform_shared::redis::{CommandBackend, RedisCommand};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Server-side view of one ACL user
#[derive(Debug, Clone, Default)]
struct MemoryUser {
    enabled: bool,
    nopass: bool,
    /// SHA-256 hex digests, as the server stores them
    passwords: Vec<String>,
    keys: Vec<String>,
    channels: Vec<String>,
    commands: Vec<String>,
}

impl MemoryUser {
    fn builtin_default() -> Self {
        Self {
            enabled: true,
            nopass: true,
            passwords: Vec::new(),
            keys: vec!["~*".to_string()],
            channels: vec!["&*".to_string()],
            commands: vec!["+@all".to_string()],
        }
    }

    fn commands_string(&self) -> String {
        if self.commands.is_empty() {
            "-@all".to_string()
        } else {
            self.commands.join(" ")
        }
    }

    fn flags(&self) -> Vec<&'static str> {
        let mut flags = vec![if self.enabled { "on" } else { "off" }];
        if self.nopass {
            flags.push("nopass");
        }
        flags
    }

    /// Renders the user the way `ACL LIST` does
    fn describe(&self, name: &str) -> String {
        let mut parts = vec!["user".to_string(), name.to_string()];
        parts.extend(self.flags().into_iter().map(str::to_string));
        parts.extend(self.passwords.iter().map(|h| format!("#{}", h)));
        parts.extend(self.keys.iter().cloned());
        if self.channels.is_empty() {
            parts.push("resetchannels".to_string());
        } else {
            parts.extend(self.channels.iter().cloned());
        }
        parts.push(self.commands_string());
        parts.join(" ")
    }

    /// Renders the user the way `ACL GETUSER` does
    fn getuser_reply(&self) -> Value {
        Value::Bulk(vec![
            data("flags"),
            Value::Bulk(self.flags().into_iter().map(data).collect()),
            data("passwords"),
            Value::Bulk(self.passwords.iter().map(|h| data(h)).collect()),
            data("commands"),
            data(&self.commands_string()),
            data("keys"),
            Value::Bulk(self.keys.iter().map(|k| data(k)).collect()),
            data("channels"),
            Value::Bulk(self.channels.iter().map(|c| data(c)).collect()),
        ])
    }

    /// Applies `ACL SETUSER` rules in order
    fn apply(&mut self, rule: &str) -> Result<(), String> {
        match rule {
            "on" => self.enabled = true,
            "off" => self.enabled = false,
            "nopass" => {
                self.nopass = true;
                self.passwords.clear();
            }
            "resetpass" => {
                self.nopass = false;
                self.passwords.clear();
            }
            "allkeys" => push_unique(&mut self.keys, "~*"),
            "resetkeys" => self.keys.clear(),
            "allchannels" => push_unique(&mut self.channels, "&*"),
            "resetchannels" => self.channels.clear(),
            "allcommands" => push_unique(&mut self.commands, "+@all"),
            "nocommands" | "resetcommands" => self.commands.clear(),
            "reset" => *self = MemoryUser::default(),
            _ => return self.apply_prefixed(rule),
        }
        Ok(())
    }

    fn apply_prefixed(&mut self, rule: &str) -> Result<(), String> {
        let mut chars = rule.chars();
        let (Some(prefix), rest) = (chars.next(), chars.as_str()) else {
            return Err(rule.to_string());
        };
        if rest.is_empty() {
            return Err(rule.to_string());
        }

        match prefix {
            '>' => {
                let digest = hash_password(rest);
                push_unique(&mut self.passwords, &digest);
                self.nopass = false;
            }
            '<' => {
                let digest = hash_password(rest);
                self.passwords.retain(|h| *h != digest);
            }
            '~' => push_unique(&mut self.keys, rule),
            '&' => push_unique(&mut self.channels, rule),
            '+' | '-' => push_unique(&mut self.commands, rule),
            _ => return Err(rule.to_string()),
        }
        Ok(())
    }
}

fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|existing| existing == item) {
        list.push(item.to_string());
    }
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

fn data(s: &str) -> Value {
    Value::Data(s.as_bytes().to_vec())
}

fn server_error(detail: impl Into<String>) -> RedisError {
    RedisError::from((
        ErrorKind::ResponseError,
        "An error was signalled by the server",
        detail.into(),
    ))
}

fn wrong_arity(command: &str) -> RedisError {
    server_error(format!(
        "wrong number of arguments for '{}' command",
        command.to_ascii_lowercase()
    ))
}

/// One pending failure from `fail_next`
#[derive(Debug)]
struct InjectedFailure {
    command: String,
    subcommand: Option<String>,
    detail: String,
}

impl InjectedFailure {
    fn matches(&self, command: &RedisCommand) -> bool {
        command.is(&self.command)
            && self.subcommand.as_deref().map_or(true, |sub| {
                command
                    .arguments()
                    .first()
                    .is_some_and(|arg| arg.eq_ignore_ascii_case(sub))
            })
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    strings: BTreeMap<String, String>,
    users: BTreeMap<String, MemoryUser>,
    log: Vec<RedisCommand>,
    failures: Vec<InjectedFailure>,
}

/// In-memory backend implementation
#[derive(Debug)]
pub struct InMemoryBackend {
    state: Mutex<MemoryState>,
}

impl InMemoryBackend {
    /// Creates a backend holding only the built-in `default` user
    pub fn new() -> Self {
        let mut state = MemoryState::default();
        state
            .users
            .insert("default".to_string(), MemoryUser::builtin_default());
        Self {
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores a string value without recording a command
    pub fn insert_string(&self, key: impl Into<String>, value: impl Into<String>) {
        self.lock().strings.insert(key.into(), value.into());
    }

    /// Returns the stored string value
    pub fn string(&self, key: &str) -> Option<String> {
        self.lock().strings.get(key).cloned()
    }

    /// Creates or replaces a user from `ACL SETUSER` style rules, without
    /// recording a command
    ///
    /// Unrecognized rules are skipped.
    pub fn insert_user(&self, username: impl Into<String>, rules: &[&str]) {
        let username = username.into();
        let mut user = MemoryUser::default();
        for rule in rules {
            if let Err(bad) = user.apply(rule) {
                tracing::warn!(username = %username, rule = %bad, "Skipping unrecognized ACL rule");
            }
        }
        self.lock().users.insert(username, user);
    }

    /// Returns true if the user exists
    pub fn has_user(&self, username: &str) -> bool {
        self.lock().users.contains_key(username)
    }

    /// Returns the user's `ACL LIST` line
    pub fn describe_user(&self, username: &str) -> Option<String> {
        self.lock().users.get(username).map(|u| u.describe(username))
    }

    /// Returns every command received so far
    pub fn commands(&self) -> Vec<RedisCommand> {
        self.lock().log.clone()
    }

    /// Makes the next matching command fail with a server error
    ///
    /// `command` is a command name (`GET`) or a name and subcommand
    /// (`ACL LIST`).
    pub fn fail_next(&self, command: &str, detail: impl Into<String>) {
        let mut parts = command.split_whitespace();
        let failure = InjectedFailure {
            command: parts.next().unwrap_or_default().to_string(),
            subcommand: parts.next().map(str::to_string),
            detail: detail.into(),
        };
        self.lock().failures.push(failure);
    }

    fn dispatch(state: &mut MemoryState, command: &RedisCommand) -> RedisResult<Value> {
        let args = command.arguments();
        match command.name().to_ascii_uppercase().as_str() {
            "PING" => Ok(Value::Status("PONG".to_string())),
            "EXISTS" => {
                if args.is_empty() {
                    return Err(wrong_arity("EXISTS"));
                }
                let count = args.iter().filter(|k| state.strings.contains_key(*k)).count();
                Ok(Value::Int(count as i64))
            }
            "SET" => match args {
                [key, value] => {
                    state.strings.insert(key.clone(), value.clone());
                    Ok(Value::Okay)
                }
                [_, _, ..] => Err(server_error("syntax error")),
                _ => Err(wrong_arity("SET")),
            },
            "GET" => match args {
                [key] => Ok(state
                    .strings
                    .get(key)
                    .map(|v| data(v))
                    .unwrap_or(Value::Nil)),
                _ => Err(wrong_arity("GET")),
            },
            "ACL" => Self::dispatch_acl(state, args),
            other => Err(server_error(format!(
                "unknown command '{}'",
                other.to_ascii_lowercase()
            ))),
        }
    }

    fn dispatch_acl(state: &mut MemoryState, args: &[String]) -> RedisResult<Value> {
        let Some((subcommand, rest)) = args.split_first() else {
            return Err(wrong_arity("ACL"));
        };

        match subcommand.to_ascii_uppercase().as_str() {
            "LIST" => Ok(Value::Bulk(
                state
                    .users
                    .iter()
                    .map(|(name, user)| data(&user.describe(name)))
                    .collect(),
            )),
            "GETUSER" => match rest {
                [username] => Ok(state
                    .users
                    .get(username)
                    .map(MemoryUser::getuser_reply)
                    .unwrap_or(Value::Nil)),
                _ => Err(wrong_arity("ACL|GETUSER")),
            },
            "SETUSER" => {
                let Some((username, rules)) = rest.split_first() else {
                    return Err(wrong_arity("ACL|SETUSER"));
                };
                // Rules apply atomically: validate on a copy first
                let mut user = state.users.get(username).cloned().unwrap_or_default();
                for rule in rules {
                    user.apply(rule).map_err(|bad| {
                        server_error(format!(
                            "Error in ACL SETUSER modifier '{}': Syntax error",
                            bad
                        ))
                    })?;
                }
                state.users.insert(username.clone(), user);
                Ok(Value::Okay)
            }
            "DELUSER" => {
                if rest.is_empty() {
                    return Err(wrong_arity("ACL|DELUSER"));
                }
                if rest.iter().any(|u| u == "default") {
                    return Err(server_error("The 'default' user cannot be removed"));
                }
                let count = rest.iter().filter(|u| state.users.remove(*u).is_some()).count();
                Ok(Value::Int(count as i64))
            }
            other => Err(server_error(format!(
                "unknown subcommand '{}'. Try ACL HELP.",
                other.to_ascii_lowercase()
            ))),
        }
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CommandBackend for InMemoryBackend {
    fn name(&self) -> &str {
        "in-memory"
    }

    async fn execute(&self, command: &RedisCommand) -> RedisResult<Value> {
        let mut state = self.lock();
        state.log.push(command.clone());

        if let Some(pos) = state.failures.iter().position(|f| f.matches(command)) {
            let failure = state.failures.remove(pos);
            return Err(server_error(failure.detail));
        }

        tracing::trace!(command = %command, "In-memory backend executing");
        Self::dispatch(&mut state, command)
    }
}
