//! ACL rule assembly and parsing.
//!
//! Declared patterns are normalized into `ACL SETUSER` tokens here, and the
//! replies of `ACL GETUSER` / `ACL LIST` are turned back into declared fields.

use crate::reply::{as_text, as_text_list, field_pairs};
use crate::resources::user::RedisUser;
use redis::Value;

/// Prefix marking a key pattern in ACL syntax
pub const KEY_PREFIX: char = '~';

/// Prefix marking a pub/sub channel pattern in ACL syntax
pub const CHANNEL_PREFIX: char = '&';

/// Leading marker on each `ACL LIST` line emitted by the server
const ACL_LIST_MARKER: &str = "user";

/// Ensures a key pattern carries the `~` prefix
pub fn normalize_key_pattern(pattern: &str) -> String {
    ensure_prefix(pattern, KEY_PREFIX)
}

/// Ensures a channel pattern carries the `&` prefix
pub fn normalize_channel_pattern(pattern: &str) -> String {
    ensure_prefix(pattern, CHANNEL_PREFIX)
}

/// Normalizes a command rule to an explicit allow or deny
///
/// `+x`/`-x` pass through, `@category` becomes `+@category`, and a bare
/// command `x` becomes `+x`.
pub fn normalize_command_rule(rule: &str) -> String {
    if rule.starts_with('+') || rule.starts_with('-') {
        rule.to_string()
    } else {
        format!("+{}", rule)
    }
}

/// Removes the `~` prefix reported by the server, if present
pub fn strip_key_prefix(pattern: &str) -> &str {
    pattern.strip_prefix(KEY_PREFIX).unwrap_or(pattern)
}

/// Removes the `&` prefix reported by the server, if present
pub fn strip_channel_prefix(pattern: &str) -> &str {
    pattern.strip_prefix(CHANNEL_PREFIX).unwrap_or(pattern)
}

fn ensure_prefix(pattern: &str, prefix: char) -> String {
    if pattern.starts_with(prefix) {
        pattern.to_string()
    } else {
        format!("{}{}", prefix, pattern)
    }
}

/// Builds the rule tokens that follow `ACL SETUSER <username>`
///
/// Order: on/off, password or nopass, reset tokens, keys, commands,
/// channels.
pub fn setuser_rules(user: &RedisUser) -> Vec<String> {
    let mut rules = Vec::with_capacity(
        5 + user.keys.len() + user.commands.len() + user.channels.len(),
    );

    rules.push(if user.enabled { "on" } else { "off" }.to_string());

    match user.password.as_deref().filter(|p| !p.is_empty()) {
        Some(password) => rules.push(format!(">{}", password)),
        None => rules.push("nopass".to_string()),
    }

    if user.reset_keys {
        rules.push("resetkeys".to_string());
    }
    if user.reset_channels {
        rules.push("resetchannels".to_string());
    }
    if user.reset_commands {
        rules.push("resetcommands".to_string());
    }

    rules.extend(user.keys.iter().map(|k| normalize_key_pattern(k)));
    rules.extend(user.commands.iter().map(|c| normalize_command_rule(c)));
    rules.extend(user.channels.iter().map(|c| normalize_channel_pattern(c)));

    rules
}

/// Permissions reported by `ACL GETUSER`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclUserInfo {
    /// False when the flags contain `off`
    pub enabled: bool,
    /// Key patterns without the `~` prefix
    pub keys: Vec<String>,
    /// The server's command rule string, verbatim
    pub commands: Vec<String>,
    /// Channel patterns without the `&` prefix
    pub channels: Vec<String>,
}

impl Default for AclUserInfo {
    fn default() -> Self {
        Self {
            enabled: true,
            keys: Vec::new(),
            commands: Vec::new(),
            channels: Vec::new(),
        }
    }
}

/// Parses an `ACL GETUSER` reply
///
/// Fields with an unexpected shape are skipped. `keys` and `channels` are
/// accepted both as arrays (Redis 6) and as one space-separated string
/// (Redis 7+).
pub fn parse_getuser(reply: &Value) -> AclUserInfo {
    let mut info = AclUserInfo::default();

    for (field, value) in field_pairs(reply) {
        match field.as_str() {
            "flags" => {
                if let Some(flags) = as_text_list(value) {
                    if flags.iter().any(|f| f == "off") {
                        info.enabled = false;
                    }
                }
            }
            "keys" => {
                if let Some(patterns) = patterns(value) {
                    info.keys = patterns
                        .iter()
                        .map(|p| strip_key_prefix(p).to_string())
                        .collect();
                }
            }
            "channels" => {
                if let Some(patterns) = patterns(value) {
                    info.channels = patterns
                        .iter()
                        .map(|p| strip_channel_prefix(p).to_string())
                        .collect();
                }
            }
            "commands" => {
                if let Some(commands) = as_text(value) {
                    info.commands.push(commands);
                }
            }
            _ => {}
        }
    }

    info
}

fn patterns(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Bulk(_) => as_text_list(value),
        _ => as_text(value).map(|s| s.split_whitespace().map(str::to_string).collect()),
    }
}

/// Splits one `ACL LIST` line into username and rule string
///
/// Lines look like `user alice on nopass ~cache:* +@read`. The leading
/// `user` marker is optional.
fn split_list_line(line: &str) -> Option<(&str, &str)> {
    let mut line = line.trim();
    if let Some(rest) = line.strip_prefix(ACL_LIST_MARKER).and_then(|r| r.strip_prefix(' ')) {
        line = rest.trim_start();
    }
    if line.is_empty() {
        return None;
    }
    Some(line.split_once(' ').unwrap_or((line, "")))
}

/// Finds the rule string for `username` in `ACL LIST` output
pub fn find_acl_string(lines: &[String], username: &str) -> Option<String> {
    lines.iter().find_map(|line| match split_list_line(line) {
        Some((name, rules)) if name == username && !rules.is_empty() => Some(rules.to_string()),
        _ => None,
    })
}

/// Returns true if `username` appears in `ACL LIST` output
pub fn list_contains_user(lines: &[String], username: &str) -> bool {
    lines
        .iter()
        .any(|line| matches!(split_list_line(line), Some((name, _)) if name == username))
}
