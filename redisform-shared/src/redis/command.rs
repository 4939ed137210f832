/// Redis command model and the backend seam
///
/// Every command a resource issues is built as a `RedisCommand` and handed to
/// a `CommandBackend`. Keeping the command as plain data lets the in-memory
/// backend interpret it and lets logs render it without leaking passwords.

use async_trait::async_trait;
use redis::{RedisResult, Value};
use std::fmt;

/// Replacement text for secret command arguments
const REDACTED: &str = "***";

/// A single Redis command with its arguments
///
/// # Example
///
/// ```
/// use redisform_shared::redis::RedisCommand;
///
/// let cmd = RedisCommand::new("ACL")
///     .arg("SETUSER")
///     .arg("alice")
///     .arg(">s3cret");
///
/// assert_eq!(cmd.name(), "ACL");
/// assert_eq!(cmd.to_string(), "ACL SETUSER alice >***");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct RedisCommand {
    name: String,
    args: Vec<String>,
}

impl RedisCommand {
    /// Creates a command with no arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends every argument from an iterator, preserving order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Command name (e.g. `GET`, `ACL`)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments after the command name
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Returns true if the command name matches, ignoring case
    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Builds the `redis::Cmd` that is sent over the wire
    pub fn to_cmd(&self) -> redis::Cmd {
        let mut cmd = redis::cmd(&self.name);
        for arg in &self.args {
            cmd.arg(arg);
        }
        cmd
    }
}

/// Masks ACL password rules (`>pass`, `<pass`, `#hash`, `!hash`)
fn redact(arg: &str) -> String {
    match arg.chars().next() {
        Some(marker @ ('>' | '<' | '#' | '!')) if arg.len() > 1 => {
            format!("{}{}", marker, REDACTED)
        }
        _ => arg.to_string(),
    }
}

impl fmt::Display for RedisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        // Only ACL arguments can carry passwords
        let secret_aware = self.is("ACL");
        for arg in &self.args {
            if secret_aware {
                write!(f, " {}", redact(arg))?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for RedisCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RedisCommand({})", self)
    }
}

/// Executes Redis commands
///
/// Implementations must issue exactly one server round trip per call and
/// return the server's reply or error unchanged. No retries.
#[async_trait]
pub trait CommandBackend: Send + Sync {
    /// Returns the backend name
    ///
    /// Used for logging.
    fn name(&self) -> &str;

    /// Executes a command and returns the raw reply
    async fn execute(&self, command: &RedisCommand) -> RedisResult<Value>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_preserves_argument_order() {
        let cmd = RedisCommand::new("ACL")
            .arg("SETUSER")
            .arg("bob")
            .args(["on", "nopass", "~a:*"]);

        assert_eq!(cmd.arguments(), &["SETUSER", "bob", "on", "nopass", "~a:*"]);
    }

    #[test]
    fn test_display_redacts_acl_passwords() {
        let cmd = RedisCommand::new("ACL")
            .arg("SETUSER")
            .arg("bob")
            .arg(">hunter2")
            .arg("~cache:*");

        let rendered = cmd.to_string();
        assert_eq!(rendered, "ACL SETUSER bob >*** ~cache:*");
        assert!(!rendered.contains("hunter2"));
        assert!(!format!("{:?}", cmd).contains("hunter2"));
    }

    #[test]
    fn test_display_keeps_string_values() {
        let cmd = RedisCommand::new("SET").arg("k").arg(">not-a-secret");
        assert_eq!(cmd.to_string(), "SET k >not-a-secret");
    }

    #[test]
    fn test_is_ignores_case() {
        assert!(RedisCommand::new("acl").is("ACL"));
        assert!(!RedisCommand::new("GET").is("SET"));
    }

    #[test]
    fn test_to_cmd_packs_all_arguments() {
        let cmd = RedisCommand::new("SET").arg("k").arg("v").to_cmd();
        let packed = String::from_utf8(cmd.get_packed_command()).unwrap();
        assert_eq!(packed, "*3\r\n$3\r\nSET\r\n$1\r\nk\r\n$1\r\nv\r\n");
    }
}
