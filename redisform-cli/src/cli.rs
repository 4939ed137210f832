/// Command-line interface definition
use crate::config::LogFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// redisform - declarative provisioning of Redis keys and ACL users
#[derive(Parser, Debug)]
#[command(name = "redisform")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Redis connection URL (overrides config file and REDISFORM_REDIS_URL)
    #[arg(long, global = true)]
    pub redis_url: Option<String>,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Print the provider and resource schemas
    Schema,

    /// Check connectivity to Redis
    Ping,

    /// Create a resource from declared attributes
    Create {
        /// Resource type (redis_string or redis_user)
        resource_type: String,
        /// Declared attributes as a JSON object
        #[arg(long)]
        attrs: String,
    },

    /// Refresh a resource from its recorded state
    Read {
        resource_type: String,
        /// Recorded state as a JSON object
        #[arg(long)]
        state: String,
    },

    /// Apply changed attributes to an existing resource
    Update {
        resource_type: String,
        #[arg(long)]
        attrs: String,
    },

    /// Delete a resource
    Delete {
        resource_type: String,
        #[arg(long)]
        state: String,
    },

    /// Adopt an existing key or user by identity
    Import {
        resource_type: String,
        /// Key name or username
        id: String,
    },
}

impl Command {
    /// Whether the command needs a Redis connection
    pub fn needs_connection(&self) -> bool {
        !matches!(self, Command::Schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::try_parse_from([
            "redisform",
            "create",
            "redis_string",
            "--attrs",
            r#"{"key":"k","value":"v"}"#,
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::Create {
                resource_type: "redis_string".to_string(),
                attrs: r#"{"key":"k","value":"v"}"#.to_string(),
            }
        );
        assert!(cli.redis_url.is_none());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "redisform",
            "import",
            "redis_user",
            "alice",
            "--redis-url",
            "redis://cache:6379",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(cli.command.needs_connection());
    }

    #[test]
    fn test_schema_needs_no_connection() {
        let cli = Cli::try_parse_from(["redisform", "schema"]).unwrap();
        assert!(!cli.command.needs_connection());
    }

    #[test]
    fn test_create_requires_attrs() {
        assert!(Cli::try_parse_from(["redisform", "create", "redis_string"]).is_err());
    }
}
