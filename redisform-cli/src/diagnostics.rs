/// Error reporting for the CLI
///
/// Every failure is rendered as a single diagnostic JSON object on stderr:
///
/// ```json
/// {"severity": "error", "summary": "Redis key already exists", "detail": "Redis key 'k' already exists (set overridable = true to overwrite it)"}
/// ```
///
/// `summary` is a stable short category; `detail` carries the full message.

use redisform_provider::error::ProviderError;
use redisform_shared::redis::RedisClientError;
use serde::{Deserialize, Serialize};

/// Diagnostic severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
}

/// Diagnostic shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    /// Creates an error diagnostic
    pub fn error(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: summary.into(),
            detail: detail.into(),
        }
    }

    /// Renders the diagnostic as one line of JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!("{{\"severity\":\"error\",\"summary\":{:?},\"detail\":{:?}}}", self.summary, self.detail)
        })
    }
}

impl From<&ProviderError> for Diagnostic {
    fn from(err: &ProviderError) -> Self {
        let summary = match err {
            ProviderError::AlreadyExists(_) => "Redis key already exists",
            ProviderError::NotFound { .. } => "Resource not found",
            ProviderError::ProtectedUser(_) => "Protected user",
            ProviderError::UserCreateFailed { .. } => "Failed to create Redis user",
            ProviderError::UserUpdateFailed { .. } => "Failed to update Redis user",
            ProviderError::InvalidDeclaration(_) => "Invalid resource declaration",
            ProviderError::UnknownResourceType(_) => "Unknown resource type",
            ProviderError::Redis(_) => "Redis command failed",
            ProviderError::Client(RedisClientError::ConfigError(_)) => "Invalid provider configuration",
            ProviderError::Client(_) => "Redis connection failed",
            ProviderError::Json(_) => "Invalid JSON",
        };
        Self::error(summary, err.to_string())
    }
}

impl From<&anyhow::Error> for Diagnostic {
    fn from(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<ProviderError>() {
            Some(provider_err) => provider_err.into(),
            None => Self::error("redisform failed", format!("{:#}", err)),
        }
    }
}
