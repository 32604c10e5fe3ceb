//! Error types for the application.

use thiserror::Error;

/// Configuration-related errors. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{path}' not found")]
    NotFound { path: String },

    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Config is not valid JSON: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("Config must have a non-empty \"mappings\" array")]
    NoMappings,

    #[error("{mapping}: missing or invalid \"{field}\"")]
    InvalidMapping { mapping: String, field: &'static str },
}

/// Missing secrets in the process environment.
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<String>),
}

/// A destination platform refused or failed to deliver a payload.
///
/// Send failures are never retried; the relay attempt is abandoned.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Rate limited (retry after: {})", retry_after_hint(.retry_after))]
    RateLimited { retry_after: Option<f64> },

    #[error("Rejected with HTTP {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid channel id: {0}")]
    InvalidChannel(String),
}

impl SendError {
    /// Retry-after hint in seconds, if the failure was a rate limit that carried one.
    pub fn retry_after(&self) -> Option<f64> {
        match self {
            SendError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

fn retry_after_hint(retry_after: &Option<f64>) -> String {
    match retry_after {
        Some(secs) => format!("{secs}s"),
        None => "unknown".to_string(),
    }
}

/// Fluxer gateway errors. Recovered by reconnecting.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Failed to fetch gateway URL: {0}")]
    Discovery(String),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Invalid gateway payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Gateway closed before Hello")]
    NoHello,

    #[error("Timed out after {0:?}")]
    Timeout(std::time::Duration),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_error_lists_all_names() {
        let err = EnvError::Missing(vec![
            "DISCORD_BOT_TOKEN".to_string(),
            "FLUXER_BOT_TOKEN".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "Missing required environment variables: DISCORD_BOT_TOKEN, FLUXER_BOT_TOKEN"
        );
    }

    #[test]
    fn test_rate_limit_display() {
        let err = SendError::RateLimited {
            retry_after: Some(1.5),
        };
        assert_eq!(err.to_string(), "Rate limited (retry after: 1.5s)");
        assert_eq!(err.retry_after(), Some(1.5));

        let err = SendError::RateLimited { retry_after: None };
        assert!(err.to_string().contains("unknown"));
    }

    #[test]
    fn test_retry_after_only_for_rate_limits() {
        let err = SendError::Rejected {
            status: 403,
            message: "Missing Access".to_string(),
        };
        assert_eq!(err.retry_after(), None);
    }

    #[test]
    fn test_invalid_mapping_message() {
        let err = ConfigError::InvalidMapping {
            mapping: "mappings[0] (\"general\")".to_string(),
            field: "discordId",
        };
        assert_eq!(
            err.to_string(),
            "mappings[0] (\"general\"): missing or invalid \"discordId\""
        );
    }
}
