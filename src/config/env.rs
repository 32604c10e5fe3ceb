//! Environment variables.
//!
//! - `DISCORD_BOT_TOKEN` - Discord bot token (required)
//! - `FLUXER_BOT_TOKEN` - Fluxer bot token (required)
//! - `FLUXER_API_URL` - Fluxer API base URL
//! - `BRIDGE_CONFIG` - Path to the JSON config file

use std::env;
use std::fmt;

use crate::common::error::EnvError;

pub const DISCORD_TOKEN_VAR: &str = "DISCORD_BOT_TOKEN";
pub const FLUXER_TOKEN_VAR: &str = "FLUXER_BOT_TOKEN";

const DEFAULT_CONFIG_PATH: &str = "config.json";
const DEFAULT_FLUXER_API_URL: &str = "https://api.fluxer.app";

/// Bot tokens for both platforms.
#[derive(Clone)]
pub struct Secrets {
    pub discord_token: String,
    pub fluxer_token: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("discord_token", &"<redacted>")
            .field("fluxer_token", &"<redacted>")
            .finish()
    }
}

/// Read both bot tokens from the process environment.
pub fn load_secrets() -> Result<Secrets, EnvError> {
    load_secrets_from(|name| env::var(name).ok())
}

/// Read both bot tokens using `lookup`.
///
/// Unset and empty variables are both reported, all at once.
pub fn load_secrets_from(lookup: impl Fn(&str) -> Option<String>) -> Result<Secrets, EnvError> {
    let read = |name: &str| lookup(name).filter(|value| !value.is_empty());

    let discord_token = read(DISCORD_TOKEN_VAR);
    let fluxer_token = read(FLUXER_TOKEN_VAR);

    match (discord_token, fluxer_token) {
        (Some(discord_token), Some(fluxer_token)) => Ok(Secrets {
            discord_token,
            fluxer_token,
        }),
        (discord_token, fluxer_token) => {
            let mut missing = Vec::new();
            if discord_token.is_none() {
                missing.push(DISCORD_TOKEN_VAR.to_string());
            }
            if fluxer_token.is_none() {
                missing.push(FLUXER_TOKEN_VAR.to_string());
            }
            Err(EnvError::Missing(missing))
        }
    }
}

/// Get the config file path from environment or use default.
pub fn get_config_path() -> String {
    env::var("BRIDGE_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string())
}

/// Get the Fluxer API base URL, without a trailing slash.
pub fn get_fluxer_api_url() -> String {
    env::var("FLUXER_API_URL")
        .ok()
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_FLUXER_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_in(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_both_tokens_present() {
        let secrets = load_secrets_from(lookup_in(&[
            ("DISCORD_BOT_TOKEN", "d-token"),
            ("FLUXER_BOT_TOKEN", "f-token"),
        ]))
        .unwrap();
        assert_eq!(secrets.discord_token, "d-token");
        assert_eq!(secrets.fluxer_token, "f-token");
    }

    #[test]
    fn test_all_missing_reported_together() {
        let err = load_secrets_from(lookup_in(&[])).unwrap_err();
        let EnvError::Missing(missing) = err;
        assert_eq!(missing, vec!["DISCORD_BOT_TOKEN", "FLUXER_BOT_TOKEN"]);
    }

    #[test]
    fn test_empty_token_counts_as_missing() {
        let err = load_secrets_from(lookup_in(&[
            ("DISCORD_BOT_TOKEN", "d-token"),
            ("FLUXER_BOT_TOKEN", ""),
        ]))
        .unwrap_err();
        let EnvError::Missing(missing) = err;
        assert_eq!(missing, vec!["FLUXER_BOT_TOKEN"]);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let secrets = Secrets {
            discord_token: "super-secret".to_string(),
            fluxer_token: "also-secret".to_string(),
        };
        let debug = format!("{secrets:?}");
        assert!(!debug.contains("super-secret"));
        assert!(!debug.contains("also-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
