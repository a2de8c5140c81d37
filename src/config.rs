use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use teloxide::types::UserId;

/// Fallback model for both transcription and note generation.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

const DEFAULT_BIND_ADDR: ([u8; 4], u16) = ([0, 0, 0, 0], 8080);

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// A required environment variable is absent or empty.
    MissingVar(&'static str),
    /// A variable is set but its value cannot be used.
    InvalidVar {
        name: &'static str,
        value: String,
        reason: String,
    },
    /// Validation error.
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingVar(name) => {
                write!(f, "required environment variable {name} is not set")
            }
            Self::InvalidVar { name, value, reason } => {
                write!(f, "invalid value '{value}' for {name}: {reason}")
            }
            Self::Validation(msg) => write!(f, "config validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Process-wide configuration, loaded once at startup and passed into
/// each collaborator.
pub struct Config {
    /// Telegram bot credential.
    pub bot_token: String,
    /// The single user the bot answers to. `None` permits everyone.
    pub allowed_user_id: Option<UserId>,
    pub gemini_api_key: String,
    /// Model used for both transcription passes.
    pub transcribe_model: String,
    /// Model used for note generation.
    pub note_model: String,
    /// Address the webhook server listens on.
    pub bind_addr: SocketAddr,
    /// When set, logs are also written to a file in this directory.
    pub log_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Tests inject a
    /// map here instead of mutating process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &'static str| lookup(name).filter(|v| !v.is_empty());

        let bot_token = var("BOT_TOKEN").ok_or(ConfigError::MissingVar("BOT_TOKEN"))?;
        // Telegram tokens are formatted as {bot_id}:{secret} where bot_id is numeric
        let token_parts: Vec<&str> = bot_token.split(':').collect();
        if token_parts.len() != 2
            || token_parts[0].parse::<u64>().is_err()
            || token_parts[1].is_empty()
        {
            return Err(ConfigError::Validation(
                "BOT_TOKEN appears invalid (expected format: 123456789:ABCdefGHI...)".into(),
            ));
        }

        let allowed_user_id = match var("ALLOWED_USER_ID") {
            None => None,
            Some(raw) => match raw.parse::<u64>() {
                // 0 disables the check, same as leaving it unset
                Ok(0) => None,
                Ok(id) => Some(UserId(id)),
                Err(e) => {
                    return Err(ConfigError::InvalidVar {
                        name: "ALLOWED_USER_ID",
                        value: raw,
                        reason: e.to_string(),
                    });
                }
            },
        };

        let gemini_api_key =
            var("GEMINI_API_KEY").ok_or(ConfigError::MissingVar("GEMINI_API_KEY"))?;

        let transcribe_model =
            var("GEMINI_TRANSCRIBE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let note_model = var("GEMINI_NOTE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let bind_addr = match var("BIND_ADDR") {
            None => SocketAddr::from(DEFAULT_BIND_ADDR),
            Some(raw) => match raw.parse() {
                Ok(addr) => addr,
                Err(e) => {
                    return Err(ConfigError::InvalidVar {
                        name: "BIND_ADDR",
                        value: raw,
                        reason: format!("{e}"),
                    });
                }
            },
        };

        let log_dir = var("LOG_DIR").map(PathBuf::from);

        Ok(Self {
            bot_token,
            allowed_user_id,
            gemini_api_key,
            transcribe_model,
            note_model,
            bind_addr,
            log_dir,
        })
    }

    /// Whether a sender may use the bot. A message without a sender is
    /// only allowed when no restriction is configured.
    pub fn is_allowed(&self, sender: Option<UserId>) -> bool {
        match self.allowed_user_id {
            None => true,
            Some(allowed) => sender == Some(allowed),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&'static str, &str)]) -> Result<Config, ConfigError> {
        let map: HashMap<&str, String> = vars
            .iter()
            .map(|(name, value)| (*name, value.to_string()))
            .collect();
        Config::from_lookup(|name| map.get(name).cloned())
    }

    fn assert_err(result: Result<Config, ConfigError>) -> ConfigError {
        match result {
            Ok(_) => panic!("expected error, got Ok"),
            Err(e) => e,
        }
    }

    const TOKEN: &str = "123456789:ABCdefGHIjklMNOpqrsTUVwxyz";

    #[test]
    fn test_valid_config() {
        let config = load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("ALLOWED_USER_ID", "42"),
        ])
        .expect("should load valid config");
        assert_eq!(config.allowed_user_id, Some(UserId(42)));
        assert_eq!(config.transcribe_model, DEFAULT_MODEL);
        assert_eq!(config.note_model, DEFAULT_MODEL);
        assert_eq!(config.bind_addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_missing_bot_token() {
        let err = assert_err(load(&[("GEMINI_API_KEY", "key")]));
        assert!(matches!(err, ConfigError::MissingVar("BOT_TOKEN")));
    }

    #[test]
    fn test_empty_bot_token_counts_as_missing() {
        let err = assert_err(load(&[("BOT_TOKEN", ""), ("GEMINI_API_KEY", "key")]));
        assert!(matches!(err, ConfigError::MissingVar("BOT_TOKEN")));
    }

    #[test]
    fn test_invalid_token_format_no_colon() {
        let err = assert_err(load(&[
            ("BOT_TOKEN", "invalid_token_no_colon"),
            ("GEMINI_API_KEY", "key"),
        ]));
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("BOT_TOKEN"));
    }

    #[test]
    fn test_invalid_token_format_non_numeric_id() {
        let err = assert_err(load(&[
            ("BOT_TOKEN", "notanumber:ABCdef"),
            ("GEMINI_API_KEY", "key"),
        ]));
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_missing_gemini_key() {
        let err = assert_err(load(&[("BOT_TOKEN", TOKEN)]));
        assert!(matches!(err, ConfigError::MissingVar("GEMINI_API_KEY")));
    }

    #[test]
    fn test_invalid_allowed_user_id() {
        let err = assert_err(load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("ALLOWED_USER_ID", "kira"),
        ]));
        assert!(matches!(
            err,
            ConfigError::InvalidVar {
                name: "ALLOWED_USER_ID",
                ..
            }
        ));
    }

    #[test]
    fn test_zero_allowed_user_id_means_everyone() {
        let config = load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("ALLOWED_USER_ID", "0"),
        ])
        .unwrap();
        assert!(config.allowed_user_id.is_none());
        assert!(config.is_allowed(Some(UserId(7))));
    }

    #[test]
    fn test_model_overrides() {
        let config = load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("GEMINI_TRANSCRIBE_MODEL", "gemini-2.5-pro"),
            ("GEMINI_NOTE_MODEL", "gemini-2.5-flash"),
        ])
        .unwrap();
        assert_eq!(config.transcribe_model, "gemini-2.5-pro");
        assert_eq!(config.note_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = assert_err(load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("BIND_ADDR", "not-an-address"),
        ]));
        assert!(matches!(err, ConfigError::InvalidVar { name: "BIND_ADDR", .. }));
    }

    #[test]
    fn test_is_allowed() {
        let config = load(&[
            ("BOT_TOKEN", TOKEN),
            ("GEMINI_API_KEY", "key"),
            ("ALLOWED_USER_ID", "42"),
        ])
        .unwrap();
        assert!(config.is_allowed(Some(UserId(42))));
        assert!(!config.is_allowed(Some(UserId(7))));
        assert!(!config.is_allowed(None));
    }
}
