use std::{collections::HashMap, path::PathBuf, str::FromStr, time::Duration};

use crate::platform::LinkScope;

pub const DEFAULT_SECRETS_FILE: &str = ".env.secret";

/// Built-in GraphQL document id for the shortcode media query.
pub const DEFAULT_INSTAGRAM_DOC_ID: &str = "8845758582119845";

/// Bots can upload up to 50 MB through the public Bot API.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing {0}")]
    MissingKey(&'static str),
    #[error("Invalid {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
    #[error("Failed to read secrets file: {0}")]
    SecretsFile(#[from] dotenv::Error),
}

/// Key/value secrets loaded from a dotenv file, with process environment as fallback.
#[derive(Debug, Clone, Default)]
pub struct SecretStore {
    values: HashMap<String, String>,
}

impl SecretStore {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();

        match dotenv::from_filename_iter(path) {
            Ok(iter) => {
                for item in iter {
                    let (key, value) = item?;
                    values.insert(key, value);
                }
                info!("Loaded {} secrets from {}", values.len(), path);
            }
            Err(dotenv::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Secrets file {} not found, using environment only", path);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self { values })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values
            .get(key)
            .cloned()
            .or_else(|| std::env::var(key).ok())
            .filter(|v| !v.trim().is_empty())
    }

    fn parse_or<T: FromStr>(&self, key: &'static str, default: T) -> Result<T, ConfigError> {
        match self.get(key) {
            Some(value) => value
                .trim()
                .parse::<T>()
                .map_err(|_| ConfigError::InvalidValue { key, value }),
            None => Ok(default),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub instagram: InstagramConfig,
    pub dispatch: DispatchConfig,
    pub progress: ProgressConfig,
}

#[derive(Clone, Debug)]
pub struct TelegramConfig {
    pub token: String,
    pub timeout_secs: u64,
    pub upload_timeout_secs: u64,
    pub enable_commands: bool,
}

#[derive(Clone, Debug)]
pub struct InstagramConfig {
    pub doc_id: String,
    pub session_id: Option<String>,
    pub proxy_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct DispatchConfig {
    pub link_scope: LinkScope,
    pub download_dir: PathBuf,
    pub keep_downloads: bool,
    pub max_upload_bytes: u64,
}

#[derive(Clone, Debug)]
pub struct ProgressConfig {
    pub steps: u8,
    pub step_delay: Duration,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            steps: 10,
            step_delay: Duration::from_secs(1),
        }
    }
}

impl AppConfig {
    pub fn from_store(store: &SecretStore) -> Result<Self, ConfigError> {
        info!("Building AppConfig...");

        let token = store.get("BOT_TOKEN").ok_or(ConfigError::MissingKey("BOT_TOKEN"))?;

        let steps = store.parse_or::<u8>("PROGRESS_STEPS", 10)?;
        if !(1..=100).contains(&steps) {
            return Err(ConfigError::InvalidValue {
                key: "PROGRESS_STEPS",
                value: steps.to_string(),
            });
        }

        let config = AppConfig {
            telegram: TelegramConfig {
                token,
                timeout_secs: store.parse_or("TELEGRAM_TIMEOUT_SECS", 30)?,
                upload_timeout_secs: store.parse_or("TELEGRAM_UPLOAD_TIMEOUT_SECS", 600)?,
                enable_commands: store.parse_or("ENABLE_COMMANDS", true)?,
            },
            instagram: InstagramConfig {
                doc_id: store
                    .get("INSTAGRAM_DOC_ID")
                    .unwrap_or_else(|| DEFAULT_INSTAGRAM_DOC_ID.to_string()),
                session_id: store.get("INSTAGRAM_SESSION_ID"),
                proxy_url: store.get("HTTP_PROXY_URL"),
            },
            dispatch: DispatchConfig {
                link_scope: store.parse_or("LINK_SCOPE", LinkScope::All)?,
                download_dir: PathBuf::from(store.get("DOWNLOAD_DIR").unwrap_or_else(|| "downloads".to_string())),
                keep_downloads: store.parse_or("KEEP_DOWNLOADS", false)?,
                max_upload_bytes: store.parse_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            },
            progress: ProgressConfig {
                steps,
                step_delay: Duration::from_millis(store.parse_or("PROGRESS_STEP_MILLIS", 1000)?),
            },
        };

        info!("AppConfig built");

        Ok(config)
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("BOT_SECRETS_FILE").unwrap_or_else(|_| DEFAULT_SECRETS_FILE.to_string());
        let store = SecretStore::load(&path)?;
        Self::from_store(&store)
    }

    #[cfg(test)]
    pub fn new_test_config(download_dir: PathBuf) -> Self {
        AppConfig {
            telegram: TelegramConfig {
                token: "1234567890:TEST".to_string(),
                timeout_secs: 30,
                upload_timeout_secs: 600,
                enable_commands: true,
            },
            instagram: InstagramConfig {
                doc_id: DEFAULT_INSTAGRAM_DOC_ID.to_string(),
                session_id: None,
                proxy_url: None,
            },
            dispatch: DispatchConfig {
                link_scope: LinkScope::All,
                download_dir,
                keep_downloads: false,
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            progress: ProgressConfig {
                steps: 10,
                step_delay: Duration::ZERO,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let store = SecretStore::from_pairs([("BOT_TOKEN", "123:abc")]);
        let config = AppConfig::from_store(&store).unwrap();

        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.telegram.timeout_secs, 30);
        assert_eq!(config.telegram.upload_timeout_secs, 600);
        assert!(config.telegram.enable_commands);
        assert_eq!(config.instagram.doc_id, DEFAULT_INSTAGRAM_DOC_ID);
        assert_eq!(config.dispatch.link_scope, LinkScope::All);
        assert_eq!(config.dispatch.download_dir, PathBuf::from("downloads"));
        assert!(!config.dispatch.keep_downloads);
        assert_eq!(config.progress.steps, 10);
        assert_eq!(config.progress.step_delay, Duration::from_secs(1));
    }

    #[test]
    fn test_config_overrides() {
        let store = SecretStore::from_pairs([
            ("BOT_TOKEN", "123:abc"),
            ("LINK_SCOPE", "single"),
            ("ENABLE_COMMANDS", "false"),
            ("PROGRESS_STEPS", "5"),
            ("PROGRESS_STEP_MILLIS", "250"),
            ("KEEP_DOWNLOADS", "true"),
            ("INSTAGRAM_SESSION_ID", "abc%3A123"),
        ]);
        let config = AppConfig::from_store(&store).unwrap();

        assert_eq!(config.dispatch.link_scope, LinkScope::Single);
        assert!(!config.telegram.enable_commands);
        assert_eq!(config.progress.steps, 5);
        assert_eq!(config.progress.step_delay, Duration::from_millis(250));
        assert!(config.dispatch.keep_downloads);
        assert_eq!(config.instagram.session_id.as_deref(), Some("abc%3A123"));
    }

    #[test]
    fn test_config_invalid_values() {
        let store = SecretStore::from_pairs([("BOT_TOKEN", "123:abc"), ("PROGRESS_STEPS", "0")]);
        assert!(matches!(
            AppConfig::from_store(&store),
            Err(ConfigError::InvalidValue { key: "PROGRESS_STEPS", .. })
        ));

        let store = SecretStore::from_pairs([("BOT_TOKEN", "123:abc"), ("LINK_SCOPE", "some")]);
        assert!(matches!(
            AppConfig::from_store(&store),
            Err(ConfigError::InvalidValue { key: "LINK_SCOPE", .. })
        ));
    }
}
