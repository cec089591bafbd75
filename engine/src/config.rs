use serde::Deserialize;
use std::io::Write;
use std::{env, fs, path::Path, path::PathBuf};

use recall_api::ApiToken;
use recall_types::ui::UiOptions;

// Default value function for serde (bool::default() is false, so only true needs a fn)
pub(crate) const fn default_true() -> bool {
    true
}

/// Server base URL used when neither the config file nor the environment
/// provides one. The companion backend listens on localhost by default.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:5000";
/// Profile id used when the config file does not name one.
pub const DEFAULT_USER_ID: &str = "local";
/// Display name used until the user introduces themselves.
pub const DEFAULT_USER_NAME: &str = "friend";

pub const SERVER_URL_ENV: &str = "RECALL_SERVER_URL";
pub const API_TOKEN_ENV: &str = "RECALL_API_TOKEN";
pub const USER_NAME_ENV: &str = "RECALL_USER";

#[derive(Debug, Default, Deserialize)]
pub struct RecallConfig {
    pub server: Option<ServerConfig>,
    pub user: Option<UserConfig>,
    pub ui: Option<UiConfig>,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct ServerConfig {
    /// Companion backend base URL, e.g. `http://192.168.1.20:5000`.
    pub base_url: Option<String>,
    /// Bearer token sent with every request. Supports `${VAR}` expansion.
    pub api_token: Option<String>,
}

// Manual Debug impl to prevent leaking the token in logs.
impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("base_url", &self.base_url)
            .field(
                "api_token",
                &if self.api_token.is_some() {
                    "[REDACTED]"
                } else {
                    "None"
                },
            )
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    /// Profile id under which journals, scores and reminders are stored.
    pub id: Option<String>,
    /// Display name used in greetings and sent to the generation services.
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UiConfig {
    /// Use ASCII-only glyphs for icons and card faces.
    #[serde(default)]
    pub ascii_only: bool,
    /// Enable a high-contrast color palette.
    #[serde(default)]
    pub high_contrast: bool,
    /// Disable slide animations; swipes and breathing cues commit instantly.
    #[serde(default)]
    pub reduced_motion: bool,
}

impl UiConfig {
    #[must_use]
    pub fn options(&self) -> UiOptions {
        UiOptions {
            ascii_only: self.ascii_only,
            high_contrast: self.high_contrast,
            reduced_motion: self.reduced_motion,
        }
    }
}

/// File logging configuration.
///
/// ```toml
/// [logging]
/// enabled = true
/// filter = "recall=debug"
/// ```
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tracing filter directive. `RECALL_LOG` in the environment wins.
    pub filter: Option<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            filter: None,
        }
    }
}

pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut i = 0;

    while i < value.len() {
        if value[i..].starts_with("${") {
            let start = i + 2;
            if let Some(end_rel) = value[start..].find('}') {
                let end = start + end_rel;
                let var = &value[start..end];
                if !var.is_empty() {
                    let replacement = env::var(var).unwrap_or_default();
                    out.push_str(&replacement);
                }
                i = end + 1;
                continue;
            }
        }

        let ch = value[i..].chars().next().unwrap();
        out.push(ch);
        i += ch.len_utf8();
    }

    out
}

impl RecallConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read { path, source: err });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse { path, source: err })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    #[must_use]
    pub fn ui_options(&self) -> UiOptions {
        self.ui.as_ref().map(UiConfig::options).unwrap_or_default()
    }

    /// Persist the user's display name to the config file.
    ///
    /// Uses `toml_edit` to preserve comments and formatting.
    /// Creates the config file and parent directory if they don't exist.
    pub fn persist_user_name(name: &str) -> std::io::Result<()> {
        let path = match config_path() {
            Some(path) => path,
            None => {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config path",
                ));
            }
        };

        // Ensure parent directory exists with user-only permissions
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                let mode = fs::metadata(parent)?.permissions().mode() & 0o777;
                if mode & 0o077 != 0 {
                    fs::set_permissions(parent, fs::Permissions::from_mode(0o700))?;
                }
            }
        }

        // Load existing config or create empty document
        let content = if path.exists() {
            fs::read_to_string(&path)?
        } else {
            String::new()
        };

        let mut doc = content
            .parse::<toml_edit::DocumentMut>()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        if !doc.contains_key("user") {
            doc["user"] = toml_edit::Item::Table(toml_edit::Table::new());
        }
        doc["user"]["name"] = toml_edit::value(name);

        write_atomic(&path, doc.to_string().as_bytes())
    }
}

/// Write via a temp file in the same directory plus rename, so a crash
/// mid-write never leaves a truncated config. The temp file is created
/// with user-only permissions before any secret lands in it.
fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("toml.tmp");
    {
        let mut file = fs::File::create(&tmp)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(contents)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".recall").join("config.toml"))
}

/// Resolved identity and connection settings: config file first, then
/// environment, then defaults.
#[derive(Debug, Clone)]
pub struct Profile {
    pub server_url: String,
    pub api_token: Option<ApiToken>,
    pub user_id: String,
    pub user_name: String,
}

impl Profile {
    #[must_use]
    pub fn resolve(config: Option<&RecallConfig>) -> Self {
        let server = config.and_then(|cfg| cfg.server.as_ref());
        let user = config.and_then(|cfg| cfg.user.as_ref());

        let server_url = server
            .and_then(|cfg| cfg.base_url.as_ref())
            .map(|raw| raw.trim().to_string())
            .filter(|url| !url.is_empty())
            .or_else(|| non_empty_env(SERVER_URL_ENV))
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let api_token = server
            .and_then(|cfg| cfg.api_token.as_ref())
            .map(|raw| expand_env_vars(raw).trim().to_string())
            .filter(|token| !token.is_empty())
            .or_else(|| non_empty_env(API_TOKEN_ENV))
            .map(ApiToken::new);

        let user_id = user
            .and_then(|cfg| cfg.id.as_ref())
            .map(|raw| raw.trim().to_string())
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let user_name = user
            .and_then(|cfg| cfg.name.as_ref())
            .map(|raw| raw.trim().to_string())
            .filter(|name| !name.is_empty())
            .or_else(|| non_empty_env(USER_NAME_ENV))
            .unwrap_or_else(|| DEFAULT_USER_NAME.to_string());

        Self {
            server_url,
            api_token,
            user_id,
            user_name,
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
