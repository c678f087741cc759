// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::Deserialize;

/// Prefix of the environment variables that override file settings
pub const ENV_PREFIX: &str = "ELEARN_";

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Data directory path (flat-file user store)
    pub data_dir: PathBuf,
    /// Log level
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Origin allowed to call the API with credentials
    pub cors_origin: Option<String>,
    /// Session cookie attributes
    pub cookies: CookieSettings,
    /// Token secrets and lifetimes
    pub tokens: TokenSettings,
    /// Password hashing cost
    pub password_hash: PasswordHashSettings,
    /// Failed-login lockout
    pub login_throttle: LoginThrottleSettings,
    /// Interval of the session cache cleanup task, in seconds
    pub cache_cleanup_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CookieSettings {
    /// Add the `Secure` attribute to auth cookies
    pub secure: bool,
}

/// Secrets and lifetimes of the three token kinds
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct TokenSettings {
    pub activation_secret: String,
    pub access_secret: String,
    pub refresh_secret: String,
    pub activation_ttl_secs: u64,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PasswordHashSettings {
    /// scrypt `log_n` cost parameter
    pub log_n: u8,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoginThrottleSettings {
    pub max_attempts: u32,
    pub lockout_secs: u64,
    /// Take the client address from `X-Real-IP`. Only safe behind a proxy
    /// that overwrites the header.
    pub trust_proxy_header: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 8000)),
            data_dir: PathBuf::from("data"),
            log_level: "info".to_string(),
            log_json: false,
            cors_origin: None,
            cookies: CookieSettings::default(),
            tokens: TokenSettings::default(),
            password_hash: PasswordHashSettings::default(),
            login_throttle: LoginThrottleSettings::default(),
            cache_cleanup_secs: 60,
        }
    }
}

impl Default for CookieSettings {
    fn default() -> Self {
        Self { secure: true }
    }
}

impl Default for TokenSettings {
    fn default() -> Self {
        Self {
            activation_secret: String::new(),
            access_secret: String::new(),
            refresh_secret: String::new(),
            activation_ttl_secs: 5 * 60,
            access_ttl_secs: 5 * 60,
            refresh_ttl_secs: 3 * 24 * 60 * 60,
        }
    }
}

// Secrets stay out of logs and panics.
impl std::fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSettings")
            .field("activation_secret", &"<redacted>")
            .field("access_secret", &"<redacted>")
            .field("refresh_secret", &"<redacted>")
            .field("activation_ttl_secs", &self.activation_ttl_secs)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .finish()
    }
}

impl Default for PasswordHashSettings {
    fn default() -> Self {
        Self { log_n: 15 }
    }
}

impl Default for LoginThrottleSettings {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            lockout_secs: 5 * 60,
            trust_proxy_header: false,
        }
    }
}

impl TokenSettings {
    pub fn activation_ttl(&self) -> Duration {
        Duration::from_secs(self.activation_ttl_secs)
    }

    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_ttl_secs)
    }
}

impl Settings {
    /// Load settings from `config.toml` and the environment
    pub fn load() -> Result<Self> {
        load_settings(None)
    }

    /// Load settings from an explicit file and the environment
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_settings(Some(path.as_ref()))
    }

    /// Reject configurations the server must not start with
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_lowercase().as_str()) {
            bail!("invalid log level: {}", self.log_level);
        }

        let tokens = &self.tokens;
        let secrets = [
            ("activation_secret", &tokens.activation_secret),
            ("access_secret", &tokens.access_secret),
            ("refresh_secret", &tokens.refresh_secret),
        ];
        for (name, secret) in secrets {
            if secret.trim().is_empty() {
                bail!("tokens.{name} must be set");
            }
        }
        if tokens.activation_secret == tokens.access_secret
            || tokens.activation_secret == tokens.refresh_secret
            || tokens.access_secret == tokens.refresh_secret
        {
            bail!("each token kind needs its own secret");
        }

        if tokens.activation_ttl_secs == 0 || tokens.access_ttl_secs == 0 {
            bail!("token lifetimes must be positive");
        }
        if tokens.refresh_ttl_secs < tokens.access_ttl_secs {
            bail!("refresh token lifetime must cover the access token lifetime");
        }

        if self.login_throttle.max_attempts == 0 {
            bail!("login_throttle.max_attempts must be positive");
        }
        if self.cache_cleanup_secs == 0 {
            bail!("cache_cleanup_secs must be positive");
        }

        Ok(())
    }
}

/// Load settings from various sources
///
/// Defaults, then the TOML file (explicit path or `config.toml`), then
/// `ELEARN_*` environment variables; nested keys use `__`, e.g.
/// `ELEARN_TOKENS__ACCESS_SECRET`.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let settings: Settings = Figment::new()
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()?;

    Ok(settings)
}
