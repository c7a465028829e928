use anyhow::{anyhow, Context, Result};
use base64::{engine::general_purpose, Engine as _};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::clock::Clock;
use crate::models::SessionLifetimes;
use crate::session::ExpirationPolicy;
use crate::utils::crypto::{generate_key, Aes256GcmCipher, KEY_SIZE};

/// Name of the settings file looked up in the working and secrets directories
pub const SETTINGS_FILE: &str = "Settings.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub session: SessionSettings,
    pub logging: LoggingSettings,
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Base64 (standard alphabet) encoding of the 32-byte cipher key
    pub session_secret: String,
    /// Hard ceiling on a session, measured from sign-in
    pub lifetime_hours: u64,
    /// How long a refresh token may be used after it was issued
    pub refresh_hours: u64,
    /// How long an access token is trusted before re-validation
    pub validation_minutes: u64,
    /// Tolerance after a failed refresh. 0 disables the grace period.
    pub grace_period_minutes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            session_secret: String::new(), // Will be generated if empty
            lifetime_hours: 720,
            refresh_hours: 1,
            validation_minutes: 1,
            grace_period_minutes: 180,
        }
    }
}

// Keep the secret out of debug output
impl std::fmt::Debug for SessionSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSettings")
            .field("session_secret", &"<redacted>")
            .field("lifetime_hours", &self.lifetime_hours)
            .field("refresh_hours", &self.refresh_hours)
            .field("validation_minutes", &self.validation_minutes)
            .field("grace_period_minutes", &self.grace_period_minutes)
            .finish()
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from configuration files and environment variables
    ///
    /// Installs an `env_logger` filtered by [`LoggingSettings::level`] unless the
    /// host application already set a logger.
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file cannot be read or parsed
    pub fn load() -> Result<Self> {
        Self::load_env_file(Path::new(".env"));

        let secrets_dir = std::env::var("SESSION_SECRETS_DIR").ok().map(PathBuf::from);
        let mut settings = Self::load_base_settings(Path::new("."), secrets_dir.as_deref())?;

        // Logger first so the session overrides below can report through it
        Self::apply_logging_env_overrides(&mut settings.logging);
        if settings.logging.init_logger() {
            log::debug!("Logging initialized with filter {}", settings.logging.level);
        }
        SessionSettings::apply_env_overrides(&mut settings.session);

        Ok(settings)
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `secrets_dir` (if specified and exists)
    /// 3. Settings.toml in `config_dir` (if exists)
    /// 4. Default settings
    ///
    /// # Errors
    ///
    /// Returns an error if a settings file exists but cannot be read or parsed
    pub fn load_base_settings(config_dir: &Path, secrets_dir: Option<&Path>) -> Result<Self> {
        let mut settings = Self::default();

        let default_config_path = config_dir.join(SETTINGS_FILE);
        if default_config_path.exists() {
            settings = Self::read_settings_file(&default_config_path)?;
            log::info!("Loaded base settings from {}", default_config_path.display());
        }

        if let Some(secrets_dir) = secrets_dir {
            let secrets_path = secrets_dir.join(SETTINGS_FILE);
            if secrets_path.exists() {
                settings = Self::read_settings_file(&secrets_path)?;
                log::info!("Overriding settings from {}", secrets_path.display());
            } else {
                log::info!(
                    "SESSION_SECRETS_DIR set but no {SETTINGS_FILE} found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    fn read_settings_file(path: &Path) -> Result<Self> {
        let toml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        basic_toml::from_str(&toml_content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    fn apply_logging_env_overrides(logging_settings: &mut LoggingSettings) {
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            logging_settings.level = log_level;
        }
    }

    /// Load `KEY=VALUE` lines from an env file into the process environment
    fn load_env_file(path: &Path) {
        let Ok(contents) = fs::read_to_string(path) else {
            return;
        };
        for line in contents.lines() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim();
                if !key.is_empty() {
                    std::env::set_var(key, value.trim());
                }
            }
        }
    }
}

impl LoggingSettings {
    /// Install `env_logger` with `level` as its filter
    ///
    /// Returns `false` if a logger was already installed, which is left in place.
    #[must_use]
    pub fn init_logger(&self) -> bool {
        let installed = env_logger::Builder::new()
            .parse_filters(&self.level)
            .try_init()
            .is_ok();
        if !installed {
            log::debug!("Logger already initialized by the host, keeping it");
        }
        installed
    }
}

impl SessionSettings {
    /// Apply environment overrides for session settings
    pub fn apply_env_overrides(session_settings: &mut Self) {
        Self::apply_numeric_env_override("SESSION_LIFETIME_HOURS", &mut session_settings.lifetime_hours);
        Self::apply_numeric_env_override("SESSION_REFRESH_HOURS", &mut session_settings.refresh_hours);
        Self::apply_numeric_env_override(
            "SESSION_VALIDATION_MINUTES",
            &mut session_settings.validation_minutes,
        );
        Self::apply_numeric_env_override(
            "SESSION_GRACE_PERIOD_MINUTES",
            &mut session_settings.grace_period_minutes,
        );

        Self::handle_session_secret_override(session_settings);
    }

    /// Helper function to apply numeric environment variable overrides
    fn apply_numeric_env_override(env_var: &str, target: &mut u64) {
        if let Ok(value_str) = std::env::var(env_var) {
            match value_str.parse::<u64>() {
                Ok(value) => *target = value,
                Err(e) => log::warn!("Ignoring {env_var}={value_str}: {e}"),
            }
        }
    }

    /// Helper function to handle session secret environment override and generation
    fn handle_session_secret_override(session_settings: &mut Self) {
        let env_secret_set = std::env::var("SESSION_SECRET").is_ok_and(|secret| {
            if secret.is_empty() {
                false
            } else {
                session_settings.session_secret = secret;
                true
            }
        });

        // Generate random session secret if no environment variable was set and current value is empty
        if !env_secret_set && session_settings.session_secret.is_empty() {
            session_settings.session_secret = general_purpose::STANDARD.encode(generate_key());
            log::warn!("Using auto-generated session secret; sessions will not survive a restart");
            log::warn!("For production use, set SESSION_SECRET or session_secret in {SETTINGS_FILE}");
        }
    }

    /// Decode the configured secret into raw key bytes
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is not base64 or does not decode to
    /// exactly 32 bytes
    pub fn secret_key(&self) -> Result<[u8; KEY_SIZE]> {
        let bytes = general_purpose::STANDARD
            .decode(self.session_secret.trim())
            .context("Session secret is not valid base64")?;

        <[u8; KEY_SIZE]>::try_from(bytes.as_slice()).map_err(|_| {
            anyhow!(
                "Session secret must decode to {KEY_SIZE} bytes, got {}",
                bytes.len()
            )
        })
    }

    /// Build the session cipher from the configured secret
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is invalid
    pub fn cipher(&self) -> Result<Aes256GcmCipher> {
        let key = self.secret_key()?;
        Aes256GcmCipher::new(&key).context("Failed to create session cipher")
    }

    /// Session TTLs described by these settings
    #[must_use]
    pub fn lifetimes(&self) -> SessionLifetimes {
        SessionLifetimes {
            lifetime: hours(self.lifetime_hours),
            refresh: hours(self.refresh_hours),
            validation: minutes(self.validation_minutes),
            grace_period: minutes(self.grace_period_minutes),
        }
    }

    /// Expiration policy reading `clock`
    #[must_use]
    pub fn expiration_policy(&self, clock: Arc<dyn Clock>) -> ExpirationPolicy {
        ExpirationPolicy::new(clock, self.lifetimes())
    }
}

fn hours(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_hours)
        .unwrap_or(Duration::MAX)
}

fn minutes(value: u64) -> Duration {
    i64::try_from(value)
        .ok()
        .and_then(Duration::try_minutes)
        .unwrap_or(Duration::MAX)
}
