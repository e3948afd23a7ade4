//! Shared configuration for the rowsync CLI.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation to `rowsync_core::ControllerConfig`. The CLI adds
//! `GlobalOpts`-aware overrides on top.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rowsync_core::{ControllerConfig, Credentials, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String },

    #[error("no password configured for user '{username}' in profile '{profile}'")]
    NoCredentials { profile: String, username: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Pick the named profile, falling back to the default profile.
    pub fn resolve_profile<'a>(
        &'a self,
        name: Option<&'a str>,
    ) -> Result<(&'a str, &'a Profile), ConfigError> {
        let name = name
            .or(self.default_profile.as_deref())
            .unwrap_or("default");
        self.profiles
            .get_key_value(name)
            .map(|(k, p)| (k.as_str(), p))
            .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() })
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_resync")]
    pub resync_on_failure: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            resync_on_failure: default_resync(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_resync() -> bool {
    true
}

/// A named deployment of the record, dictionary, and metadata services.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Record service base URL (e.g., "https://validator.local/api").
    pub api_url: String,

    /// Dictionary service base URL.
    pub dictionary_url: Option<String>,

    /// Metadata service base URL.
    pub metadata_url: Option<String>,

    /// Username for the record and metadata services.
    pub username: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Dictionary service username. Falls back to `username`.
    pub dictionary_username: Option<String>,

    pub dictionary_password: Option<String>,

    pub dictionary_password_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout (seconds).
    pub timeout: Option<u64>,

    /// Override resync-after-failure.
    pub resync_on_failure: Option<bool>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("io", "rowsync", "rowsync").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("rowsync");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the full Config from `path` + environment.
///
/// Nested keys use a double underscore, so field names keep their own:
/// `ROWSYNC_PROFILES__PROD__API_URL`, `ROWSYNC_DEFAULTS__TIMEOUT`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ROWSYNC_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(cfg, &config_path())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve a password: the named environment variable wins over the
/// plaintext value.
pub fn resolve_password(
    plaintext: Option<&str>,
    env_name: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Option<SecretString> {
    env_name
        .and_then(&lookup)
        .or_else(|| plaintext.map(str::to_owned))
        .map(SecretString::from)
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Credentials for the record and metadata services, if a username is
/// configured.
pub fn resolve_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    resolve_with(
        profile.username.as_deref(),
        profile.password.as_deref(),
        profile.password_env.as_deref(),
        profile_name,
        env_lookup,
    )
}

/// Credentials for the dictionary service. Without a dictionary username
/// the record credentials are reused.
pub fn resolve_dictionary_credentials(
    profile: &Profile,
    profile_name: &str,
) -> Result<Option<Credentials>, ConfigError> {
    if profile.dictionary_username.is_none() {
        return resolve_credentials(profile, profile_name);
    }
    resolve_with(
        profile.dictionary_username.as_deref(),
        profile.dictionary_password.as_deref(),
        profile.dictionary_password_env.as_deref(),
        profile_name,
        env_lookup,
    )
}

fn resolve_with(
    username: Option<&str>,
    plaintext: Option<&str>,
    env_name: Option<&str>,
    profile_name: &str,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Option<Credentials>, ConfigError> {
    let Some(username) = username else {
        return Ok(None);
    };
    let password = resolve_password(plaintext, env_name, lookup).ok_or_else(|| {
        ConfigError::NoCredentials {
            profile: profile_name.into(),
            username: username.into(),
        }
    })?;
    Ok(Some(Credentials::new(username, password)))
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a service URL, accepting only http and https.
pub fn parse_service_url(field: &str, raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: field.into(),
        reason: format!("invalid URL: {raw}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("unsupported scheme '{other}' in {raw}"),
        }),
    }
}

/// Build a `ControllerConfig` from a profile, with `defaults` filling in
/// whatever the profile leaves unset.
pub fn profile_to_controller_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ControllerConfig, ConfigError> {
    let api_url = parse_service_url("api_url", &profile.api_url)?;
    let dictionary_url = profile
        .dictionary_url
        .as_deref()
        .map(|raw| parse_service_url("dictionary_url", raw))
        .transpose()?;
    let metadata_url = profile
        .metadata_url
        .as_deref()
        .map(|raw| parse_service_url("metadata_url", raw))
        .transpose()?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsVerification::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(ControllerConfig {
        api_url,
        dictionary_url,
        metadata_url,
        credentials: resolve_credentials(profile, profile_name)?,
        dictionary_credentials: resolve_dictionary_credentials(profile, profile_name)?,
        tls,
        timeout: Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout)),
        resync_on_failure: profile
            .resync_on_failure
            .unwrap_or(defaults.resync_on_failure),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    fn write_config(contents: &str) -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn profile(api_url: &str) -> Profile {
        Profile {
            api_url: api_url.into(),
            ..Profile::default()
        }
    }

    #[test]
    fn loads_profiles_from_file() {
        let (_dir, path) = write_config(
            r#"
default_profile = "prod"

[defaults]
timeout = 45

[profiles.prod]
api_url = "https://validator.example.com/api"
dictionary_url = "https://dict.example.com"
username = "analyst"
password_env = "VALIDATOR_PASSWORD"
resync_on_failure = false
"#,
        );

        let config = load_config_from(&path).unwrap();

        assert_eq!(config.defaults.timeout, 45);
        assert_eq!(config.defaults.output, "table");
        let (name, prod) = config.resolve_profile(None).unwrap();
        assert_eq!(name, "prod");
        assert_eq!(prod.username.as_deref(), Some("analyst"));
        assert_eq!(prod.resync_on_failure, Some(false));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();

        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert!(config.profiles.is_empty());
        assert!(matches!(
            config.resolve_profile(None),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn save_then_load_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config
            .profiles
            .insert("default".into(), profile("http://localhost:8080/api"));

        save_config_to(&config, &path).unwrap();
        let loaded = load_config_from(&path).unwrap();

        assert_eq!(
            loaded.resolve_profile(None).unwrap().1.api_url,
            "http://localhost:8080/api"
        );
    }

    #[test]
    fn env_password_wins_over_plaintext() {
        let lookup = |name: &str| (name == "PW").then(|| "from-env".to_owned());

        let secret = resolve_password(Some("plain"), Some("PW"), lookup).unwrap();
        assert_eq!(secret.expose_secret(), "from-env");

        let secret = resolve_password(Some("plain"), Some("UNSET"), lookup).unwrap();
        assert_eq!(secret.expose_secret(), "plain");

        assert!(resolve_password(None, Some("UNSET"), lookup).is_none());
    }

    #[test]
    fn username_without_password_is_an_error() {
        let mut p = profile("https://validator.example.com/api");
        p.username = Some("analyst".into());

        let err = resolve_credentials(&p, "prod").unwrap_err();
        assert!(matches!(err, ConfigError::NoCredentials { .. }));
    }

    #[test]
    fn dictionary_credentials_fall_back_to_record_credentials() {
        let mut p = profile("https://validator.example.com/api");
        p.username = Some("analyst".into());
        p.password = Some("secret".into());

        let creds = resolve_dictionary_credentials(&p, "prod").unwrap().unwrap();
        assert_eq!(creds.username, "analyst");

        p.dictionary_username = Some("dict".into());
        p.dictionary_password = Some("other".into());
        let creds = resolve_dictionary_credentials(&p, "prod").unwrap().unwrap();
        assert_eq!(creds.username, "dict");
        assert_eq!(creds.password.expose_secret(), "other");
    }

    #[test]
    fn profile_translates_to_controller_config() {
        let mut p = profile("https://validator.example.com/api");
        p.metadata_url = Some("https://meta.example.com".into());
        p.ca_cert = Some(PathBuf::from("/etc/ssl/validator.pem"));
        let defaults = Defaults {
            timeout: 12,
            ..Defaults::default()
        };

        let cfg = profile_to_controller_config(&p, "prod", &defaults).unwrap();

        assert_eq!(cfg.api_url.as_str(), "https://validator.example.com/api");
        assert!(cfg.dictionary_url.is_none());
        assert_eq!(
            cfg.metadata_url.as_ref().map(url::Url::as_str),
            Some("https://meta.example.com/")
        );
        assert!(cfg.credentials.is_none());
        assert_eq!(
            cfg.tls,
            TlsVerification::CustomCa(PathBuf::from("/etc/ssl/validator.pem"))
        );
        assert_eq!(cfg.timeout, Duration::from_secs(12));
        assert!(cfg.resync_on_failure);
    }

    #[test]
    fn insecure_overrides_custom_ca() {
        let mut p = profile("https://validator.example.com/api");
        p.ca_cert = Some(PathBuf::from("/etc/ssl/validator.pem"));
        p.insecure = Some(true);

        let cfg = profile_to_controller_config(&p, "prod", &Defaults::default()).unwrap();
        assert_eq!(cfg.tls, TlsVerification::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_non_http_urls() {
        let p = profile("ftp://validator.example.com");
        let err = profile_to_controller_config(&p, "prod", &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "api_url"));

        let p = profile("not a url");
        assert!(profile_to_controller_config(&p, "prod", &Defaults::default()).is_err());
    }
}
