//! CLI configuration -- thin wrapper around `rowsync_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--api-url, --password, etc.).

use rowsync_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use rowsync_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `ControllerConfig` from the config file, profile, and CLI
/// overrides.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, &cfg.defaults, global);
    }

    // An explicitly requested profile must exist.
    if let Some(ref requested) = global.profile {
        return Err(CliError::ProfileNotFound {
            name: requested.clone(),
            available: available_profiles(&cfg),
        });
    }

    // No profile found -- build from CLI flags / env vars alone
    let api_url = global.api_url.clone().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let bare = Profile {
        api_url,
        ..Profile::default()
    };
    resolve_profile(&bare, &profile_name, &cfg.defaults, global)
}

/// Translate a `Profile` + global flags into a `ControllerConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let mut merged = profile.clone();

    if let Some(ref url) = global.api_url {
        merged.api_url.clone_from(url);
    }
    if let Some(ref url) = global.dictionary_url {
        merged.dictionary_url = Some(url.clone());
    }
    if let Some(ref url) = global.metadata_url {
        merged.metadata_url = Some(url.clone());
    }
    if let Some(ref username) = global.username {
        merged.username = Some(username.clone());
    }
    if let Some(ref password) = global.password {
        merged.password = Some(password.clone());
        merged.password_env = None;
    }
    if global.insecure {
        merged.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        merged.timeout = Some(timeout);
    }

    Ok(rowsync_config::profile_to_controller_config(
        &merged,
        profile_name,
        defaults,
    )?)
}

pub fn available_profiles(cfg: &Config) -> String {
    if cfg.profiles.is_empty() {
        return "(none)".into();
    }
    cfg.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
}
