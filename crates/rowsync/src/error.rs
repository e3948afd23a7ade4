//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use rowsync_config::ConfigError;
use rowsync_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const REJECTED: i32 = 5;
    pub const INCONSISTENT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the record service at {url}")]
    #[diagnostic(
        code(rowsync::connection_failed),
        help(
            "Check that the service is running and reachable.\n\
             URL: {url}\n\
             Self-signed certificate? Try --insecure (-k) or set ca_cert in your profile."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(rowsync::auth_failed),
        help(
            "Verify the username and password of profile '{profile}'.\n\
             Passwords can come from --password, ROWSYNC_PASSWORD, or password_env."
        )
    )]
    AuthFailed { profile: String, message: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(rowsync::not_found),
        help("Run: rowsync {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("{message}")]
    #[diagnostic(
        code(rowsync::rejected),
        help("Review the entities involved: rowsync entities list --errors")
    )]
    Rejected { message: String },

    #[error("The metadata service rejected the document: {message}")]
    #[diagnostic(
        code(rowsync::document_rejected),
        help("Inspect the document with: rowsync export")
    )]
    DocumentRejected { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("API error{}: {message}", status_suffix(.status.as_ref()))]
    #[diagnostic(code(rowsync::api_error))]
    ApiError { status: Option<u16>, message: String },

    #[error("The service answered with data that does not match the loaded entities: {message}")]
    #[diagnostic(
        code(rowsync::inconsistent),
        help("Re-run the command; the entities are reloaded before each command.")
    )]
    Inconsistent { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(rowsync::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(rowsync::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: rowsync config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No record service configured")]
    #[diagnostic(
        code(rowsync::no_config),
        help(
            "Create a profile with: rowsync config init\n\
             Expected at: {path}\n\
             Or pass --api-url / set ROWSYNC_API_URL."
        )
    )]
    NoConfig { path: String },

    #[error("No password for user '{username}' (profile '{profile}')")]
    #[diagnostic(
        code(rowsync::no_credentials),
        help("Pass --password, set ROWSYNC_PASSWORD, or set password_env in the profile.")
    )]
    NoCredentials { profile: String, username: String },

    #[error(transparent)]
    #[diagnostic(code(rowsync::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(rowsync::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out after {seconds}s")]
    #[diagnostic(
        code(rowsync::timeout),
        help("Increase timeout with --timeout or check service responsiveness.")
    )]
    Timeout { seconds: u64 },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ProfileNotFound { .. } => exit_code::NOT_FOUND,
            Self::Rejected { .. } | Self::DocumentRejected { .. } => exit_code::REJECTED,
            Self::Inconsistent { .. } => exit_code::INCONSISTENT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials { profile, username } => {
                CliError::NoCredentials { profile, username }
            }
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            other => CliError::Config(Box::new(other)),
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },

            CoreError::AuthenticationFailed { message } => CliError::AuthFailed {
                profile: "current".into(),
                message,
            },

            CoreError::Timeout { timeout_secs } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => CliError::NotFound {
                list_command: list_command_for(&entity_type).into(),
                resource_type: entity_type,
                identifier,
            },

            CoreError::Rejected { message } => CliError::Rejected { message },

            CoreError::Consistency(fault) => CliError::Inconsistent {
                message: fault.to_string(),
            },

            CoreError::Api { message, status } => CliError::ApiError { status, message },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::Internal(message) => CliError::ApiError {
                status: None,
                message,
            },
        }
    }
}

fn status_suffix(status: Option<&u16>) -> String {
    status.map(|s| format!(" ({s})")).unwrap_or_default()
}

fn list_command_for(entity_type: &str) -> &'static str {
    match entity_type {
        "attribute" => "attributes list <ENTITY>",
        "file" => "files list",
        _ => "entities list",
    }
}
