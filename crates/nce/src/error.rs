//! CLI error types with miette diagnostics.
//!
//! Maps `nce_api::Error` and `nce_config::ConfigError` into user-facing
//! errors with actionable help text and a process exit code.

use miette::Diagnostic;
use thiserror::Error;

use nce_config::ConfigError;

/// Process exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const ACTION_FAILED: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to {url}")]
    #[diagnostic(
        code(nce::connection_failed),
        help("Check network access and the configured API URLs (nce config show).")
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS error: {message}")]
    #[diagnostic(code(nce::tls_error))]
    TlsError { message: String },

    #[error("HTTP request to {url} timed out")]
    #[diagnostic(
        code(nce::http_timeout),
        help("Increase the timeout with --timeout or api.timeout in the config file.")
    )]
    HttpTimeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("No basic credential found")]
    #[diagnostic(
        code(nce::no_credential),
        help(
            "Put the base64 client credential in {path},\n\
             set NCE_BASIC_TOKEN, or run: nce config set-credential"
        )
    )]
    NoCredential { path: String },

    #[error("No access token found at {location}")]
    #[diagnostic(code(nce::no_access_token), help("Run: nce auth"))]
    NoAccessToken { location: String },

    #[error("Authentication rejected (HTTP {status})")]
    #[diagnostic(
        code(nce::auth_failed),
        help(
            "The token endpoint did not return an access token.\n\
             Check the basic credential, then run: nce auth"
        )
    )]
    AuthRejected { status: u16 },

    #[error("Invalid {scheme} credential: {message}")]
    #[diagnostic(code(nce::invalid_credential))]
    InvalidCredential {
        scheme: &'static str,
        message: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Response (HTTP {status}) is missing '{field}'")]
    #[diagnostic(
        code(nce::unexpected_response),
        help("The raw response was printed above.")
    )]
    UnexpectedResponse { field: &'static str, status: u16 },

    #[error("API error: {message}")]
    #[diagnostic(code(nce::api_error))]
    ApiError { message: String },

    // ── Actions ──────────────────────────────────────────────────────
    #[error("Request {request_id} failed: {status}")]
    #[diagnostic(code(nce::action_failed))]
    ActionFailed { request_id: String, status: String },

    #[error("Request {request_id} still in progress after {attempts} attempt(s)")]
    #[diagnostic(
        code(nce::poll_timeout),
        help("The device may be offline. Retry with more --poll-attempts or a longer --poll-interval-ms.")
    )]
    PollTimeout { request_id: String, attempts: u32 },

    #[error("Could not decode result payload: {message}")]
    #[diagnostic(code(nce::payload))]
    Payload { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(nce::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(nce::no_config),
        help("Create one with: nce config init --config {path}")
    )]
    NoConfig { path: String },

    #[error("Configuration file already exists: {path}")]
    #[diagnostic(code(nce::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(nce::config))]
    Config(Box<figment::Error>),

    #[error("Keyring error: {message}")]
    #[diagnostic(
        code(nce::keyring),
        help("Use NCE_BASIC_TOKEN or the basic token file instead.")
    )]
    Keyring { message: String },

    // ── IO / Serialization ────────────────────────────────────────────
    #[error("Token store error ({location})")]
    #[diagnostic(code(nce::token_store))]
    TokenStore {
        location: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::NoCredential { .. }
            | Self::NoAccessToken { .. }
            | Self::AuthRejected { .. }
            | Self::InvalidCredential { .. } => exit_code::AUTH,
            Self::ActionFailed { .. } => exit_code::ACTION_FAILED,
            Self::HttpTimeout { .. } | Self::PollTimeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NoConfig { .. } | Self::ConfigExists { .. } => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── nce_api::Error → CliError mapping ────────────────────────────────

impl From<nce_api::Error> for CliError {
    fn from(err: nce_api::Error) -> Self {
        use nce_api::Error;

        let timed_out = err.is_timeout();
        let unreachable = err.is_connect();

        match err {
            Error::MissingToken { location } => CliError::NoAccessToken { location },

            Error::InvalidCredential { scheme, message } => {
                CliError::InvalidCredential { scheme, message }
            }

            Error::Transport(e) => {
                let url = e
                    .url()
                    .map_or_else(|| "(unknown)".to_owned(), ToString::to_string);
                if timed_out {
                    CliError::HttpTimeout { url }
                } else if unreachable {
                    CliError::ConnectionFailed {
                        url,
                        source: Box::new(e),
                    }
                } else {
                    CliError::ApiError {
                        message: e.to_string(),
                    }
                }
            }

            Error::InvalidUrl(e) => CliError::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },

            Error::Tls(message) => CliError::TlsError { message },

            Error::UnexpectedResponse {
                field: "access_token",
                status,
                ..
            } => CliError::AuthRejected { status },

            Error::UnexpectedResponse { field, status, .. } => {
                CliError::UnexpectedResponse { field, status }
            }

            Error::Deserialization { message, .. } => CliError::ApiError { message },

            Error::Payload(message) => CliError::Payload { message },

            Error::Tlv { offset, message } => CliError::Payload {
                message: format!("TLV error at byte {offset}: {message}"),
            },

            Error::Validation { field, reason } => CliError::Validation {
                field: field.into(),
                reason,
            },

            Error::TokenStore { location, source } => CliError::TokenStore { location, source },
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredential { path } => CliError::NoCredential {
                path: path.display().to_string(),
            },
            ConfigError::NotFound { path } => CliError::NoConfig {
                path: path.display().to_string(),
            },
            ConfigError::AlreadyExists { path } => CliError::ConfigExists {
                path: path.display().to_string(),
            },
            ConfigError::Keyring(e) => CliError::Keyring {
                message: e.to_string(),
            },
            ConfigError::Api(e) => e.into(),
            ConfigError::Serialization(e) => CliError::Serialization(e.to_string()),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}
