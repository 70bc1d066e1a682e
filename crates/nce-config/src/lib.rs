//! Configuration for the `nce` CLI.
//!
//! TOML file + `NCE__` environment layering, credential resolution
//! (env + keyring + flat file), and translation into the pieces
//! `nce_api::NceClient` is built from. The binary adds flag overrides
//! on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Value},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use nce_api::{
    DEFAULT_DEVICE_ID, DEFAULT_DEVICE_URL, DEFAULT_PSK, DEFAULT_TOKEN_URL, DeviceId, Endpoints,
    FileTokenStore, PollPolicy, TlsMode, TokenStore, TransportConfig,
};

/// Environment variable holding the basic credential.
pub const BASIC_TOKEN_ENV: &str = "NCE_BASIC_TOKEN";

/// Keyring service and entry for the basic credential.
pub const KEYRING_SERVICE: &str = "nce";
pub const KEYRING_ENTRY: &str = "basic-token";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no basic credential found (checked $NCE_BASIC_TOKEN, keyring, {})", path.display())]
    NoCredential { path: PathBuf },

    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("config file already exists: {}", path.display())]
    AlreadyExists { path: PathBuf },

    #[error("keyring error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error(transparent)]
    Api(#[from] nce_api::Error),

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
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Device the CLI acts on unless `--device` says otherwise.
    #[serde(default = "default_device_id")]
    pub device_id: String,

    /// Hex key sent by `provision` when `--secret` is absent.
    #[serde(default = "default_psk")]
    pub default_psk: String,

    /// Consult the system keyring for the basic credential.
    #[serde(default = "default_true")]
    pub use_keyring: bool,

    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub files: FileSettings,

    #[serde(default)]
    pub poll: PollSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_id: default_device_id(),
            default_psk: default_psk(),
            use_keyring: true,
            api: ApiSettings::default(),
            files: FileSettings::default(),
            poll: PollSettings::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApiSettings {
    #[serde(default = "default_token_url")]
    pub token_url: String,

    #[serde(default = "default_device_url")]
    pub device_url: String,

    /// HTTP timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Extra CA certificate (PEM) to trust.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            device_url: default_device_url(),
            timeout: default_timeout(),
            ca_cert: None,
        }
    }
}

/// Flat files holding secrets. Relative paths resolve against the
/// working directory.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct FileSettings {
    #[serde(default = "default_basic_token_file")]
    pub basic_token: PathBuf,

    #[serde(default = "default_access_token_file")]
    pub access_token: PathBuf,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            basic_token: default_basic_token_file(),
            access_token: default_access_token_file(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PollSettings {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_device_id() -> String {
    DEFAULT_DEVICE_ID.into()
}
fn default_psk() -> String {
    DEFAULT_PSK.into()
}
fn default_true() -> bool {
    true
}
fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.into()
}
fn default_device_url() -> String {
    DEFAULT_DEVICE_URL.into()
}
fn default_timeout() -> u64 {
    30
}
fn default_basic_token_file() -> PathBuf {
    PathBuf::from("basic_token.txt")
}
fn default_access_token_file() -> PathBuf {
    PathBuf::from("access_token.txt")
}
fn default_attempts() -> u32 {
    20
}
fn default_interval_ms() -> u64 {
    1000
}

// ── Translation ─────────────────────────────────────────────────────

impl Config {
    pub fn device(&self) -> Result<DeviceId, ConfigError> {
        Ok(DeviceId::new(self.device_id.as_str())?)
    }

    pub fn endpoints(&self) -> Result<Endpoints, ConfigError> {
        let parse = |field: &str, raw: &str| {
            url::Url::parse(raw).map_err(|e| ConfigError::Validation {
                field: field.into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })
        };
        Ok(Endpoints {
            token_url: parse("api.token_url", &self.api.token_url)?,
            device_url: parse("api.device_url", &self.api.device_url)?,
        })
    }

    pub fn poll_policy(&self) -> Result<PollPolicy, ConfigError> {
        if self.poll.attempts == 0 {
            return Err(ConfigError::Validation {
                field: "poll.attempts".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(PollPolicy {
            attempts: self.poll.attempts,
            interval: Duration::from_millis(self.poll.interval_ms),
        })
    }

    pub fn transport(&self) -> TransportConfig {
        let tls = match self.api.ca_cert {
            Some(ref path) => TlsMode::CustomCa(path.clone()),
            None => TlsMode::System,
        };
        TransportConfig {
            tls,
            timeout: Duration::from_secs(self.api.timeout),
        }
    }

    pub fn access_token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.files.access_token)
    }

    pub fn basic_token_store(&self) -> FileTokenStore {
        FileTokenStore::new(&self.files.basic_token)
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "1nce", "nce").map_or_else(
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
    p.push("nce");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Prefix for environment overrides.
const ENV_PREFIX: &str = "NCE__";

/// Keys whose environment values are taken verbatim. ICCIDs and hex keys
/// are often all digits and must not be parsed as numbers.
const VERBATIM_ENV_KEYS: [&str; 2] = ["device_id", "default_psk"];

/// Layered sources: defaults, then the TOML file, then `NCE__*` variables
/// (`NCE__POLL__ATTEMPTS=5` sets `poll.attempts`).
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(
            Env::prefixed(ENV_PREFIX)
                .split("__")
                .ignore(&VERBATIM_ENV_KEYS),
        )
        .merge(Serialized::defaults(verbatim_env()))
}

fn verbatim_env() -> Dict {
    VERBATIM_ENV_KEYS
        .iter()
        .filter_map(|key| {
            let var = format!("{ENV_PREFIX}{}", key.to_uppercase());
            std::env::var(var)
                .ok()
                .map(|val| ((*key).to_owned(), Value::from(val)))
        })
        .collect()
}

/// Load the config from `explicit` (which must exist) or the platform
/// config path (which may not).
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    let path = match explicit {
        Some(p) if !p.exists() => {
            return Err(ConfigError::NotFound { path: p.into() });
        }
        Some(p) => p.to_path_buf(),
        None => config_path(),
    };
    debug!(path = %path.display(), "loading config");

    let config: Config = figment(&path).extract()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Where the basic credential came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Env,
    Keyring,
    File(PathBuf),
}

impl std::fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Env => write!(f, "${BASIC_TOKEN_ENV}"),
            Self::Keyring => write!(f, "keyring ({KEYRING_SERVICE}/{KEYRING_ENTRY})"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Resolve the basic credential: `$NCE_BASIC_TOKEN`, then the system
/// keyring (when enabled), then the basic token file.
pub fn resolve_basic_credential(
    cfg: &Config,
) -> Result<(SecretString, CredentialSource), ConfigError> {
    resolve_with(cfg, |name| std::env::var(name).ok(), keyring_lookup)
}

fn resolve_with(
    cfg: &Config,
    env: impl Fn(&str) -> Option<String>,
    keyring: impl Fn() -> Option<String>,
) -> Result<(SecretString, CredentialSource), ConfigError> {
    // 1. Environment
    if let Some(val) = env(BASIC_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
        return Ok((SecretString::from(val), CredentialSource::Env));
    }

    // 2. System keyring
    if cfg.use_keyring {
        if let Some(secret) = keyring() {
            return Ok((SecretString::from(secret), CredentialSource::Keyring));
        }
    }

    // 3. Flat file
    let store = cfg.basic_token_store();
    if let Some(secret) = store.load()? {
        return Ok((secret, CredentialSource::File(store.path().to_path_buf())));
    }

    Err(ConfigError::NoCredential {
        path: cfg.files.basic_token.clone(),
    })
}

fn keyring_lookup() -> Option<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY).ok()?;
    match entry.get_password() {
        Ok(secret) if !secret.trim().is_empty() => Some(secret),
        Ok(_) => None,
        Err(e) => {
            debug!(error = %e, "keyring lookup skipped");
            None
        }
    }
}

/// Save the basic credential in the system keyring.
pub fn store_basic_credential(secret: &str) -> Result<(), ConfigError> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, KEYRING_ENTRY)?;
    entry.set_password(secret)?;
    Ok(())
}
