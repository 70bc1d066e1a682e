// Secret persistence
//
// The access token outlives a single invocation: `authenticate` writes it,
// every device call reads it. `TokenStore` hides where it lives so tests
// can run against memory and the CLI against flat files.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::Error;

/// Read/write access to a single persisted secret.
pub trait TokenStore: Send + Sync {
    /// Load the secret. `Ok(None)` means nothing has been stored yet.
    fn load(&self) -> Result<Option<SecretString>, Error>;

    /// Persist `token`, replacing any previous value.
    fn store(&self, token: &SecretString) -> Result<(), Error>;

    /// Human-readable location, used in error messages.
    fn location(&self) -> String;

    /// Whether a non-empty secret is currently stored.
    fn is_present(&self) -> bool {
        matches!(self.load(), Ok(Some(_)))
    }
}

// ── File-backed ─────────────────────────────────────────────────────

/// A secret kept in a flat file, e.g. `access_token.txt`.
///
/// Reads trim trailing whitespace; writes store the value verbatim with no
/// trailing newline. No locking: the last writer wins.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> Error {
        Error::TokenStore {
            location: self.location(),
            source,
        }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let trimmed = contents.trim_end();
                if trimmed.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(SecretString::from(trimmed.to_owned())))
                }
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    fn store(&self, token: &SecretString) -> Result<(), Error> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
            }
        }
        std::fs::write(&self.path, token.expose_secret()).map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), "token written");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ── In-memory ───────────────────────────────────────────────────────

/// A secret held in process memory. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<SecretString>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(SecretString::from(token.into()))),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, Error> {
        let guard = self.token.read().expect("token lock poisoned");
        Ok(guard.clone())
    }

    fn store(&self, token: &SecretString) -> Result<(), Error> {
        *self.token.write().expect("token lock poisoned") = Some(token.clone());
        Ok(())
    }

    fn location(&self) -> String {
        "memory".into()
    }
}
