use thiserror::Error;

/// Top-level error type for the `nce-api` crate.
///
/// Covers every failure mode of the management API client:
/// transport, token persistence, unexpected response shapes, and
/// payload decoding. The `nce` binary maps these into diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// No access token has been persisted yet (run `authenticate` first).
    #[error("No access token found at {location}")]
    MissingToken { location: String },

    /// A secret could not be used as an HTTP header value.
    #[error("Invalid {scheme} credential: {message}")]
    InvalidCredential {
        scheme: &'static str,
        message: String,
    },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── API responses ───────────────────────────────────────────────
    /// The response parsed as JSON but lacks a field the operation needs.
    /// `body` is the raw response, kept for display.
    #[error("Response (HTTP {status}) is missing '{field}'")]
    UnexpectedResponse {
        field: &'static str,
        status: u16,
        body: serde_json::Value,
    },

    /// The response body was not valid JSON.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    // ── Payloads ────────────────────────────────────────────────────
    /// `resultData.payload` was not valid base64.
    #[error("Invalid result payload: {0}")]
    Payload(String),

    /// LWM2M TLV payload could not be decoded.
    #[error("TLV decode error at byte {offset}: {message}")]
    Tlv { offset: usize, message: String },

    // ── Input ───────────────────────────────────────────────────────
    /// Caller-supplied value rejected before any request was sent.
    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    // ── Storage ─────────────────────────────────────────────────────
    /// Reading or writing a token store failed.
    #[error("Token store error ({location}): {source}")]
    TokenStore {
        location: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Returns `true` if the server refused to hand out a token, or no
    /// token is available locally.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::MissingToken { .. } | Self::InvalidCredential { .. } => true,
            Self::UnexpectedResponse { field, status, .. } => {
                *field == "access_token" || matches!(status, 401 | 403)
            }
            _ => false,
        }
    }

    /// Returns `true` if the request timed out at the HTTP layer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the connection could not be established.
    pub fn is_connect(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect())
    }

    /// The raw JSON body attached to a response-shape error, if any.
    pub fn raw_response(&self) -> Option<&serde_json::Value> {
        match self {
            Self::UnexpectedResponse { body, .. } => Some(body),
            _ => None,
        }
    }
}
