// Management API HTTP client
//
// Wraps `reqwest::Client` with endpoint construction, per-request
// authorization, and lenient JSON response handling. The endpoint groups
// (oauth, devices, actions) are implemented as inherent methods in
// separate files to keep this module focused on transport mechanics.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{RequestBuilder, StatusCode};
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use crate::actions::PollPolicy;
use crate::auth::AuthScheme;
use crate::error::Error;
use crate::store::TokenStore;
use crate::transport::TransportConfig;

/// Production token endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://api.1nce.com/management-api/oauth/token";

/// Production device API root. Device- and request-scoped paths hang off it.
pub const DEFAULT_DEVICE_URL: &str = "https://api.1nce.com/management-api/v1/integrate/devices/";

/// Device used when none is given on the command line or in config.
pub const DEFAULT_DEVICE_ID: &str = "8988228066612797879";

// ── Identifiers ─────────────────────────────────────────────────────

/// Numeric device identifier (the SIM's ICCID).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeviceId(String);

impl DeviceId {
    /// Parse a device identifier. Must be non-empty and all ASCII digits.
    pub fn new(raw: impl Into<String>) -> Result<Self, Error> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::Validation {
                field: "device id",
                reason: format!("expected a numeric identifier, got '{raw}'"),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The two API roots the client talks to.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub token_url: Url,
    pub device_url: Url,
}

impl Endpoints {
    pub fn new(token_url: &str, device_url: &str) -> Result<Self, Error> {
        Ok(Self {
            token_url: Url::parse(token_url)?,
            device_url: Url::parse(device_url)?,
        })
    }
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            token_url: Url::parse(DEFAULT_TOKEN_URL).expect("default token URL is valid"),
            device_url: Url::parse(DEFAULT_DEVICE_URL).expect("default device URL is valid"),
        }
    }
}

// ── Response ────────────────────────────────────────────────────────

/// A decoded JSON response together with its HTTP status.
///
/// The API reports most failures as a JSON body lacking the expected
/// field, so status alone does not decide success.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    /// Fetch a string-ish field, or fail with the raw body attached.
    ///
    /// Numeric values are accepted and rendered as strings; identifiers
    /// come back either way depending on the endpoint.
    pub fn require_str(&self, field: &'static str) -> Result<String, Error> {
        match self.body.get(field) {
            Some(Value::String(s)) if !s.is_empty() => Ok(s.clone()),
            Some(Value::Number(n)) => Ok(n.to_string()),
            _ => Err(Error::UnexpectedResponse {
                field,
                status: self.status.as_u16(),
                body: self.body.clone(),
            }),
        }
    }
}

// ── Client ──────────────────────────────────────────────────────────

/// Async client for the 1NCE management API.
///
/// One client is bound to one device. The access token is read from the
/// token store on every device request and never cached in the client.
pub struct NceClient {
    http: reqwest::Client,
    endpoints: Endpoints,
    device_id: DeviceId,
    tokens: Arc<dyn TokenStore>,
    poll: PollPolicy,
}

impl NceClient {
    /// Create a client from a `TransportConfig`.
    pub fn new(
        endpoints: Endpoints,
        device_id: DeviceId,
        tokens: Arc<dyn TokenStore>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, endpoints, device_id, tokens))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoints: Endpoints,
        device_id: DeviceId,
        tokens: Arc<dyn TokenStore>,
    ) -> Self {
        Self {
            http,
            endpoints,
            device_id,
            tokens,
            poll: PollPolicy::default(),
        }
    }

    /// Override the poll policy used by action requests.
    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.poll
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Build `{device_url}/{path}`, tolerating a trailing slash on the root.
    pub(crate) fn device_api_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.endpoints.device_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{path}"))?)
    }

    /// Build a URL scoped to the bound device: `{device_url}/{device_id}/{path}`.
    pub(crate) fn device_url(&self, path: &str) -> Result<Url, Error> {
        self.device_api_url(&format!("{}/{path}", self.device_id))
    }

    // ── Auth ─────────────────────────────────────────────────────────

    /// Bearer header from the token store, or `MissingToken`.
    pub(crate) fn bearer(&self) -> Result<HeaderValue, Error> {
        let token = self.tokens.load()?.ok_or_else(|| Error::MissingToken {
            location: self.tokens.location(),
        })?;
        AuthScheme::Bearer.header_value(&token)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Send a GET request with bearer auth.
    pub(crate) async fn get(&self, url: Url) -> Result<ApiResponse, Error> {
        debug!("GET {}", url);
        let builder = self.http.get(url).header(AUTHORIZATION, self.bearer()?);
        Self::send(builder).await
    }

    /// Send a POST request with a JSON body and bearer auth.
    pub(crate) async fn post(
        &self,
        url: Url,
        body: &(impl serde::Serialize + Sync),
    ) -> Result<ApiResponse, Error> {
        debug!("POST {}", url);
        let builder = self
            .http
            .post(url)
            .header(AUTHORIZATION, self.bearer()?)
            .json(body);
        Self::send(builder).await
    }

    /// Send a prepared request and decode the body as JSON.
    ///
    /// An empty body decodes to `null`; anything else that is not JSON is
    /// a `Deserialization` error carrying the raw text.
    pub(crate) async fn send(builder: RequestBuilder) -> Result<ApiResponse, Error> {
        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        trace!(%status, body = %text, "response");

        if text.trim().is_empty() {
            return Ok(ApiResponse {
                status,
                body: Value::Null,
            });
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            Error::Deserialization {
                message: format!("HTTP {status}: {e} (body preview: {preview:?})"),
                body: text.clone(),
            }
        })?;

        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::store::MemoryTokenStore;
    use serde_json::json;

    fn client(device_url: &str) -> NceClient {
        NceClient::with_client(
            reqwest::Client::new(),
            Endpoints::new("https://auth.example/oauth/token", device_url).unwrap(),
            DeviceId::new("8988228066612797879").unwrap(),
            Arc::new(MemoryTokenStore::new()),
        )
    }

    #[test]
    fn device_id_rejects_non_numeric() {
        assert!(DeviceId::new("").is_err());
        assert!(DeviceId::new("89882abc").is_err());
        assert_eq!(DeviceId::new(" 1234 ").unwrap().as_str(), "1234");
    }

    #[test]
    fn urls_join_with_or_without_trailing_slash() {
        for base in [
            "https://api.example/v1/integrate/devices/",
            "https://api.example/v1/integrate/devices",
        ] {
            let c = client(base);
            assert_eq!(
                c.device_url("psk").unwrap().as_str(),
                "https://api.example/v1/integrate/devices/8988228066612797879/psk"
            );
            assert_eq!(
                c.device_api_url("actions/requests/42").unwrap().as_str(),
                "https://api.example/v1/integrate/devices/actions/requests/42"
            );
        }
    }

    #[test]
    fn bearer_without_token_is_missing_token() {
        let c = client("https://api.example/devices/");
        assert!(matches!(c.bearer(), Err(Error::MissingToken { .. })));
    }

    #[test]
    fn require_str_accepts_numbers_and_rejects_blank() {
        let resp = ApiResponse {
            status: StatusCode::OK,
            body: json!({ "id": 42, "deviceId": "", "name": "x" }),
        };
        assert_eq!(resp.require_str("id").unwrap(), "42");
        assert_eq!(resp.require_str("name").unwrap(), "x");
        let err = resp.require_str("deviceId").unwrap_err();
        assert!(matches!(
            err,
            Error::UnexpectedResponse {
                field: "deviceId",
                status: 200,
                ..
            }
        ));
    }
}
