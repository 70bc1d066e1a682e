use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Which `Authorization` scheme a request is sent with.
///
/// Marker enum (no data) -- the secret itself comes from the caller
/// (basic credential) or the token store (bearer token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthScheme {
    /// Pre-encoded client credential, only used against the token endpoint.
    Basic,
    /// OAuth access token, used on every device endpoint.
    Bearer,
}

impl AuthScheme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Bearer => "Bearer",
        }
    }

    /// Build the `Authorization` header value for `secret`.
    ///
    /// The value is marked sensitive so it never shows up in debug output.
    pub fn header_value(self, secret: &SecretString) -> Result<HeaderValue, Error> {
        let raw = format!("{} {}", self.as_str(), secret.expose_secret().trim());
        let mut value = HeaderValue::from_str(&raw).map_err(|e| Error::InvalidCredential {
            scheme: self.as_str(),
            message: e.to_string(),
        })?;
        value.set_sensitive(true);
        Ok(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn basic_header_is_prefixed_and_sensitive() {
        let secret = SecretString::from("dXNlcjpwYXNz".to_owned());
        let value = AuthScheme::Basic.header_value(&secret).unwrap();
        assert_eq!(value.to_str().unwrap(), "Basic dXNlcjpwYXNz");
        assert!(value.is_sensitive());
    }

    #[test]
    fn bearer_header_trims_secret() {
        let secret = SecretString::from("tok-123\n".to_owned());
        let value = AuthScheme::Bearer.header_value(&secret).unwrap();
        assert_eq!(value.to_str().unwrap(), "Bearer tok-123");
    }

    #[test]
    fn control_characters_are_rejected() {
        let secret = SecretString::from("bad\u{0}token".to_owned());
        let result = AuthScheme::Bearer.header_value(&secret);
        assert!(matches!(
            result,
            Err(Error::InvalidCredential {
                scheme: "Bearer",
                ..
            })
        ));
    }
}
