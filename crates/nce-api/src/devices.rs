// Device provisioning endpoints
//
// Pre-shared key setup for the LWM2M DTLS session.

use serde::Serialize;
use tracing::{debug, info};

use crate::client::NceClient;
use crate::error::Error;

/// Key used when the caller does not supply one (ASCII `nordicsecret`).
pub const DEFAULT_PSK: &str = "6E6F72646963736563726574";

/// Body of `POST {device}/psk`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PskRequest<'a> {
    protocol: &'static str,
    secret_key: &'a str,
    format: &'static str,
}

impl<'a> PskRequest<'a> {
    /// An LWM2M PSK in hex format. The key must be non-empty, even-length hex.
    pub fn lwm2m_hex(secret_key: &'a str) -> Result<Self, Error> {
        validate_hex_key(secret_key)?;
        Ok(Self {
            protocol: "LWM2M",
            secret_key,
            format: "HEX",
        })
    }

    pub fn secret_key(&self) -> &str {
        self.secret_key
    }
}

fn validate_hex_key(key: &str) -> Result<(), Error> {
    if key.is_empty() {
        return Err(Error::Validation {
            field: "secret",
            reason: "pre-shared key cannot be empty".into(),
        });
    }
    hex::decode(key).map_err(|e| Error::Validation {
        field: "secret",
        reason: format!("expected hex-encoded key: {e}"),
    })?;
    Ok(())
}

impl NceClient {
    /// Associate a pre-shared key with the bound device.
    ///
    /// `POST {device_url}/{device_id}/psk`. Returns the `deviceId` echoed by
    /// the API; a response without it is an `UnexpectedResponse`.
    pub async fn provision(&self, secret_key: &str) -> Result<String, Error> {
        let body = PskRequest::lwm2m_hex(secret_key)?;
        let url = self.device_url("psk")?;
        debug!(device = %self.device_id(), "provisioning PSK");

        let resp = self.post(url, &body).await?;
        let device_id = resp.require_str("deviceId")?;

        info!(device = %device_id, "device provisioned");
        Ok(device_id)
    }
}
