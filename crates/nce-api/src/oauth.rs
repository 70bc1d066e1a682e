// OAuth client-credentials flow
//
// Exchanges the long-lived basic credential for a bearer token and
// persists it in the client's token store.

use reqwest::header::AUTHORIZATION;
use secrecy::SecretString;
use serde_json::json;
use tracing::{debug, info};

use crate::auth::AuthScheme;
use crate::client::NceClient;
use crate::error::Error;

impl NceClient {
    /// Authenticate with a client-credentials grant.
    ///
    /// `POST {token_url}` with `{"grant_type": "client_credentials"}` and
    /// `Authorization: Basic <credential>`. On success the returned
    /// `access_token` is written to the token store, replacing any previous
    /// token. If the response has no `access_token` the store is left
    /// untouched and the raw body comes back in `Error::UnexpectedResponse`.
    pub async fn authenticate(&self, credential: &SecretString) -> Result<SecretString, Error> {
        let url = self.endpoints().token_url.clone();
        debug!("requesting access token at {}", url);

        let builder = self
            .http()
            .post(url)
            .header(AUTHORIZATION, AuthScheme::Basic.header_value(credential)?)
            .json(&json!({ "grant_type": "client_credentials" }));

        let resp = Self::send(builder).await?;
        let token = SecretString::from(resp.require_str("access_token")?);

        self.tokens().store(&token)?;
        info!(store = %self.tokens().location(), "access token saved");
        Ok(token)
    }
}
