use std::fmt;
use std::sync::Arc;

use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{Config, effective_ttl};
use crate::errors::{ApiError, Error};
use crate::telemetry::refresh::RefreshTelemetry;
use crate::transport::{Body, Transport};

use super::flight::SingleFlight;

const GRANT_TYPE: &str = "client_credentials";
pub const TOKEN_PATH: &str = "/token";

/// Client-credentials identity used to obtain access tokens.
#[derive(Clone)]
pub struct Credentials {
    client_id: String,
    client_secret: String,
    ttl: i64,
}

impl Credentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>, ttl: i64) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.client_id, &config.client_secret, config.token_ttl)
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// TTL sent to the token endpoint; non-positive values fall back to 7200 seconds.
    pub fn effective_ttl(&self) -> i64 {
        effective_ttl(self.ttl)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    client_id: &'a str,
    client_secret: &'a str,
    ttl: i64,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: i64,
    #[serde(default)]
    pub application: String,
}

type RefreshResult = Result<(), Arc<Error>>;

/// Obtains access tokens with the client-credentials grant and installs them into the
/// shared [`Transport`]. Concurrent refreshes for the same client id are coalesced.
pub struct Authenticator {
    transport: Arc<Transport>,
    credentials: Credentials,
    flights: SingleFlight<RefreshResult>,
}

impl Authenticator {
    pub fn new(transport: Arc<Transport>, credentials: Credentials) -> Self {
        Self {
            transport,
            credentials,
            flights: SingleFlight::new(),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Joins the refresh in progress for this client id, or starts one.
    pub async fn ensure_token(&self) -> Result<(), Error> {
        self.refresh(None).await
    }

    /// Refreshes unless a token newer than `observed_generation` has been installed
    /// since the caller's failed request was sent.
    pub(crate) async fn refresh_after(&self, observed_generation: u64) -> Result<(), Error> {
        self.refresh(Some(observed_generation)).await
    }

    async fn refresh(&self, observed_generation: Option<u64>) -> Result<(), Error> {
        if let Some(observed) = observed_generation
            && self.transport.token_generation().await > observed
        {
            debug!(client_id = %self.credentials.client_id, "token already refreshed; skipping");
            return Ok(());
        }

        self.flights
            .run(&self.credentials.client_id, || async {
                if let Some(observed) = observed_generation
                    && self.transport.token_generation().await > observed
                {
                    return Ok(());
                }
                self.fetch_and_install().await.map_err(Arc::new)
            })
            .await
            .map_err(Error::Auth)
    }

    async fn fetch_and_install(&self) -> Result<(), Error> {
        let telemetry = RefreshTelemetry::new(self.credentials.client_id.as_str());
        telemetry.emit_start(self.credentials.effective_ttl());
        match self.request_token().await {
            Ok(token) => {
                self.transport.set_bearer_token(token.access_token.as_str()).await;
                telemetry.emit_success(&token);
                Ok(())
            }
            Err(err) => {
                telemetry.emit_failure(&err);
                Err(err)
            }
        }
    }

    /// Posts straight to the transport: a 401 here must not re-enter the refresh path.
    async fn request_token(&self) -> Result<TokenResponse, Error> {
        let body = Body::json(&TokenRequest {
            grant_type: GRANT_TYPE,
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            ttl: self.credentials.effective_ttl(),
        })?;
        let raw = self.transport.send(Method::POST, TOKEN_PATH, &body).await?;
        if !raw.status.is_success() {
            return Err(ApiError::decode(raw.status, &raw.body)?.into());
        }
        let token: TokenResponse = serde_json::from_slice(&raw.body)?;
        if token.access_token.is_empty() {
            return Err(Error::MissingData("access_token"));
        }
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_request_serializes_grant_fields() {
        let creds = Credentials::new("YXA6id", "YXA6secret", 0);
        let body = serde_json::to_value(TokenRequest {
            grant_type: GRANT_TYPE,
            client_id: creds.client_id(),
            client_secret: "YXA6secret",
            ttl: creds.effective_ttl(),
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "grant_type": "client_credentials",
                "client_id": "YXA6id",
                "client_secret": "YXA6secret",
                "ttl": 7200
            })
        );
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = Credentials::new("id", "topsecret", 60);
        assert!(!format!("{:?}", creds).contains("topsecret"));
    }
}
