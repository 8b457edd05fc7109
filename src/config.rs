//! read client configuration from values, a file, the environment or AWS Secrets Manager

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use aws_config::BehaviorVersion;
use serde::Deserialize;

use crate::errors::Error;

/// Token lifetime requested when the configured TTL is not positive.
pub const DEFAULT_TOKEN_TTL: i64 = 7200;

pub enum ConfigLocation {
    File(String),
    Env,
    /// ARN of a secret whose string value is a JSON `Config`.
    Secret(String),
}

#[derive(Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub app_key: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default)]
    pub token_ttl: i64,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("app_key", &self.app_key)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    pub fn from_values(
        host: impl Into<String>,
        app_key: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_ttl: i64,
    ) -> Self {
        Self {
            host: host.into(),
            app_key: app_key.into(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_ttl,
            timeout_secs: None,
        }
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub async fn load(loc: ConfigLocation) -> Result<Self, Error> {
        match loc {
            ConfigLocation::File(path) => Self::from_file(path),
            ConfigLocation::Env => Self::from_env(),
            ConfigLocation::Secret(arn) => Self::from_secret(&arn).await,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }

    /// Reads `EASEMOB_HOST`, `EASEMOB_APP_KEY`, `EASEMOB_CLIENT_ID`, `EASEMOB_CLIENT_SECRET`
    /// and the optional `EASEMOB_TOKEN_TTL` / `EASEMOB_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, Error> {
        let token_ttl = match std::env::var("EASEMOB_TOKEN_TTL") {
            Ok(raw) => raw.trim().parse().map_err(|_| {
                Error::Config(format!("EASEMOB_TOKEN_TTL is not an integer: '{}'", raw))
            })?,
            Err(_) => 0,
        };
        let timeout_secs = match std::env::var("EASEMOB_TIMEOUT_SECS") {
            Ok(raw) => Some(raw.trim().parse().map_err(|_| {
                Error::Config(format!("EASEMOB_TIMEOUT_SECS is not an integer: '{}'", raw))
            })?),
            Err(_) => None,
        };
        Ok(Self {
            host: required_env("EASEMOB_HOST")?,
            app_key: required_env("EASEMOB_APP_KEY")?,
            client_id: required_env("EASEMOB_CLIENT_ID")?,
            client_secret: required_env("EASEMOB_CLIENT_SECRET")?,
            token_ttl,
            timeout_secs,
        })
    }

    pub async fn from_secret(secret_arn: &str) -> Result<Self, Error> {
        let client = aws_sdk_secretsmanager::Client::new(
            &aws_config::load_defaults(BehaviorVersion::latest()).await,
        );
        let resp = client
            .get_secret_value()
            .secret_id(secret_arn)
            .send()
            .await
            .map_err(|e| Error::Config(format!("Failed to get secret: {}", e)))?;
        let secret = resp
            .secret_string()
            .ok_or_else(|| Error::Config("Failed to get secret string, returned None".into()))?;
        Ok(serde_json::from_str(secret)?)
    }

    /// Token lifetime sent to the token endpoint.
    pub fn effective_token_ttl(&self) -> i64 {
        effective_ttl(self.token_ttl)
    }

    /// Base URL shared by every endpoint: `https://{host}/{org}/{app}`.
    ///
    /// A host that already carries an `http://` or `https://` scheme is used as is.
    pub fn base_url(&self) -> Result<String, Error> {
        let key: AppKey = self.app_key.parse()?;
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::Config("host must not be empty".into()));
        }
        let origin = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        let base = format!("{}/{}/{}", origin, key.org, key.app);
        reqwest::Url::parse(&base)
            .map_err(|e| Error::Config(format!("Invalid base URL '{}': {}", base, e)))?;
        Ok(base)
    }
}

pub(crate) fn effective_ttl(ttl: i64) -> i64 {
    if ttl <= 0 { DEFAULT_TOKEN_TTL } else { ttl }
}

fn required_env(name: &str) -> Result<String, Error> {
    std::env::var(name).map_err(|_| Error::Config(format!("Missing {} env var", name)))
}

/// Application key of the form `org#app`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppKey {
    pub org: String,
    pub app: String,
}

impl FromStr for AppKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('#').collect();
        match parts.as_slice() {
            [org, app] if !org.is_empty() && !app.is_empty() => Ok(Self {
                org: (*org).to_string(),
                app: (*app).to_string(),
            }),
            _ => Err(Error::Config(format!(
                "invalid app key '{}'; expected '<org>#<app>'",
                s
            ))),
        }
    }
}
