mod outcome;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tracing::{error, warn};

use crate::errors::{ApiError, Error};
use crate::token::Authenticator;
use crate::transport::{Body, Middleware, RawResponse, Transport};

pub use outcome::RequestOutcome;

/// A request is sent at most twice: once, and once more after a token refresh.
const MAX_ATTEMPTS: u8 = 2;

/// Successful response body. Nothing is decoded until [`Reply::json`] is called.
#[derive(Debug)]
pub struct Reply {
    status: StatusCode,
    body: Vec<u8>,
}

impl Reply {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Per-call options.
#[derive(Clone, Debug, Default)]
pub struct CallOptions {
    /// Upper bound for the whole call, including a token refresh and the retry.
    pub deadline: Option<Duration>,
}

impl CallOptions {
    pub fn with_deadline(deadline: Duration) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }
}

/// Single entry point for every REST call: applies the refresh-and-retry-once
/// protocol on 401 and decodes platform errors uniformly.
pub struct Dispatcher {
    transport: Arc<Transport>,
    authenticator: Option<Arc<Authenticator>>,
}

impl Dispatcher {
    pub fn new(transport: Arc<Transport>, authenticator: Option<Arc<Authenticator>>) -> Self {
        Self {
            transport,
            authenticator,
        }
    }

    pub fn transport(&self) -> &Arc<Transport> {
        &self.transport
    }

    pub fn authenticator(&self) -> Option<&Arc<Authenticator>> {
        self.authenticator.as_ref()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn use_middleware(&self, middleware: impl Middleware + 'static) {
        self.transport.use_middleware(middleware);
    }

    pub async fn get(&self, path: &str, body: Body) -> Result<Reply, Error> {
        self.request(Method::GET, path, body).await
    }

    pub async fn post(&self, path: &str, body: Body) -> Result<Reply, Error> {
        self.request(Method::POST, path, body).await
    }

    pub async fn put(&self, path: &str, body: Body) -> Result<Reply, Error> {
        self.request(Method::PUT, path, body).await
    }

    pub async fn patch(&self, path: &str, body: Body) -> Result<Reply, Error> {
        self.request(Method::PATCH, path, body).await
    }

    pub async fn delete(&self, path: &str, body: Body) -> Result<Reply, Error> {
        self.request(Method::DELETE, path, body).await
    }

    pub async fn request(&self, method: Method, path: &str, body: Body) -> Result<Reply, Error> {
        self.execute(method, path, &body).await
    }

    /// Like [`Dispatcher::request`], bounded by `options.deadline` when set.
    ///
    /// An elapsed deadline drops the call wherever it is; a call cut short during its
    /// first attempt never triggers a refresh.
    pub async fn request_with(
        &self,
        method: Method,
        path: &str,
        body: Body,
        options: &CallOptions,
    ) -> Result<Reply, Error> {
        match options.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.execute(method, path, &body))
                .await
                .map_err(|_| Error::Timeout(deadline))?,
            None => self.execute(method, path, &body).await,
        }
    }

    async fn execute(&self, method: Method, path: &str, body: &Body) -> Result<Reply, Error> {
        let start = Instant::now();
        let mut attempt: u8 = 1;
        let mut refreshed = false;
        let result = loop {
            let raw = match self.transport.send(method.clone(), path, body).await {
                Ok(raw) => raw,
                Err(err) => break Err(err),
            };

            if raw.status.is_success() {
                break Ok(Reply {
                    status: raw.status,
                    body: raw.body,
                });
            }

            if raw.status == StatusCode::UNAUTHORIZED
                && attempt < MAX_ATTEMPTS
                && let Some(auth) = &self.authenticator
            {
                warn!(
                    method = %method,
                    path,
                    attempt,
                    "request unauthorized (401); refreshing token before retry"
                );
                if let Err(err) = auth.refresh_after(raw.token_generation).await {
                    break Err(err);
                }
                refreshed = true;
                attempt += 1;
                continue;
            }

            break Err(self.failure(&method, path, attempt, raw));
        };

        RequestOutcome {
            method,
            path: path.to_string(),
            attempts: attempt,
            refreshed,
            success: result.is_ok(),
            elapsed: start.elapsed(),
        }
        .log();
        result
    }

    fn failure(&self, method: &Method, path: &str, attempt: u8, raw: RawResponse) -> Error {
        let status = raw.status;
        match ApiError::decode(status, &raw.body) {
            Ok(api) => {
                if status == StatusCode::UNAUTHORIZED {
                    warn!(
                        method = %method,
                        path,
                        attempt,
                        error = %api.error,
                        "request unauthorized (401) after token refresh; giving up"
                    );
                } else {
                    warn!(
                        method = %method,
                        path,
                        status = status.as_u16(),
                        error = %api.error,
                        description = %api.error_description,
                        "request rejected by platform"
                    );
                }
                Error::Api(api)
            }
            Err(err) => {
                error!(
                    method = %method,
                    path,
                    status = status.as_u16(),
                    body_len = raw.body.len(),
                    "undecodable error response"
                );
                err
            }
        }
    }
}
