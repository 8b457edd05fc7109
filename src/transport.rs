use std::sync::{Arc, PoisonError, RwLock as SyncRwLock};
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, Method, Request, StatusCode};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::{config::Config, errors::Error};

const CONTENT_TYPE_JSON: &str = "application/json";
const USER_AGENT: &str = concat!("easemob-im-rust-sdk/", env!("CARGO_PKG_VERSION"));

/// Payload of a single request.
#[derive(Clone, Debug, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(serde_json::Value),
    /// Sent as `application/x-www-form-urlencoded`.
    Form(Vec<(String, String)>),
    /// Appended to the URL as a query string.
    Query(Vec<(String, String)>),
}

impl Body {
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, Error> {
        Ok(Body::Json(serde_json::to_value(value)?))
    }

    pub fn form<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Body::Form(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }

    pub fn query<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Body::Query(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// Interceptor run around every request sent by a [`Transport`].
///
/// `on_request` hooks run in registration order after default headers, body and
/// bearer token have been applied; `on_response` hooks run in registration order
/// once the status is known.
pub trait Middleware: Send + Sync {
    fn on_request(&self, _request: &mut Request) -> Result<(), Error> {
        Ok(())
    }

    fn on_response(&self, _method: &Method, _url: &reqwest::Url, _status: StatusCode) {}
}

impl<F> Middleware for F
where
    F: Fn(&mut Request) -> Result<(), Error> + Send + Sync,
{
    fn on_request(&self, request: &mut Request) -> Result<(), Error> {
        self(request)
    }
}

/// Status and body of a completed exchange.
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
    /// Generation of the bearer token the request was sent with.
    pub token_generation: u64,
}

#[derive(Default)]
struct BearerToken {
    value: Option<String>,
    generation: u64,
}

pub struct Transport {
    http: Client,
    base_url: String,
    bearer: RwLock<BearerToken>,
    middleware: SyncRwLock<Vec<Arc<dyn Middleware>>>,
}

impl Transport {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        let mut builder = Client::builder().user_agent(USER_AGENT);
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            bearer: RwLock::new(BearerToken::default()),
            middleware: SyncRwLock::new(Vec::new()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Replaces the token attached to every request issued after this returns.
    pub async fn set_bearer_token(&self, token: impl Into<String>) {
        let mut bearer = self.bearer.write().await;
        bearer.value = Some(token.into());
        bearer.generation += 1;
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.bearer.read().await.value.clone()
    }

    /// Incremented on every [`Transport::set_bearer_token`].
    pub async fn token_generation(&self) -> u64 {
        self.bearer.read().await.generation
    }

    /// Registers interceptors for all future requests on this transport.
    pub fn use_middleware(&self, middleware: impl Middleware + 'static) {
        self.middleware
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(middleware));
    }

    /// Performs one HTTP exchange. Transport failures are returned as-is and never retried.
    pub async fn send(&self, method: Method, path: &str, body: &Body) -> Result<RawResponse, Error> {
        let url = format!("{}{}", self.base_url, path);
        let (token, token_generation) = {
            let bearer = self.bearer.read().await;
            (bearer.value.clone(), bearer.generation)
        };

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT, CONTENT_TYPE_JSON);
        builder = match body {
            Body::Empty => builder.header(CONTENT_TYPE, CONTENT_TYPE_JSON),
            Body::Json(value) => builder.json(value),
            Body::Form(pairs) => builder.form(pairs),
            Body::Query(pairs) => builder.query(pairs).header(CONTENT_TYPE, CONTENT_TYPE_JSON),
        };
        if let Some(token) = token.as_deref() {
            builder = builder.bearer_auth(token);
        }
        let mut request = builder.build()?;

        let chain: Vec<Arc<dyn Middleware>> = self
            .middleware
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for middleware in &chain {
            middleware.on_request(&mut request)?;
        }

        let request_url = request.url().clone();
        debug!(
            method = %method,
            path,
            has_token = token.is_some(),
            "request.send"
        );
        let resp = self.http.execute(request).await?;
        let status = resp.status();
        let body = resp.bytes().await?.to_vec();
        for middleware in &chain {
            middleware.on_response(&method, &request_url, status);
        }
        debug!(method = %method, path, status = status.as_u16(), bytes = body.len(), "request.done");

        Ok(RawResponse {
            status,
            body,
            token_generation,
        })
    }
}

/// Sets a fixed header on every request.
pub struct StaticHeader {
    name: reqwest::header::HeaderName,
    value: HeaderValue,
}

impl StaticHeader {
    pub fn new(name: &str, value: &str) -> Result<Self, Error> {
        let name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| Error::InvalidArgument(format!("invalid header name '{}': {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| Error::InvalidArgument(format!("invalid header value: {}", e)))?;
        Ok(Self { name, value })
    }
}

impl Middleware for StaticHeader {
    fn on_request(&self, request: &mut Request) -> Result<(), Error> {
        request
            .headers_mut()
            .insert(self.name.clone(), self.value.clone());
        Ok(())
    }
}
