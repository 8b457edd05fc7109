use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use crate::{
    chatroom::ChatroomApi,
    config::{Config, ConfigLocation},
    dispatch::Dispatcher,
    errors::Error,
    group::GroupApi,
    message::MessageApi,
    push::PushApi,
    token::{Authenticator, Credentials},
    transport::{Middleware, Transport},
    user::UserApi,
};

/// Entry point of the SDK. Cheap to clone; all clones share one token and one
/// connection pool.
#[derive(Clone)]
pub struct ImClient {
    dispatcher: Arc<Dispatcher>,
    authenticator: Arc<Authenticator>,
    user: UserApi,
    group: GroupApi,
    chatroom: ChatroomApi,
    message: MessageApi,
    push: PushApi,
}

impl ImClient {
    /// Create a new ImClient
    /// # Arguments
    /// * `config` - Endpoint and credentials, typically loaded via `Config::from_file` or `Config::from_env`.
    ///
    /// Fails with `Error::Config` on a malformed app key or host before any network activity.
    /// No token is requested until the first call is rejected with 401, or until
    /// [`ImClient::authenticate`] is called.
    pub fn new(config: Config) -> Result<Self, Error> {
        let transport = Transport::new(&config)?;
        Ok(Self::assemble(transport, &config))
    }

    /// Like [`ImClient::new`], sending through a caller-built `reqwest::Client`.
    pub fn with_http_client(config: Config, http: Client) -> Result<Self, Error> {
        let transport = Transport::with_client(http, config.base_url()?);
        Ok(Self::assemble(transport, &config))
    }

    pub async fn from_location(location: ConfigLocation) -> Result<Self, Error> {
        Self::new(Config::load(location).await?)
    }

    fn assemble(transport: Transport, config: &Config) -> Self {
        let transport = Arc::new(transport);
        let authenticator = Arc::new(Authenticator::new(
            transport.clone(),
            Credentials::from_config(config),
        ));
        let dispatcher = Arc::new(Dispatcher::new(transport, Some(authenticator.clone())));
        info!(
            base_url = %dispatcher.base_url(),
            client_id = %authenticator.credentials().client_id(),
            "client constructed"
        );
        Self {
            user: UserApi::new(dispatcher.clone()),
            group: GroupApi::new(dispatcher.clone()),
            chatroom: ChatroomApi::new(dispatcher.clone()),
            message: MessageApi::new(dispatcher.clone()),
            push: PushApi::new(dispatcher.clone()),
            dispatcher,
            authenticator,
        }
    }

    pub fn user(&self) -> &UserApi {
        &self.user
    }

    pub fn group(&self) -> &GroupApi {
        &self.group
    }

    pub fn chatroom(&self) -> &ChatroomApi {
        &self.chatroom
    }

    pub fn message(&self) -> &MessageApi {
        &self.message
    }

    pub fn push(&self) -> &PushApi {
        &self.push
    }

    /// Raw access for endpoints without a typed wrapper.
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    pub fn base_url(&self) -> &str {
        self.dispatcher.base_url()
    }

    pub fn use_middleware(&self, middleware: impl Middleware + 'static) {
        self.dispatcher.use_middleware(middleware);
    }

    /// Fetches a token now instead of on the first 401.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.authenticator.ensure_token().await
    }
}
