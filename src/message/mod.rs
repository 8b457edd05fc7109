//! Sending messages to users, groups and chatrooms.

mod types;

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::transport::Body;
use crate::types::Data;

pub use types::{
    AudioBody, CommandBody, CustomBody, FileBody, ImageBody, LocationBody, Message, MessageBody,
    Target, TextBody, VideoBody,
};

#[derive(Clone)]
pub struct MessageApi {
    dispatcher: Arc<Dispatcher>,
}

impl MessageApi {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Sends `message` and returns the message id assigned per receiver.
    pub async fn send(&self, message: &Message) -> Result<HashMap<String, String>, Error> {
        let request = message.to_request(self.dispatcher.base_url())?;
        debug!(
            kind = request.kind,
            receivers = request.to.len(),
            "message.send"
        );
        let reply = self
            .dispatcher
            .post(message.target().path(), Body::json(&request)?)
            .await?;
        Ok(reply
            .json::<Data<Option<HashMap<String, String>>>>()?
            .data
            .unwrap_or_default())
    }
}
