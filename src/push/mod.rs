//! Offline push notification templates.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::transport::Body;
use crate::types::{Data, seg};

const TEMPLATE_PATH: &str = "/notification/template";

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Template {
    pub name: String,
    pub title_pattern: String,
    pub content_pattern: String,
    #[serde(rename = "createAt")]
    pub created_at: i64,
    #[serde(rename = "updateAt")]
    pub updated_at: i64,
}

#[derive(Debug, Serialize)]
struct NewTemplate<'a> {
    name: &'a str,
    title_pattern: &'a str,
    content_pattern: &'a str,
}

#[derive(Clone)]
pub struct PushApi {
    dispatcher: Arc<Dispatcher>,
}

impl PushApi {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    pub async fn get_template(&self, name: &str) -> Result<Template, Error> {
        let reply = self
            .dispatcher
            .get(&format!("{}/{}", TEMPLATE_PATH, seg(name)), Body::Empty)
            .await?;
        reply
            .json::<Data<Option<Template>>>()?
            .data
            .ok_or(Error::MissingData("template"))
    }

    /// Patterns use `{0}`, `{1}`, ... placeholders filled at push time.
    pub async fn create_template(
        &self,
        name: &str,
        title_pattern: &str,
        content_pattern: &str,
    ) -> Result<(), Error> {
        let body = Body::json(&NewTemplate {
            name,
            title_pattern,
            content_pattern,
        })?;
        self.dispatcher.post(TEMPLATE_PATH, body).await?;
        Ok(())
    }

    pub async fn delete_template(&self, name: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&format!("{}/{}", TEMPLATE_PATH, seg(name)), Body::Empty)
            .await?;
        Ok(())
    }
}
