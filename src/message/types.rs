use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::errors::Error;

/// Conversation kind a message is delivered to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Target {
    User,
    Group,
    Chatroom,
}

impl Target {
    pub(crate) fn path(&self) -> &'static str {
        match self {
            Target::User => "/messages/users",
            Target::Group => "/messages/chatgroups",
            Target::Chatroom => "/messages/chatrooms",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TextBody {
    pub msg: String,
}

/// Image previously uploaded to the platform file store as `uuid`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBody {
    pub filename: String,
    pub secret: String,
    pub width: u32,
    pub height: u32,
    pub uuid: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioBody {
    pub filename: String,
    pub secret: String,
    /// Seconds.
    pub length: u32,
    pub uuid: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VideoBody {
    pub thumb_uuid: String,
    pub thumb_secret: String,
    /// Seconds.
    pub video_length: u32,
    pub video_secret: String,
    /// Bytes.
    pub video_size: u64,
    pub video_uuid: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FileBody {
    pub filename: String,
    pub secret: String,
    pub uuid: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LocationBody {
    pub lat: f64,
    pub lng: f64,
    pub addr: String,
}

/// Transparent command, never shown to the receiving user.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CommandBody {
    pub action: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CustomBody {
    pub custom_event: String,
    pub custom_exts: HashMap<String, String>,
    pub from: Option<String>,
    pub ext: Option<Value>,
}

/// Every message kind the platform accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum MessageBody {
    Text(TextBody),
    Image(ImageBody),
    Audio(AudioBody),
    Video(VideoBody),
    File(FileBody),
    Location(LocationBody),
    Command(CommandBody),
    Custom(CustomBody),
}

impl MessageBody {
    pub fn text(msg: impl Into<String>) -> Self {
        MessageBody::Text(TextBody { msg: msg.into() })
    }

    pub fn command(action: impl Into<String>) -> Self {
        MessageBody::Command(CommandBody {
            action: action.into(),
        })
    }

    /// Wire name of the kind.
    pub fn kind(&self) -> &'static str {
        match self {
            MessageBody::Text(_) => "txt",
            MessageBody::Image(_) => "img",
            MessageBody::Audio(_) => "audio",
            MessageBody::Video(_) => "video",
            MessageBody::File(_) => "file",
            MessageBody::Location(_) => "loc",
            MessageBody::Command(_) => "cmd",
            MessageBody::Custom(_) => "custom",
        }
    }

    /// Encodes the body as the JSON string the send endpoint expects. Uploaded files are
    /// referenced as `{base_url}/chatfiles/{uuid}`.
    pub(crate) fn encode(&self, base_url: &str) -> Result<String, Error> {
        let file_url = |uuid: &str| format!("{}/chatfiles/{}", base_url, uuid);
        let encoded = match self {
            MessageBody::Text(body) => serde_json::to_string(body)?,
            MessageBody::Location(body) => serde_json::to_string(body)?,
            MessageBody::Command(body) => serde_json::to_string(body)?,
            MessageBody::Image(body) => {
                let size = serde_json::to_string(&ImageSize {
                    width: body.width,
                    height: body.height,
                })?;
                serde_json::to_string(&ImageWire {
                    filename: &body.filename,
                    secret: &body.secret,
                    size,
                    url: file_url(&body.uuid),
                })?
            }
            MessageBody::Audio(body) => serde_json::to_string(&AudioWire {
                filename: &body.filename,
                secret: &body.secret,
                length: body.length,
                url: file_url(&body.uuid),
            })?,
            MessageBody::Video(body) => serde_json::to_string(&VideoWire {
                thumb: file_url(&body.thumb_uuid),
                length: body.video_length,
                secret: &body.video_secret,
                file_length: body.video_size,
                thumb_secret: &body.thumb_secret,
                url: file_url(&body.video_uuid),
            })?,
            MessageBody::File(body) => serde_json::to_string(&FileWire {
                filename: &body.filename,
                secret: &body.secret,
                url: file_url(&body.uuid),
            })?,
            MessageBody::Custom(body) => {
                let custom_exts = if body.custom_exts.is_empty() {
                    None
                } else {
                    Some(serde_json::to_string(&body.custom_exts)?)
                };
                let ext = match &body.ext {
                    Some(ext) if !ext.is_null() => Some(serde_json::to_string(ext)?),
                    _ => None,
                };
                serde_json::to_string(&CustomWire {
                    custom_event: Some(body.custom_event.as_str()).filter(|e| !e.is_empty()),
                    custom_exts,
                    from: body.from.as_deref(),
                    ext,
                })?
            }
        };
        Ok(encoded)
    }
}

#[derive(Serialize)]
struct ImageSize {
    width: u32,
    height: u32,
}

#[derive(Serialize)]
struct ImageWire<'a> {
    filename: &'a str,
    secret: &'a str,
    size: String,
    url: String,
}

#[derive(Serialize)]
struct AudioWire<'a> {
    filename: &'a str,
    secret: &'a str,
    length: u32,
    url: String,
}

#[derive(Serialize)]
struct VideoWire<'a> {
    thumb: String,
    length: u32,
    secret: &'a str,
    file_length: u64,
    thumb_secret: &'a str,
    url: String,
}

#[derive(Serialize)]
struct FileWire<'a> {
    filename: &'a str,
    secret: &'a str,
    url: String,
}

#[derive(Serialize)]
struct CustomWire<'a> {
    #[serde(rename = "customEvent", skip_serializing_if = "Option::is_none")]
    custom_event: Option<&'a str>,
    #[serde(rename = "customExts", skip_serializing_if = "Option::is_none")]
    custom_exts: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    ext: Option<String>,
}

/// Outgoing message.
///
/// A message needs a body and at least one receiver; [`crate::message::MessageApi::send`]
/// rejects it before any request is made otherwise.
#[derive(Clone, Debug)]
pub struct Message {
    target: Target,
    sender: Option<String>,
    receivers: Vec<String>,
    body: Option<MessageBody>,
    sync_device: bool,
    online_only: bool,
    ext: Option<Value>,
}

impl Message {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            sender: None,
            receivers: Vec::new(),
            body: None,
            sync_device: false,
            online_only: false,
            ext: None,
        }
    }

    pub fn target(&self) -> Target {
        self.target
    }

    /// Sender username. The platform sends as `admin` when unset.
    pub fn sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    pub fn get_sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn add_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.receivers.extend(receivers.into_iter().map(Into::into));
        self
    }

    pub fn set_receivers<I, S>(mut self, receivers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.receivers = receivers.into_iter().map(Into::into).collect();
        self
    }

    pub fn receivers(&self) -> &[String] {
        &self.receivers
    }

    pub fn body(mut self, body: MessageBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn get_body(&self) -> Option<&MessageBody> {
        self.body.as_ref()
    }

    /// Also delivers the message to the sender's other devices.
    pub fn sync_device(mut self) -> Self {
        self.sync_device = true;
        self
    }

    /// Delivers only to receivers currently online.
    pub fn online_only(mut self) -> Self {
        self.online_only = true;
        self
    }

    /// Extension attributes attached to the message.
    pub fn ext(mut self, ext: Value) -> Self {
        self.ext = Some(ext);
        self
    }

    pub(crate) fn to_request(&self, base_url: &str) -> Result<SendRequest<'_>, Error> {
        let body = self
            .body
            .as_ref()
            .ok_or_else(|| Error::InvalidArgument("message has no body".to_string()))?;
        if self.receivers.is_empty() {
            return Err(Error::InvalidArgument(
                "message has no receivers".to_string(),
            ));
        }
        let ext = match &self.ext {
            Some(ext) if !ext.is_null() => Some(serde_json::to_string(ext)?),
            _ => None,
        };
        Ok(SendRequest {
            from: self.sender.as_deref(),
            to: &self.receivers,
            kind: body.kind(),
            body: body.encode(base_url)?,
            sync_device: self.sync_device,
            route_type: self.online_only.then_some(ROUTE_ONLINE),
            ext,
        })
    }
}

const ROUTE_ONLINE: &str = "ROUTE_ONLINE";

#[derive(Debug, Serialize)]
pub(crate) struct SendRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<&'a str>,
    pub to: &'a [String],
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub body: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub sync_device: bool,
    #[serde(rename = "routetype", skip_serializing_if = "Option::is_none")]
    pub route_type: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
}
