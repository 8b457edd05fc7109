use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::Error;

const NOTIFICATION_IGNORE_PREFIX: &str = "notification_ignore_";

/// Account to register.
#[derive(Clone, Debug, Serialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            nickname: None,
        }
    }

    pub fn nickname(mut self, nickname: impl Into<String>) -> Self {
        self.nickname = Some(nickname.into());
        self
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct UserEntity {
    pub uuid: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub created: i64,
    pub modified: i64,
    pub username: String,
    pub activated: bool,
    pub nickname: String,
    pub notification_display_style: i32,
    pub notification_no_disturbing: bool,
    pub notification_no_disturbing_start: String,
    pub notification_no_disturbing_end: String,
    /// Groups whose offline push the user ignores, collected from
    /// `notification_ignore_<groupId>` keys.
    #[serde(skip)]
    pub notification_ignore_groups: Vec<String>,
    pub notifier_name: String,
    pub device_token: String,
}

impl UserEntity {
    pub(crate) fn from_map(map: Map<String, Value>) -> Result<Self, Error> {
        let mut ignored: Vec<String> = map
            .keys()
            .filter_map(|k| k.strip_prefix(NOTIFICATION_IGNORE_PREFIX))
            .filter(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
            .map(str::to_string)
            .collect();
        ignored.sort();
        let mut entity: UserEntity = serde_json::from_value(Value::Object(map))?;
        entity.notification_ignore_groups = ignored;
        Ok(entity)
    }
}

/// Global mute durations in seconds. `0` lifts the mute, `-1` mutes permanently.
#[derive(Clone, Debug, Default, Serialize)]
pub struct UserMutes {
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groupchat: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chatroom: Option<i64>,
}

impl UserMutes {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuteState {
    #[serde(alias = "userid")]
    pub username: String,
    pub chat: i64,
    pub groupchat: i64,
    pub chatroom: i64,
    pub unixtime: i64,
}

#[derive(Clone, Debug, Default)]
pub struct MutesPage {
    pub list: Vec<MuteState>,
    pub has_more: bool,
    pub unixtime: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MutesListing {
    #[serde(default)]
    pub data: Vec<MuteState>,
    #[serde(default)]
    pub unixtime: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DisconnectResult {
    #[serde(default)]
    pub result: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct Usernames<'a> {
    pub usernames: &'a [String],
}

#[derive(Debug, Serialize)]
pub(crate) struct MetadataQuery<'a> {
    pub properties: &'a [String],
    pub targets: &'a [String],
}

pub type Metadata = HashMap<String, String>;

/// Offline push policy for one conversation, or app-wide when targeting the user itself.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct NoDisturbing {
    /// `DEFAULT`, `ALL`, `AT` or `NONE`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `HH:MM-HH:MM`.
    #[serde(rename = "ignoreInterval")]
    pub ignore_interval: String,
    /// Milliseconds, at most seven days.
    #[serde(rename = "ignoreDuration")]
    pub ignore_duration: i64,
}

/// Conversation kind addressed by a targeted push setting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConversationKind {
    User,
    ChatGroup,
}

impl ConversationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConversationKind::User => "user",
            ConversationKind::ChatGroup => "chatgroup",
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct PushLanguage {
    #[serde(default)]
    pub language: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct JoinedChatroom {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct JoinedGroup {
    #[serde(rename = "groupid")]
    pub id: String,
    #[serde(rename = "groupname")]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_collects_ignored_groups() {
        let value = serde_json::json!({
            "uuid": "u-1",
            "type": "user",
            "username": "alice",
            "activated": true,
            "notification_ignore_63112447328257": true,
            "notification_ignore_1001": true,
            "notification_ignore_abc": true,
        });
        let Value::Object(map) = value else {
            unreachable!()
        };
        let entity = UserEntity::from_map(map).unwrap();
        assert_eq!(entity.username, "alice");
        assert_eq!(entity.kind, "user");
        assert!(entity.activated);
        assert_eq!(
            entity.notification_ignore_groups,
            vec!["1001".to_string(), "63112447328257".to_string()]
        );
    }

    #[test]
    fn mutes_omit_unset_durations() {
        let mut mutes = UserMutes::new("bob");
        mutes.chat = Some(-1);
        let json = serde_json::to_value(&mutes).unwrap();
        assert_eq!(json, serde_json::json!({"username": "bob", "chat": -1}));
    }
}
