use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Group {
    pub id: String,
    pub name: String,
    pub description: String,
    pub public: bool,
    #[serde(rename = "maxusers")]
    pub max_users: i64,
    #[serde(rename = "allowinvites")]
    pub allow_invites: bool,
    #[serde(alias = "membersonly")]
    pub members_only: bool,
    pub invite_need_confirm: bool,
    pub affiliations_count: i64,
    pub owner: String,
    pub custom: String,
    pub mute: bool,
    pub created: i64,
    pub permission: String,
}

/// Parameters of a new group. `owner` is not listed in `members`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NewGroup {
    #[serde(rename = "groupname")]
    pub name: String,
    #[serde(rename = "desc")]
    pub description: String,
    pub public: bool,
    #[serde(rename = "maxusers", skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,
    #[serde(rename = "allowinvites")]
    pub allow_invites: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub members_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invite_need_confirm: Option<bool>,
    pub owner: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl NewGroup {
    pub fn new(name: impl Into<String>, description: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            owner: owner.into(),
            ..Default::default()
        }
    }
}

/// Only the fields that are set are changed.
#[derive(Clone, Debug, Default, Serialize)]
pub struct GroupUpdate {
    #[serde(rename = "groupname", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "maxusers", skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,
    #[serde(rename = "allowinvites", skip_serializing_if = "Option::is_none")]
    pub allow_invites: Option<bool>,
    #[serde(rename = "membersonly", skip_serializing_if = "Option::is_none")]
    pub members_only: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

/// Which fields an update actually changed.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupUpdateResult {
    #[serde(rename = "groupname")]
    pub name: bool,
    pub description: bool,
    #[serde(rename = "maxusers")]
    pub max_users: bool,
    #[serde(rename = "membersonly")]
    pub members_only: bool,
    #[serde(rename = "allowinvites")]
    pub allow_invites: bool,
    pub custom: bool,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListedGroup {
    #[serde(rename = "groupid")]
    pub id: String,
    #[serde(rename = "groupname")]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub owner: String,
    pub affiliations: i64,
    pub created: i64,
    #[serde(rename = "lastModified")]
    pub last_modified: i64,
    pub disabled: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GroupListing {
    #[serde(default)]
    pub data: Vec<ListedGroup>,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ShareFile {
    pub file_id: String,
    pub file_name: String,
    pub file_owner: String,
    pub file_size: i64,
    pub created: i64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedGroup {
    #[serde(rename = "groupid")]
    pub id: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewThread {
    pub group_id: String,
    pub name: String,
    pub msg_id: String,
    pub owner: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedThread {
    pub thread_id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ThreadId {
    pub id: String,
}
