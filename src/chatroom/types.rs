use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ListedChatroom {
    pub id: String,
    pub name: String,
    pub owner: String,
    pub affiliations_count: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Chatroom {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "maxusers")]
    pub max_users: i64,
    pub owner: String,
    pub custom: String,
    pub affiliations_count: i64,
    #[serde(rename = "membersonly")]
    pub members_only: bool,
    #[serde(rename = "allowinvites")]
    pub allow_invites: bool,
    pub created: i64,
    pub affiliations: Vec<ChatroomAffiliation>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatroomAffiliation {
    pub owner: Option<String>,
    pub member: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize)]
pub struct NewChatroom {
    pub name: String,
    pub description: String,
    #[serde(rename = "maxusers", skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,
    pub owner: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
}

impl NewChatroom {
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
pub struct ChatroomUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "maxusers", skip_serializing_if = "Option::is_none")]
    pub max_users: Option<i64>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatroomUpdateResult {
    #[serde(alias = "groupname")]
    pub name: bool,
    pub description: bool,
    #[serde(rename = "maxusers")]
    pub max_users: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CreatedChatroom {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct DeletedChatroom {
    pub success: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct SuperAdminListing {
    pub data: Vec<String>,
    pub count: usize,
}
