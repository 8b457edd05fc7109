use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// One page of a paginated listing.
///
/// Cursor-paginated endpoints report `has_more` when the platform returned a cursor;
/// page-number endpoints report it when the page came back full.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Page<T> {
    pub list: Vec<T>,
    pub has_more: bool,
    pub cursor: Option<String>,
}

impl<T> Page<T> {
    pub(crate) fn from_cursor(list: Vec<T>, cursor: Option<String>) -> Self {
        let cursor = cursor.filter(|c| !c.is_empty());
        Self {
            list,
            has_more: cursor.is_some(),
            cursor,
        }
    }

    pub(crate) fn from_page_size(list: Vec<T>, page_size: u32) -> Self {
        let has_more = page_size > 0 && list.len() >= page_size as usize;
        Self {
            list,
            has_more,
            cursor: None,
        }
    }
}

/// `{"data": ...}` wrapper most endpoints answer with.
#[derive(Debug, Deserialize)]
pub(crate) struct Data<T> {
    pub data: T,
}

/// `{"entities": [...]}` wrapper of user-style endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct Entities<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    #[serde(default)]
    pub cursor: Option<String>,
}

/// `{"entities": [...], "properties": {"cursor": ...}}` wrapper of thread listings.
#[derive(Debug, Deserialize)]
pub(crate) struct CursorEntities<T> {
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
    #[serde(default)]
    pub properties: CursorProperties,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CursorProperties {
    #[serde(default)]
    pub cursor: Option<String>,
}

/// Message thread inside a group.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Thread {
    pub id: String,
    pub name: String,
    pub owner: String,
    #[serde(rename = "msgId")]
    pub msg_id: String,
    #[serde(rename = "groupId")]
    pub group_id: String,
    pub created: i64,
}

/// Per-user result of a membership or list change on a group or chatroom.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ActionResult {
    pub result: bool,
    pub action: String,
    #[serde(alias = "groupid")]
    pub id: String,
    pub user: String,
    pub reason: String,
}

/// Muted member and the mute expiry in milliseconds.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Mute {
    #[serde(alias = "user")]
    pub username: String,
    pub expire: i64,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct MuteResult {
    pub result: bool,
    #[serde(rename = "user")]
    pub username: String,
    pub expire: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Affiliation {
    pub owner: Option<String>,
    pub member: Option<String>,
}

/// Percent-encodes one path segment.
pub(crate) fn seg(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Percent-encodes each value and joins them with `,` for batch endpoints.
pub(crate) fn segs<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| urlencoding::encode(v.as_ref()).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

/// Rejects batches above the platform limit. Returns `false` for an empty batch, which
/// callers treat as a no-op.
pub(crate) fn check_batch(what: &str, len: usize, max: usize) -> Result<bool, Error> {
    if len > max {
        return Err(Error::InvalidArgument(format!(
            "the number of {} exceeds the upper limit ({} > {})",
            what, len, max
        )));
    }
    Ok(len > 0)
}

/// Cursor/limit/sort query used by cursor-paginated listings.
#[derive(Clone, Debug, Default)]
pub struct CursorQuery {
    pub limit: Option<u32>,
    pub cursor: Option<String>,
    pub sort: Option<String>,
}

impl CursorQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            ..Default::default()
        }
    }

    pub fn cursor(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }

    pub fn sort(mut self, sort: impl Into<String>) -> Self {
        self.sort = Some(sort.into());
        self
    }

    pub(crate) fn pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(cursor) = self.cursor.as_deref().filter(|c| !c.is_empty()) {
            pairs.push(("cursor".to_string(), cursor.to_string()));
        }
        if let Some(sort) = self.sort.as_deref().filter(|s| !s.is_empty()) {
            pairs.push(("sort".to_string(), sort.to_string()));
        }
        pairs
    }
}

/// Page-number query used by page-number listings.
#[derive(Clone, Copy, Debug)]
pub struct PageQuery {
    pub page_num: u32,
    pub page_size: u32,
}

impl PageQuery {
    pub fn new(page_num: u32, page_size: u32) -> Self {
        Self {
            page_num,
            page_size,
        }
    }

    pub(crate) fn pairs(&self) -> Vec<(String, String)> {
        vec![
            ("pagenum".to_string(), self.page_num.to_string()),
            ("pagesize".to_string(), self.page_size.to_string()),
        ]
    }
}
