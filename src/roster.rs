//! Member management shared by groups and chatrooms. Both expose the same endpoints
//! under their own collection prefix.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::dispatch::{Dispatcher, Reply};
use crate::errors::Error;
use crate::transport::Body;
use crate::types::{
    ActionResult, Affiliation, Data, Mute, MuteResult, Page, PageQuery, check_batch, seg, segs,
};

#[derive(Clone, Copy, Debug)]
pub(crate) enum UserList {
    Blocks,
    White,
}

impl UserList {
    fn segment(self) -> &'static str {
        match self {
            UserList::Blocks => "blocks/users",
            UserList::White => "white/users",
        }
    }

    fn label(self) -> &'static str {
        match self {
            UserList::Blocks => "blacklisted users",
            UserList::White => "whitelisted users",
        }
    }
}

pub(crate) struct Roster<'a> {
    dispatcher: &'a Dispatcher,
    prefix: &'static str,
    id: &'a str,
}

impl<'a> Roster<'a> {
    pub(crate) fn new(dispatcher: &'a Dispatcher, prefix: &'static str, id: &'a str) -> Self {
        Self {
            dispatcher,
            prefix,
            id,
        }
    }

    fn path(&self, tail: &str) -> String {
        if tail.is_empty() {
            format!("{}/{}", self.prefix, seg(self.id))
        } else {
            format!("{}/{}/{}", self.prefix, seg(self.id), tail)
        }
    }

    pub(crate) async fn announcement(&self) -> Result<String, Error> {
        #[derive(serde::Deserialize)]
        struct Announcement {
            #[serde(default)]
            announcement: String,
        }
        let reply = self
            .dispatcher
            .get(&self.path("announcement"), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Announcement>>()?.data.announcement)
    }

    pub(crate) async fn update_announcement(&self, announcement: &str) -> Result<(), Error> {
        self.dispatcher
            .post(
                &self.path("announcement"),
                Body::Json(json!({ "announcement": announcement })),
            )
            .await?;
        Ok(())
    }

    /// Owner and members flattened into one list.
    pub(crate) async fn members(&self, query: PageQuery) -> Result<Page<String>, Error> {
        let reply = self
            .dispatcher
            .get(&self.path("users"), Body::Query(query.pairs()))
            .await?;
        let affiliations = reply.json::<Data<Vec<Affiliation>>>()?.data;
        let full = query.page_size > 0 && affiliations.len() >= query.page_size as usize;
        let list = affiliations
            .into_iter()
            .flat_map(|a| [a.owner, a.member])
            .flatten()
            .filter(|name| !name.is_empty())
            .collect();
        Ok(Page {
            list,
            has_more: full,
            cursor: None,
        })
    }

    pub(crate) async fn add_member(&self, username: &str) -> Result<Reply, Error> {
        self.dispatcher
            .post(&self.path(&format!("users/{}", seg(username))), Body::Empty)
            .await
    }

    /// Returns the usernames that were newly added.
    pub(crate) async fn add_members(
        &self,
        usernames: &[String],
        max: usize,
    ) -> Result<Vec<String>, Error> {
        #[derive(serde::Deserialize)]
        struct Added {
            #[serde(default)]
            newmembers: Vec<String>,
        }
        if !check_batch("members", usernames.len(), max)? {
            return Ok(Vec::new());
        }
        let reply = self
            .dispatcher
            .post(
                &self.path("users"),
                Body::Json(json!({ "usernames": usernames })),
            )
            .await?;
        Ok(reply.json::<Data<Added>>()?.data.newmembers)
    }

    pub(crate) async fn remove_members(
        &self,
        usernames: &[String],
        max: usize,
    ) -> Result<Vec<ActionResult>, Error> {
        if !check_batch("members", usernames.len(), max)? {
            return Ok(Vec::new());
        }
        let path = self.path(&format!("users/{}", segs(usernames)));
        self.delete_many(&path, usernames.len()).await
    }

    pub(crate) async fn admins(&self) -> Result<Vec<String>, Error> {
        let reply = self.dispatcher.get(&self.path("admin"), Body::Empty).await?;
        Ok(reply.json::<Data<Vec<String>>>()?.data)
    }

    pub(crate) async fn add_admin(&self, username: &str) -> Result<Reply, Error> {
        self.dispatcher
            .post(
                &self.path("admin"),
                Body::Json(json!({ "newadmin": username })),
            )
            .await
    }

    pub(crate) async fn remove_admin(&self, username: &str) -> Result<Reply, Error> {
        self.dispatcher
            .delete(&self.path(&format!("admin/{}", seg(username))), Body::Empty)
            .await
    }

    pub(crate) async fn list(&self, list: UserList) -> Result<Vec<String>, Error> {
        let reply = self
            .dispatcher
            .get(&self.path(list.segment()), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Vec<String>>>()?.data)
    }

    pub(crate) async fn add_to(&self, list: UserList, username: &str) -> Result<Reply, Error> {
        let path = self.path(&format!("{}/{}", list.segment(), seg(username)));
        self.dispatcher.post(&path, Body::Empty).await
    }

    pub(crate) async fn add_many_to(
        &self,
        list: UserList,
        usernames: &[String],
        max: usize,
    ) -> Result<Vec<ActionResult>, Error> {
        if !check_batch(list.label(), usernames.len(), max)? {
            return Ok(Vec::new());
        }
        let reply = self
            .dispatcher
            .post(
                &self.path(list.segment()),
                Body::Json(json!({ "usernames": usernames })),
            )
            .await?;
        Ok(reply.json::<Data<Vec<ActionResult>>>()?.data)
    }

    pub(crate) async fn remove_from(
        &self,
        list: UserList,
        usernames: &[String],
        max: usize,
    ) -> Result<Vec<ActionResult>, Error> {
        if !check_batch(list.label(), usernames.len(), max)? {
            return Ok(Vec::new());
        }
        let path = self.path(&format!("{}/{}", list.segment(), segs(usernames)));
        self.delete_many(&path, usernames.len()).await
    }

    pub(crate) async fn mutes(&self) -> Result<Vec<Mute>, Error> {
        let reply = self.dispatcher.get(&self.path("mute"), Body::Empty).await?;
        Ok(reply.json::<Data<Vec<Mute>>>()?.data)
    }

    /// `duration` is in milliseconds; `-1` mutes permanently.
    pub(crate) async fn add_mutes(
        &self,
        duration: i64,
        usernames: &[String],
    ) -> Result<Vec<MuteResult>, Error> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let reply = self
            .dispatcher
            .post(
                &self.path("mute"),
                Body::Json(json!({ "mute_duration": duration, "usernames": usernames })),
            )
            .await?;
        Ok(reply.json::<Data<Vec<MuteResult>>>()?.data)
    }

    pub(crate) async fn remove_mutes(&self, usernames: &[String]) -> Result<Vec<MuteResult>, Error> {
        if usernames.is_empty() {
            return Ok(Vec::new());
        }
        let reply = self
            .dispatcher
            .delete(&self.path(&format!("mute/{}", segs(usernames))), Body::Empty)
            .await?;
        decode_one_or_many(&reply, usernames.len())
    }

    pub(crate) async fn mute_all(&self) -> Result<(), Error> {
        self.dispatcher.post(&self.path("ban"), Body::Empty).await?;
        Ok(())
    }

    pub(crate) async fn unmute_all(&self) -> Result<(), Error> {
        self.dispatcher
            .delete(&self.path("ban"), Body::Empty)
            .await?;
        Ok(())
    }

    async fn delete_many(&self, path: &str, count: usize) -> Result<Vec<ActionResult>, Error> {
        let reply = self.dispatcher.delete(path, Body::Empty).await?;
        decode_one_or_many(&reply, count)
    }
}

/// Batch endpoints answer a single target with an object and several with an array.
fn decode_one_or_many<T: DeserializeOwned>(reply: &Reply, count: usize) -> Result<Vec<T>, Error> {
    if count > 1 {
        Ok(reply.json::<Data<Vec<T>>>()?.data)
    } else {
        Ok(vec![reply.json::<Data<T>>()?.data])
    }
}

/// Reads `data.result` from a single-target action, which the platform reports either as
/// a boolean or as the string `"success"`.
pub(crate) fn action_succeeded(reply: &Reply) -> Result<bool, Error> {
    #[derive(serde::Deserialize)]
    struct Outcome {
        #[serde(default)]
        result: serde_json::Value,
    }
    let outcome = reply.json::<Data<Outcome>>()?.data;
    Ok(match outcome.result {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::String(s) => s == "success",
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Transport;
    use std::sync::Arc;

    #[test]
    fn paths_encode_the_collection_id() {
        let transport = Arc::new(Transport::with_client(
            reqwest::Client::new(),
            "http://localhost/org/app",
        ));
        let dispatcher = Dispatcher::new(transport, None);
        let roster = Roster::new(&dispatcher, "/chatgroups", "g 1");
        assert_eq!(roster.path(""), "/chatgroups/g%201");
        assert_eq!(roster.path("users"), "/chatgroups/g%201/users");
    }
}
