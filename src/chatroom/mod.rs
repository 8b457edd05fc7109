//! Chatrooms, their super admins and members.

mod types;

use std::sync::Arc;

use serde_json::json;

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::roster::{Roster, UserList, action_succeeded};
use crate::transport::Body;
use crate::types::{ActionResult, Data, Mute, MuteResult, Page, PageQuery, check_batch, seg, segs};

pub use types::{
    Chatroom, ChatroomAffiliation, ChatroomUpdate, ChatroomUpdateResult, ListedChatroom,
    NewChatroom,
};
use types::{CreatedChatroom, DeletedChatroom, SuperAdminListing};

const PREFIX: &str = "/chatrooms";
const MAX_GET: usize = 100;
const MAX_ADD_MEMBERS: usize = 60;
const MAX_REMOVE_MEMBERS: usize = 100;
const MAX_USER_LIST: usize = 60;

#[derive(Clone)]
pub struct ChatroomApi {
    dispatcher: Arc<Dispatcher>,
}

impl ChatroomApi {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn roster<'a>(&'a self, id: &'a str) -> Roster<'a> {
        Roster::new(&self.dispatcher, PREFIX, id)
    }

    /// Super admins are the only users allowed to create chatrooms from a client.
    pub async fn add_super_admin(&self, username: &str) -> Result<bool, Error> {
        let reply = self
            .dispatcher
            .post(
                "/chatrooms/super_admin",
                Body::Json(json!({ "superadmin": username })),
            )
            .await?;
        action_succeeded(&reply)
    }

    pub async fn revoke_super_admin(&self, username: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(
                &format!("/chatrooms/super_admin/{}", seg(username)),
                Body::Empty,
            )
            .await?;
        Ok(())
    }

    pub async fn fetch_super_admins(&self, query: PageQuery) -> Result<Page<String>, Error> {
        let reply = self
            .dispatcher
            .get("/chatrooms/super_admin", Body::Query(query.pairs()))
            .await?;
        let listing: SuperAdminListing = reply.json()?;
        Ok(Page {
            has_more: query.page_size > 0 && listing.count >= query.page_size as usize,
            list: listing.data,
            cursor: None,
        })
    }

    pub async fn get_all_chatrooms(&self) -> Result<Vec<ListedChatroom>, Error> {
        let reply = self.dispatcher.get(PREFIX, Body::Empty).await?;
        Ok(reply.json::<Data<Vec<ListedChatroom>>>()?.data)
    }

    /// Details of up to 100 chatrooms.
    pub async fn get_chatrooms(&self, ids: &[String]) -> Result<Vec<Chatroom>, Error> {
        if !check_batch("chatrooms", ids.len(), MAX_GET)? {
            return Ok(Vec::new());
        }
        let reply = self
            .dispatcher
            .get(&format!("{}/{}", PREFIX, segs(ids)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Vec<Chatroom>>>()?.data)
    }

    pub async fn get_chatroom(&self, id: &str) -> Result<Chatroom, Error> {
        self.get_chatrooms(&[id.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or(Error::MissingData("chatroom"))
    }

    /// Returns the new chatroom id.
    pub async fn create_chatroom(&self, chatroom: &NewChatroom) -> Result<String, Error> {
        let reply = self.dispatcher.post(PREFIX, Body::json(chatroom)?).await?;
        Ok(reply.json::<Data<CreatedChatroom>>()?.data.id)
    }

    pub async fn update_chatroom(
        &self,
        id: &str,
        update: &ChatroomUpdate,
    ) -> Result<ChatroomUpdateResult, Error> {
        let reply = self
            .dispatcher
            .put(&format!("{}/{}", PREFIX, seg(id)), Body::json(update)?)
            .await?;
        Ok(reply
            .json::<Data<Option<ChatroomUpdateResult>>>()?
            .data
            .unwrap_or_default())
    }

    pub async fn delete_chatroom(&self, id: &str) -> Result<bool, Error> {
        let reply = self
            .dispatcher
            .delete(&format!("{}/{}", PREFIX, seg(id)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<DeletedChatroom>>()?.data.success)
    }

    pub async fn get_announcement(&self, id: &str) -> Result<String, Error> {
        self.roster(id).announcement().await
    }

    pub async fn update_announcement(&self, id: &str, announcement: &str) -> Result<(), Error> {
        self.roster(id).update_announcement(announcement).await
    }

    pub async fn fetch_members(&self, id: &str, query: PageQuery) -> Result<Page<String>, Error> {
        self.roster(id).members(query).await
    }

    pub async fn add_member(&self, id: &str, username: &str) -> Result<bool, Error> {
        let reply = self.roster(id).add_member(username).await?;
        action_succeeded(&reply)
    }

    /// Adds up to 60 members and returns those newly added.
    pub async fn add_members(&self, id: &str, usernames: &[String]) -> Result<Vec<String>, Error> {
        self.roster(id).add_members(usernames, MAX_ADD_MEMBERS).await
    }

    pub async fn remove_member(&self, id: &str, username: &str) -> Result<bool, Error> {
        let results = self
            .roster(id)
            .remove_members(&[username.to_string()], MAX_REMOVE_MEMBERS)
            .await?;
        first_result(results)
    }

    /// Removes up to 100 members.
    pub async fn remove_members(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<ActionResult>, Error> {
        self.roster(id)
            .remove_members(usernames, MAX_REMOVE_MEMBERS)
            .await
    }

    pub async fn get_admins(&self, id: &str) -> Result<Vec<String>, Error> {
        self.roster(id).admins().await
    }

    pub async fn add_admin(&self, id: &str, username: &str) -> Result<bool, Error> {
        let reply = self.roster(id).add_admin(username).await?;
        action_succeeded(&reply)
    }

    pub async fn remove_admin(&self, id: &str, username: &str) -> Result<bool, Error> {
        let reply = self.roster(id).remove_admin(username).await?;
        action_succeeded(&reply)
    }

    pub async fn get_blacklist(&self, id: &str) -> Result<Vec<String>, Error> {
        self.roster(id).list(UserList::Blocks).await
    }

    pub async fn add_blacklist(&self, id: &str, username: &str) -> Result<bool, Error> {
        let reply = self.roster(id).add_to(UserList::Blocks, username).await?;
        action_succeeded(&reply)
    }

    pub async fn add_blacklists(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<ActionResult>, Error> {
        self.roster(id)
            .add_many_to(UserList::Blocks, usernames, MAX_USER_LIST)
            .await
    }

    pub async fn remove_blacklist(&self, id: &str, username: &str) -> Result<bool, Error> {
        let results = self
            .roster(id)
            .remove_from(UserList::Blocks, &[username.to_string()], MAX_USER_LIST)
            .await?;
        first_result(results)
    }

    pub async fn remove_blacklists(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<ActionResult>, Error> {
        self.roster(id)
            .remove_from(UserList::Blocks, usernames, MAX_USER_LIST)
            .await
    }

    pub async fn get_whitelist(&self, id: &str) -> Result<Vec<String>, Error> {
        self.roster(id).list(UserList::White).await
    }

    pub async fn add_whitelist(&self, id: &str, username: &str) -> Result<bool, Error> {
        let reply = self.roster(id).add_to(UserList::White, username).await?;
        action_succeeded(&reply)
    }

    pub async fn add_whitelists(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<ActionResult>, Error> {
        self.roster(id)
            .add_many_to(UserList::White, usernames, MAX_USER_LIST)
            .await
    }

    pub async fn remove_whitelist(&self, id: &str, username: &str) -> Result<bool, Error> {
        let results = self
            .roster(id)
            .remove_from(UserList::White, &[username.to_string()], MAX_USER_LIST)
            .await?;
        first_result(results)
    }

    pub async fn remove_whitelists(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<ActionResult>, Error> {
        self.roster(id)
            .remove_from(UserList::White, usernames, MAX_USER_LIST)
            .await
    }

    pub async fn get_mutes(&self, id: &str) -> Result<Vec<Mute>, Error> {
        self.roster(id).mutes().await
    }

    /// `duration` is in milliseconds; `-1` mutes permanently.
    pub async fn add_mute(&self, id: &str, duration: i64, username: &str) -> Result<bool, Error> {
        let results = self
            .roster(id)
            .add_mutes(duration, &[username.to_string()])
            .await?;
        results
            .first()
            .map(|r| r.result)
            .ok_or(Error::MissingData("mute result"))
    }

    pub async fn add_mutes(
        &self,
        id: &str,
        duration: i64,
        usernames: &[String],
    ) -> Result<Vec<MuteResult>, Error> {
        self.roster(id).add_mutes(duration, usernames).await
    }

    pub async fn remove_mute(&self, id: &str, username: &str) -> Result<bool, Error> {
        let results = self
            .roster(id)
            .remove_mutes(&[username.to_string()])
            .await?;
        results
            .first()
            .map(|r| r.result)
            .ok_or(Error::MissingData("mute result"))
    }

    pub async fn remove_mutes(
        &self,
        id: &str,
        usernames: &[String],
    ) -> Result<Vec<MuteResult>, Error> {
        self.roster(id).remove_mutes(usernames).await
    }

    pub async fn mute_all(&self, id: &str) -> Result<(), Error> {
        self.roster(id).mute_all().await
    }

    pub async fn unmute_all(&self, id: &str) -> Result<(), Error> {
        self.roster(id).unmute_all().await
    }
}

fn first_result(results: Vec<ActionResult>) -> Result<bool, Error> {
    results
        .first()
        .map(|r| r.result)
        .ok_or(Error::MissingData("action result"))
}
