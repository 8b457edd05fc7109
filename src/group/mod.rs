//! Groups, their members, shared files and threads.

mod types;

use std::sync::Arc;

use serde_json::json;

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::roster::{Roster, UserList};
use crate::transport::Body;
use crate::types::{
    ActionResult, CursorEntities, CursorQuery, Data, Mute, MuteResult, Page, PageQuery, Thread,
    seg,
};

pub use types::{
    Group, GroupUpdate, GroupUpdateResult, ListedGroup, NewGroup, NewThread, ShareFile,
};
use types::{CreatedGroup, CreatedThread, GroupListing, ThreadId};

const PREFIX: &str = "/chatgroups";
const MAX_ADD_MEMBERS: usize = 60;
const MAX_REMOVE_MEMBERS: usize = 100;
const MAX_USER_LIST: usize = 60;

#[derive(Clone)]
pub struct GroupApi {
    dispatcher: Arc<Dispatcher>,
}

impl GroupApi {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn roster<'a>(&'a self, id: &'a str) -> Roster<'a> {
        Roster::new(&self.dispatcher, PREFIX, id)
    }

    pub async fn get_group(&self, id: &str) -> Result<Group, Error> {
        let reply = self
            .dispatcher
            .get(&format!("{}/{}", PREFIX, seg(id)), Body::Empty)
            .await?;
        reply
            .json::<Data<Vec<Group>>>()?
            .data
            .into_iter()
            .next()
            .ok_or(Error::MissingData("group"))
    }

    /// Returns the new group id.
    pub async fn create_group(&self, group: &NewGroup) -> Result<String, Error> {
        let reply = self.dispatcher.post(PREFIX, Body::json(group)?).await?;
        Ok(reply.json::<Data<CreatedGroup>>()?.data.id)
    }

    pub async fn update_group(
        &self,
        id: &str,
        update: &GroupUpdate,
    ) -> Result<GroupUpdateResult, Error> {
        let reply = self
            .dispatcher
            .put(&format!("{}/{}", PREFIX, seg(id)), Body::json(update)?)
            .await?;
        Ok(reply
            .json::<Data<Option<GroupUpdateResult>>>()?
            .data
            .unwrap_or_default())
    }

    /// Also deletes every thread of the group.
    pub async fn delete_group(&self, id: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&format!("{}/{}", PREFIX, seg(id)), Body::Empty)
            .await?;
        Ok(())
    }

    pub async fn get_all_groups(&self) -> Result<Vec<ListedGroup>, Error> {
        let reply = self.dispatcher.get(PREFIX, Body::Empty).await?;
        Ok(reply.json::<Data<Vec<ListedGroup>>>()?.data)
    }

    pub async fn fetch_groups(&self, query: &CursorQuery) -> Result<Page<ListedGroup>, Error> {
        let reply = self
            .dispatcher
            .get(PREFIX, Body::Query(query.pairs()))
            .await?;
        let listing: GroupListing = reply.json()?;
        Ok(Page::from_cursor(listing.data, listing.cursor))
    }

    pub async fn get_announcement(&self, id: &str) -> Result<String, Error> {
        self.roster(id).announcement().await
    }

    pub async fn update_announcement(&self, id: &str, announcement: &str) -> Result<(), Error> {
        self.roster(id).update_announcement(announcement).await
    }

    pub async fn get_all_share_files(&self, id: &str) -> Result<Vec<ShareFile>, Error> {
        let reply = self
            .dispatcher
            .get(&format!("{}/{}/share_files", PREFIX, seg(id)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Vec<ShareFile>>>()?.data)
    }

    pub async fn fetch_share_files(
        &self,
        id: &str,
        query: PageQuery,
    ) -> Result<Page<ShareFile>, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("{}/{}/share_files", PREFIX, seg(id)),
                Body::Query(query.pairs()),
            )
            .await?;
        let files = reply.json::<Data<Vec<ShareFile>>>()?.data;
        Ok(Page::from_page_size(files, query.page_size))
    }

    pub async fn get_share_file(&self, id: &str, file_id: &str) -> Result<ShareFile, Error> {
        let reply = self
            .dispatcher
            .get(&share_file_path(id, file_id), Body::Empty)
            .await?;
        reply
            .json::<Data<Option<ShareFile>>>()?
            .data
            .ok_or(Error::MissingData("share file"))
    }

    pub async fn delete_share_file(&self, id: &str, file_id: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&share_file_path(id, file_id), Body::Empty)
            .await?;
        Ok(())
    }

    pub async fn fetch_members(&self, id: &str, query: PageQuery) -> Result<Page<String>, Error> {
        self.roster(id).members(query).await
    }

    pub async fn add_member(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id).add_member(username).await?;
        Ok(())
    }

    /// Adds up to 60 members and returns those newly added.
    pub async fn add_members(&self, id: &str, usernames: &[String]) -> Result<Vec<String>, Error> {
        self.roster(id).add_members(usernames, MAX_ADD_MEMBERS).await
    }

    pub async fn remove_member(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id)
            .remove_members(&[username.to_string()], MAX_REMOVE_MEMBERS)
            .await?;
        Ok(())
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

    pub async fn add_admin(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id).add_admin(username).await?;
        Ok(())
    }

    pub async fn remove_admin(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id).remove_admin(username).await?;
        Ok(())
    }

    pub async fn transfer_owner(&self, id: &str, new_owner: &str) -> Result<(), Error> {
        self.dispatcher
            .put(
                &format!("{}/{}", PREFIX, seg(id)),
                Body::Json(json!({ "newowner": new_owner })),
            )
            .await?;
        Ok(())
    }

    pub async fn get_blacklist(&self, id: &str) -> Result<Vec<String>, Error> {
        self.roster(id).list(UserList::Blocks).await
    }

    pub async fn add_blacklist(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id).add_to(UserList::Blocks, username).await?;
        Ok(())
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

    pub async fn remove_blacklist(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id)
            .remove_from(UserList::Blocks, &[username.to_string()], MAX_USER_LIST)
            .await?;
        Ok(())
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

    pub async fn add_whitelist(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id).add_to(UserList::White, username).await?;
        Ok(())
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

    pub async fn remove_whitelist(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id)
            .remove_from(UserList::White, &[username.to_string()], MAX_USER_LIST)
            .await?;
        Ok(())
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
    pub async fn add_mute(&self, id: &str, duration: i64, username: &str) -> Result<(), Error> {
        self.roster(id)
            .add_mutes(duration, &[username.to_string()])
            .await?;
        Ok(())
    }

    pub async fn add_mutes(
        &self,
        id: &str,
        duration: i64,
        usernames: &[String],
    ) -> Result<Vec<MuteResult>, Error> {
        self.roster(id).add_mutes(duration, usernames).await
    }

    pub async fn remove_mute(&self, id: &str, username: &str) -> Result<(), Error> {
        self.roster(id)
            .remove_mutes(&[username.to_string()])
            .await?;
        Ok(())
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

    /// Returns the new thread id.
    pub async fn create_thread(&self, thread: &NewThread) -> Result<String, Error> {
        let reply = self.dispatcher.post("/thread", Body::json(thread)?).await?;
        Ok(reply.json::<Data<CreatedThread>>()?.data.thread_id)
    }

    pub async fn update_thread(&self, thread_id: &str, name: &str) -> Result<(), Error> {
        self.dispatcher
            .put(
                &format!("/thread/{}", seg(thread_id)),
                Body::Json(json!({ "name": name })),
            )
            .await?;
        Ok(())
    }

    pub async fn delete_thread(&self, thread_id: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&format!("/thread/{}", seg(thread_id)), Body::Empty)
            .await?;
        Ok(())
    }

    /// Lists thread ids across the app.
    pub async fn fetch_threads(&self, query: &CursorQuery) -> Result<Page<String>, Error> {
        let reply = self
            .dispatcher
            .get("/thread", Body::Query(query.pairs()))
            .await?;
        let resp: CursorEntities<ThreadId> = reply.json()?;
        let ids = resp.entities.into_iter().map(|t| t.id).collect();
        Ok(Page::from_cursor(ids, resp.properties.cursor))
    }

    /// Threads of `group_id` that `username` has joined.
    pub async fn fetch_user_threads(
        &self,
        group_id: &str,
        username: &str,
        query: &CursorQuery,
    ) -> Result<Page<Thread>, Error> {
        let path = format!(
            "/threads/chatgroups/{}/user/{}",
            seg(group_id),
            seg(username)
        );
        let reply = self
            .dispatcher
            .get(&path, Body::Query(query.pairs()))
            .await?;
        let resp: CursorEntities<Thread> = reply.json()?;
        Ok(Page::from_cursor(resp.entities, resp.properties.cursor))
    }
}

fn share_file_path(id: &str, file_id: &str) -> String {
    format!("{}/{}/share_files/{}", PREFIX, seg(id), seg(file_id))
}
