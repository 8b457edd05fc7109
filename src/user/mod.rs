//! Accounts, relationships, user metadata and per-user push settings.

mod types;

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use crate::dispatch::Dispatcher;
use crate::errors::Error;
use crate::transport::Body;
use crate::types::{
    CursorEntities, CursorQuery, Data, Entities, Page, Thread, check_batch, seg,
};

pub use types::{
    ConversationKind, JoinedChatroom, JoinedGroup, Metadata, MuteState, MutesPage, NewUser,
    NoDisturbing, UserEntity, UserMutes,
};
use types::{DisconnectResult, MetadataQuery, MutesListing, PushLanguage, Usernames};

const MAX_REGISTER: usize = 60;
const MAX_STATUS_BATCH: usize = 100;
const MAX_BLACKLIST: usize = 500;
const MAX_METADATA_BATCH: usize = 100;

#[derive(Clone)]
pub struct UserApi {
    dispatcher: Arc<Dispatcher>,
}

impl UserApi {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    /// Registers up to 60 accounts in one call.
    pub async fn register_users(&self, users: &[NewUser]) -> Result<Vec<UserEntity>, Error> {
        if !check_batch("registered users", users.len(), MAX_REGISTER)? {
            return Ok(Vec::new());
        }
        let reply = self.dispatcher.post("/users", Body::json(users)?).await?;
        let resp: Entities<Map<String, Value>> = reply.json()?;
        debug!(count = resp.entities.len(), "users registered");
        resp.entities.into_iter().map(UserEntity::from_map).collect()
    }

    pub async fn get_user(&self, username: &str) -> Result<UserEntity, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/users/{}", seg(username)), Body::Empty)
            .await?;
        let resp: Entities<Map<String, Value>> = reply.json()?;
        let entity = resp
            .entities
            .into_iter()
            .next()
            .ok_or(Error::MissingData("user entity"))?;
        UserEntity::from_map(entity)
    }

    /// Lists users in creation order.
    pub async fn fetch_users(&self, query: &CursorQuery) -> Result<Page<UserEntity>, Error> {
        let reply = self
            .dispatcher
            .get("/users", Body::Query(query.pairs()))
            .await?;
        let resp: Entities<Map<String, Value>> = reply.json()?;
        let list = resp
            .entities
            .into_iter()
            .map(UserEntity::from_map)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::from_cursor(list, resp.cursor))
    }

    /// Deleting a group or chatroom owner also deletes what they own.
    pub async fn delete_user(&self, username: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&format!("/users/{}", seg(username)), Body::Empty)
            .await?;
        Ok(())
    }

    /// Deletes `limit` users picked by the platform and returns them. `0` deletes all.
    pub async fn delete_users(&self, limit: u32) -> Result<Vec<UserEntity>, Error> {
        let reply = self
            .dispatcher
            .delete("/users", Body::query([("limit", limit.to_string())]))
            .await?;
        let resp: Entities<Map<String, Value>> = reply.json()?;
        resp.entities.into_iter().map(UserEntity::from_map).collect()
    }

    pub async fn delete_all_users(&self) -> Result<Vec<UserEntity>, Error> {
        self.delete_users(0).await
    }

    pub async fn update_password(&self, username: &str, password: &str) -> Result<(), Error> {
        self.dispatcher
            .put(
                &format!("/users/{}/password", seg(username)),
                Body::Json(json!({ "newpassword": password })),
            )
            .await?;
        Ok(())
    }

    /// Returns `online` or `offline`.
    pub async fn get_online_status(&self, username: &str) -> Result<String, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/users/{}/status", seg(username)), Body::Empty)
            .await?;
        let mut resp: Data<HashMap<String, String>> = reply.json()?;
        Ok(resp.data.remove(username).unwrap_or_default())
    }

    pub async fn get_online_statuses(
        &self,
        usernames: &[String],
    ) -> Result<HashMap<String, String>, Error> {
        if !check_batch("status users", usernames.len(), MAX_STATUS_BATCH)? {
            return Ok(HashMap::new());
        }
        let reply = self
            .dispatcher
            .post("/users/batch/status", Body::json(&Usernames { usernames })?)
            .await?;
        let resp: Data<Vec<HashMap<String, String>>> = reply.json()?;
        Ok(resp.data.into_iter().flatten().collect())
    }

    pub async fn set_mutes(&self, mutes: &UserMutes) -> Result<(), Error> {
        self.dispatcher.post("/mutes", Body::json(mutes)?).await?;
        Ok(())
    }

    pub async fn get_mutes(&self, username: &str) -> Result<MuteState, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/mutes/{}", seg(username)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<MuteState>>()?.data)
    }

    /// Lists every globally muted user with the remaining mute time.
    pub async fn fetch_mutes(&self, page_num: u32, page_size: u32) -> Result<MutesPage, Error> {
        let query = Body::query([
            ("pageNum", page_num.to_string()),
            ("pageSize", page_size.to_string()),
        ]);
        let reply = self.dispatcher.get("/mutes", query).await?;
        let listing = reply.json::<Data<MutesListing>>()?.data;
        Ok(MutesPage {
            has_more: page_size > 0 && listing.data.len() >= page_size as usize,
            list: listing.data,
            unixtime: listing.unixtime,
        })
    }

    pub async fn get_offline_msg_count(&self, username: &str) -> Result<i64, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/users/{}/offline_msg_count", seg(username)),
                Body::Empty,
            )
            .await?;
        let mut resp: Data<HashMap<String, i64>> = reply.json()?;
        Ok(resp.data.remove(username).unwrap_or_default())
    }

    /// Returns `delivered` or `undelivered`.
    pub async fn get_offline_msg_status(
        &self,
        username: &str,
        msg_id: &str,
    ) -> Result<String, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!(
                    "/users/{}/offline_msg_status/{}",
                    seg(username),
                    seg(msg_id)
                ),
                Body::Empty,
            )
            .await?;
        let mut resp: Data<HashMap<String, String>> = reply.json()?;
        Ok(resp.data.remove(msg_id).unwrap_or_default())
    }

    /// Bans the account and forces it offline.
    pub async fn deactivate_user(&self, username: &str) -> Result<UserEntity, Error> {
        let reply = self
            .dispatcher
            .post(&format!("/users/{}/deactivate", seg(username)), Body::Empty)
            .await?;
        let resp: Entities<Map<String, Value>> = reply.json()?;
        let entity = resp
            .entities
            .into_iter()
            .next()
            .ok_or(Error::MissingData("user entity"))?;
        UserEntity::from_map(entity)
    }

    pub async fn activate_user(&self, username: &str) -> Result<(), Error> {
        self.dispatcher
            .post(&format!("/users/{}/activate", seg(username)), Body::Empty)
            .await?;
        Ok(())
    }

    /// Forces the user offline; they must log in again.
    pub async fn disconnect_user(&self, username: &str) -> Result<bool, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/users/{}/disconnect", seg(username)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<DisconnectResult>>()?.data.result)
    }

    pub async fn add_friend(&self, owner: &str, friend: &str) -> Result<(), Error> {
        self.dispatcher
            .post(&contact_path(owner, friend), Body::Empty)
            .await?;
        Ok(())
    }

    pub async fn remove_friend(&self, owner: &str, friend: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(&contact_path(owner, friend), Body::Empty)
            .await?;
        Ok(())
    }

    pub async fn get_friends(&self, owner: &str) -> Result<Vec<String>, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/users/{}/contacts/users", seg(owner)),
                Body::Empty,
            )
            .await?;
        Ok(reply.json::<Data<Vec<String>>>()?.data)
    }

    /// Blocks up to 500 users from messaging `owner`.
    pub async fn add_blacklist(&self, owner: &str, usernames: &[String]) -> Result<(), Error> {
        if !check_batch("blacklisted users", usernames.len(), MAX_BLACKLIST)? {
            return Ok(());
        }
        self.dispatcher
            .post(
                &format!("/users/{}/blocks/users", seg(owner)),
                Body::json(&Usernames { usernames })?,
            )
            .await?;
        Ok(())
    }

    pub async fn remove_blacklist(&self, owner: &str, blocked: &str) -> Result<(), Error> {
        self.dispatcher
            .delete(
                &format!("/users/{}/blocks/users/{}", seg(owner), seg(blocked)),
                Body::Empty,
            )
            .await?;
        Ok(())
    }

    pub async fn get_blacklist(&self, owner: &str) -> Result<Vec<String>, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/users/{}/blocks/users", seg(owner)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Vec<String>>>()?.data)
    }

    /// Sets plain-text attributes on the user. Sent form-encoded.
    pub async fn set_metadata(&self, username: &str, metadata: &Metadata) -> Result<(), Error> {
        let mut pairs: Vec<(String, String)> = metadata
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        pairs.sort();
        self.dispatcher
            .put(
                &format!("/metadata/user/{}", seg(username)),
                Body::Form(pairs),
            )
            .await?;
        Ok(())
    }

    /// Empty when the user has no attributes.
    pub async fn get_metadata(&self, username: &str) -> Result<Metadata, Error> {
        let reply = self
            .dispatcher
            .get(&format!("/metadata/user/{}", seg(username)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<Option<Metadata>>>()?.data.unwrap_or_default())
    }

    pub async fn batch_get_metadata(
        &self,
        properties: &[String],
        usernames: &[String],
    ) -> Result<HashMap<String, Metadata>, Error> {
        if properties.is_empty() {
            return Err(Error::InvalidArgument(
                "no metadata property requested".to_string(),
            ));
        }
        if !check_batch("metadata users", usernames.len(), MAX_METADATA_BATCH)? {
            return Ok(HashMap::new());
        }
        let body = Body::json(&MetadataQuery {
            properties,
            targets: usernames,
        })?;
        let reply = self.dispatcher.post("/metadata/user/get", body).await?;
        Ok(reply
            .json::<Data<Option<HashMap<String, Metadata>>>>()?
            .data
            .unwrap_or_default())
    }

    /// Succeeds even when the user had no attributes.
    pub async fn delete_metadata(&self, username: &str) -> Result<bool, Error> {
        let reply = self
            .dispatcher
            .delete(&format!("/metadata/user/{}", seg(username)), Body::Empty)
            .await?;
        Ok(reply.json::<Data<bool>>()?.data)
    }

    /// Total size in bytes of all user attributes in the app.
    pub async fn get_metadata_capacity(&self) -> Result<i64, Error> {
        let reply = self
            .dispatcher
            .get("/metadata/user/capacity", Body::Empty)
            .await?;
        Ok(reply.json::<Data<i64>>()?.data)
    }

    pub async fn set_push_nickname(&self, username: &str, nickname: &str) -> Result<(), Error> {
        self.put_user(username, json!({ "nickname": nickname })).await
    }

    /// `0` shows only "you have a new message", `1` includes the content.
    pub async fn set_push_display_style(&self, username: &str, style: i32) -> Result<(), Error> {
        self.put_user(username, json!({ "notification_display_style": style }))
            .await
    }

    /// Silences offline push between the `start` and `end` hours.
    pub async fn enable_no_disturbing(
        &self,
        username: &str,
        start: u8,
        end: u8,
    ) -> Result<(), Error> {
        if start > 24 || end > 24 {
            return Err(Error::InvalidArgument(format!(
                "no-disturbing hours must be within 0..=24, got {}-{}",
                start, end
            )));
        }
        self.put_user(
            username,
            json!({
                "notification_no_disturbing": true,
                "notification_no_disturbing_start": start.to_string(),
                "notification_no_disturbing_end": end.to_string(),
            }),
        )
        .await
    }

    pub async fn disable_no_disturbing(&self, username: &str) -> Result<(), Error> {
        self.put_user(
            username,
            json!({
                "notification_no_disturbing": false,
                "notification_no_disturbing_start": "",
                "notification_no_disturbing_end": "",
            }),
        )
        .await
    }

    /// Push policy for one conversation. Targeting the user itself sets the app-wide policy.
    pub async fn set_targeted_no_disturbing(
        &self,
        username: &str,
        kind: ConversationKind,
        key: &str,
        setting: &NoDisturbing,
    ) -> Result<(), Error> {
        self.dispatcher
            .put(
                &notification_path(username, kind, key),
                Body::json(setting)?,
            )
            .await?;
        Ok(())
    }

    pub async fn get_targeted_no_disturbing(
        &self,
        username: &str,
        kind: ConversationKind,
        key: &str,
    ) -> Result<NoDisturbing, Error> {
        let reply = self
            .dispatcher
            .get(&notification_path(username, kind, key), Body::Empty)
            .await?;
        reply
            .json::<Data<Option<NoDisturbing>>>()?
            .data
            .ok_or(Error::MissingData("push setting"))
    }

    pub async fn set_push_language(&self, username: &str, language: &str) -> Result<(), Error> {
        self.dispatcher
            .put(
                &format!("/users/{}/notification/language", seg(username)),
                Body::Json(json!({ "translationLanguage": language })),
            )
            .await?;
        Ok(())
    }

    pub async fn get_push_language(&self, username: &str) -> Result<String, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/users/{}/notification/language", seg(username)),
                Body::Empty,
            )
            .await?;
        Ok(reply.json::<Data<PushLanguage>>()?.data.language)
    }

    pub async fn get_joined_chatrooms(&self, username: &str) -> Result<Vec<JoinedChatroom>, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/users/{}/joined_chatrooms", seg(username)),
                Body::Empty,
            )
            .await?;
        Ok(reply.json::<Data<Vec<JoinedChatroom>>>()?.data)
    }

    pub async fn get_joined_groups(&self, username: &str) -> Result<Vec<JoinedGroup>, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/users/{}/joined_chatgroups", seg(username)),
                Body::Empty,
            )
            .await?;
        Ok(reply.json::<Data<Vec<JoinedGroup>>>()?.data)
    }

    pub async fn fetch_joined_threads(
        &self,
        username: &str,
        query: &CursorQuery,
    ) -> Result<Page<Thread>, Error> {
        let reply = self
            .dispatcher
            .get(
                &format!("/threads/user/{}", seg(username)),
                Body::Query(query.pairs()),
            )
            .await?;
        let resp: CursorEntities<Thread> = reply.json()?;
        Ok(Page::from_cursor(resp.entities, resp.properties.cursor))
    }

    async fn put_user(&self, username: &str, body: Value) -> Result<(), Error> {
        self.dispatcher
            .put(&format!("/users/{}", seg(username)), Body::Json(body))
            .await?;
        Ok(())
    }
}

fn contact_path(owner: &str, friend: &str) -> String {
    format!("/users/{}/contacts/users/{}", seg(owner), seg(friend))
}

fn notification_path(username: &str, kind: ConversationKind, key: &str) -> String {
    format!(
        "/users/{}/notification/{}/{}",
        seg(username),
        kind.as_str(),
        seg(key)
    )
}
