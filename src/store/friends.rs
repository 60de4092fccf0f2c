//! Friendships between heroes

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};
use crate::hero::ClassType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendStatus {
    Pending,
    Accepted,
}

/// Profile columns embedded through the foreign key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmbeddedHero {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub class: Option<ClassType>,
}

/// Row of the `friends` table with the other hero embedded
#[derive(Debug, Clone, Deserialize)]
pub struct FriendRow {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendStatus,
    #[serde(default)]
    pub friend: Option<EmbeddedHero>,
}

/// A friendship as seen by one participant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Friend {
    /// Id of the friendship record
    pub id: Uuid,
    pub friend_id: Uuid,
    pub username: String,
    pub level: u32,
    pub class: ClassType,
    pub status: FriendStatus,
    /// Whether the viewer sent the request
    pub is_sender: bool,
    /// Connected to the realtime channel right now
    pub online: bool,
}

impl Friend {
    pub fn from_row(row: FriendRow, viewer: Uuid) -> Self {
        let is_sender = row.sender_id == viewer;
        let friend_id = if is_sender {
            row.receiver_id
        } else {
            row.sender_id
        };
        let hero = row.friend.unwrap_or_default();
        Self {
            id: row.id,
            friend_id,
            username: hero.username.unwrap_or_else(|| "Unknown".to_string()),
            level: hero.level.unwrap_or(1),
            class: hero.class.unwrap_or_default(),
            status: row.status,
            is_sender,
            online: false,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct NewFriendRequest {
    sender_id: Uuid,
    receiver_id: Uuid,
    status: FriendStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friendship {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub status: FriendStatus,
}

impl Friendship {
    pub fn involves(&self, user_id: Uuid) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

#[derive(Clone)]
pub struct FriendStore {
    client: SupabaseClient,
}

impl FriendStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Requests sent and received by a hero, mapped to the viewer's side
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<Friend>, SupabaseError> {
        let sent: Vec<FriendRow> = self
            .client
            .get(
                "friends",
                &Query::new()
                    .select("*,friend:receiver_id(username,level,class)")
                    .eq("sender_id", user_id),
            )
            .await?;
        let received: Vec<FriendRow> = self
            .client
            .get(
                "friends",
                &Query::new()
                    .select("*,friend:sender_id(username,level,class)")
                    .eq("receiver_id", user_id),
            )
            .await?;

        Ok(sent
            .into_iter()
            .chain(received)
            .map(|row| Friend::from_row(row, user_id))
            .collect())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Friendship>, SupabaseError> {
        self.client
            .get_one("friends", &Query::new().eq("id", id))
            .await
    }

    pub async fn send_request(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
    ) -> Result<Friendship, SupabaseError> {
        let request = NewFriendRequest {
            sender_id,
            receiver_id,
            status: FriendStatus::Pending,
        };
        self.client.insert("friends", &request).await
    }

    pub async fn accept(&self, id: Uuid) -> Result<(), SupabaseError> {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: FriendStatus,
        }

        self.client
            .update(
                "friends",
                &Query::new().eq("id", id),
                &StatusUpdate {
                    status: FriendStatus::Accepted,
                },
            )
            .await
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), SupabaseError> {
        self.client.delete("friends", &Query::new().eq("id", id)).await
    }
}
