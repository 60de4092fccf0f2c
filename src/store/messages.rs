//! Guild chat messages

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};

/// Row of the `guild_messages` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub guild_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewChatMessage {
    pub guild_id: Uuid,
    pub user_id: Uuid,
    pub username: String,
    pub content: String,
}

#[derive(Clone)]
pub struct MessageStore {
    client: SupabaseClient,
}

impl MessageStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// The most recent `limit` messages of a guild, oldest first
    pub async fn recent(
        &self,
        guild_id: Uuid,
        limit: u32,
    ) -> Result<Vec<ChatMessage>, SupabaseError> {
        let query = Query::new()
            .eq("guild_id", guild_id)
            .order("created_at", false)
            .limit(limit);
        let mut messages: Vec<ChatMessage> = self.client.get("guild_messages", &query).await?;
        messages.reverse();
        Ok(messages)
    }

    pub async fn insert(&self, message: &NewChatMessage) -> Result<ChatMessage, SupabaseError> {
        self.client.insert("guild_messages", message).await
    }
}
