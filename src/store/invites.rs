//! Shared workout invites

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InviteStatus {
    Pending,
    Accepted,
    Declined,
}

/// Row of the `workout_invites` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutInvite {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub receiver_id: Uuid,
    pub workout_id: String,
    pub status: InviteStatus,
}

#[derive(Debug, Clone, Serialize)]
struct NewInvite<'a> {
    sender_id: Uuid,
    receiver_id: Uuid,
    workout_id: &'a str,
    status: InviteStatus,
}

#[derive(Clone)]
pub struct InviteStore {
    client: SupabaseClient,
}

impl InviteStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn create(
        &self,
        sender_id: Uuid,
        receiver_id: Uuid,
        workout_id: &str,
    ) -> Result<WorkoutInvite, SupabaseError> {
        let invite = NewInvite {
            sender_id,
            receiver_id,
            workout_id,
            status: InviteStatus::Pending,
        };
        self.client.insert("workout_invites", &invite).await
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<WorkoutInvite>, SupabaseError> {
        self.client
            .get_one("workout_invites", &Query::new().eq("id", id))
            .await
    }

    /// Move a pending invite to a final status.
    ///
    /// Returns `None` when the invite was no longer pending.
    pub async fn resolve(
        &self,
        id: Uuid,
        status: InviteStatus,
    ) -> Result<Option<WorkoutInvite>, SupabaseError> {
        #[derive(Serialize)]
        struct StatusUpdate {
            status: InviteStatus,
        }

        let query = Query::new().eq("id", id).eq("status", "pending");
        let rows: Vec<WorkoutInvite> = self
            .client
            .update_returning("workout_invites", &query, &StatusUpdate { status })
            .await?;
        Ok(rows.into_iter().next())
    }
}
