//! Workout history

use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};
use crate::campaign::Exercise;

/// Row of the `workout_logs` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_title: String,
    pub xp_earned: u32,
    pub gold_earned: u32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    /// Older rows may hold `null` here
    #[serde(default, deserialize_with = "null_as_empty")]
    pub exercises: Vec<Exercise>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Exercise>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Exercise>>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize)]
pub struct NewWorkoutLog {
    pub user_id: Uuid,
    pub workout_title: String,
    pub xp_earned: u32,
    pub gold_earned: u32,
    pub completed_at: chrono::DateTime<chrono::Utc>,
    pub exercises: Vec<Exercise>,
}

#[derive(Clone)]
pub struct WorkoutLogStore {
    client: SupabaseClient,
}

impl WorkoutLogStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    pub async fn insert(&self, log: &NewWorkoutLog) -> Result<WorkoutLog, SupabaseError> {
        self.client.insert("workout_logs", log).await
    }

    /// A hero's history, newest first
    pub async fn list_for(&self, user_id: Uuid) -> Result<Vec<WorkoutLog>, SupabaseError> {
        let query = Query::new()
            .eq("user_id", user_id)
            .order("completed_at", false);
        self.client.get("workout_logs", &query).await
    }
}
