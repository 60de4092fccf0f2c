//! Campaign map, workout completion and history

use axum::{
    extract::{Extension, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::app::AppState;
use crate::campaign::{campaign_for, find_node, Exercise, NodeStatus, TrainingPath, WorkoutNode};
use crate::hero::leveling::{apply_workout_rewards, RewardOutcome};
use crate::http::error::AppError;
use crate::http::middleware::AuthenticatedUser;
use crate::http::profile::current_profile;
use crate::store::profiles::{ProfileUpdate, ProgressSnapshot, UserProfile, WRITE_ATTEMPTS};
use crate::store::workout_logs::{NewWorkoutLog, WorkoutLog};

#[derive(Serialize)]
pub struct CampaignResponse {
    training_path: TrainingPath,
    nodes: Vec<WorkoutNode>,
}

pub async fn campaign_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<CampaignResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    let training_path = profile.path();
    let nodes = campaign_for(
        training_path,
        &profile.stats,
        profile.mode(),
        &profile.completed_workouts,
    );
    Ok(Json(CampaignResponse {
        training_path,
        nodes,
    }))
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    node_id: String,
    /// Exercises as performed; the node's own list when absent
    #[serde(default)]
    exercises: Option<Vec<Exercise>>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    profile: UserProfile,
    #[serde(flatten)]
    reward: RewardOutcome,
}

/// Resolve where a node sits for this hero: its own campaign decides the
/// status, nodes from other campaigns (shared invites) are always open.
fn node_for_completion(profile: &UserProfile, node_id: &str) -> Result<WorkoutNode, AppError> {
    let campaign = campaign_for(
        profile.path(),
        &profile.stats,
        profile.mode(),
        &profile.completed_workouts,
    );
    if let Some(node) = campaign.into_iter().find(|n| n.id == node_id) {
        if node.status == NodeStatus::Locked {
            return Err(AppError::BadRequest(
                "Complete the previous workout first".to_string(),
            ));
        }
        return Ok(node);
    }

    find_node(node_id, &profile.stats, profile.mode())
        .ok_or_else(|| AppError::NotFound(format!("Workout {} not found", node_id)))
}

/// Apply a node's rewards against the stored profile.
///
/// The write only lands if the profile still holds the values the rewards
/// were added to, so a purchase or a second completion in between is re-read
/// rather than overwritten.
async fn commit_completion(
    state: &AppState,
    auth: &AuthenticatedUser,
    node_id: &str,
) -> Result<(UserProfile, WorkoutNode, RewardOutcome), AppError> {
    for attempt in 1..=WRITE_ATTEMPTS {
        let mut profile = current_profile(state, auth).await?;
        let node = node_for_completion(&profile, node_id)?;
        let seen = ProgressSnapshot::of(&profile);

        let reward = apply_workout_rewards(&mut profile, &node.id, node.xp_reward, node.gold_reward);
        let written = state
            .profiles
            .update_progress(auth.user_id, &seen, &ProfileUpdate::progress_of(&profile))
            .await?;
        match written {
            Some(profile) => return Ok((profile, node, reward)),
            None => debug!(user_id = %auth.user_id, attempt, "Profile changed during completion, retrying"),
        }
    }
    Err(AppError::Conflict("Profile is busy, please try again".to_string()))
}

pub async fn complete_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let (profile, node, reward) = commit_completion(&state, &auth, &req.node_id).await?;

    info!(
        user_id = %auth.user_id,
        node_id = %node.id,
        xp = reward.xp_gained,
        gold = reward.gold_gained,
        leveled_up = reward.leveled_up,
        "Workout completed"
    );

    let log = NewWorkoutLog {
        user_id: auth.user_id,
        workout_title: node.title.clone(),
        xp_earned: reward.xp_gained,
        gold_earned: reward.gold_gained,
        completed_at: chrono::Utc::now(),
        exercises: req.exercises.unwrap_or(node.exercises),
    };
    if let Err(e) = state.workout_logs.insert(&log).await {
        warn!(user_id = %auth.user_id, error = %e, "Failed to record workout history");
    }

    Ok(Json(CompleteResponse { profile, reward }))
}

pub async fn history_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<WorkoutLog>>, AppError> {
    let logs = state.workout_logs.list_for(auth.user_id).await?;
    Ok(Json(logs))
}
