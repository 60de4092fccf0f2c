//! Friends and shared workout invites

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::app::AppState;
use crate::campaign::{find_node, WorkoutNode};
use crate::http::error::AppError;
use crate::http::middleware::AuthenticatedUser;
use crate::http::profile::current_profile;
use crate::realtime::ServerEvent;
use crate::store::friends::{Friend, FriendStatus, Friendship};
use crate::store::invites::{InviteStatus, WorkoutInvite};
use crate::store::profiles::HeroSummary;

pub async fn list_friends_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<Vec<Friend>>, AppError> {
    let mut friends = state.friends.list_for(auth.user_id).await?;
    for friend in friends.iter_mut() {
        friend.online = state.realtime.is_online(friend.friend_id);
    }
    Ok(Json(friends))
}

#[derive(Deserialize)]
pub struct SearchQuery {
    username: String,
}

/// Why a found hero cannot be added
fn search_refusal(viewer: Uuid, found: &HeroSummary, friends: &[Friend]) -> Option<AppError> {
    if found.id == viewer {
        return Some(AppError::BadRequest("You cannot add yourself".to_string()));
    }
    friends
        .iter()
        .find(|f| f.friend_id == found.id)
        .map(|existing| match existing.status {
            FriendStatus::Accepted => AppError::Conflict("Already friends".to_string()),
            FriendStatus::Pending => AppError::Conflict("Request already pending".to_string()),
        })
}

pub async fn search_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<HeroSummary>, AppError> {
    let term = query.username.trim();
    if term.is_empty() {
        return Err(AppError::BadRequest("Enter a username".to_string()));
    }

    let found = state
        .profiles
        .find_by_username(term)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let friends = state.friends.list_for(auth.user_id).await?;
    match search_refusal(auth.user_id, &found, &friends) {
        Some(refusal) => Err(refusal),
        None => Ok(Json(found)),
    }
}

#[derive(Deserialize)]
pub struct FriendRequestBody {
    receiver_id: Uuid,
}

pub async fn send_request_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<FriendRequestBody>,
) -> Result<(StatusCode, Json<Friendship>), AppError> {
    let sender = current_profile(&state, &auth).await?;
    let receiver = state
        .profiles
        .get_profile(req.receiver_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let summary = HeroSummary {
        id: receiver.id,
        username: receiver.username,
        level: Some(receiver.level),
        class: receiver.class,
        current_xp: Some(receiver.current_xp),
    };
    let friends = state.friends.list_for(auth.user_id).await?;
    if let Some(refusal) = search_refusal(auth.user_id, &summary, &friends) {
        return Err(refusal);
    }

    let friendship = state
        .friends
        .send_request(auth.user_id, req.receiver_id)
        .await?;
    info!(sender_id = %auth.user_id, receiver_id = %req.receiver_id, "Friend request sent");

    let delivered = state.realtime.send_to_user(
        req.receiver_id,
        ServerEvent::FriendRequest {
            request_id: friendship.id,
            sender_id: auth.user_id,
            sender_name: sender.username,
        },
    );
    debug!(receiver_id = %req.receiver_id, delivered, "Friend request notification");

    Ok((StatusCode::CREATED, Json(friendship)))
}

async fn friendship_for(
    state: &AppState,
    id: Uuid,
    user_id: Uuid,
) -> Result<Friendship, AppError> {
    state
        .friends
        .get(id)
        .await?
        .filter(|f| f.involves(user_id))
        .ok_or_else(|| AppError::NotFound("Friend request not found".to_string()))
}

pub async fn accept_friend_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let friendship = friendship_for(&state, id, auth.user_id).await?;
    if friendship.receiver_id != auth.user_id {
        return Err(AppError::Forbidden(
            "Only the receiver can accept a request".to_string(),
        ));
    }
    if friendship.status == FriendStatus::Accepted {
        return Ok(StatusCode::NO_CONTENT);
    }

    state.friends.accept(id).await?;
    info!(user_id = %auth.user_id, friendship_id = %id, "Friend request accepted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_friend_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    friendship_for(&state, id, auth.user_id).await?;
    state.friends.remove(id).await?;
    info!(user_id = %auth.user_id, friendship_id = %id, "Friendship removed");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
pub struct InviteRequest {
    receiver_id: Uuid,
    workout_id: String,
}

pub async fn send_invite_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<InviteRequest>,
) -> Result<(StatusCode, Json<WorkoutInvite>), AppError> {
    if req.receiver_id == auth.user_id {
        return Err(AppError::BadRequest("You cannot invite yourself".to_string()));
    }
    let sender = current_profile(&state, &auth).await?;
    if find_node(&req.workout_id, &sender.stats, sender.mode()).is_none() {
        return Err(AppError::NotFound(format!(
            "Workout {} not found",
            req.workout_id
        )));
    }

    let invite = state
        .invites
        .create(auth.user_id, req.receiver_id, &req.workout_id)
        .await?;
    info!(
        sender_id = %auth.user_id,
        receiver_id = %req.receiver_id,
        workout_id = %req.workout_id,
        "Workout invite sent"
    );

    state.realtime.send_to_user(
        req.receiver_id,
        ServerEvent::WorkoutInvite {
            invite: invite.clone(),
            sender_name: sender.username,
        },
    );

    Ok((StatusCode::CREATED, Json(invite)))
}

/// Invite addressed to the caller that can still be answered
async fn pending_invite_for(
    state: &AppState,
    id: Uuid,
    receiver: Uuid,
) -> Result<WorkoutInvite, AppError> {
    let invite = state
        .invites
        .get(id)
        .await?
        .filter(|i| i.receiver_id == receiver)
        .ok_or_else(|| AppError::NotFound("Invite not found".to_string()))?;
    if invite.status != InviteStatus::Pending {
        return Err(AppError::Conflict("Invite already answered".to_string()));
    }
    Ok(invite)
}

#[derive(Serialize)]
pub struct AcceptInviteResponse {
    invite: WorkoutInvite,
    node: WorkoutNode,
}

pub async fn accept_invite_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AcceptInviteResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    let invite = pending_invite_for(&state, id, auth.user_id).await?;
    let node = find_node(&invite.workout_id, &profile.stats, profile.mode())
        .ok_or_else(|| AppError::NotFound("Workout no longer exists".to_string()))?;

    let invite = state
        .invites
        .resolve(invite.id, InviteStatus::Accepted)
        .await?
        .ok_or_else(|| AppError::Conflict("Invite already answered".to_string()))?;
    info!(user_id = %auth.user_id, invite_id = %id, "Workout invite accepted");

    state.realtime.send_to_user(
        invite.sender_id,
        ServerEvent::InviteAccepted {
            invite_id: invite.id,
            partner_name: profile.username,
            node: node.clone(),
        },
    );

    Ok(Json(AcceptInviteResponse { invite, node }))
}

pub async fn decline_invite_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkoutInvite>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    let invite = pending_invite_for(&state, id, auth.user_id).await?;

    let invite = state
        .invites
        .resolve(invite.id, InviteStatus::Declined)
        .await?
        .ok_or_else(|| AppError::Conflict("Invite already answered".to_string()))?;
    info!(user_id = %auth.user_id, invite_id = %id, "Workout invite declined");

    state.realtime.send_to_user(
        invite.sender_id,
        ServerEvent::InviteDeclined {
            invite_id: invite.id,
            partner_name: profile.username,
        },
    );

    Ok(Json(invite))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hero::ClassType;

    fn hero(id: Uuid) -> HeroSummary {
        HeroSummary {
            id,
            username: "GymRat".to_string(),
            level: Some(4),
            class: Some(ClassType::Monk),
            current_xp: Some(0),
        }
    }

    fn friend(friend_id: Uuid, status: FriendStatus) -> Friend {
        Friend {
            id: Uuid::new_v4(),
            friend_id,
            username: "GymRat".to_string(),
            level: 4,
            class: ClassType::Monk,
            status,
            is_sender: true,
            online: false,
        }
    }

    #[test]
    fn search_refuses_self_and_existing_links() {
        let me = Uuid::new_v4();
        let other = Uuid::new_v4();

        assert!(matches!(
            search_refusal(me, &hero(me), &[]),
            Some(AppError::BadRequest(_))
        ));
        assert!(search_refusal(me, &hero(other), &[]).is_none());

        match search_refusal(me, &hero(other), &[friend(other, FriendStatus::Accepted)]) {
            Some(AppError::Conflict(msg)) => assert_eq!(msg, "Already friends"),
            _ => panic!("expected conflict"),
        }
        match search_refusal(me, &hero(other), &[friend(other, FriendStatus::Pending)]) {
            Some(AppError::Conflict(msg)) => assert_eq!(msg, "Request already pending"),
            _ => panic!("expected conflict"),
        }
    }
}
