//! Guild directory, membership and chat

use axum::{
    extract::{Extension, Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::app::AppState;
use crate::hero::validation;
use crate::http::error::AppError;
use crate::http::middleware::AuthenticatedUser;
use crate::http::profile::current_profile;
use crate::realtime::ServerEvent;
use crate::store::guilds::{Guild, GuildIcon};
use crate::store::messages::{ChatMessage, NewChatMessage};
use crate::store::profiles::{HeroSummary, ProfileUpdate, UserProfile};

pub async fn list_guilds_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Guild>>, AppError> {
    Ok(Json(state.guilds.list().await?))
}

#[derive(Deserialize)]
pub struct CreateGuildRequest {
    name: String,
    description: String,
    icon: GuildIcon,
}

#[derive(Serialize)]
pub struct MembershipResponse {
    guild_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    guild: Option<Guild>,
}

/// Move the hero's profile to `target` and fix up member counters
async fn move_membership(
    state: &AppState,
    profile: &UserProfile,
    target: Option<Uuid>,
) -> Result<(), AppError> {
    let update = ProfileUpdate {
        guild_id: Some(target),
        ..ProfileUpdate::default()
    };
    state.profiles.update_profile(profile.id, &update).await?;
    state.realtime.set_guild(profile.id, target);

    if let Some(previous) = profile.guild_id.filter(|id| Some(*id) != target) {
        if let Err(e) = state.guilds.decrement_members(previous).await {
            warn!(guild_id = %previous, error = %e, "Failed to decrement guild members");
        }
    }
    Ok(())
}

pub async fn create_guild_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<CreateGuildRequest>,
) -> Result<Json<MembershipResponse>, AppError> {
    let name = validation::guild_name(&req.name)?;
    let description = validation::guild_description(&req.description)?;
    let profile = current_profile(&state, &auth).await?;

    let existing = state.guilds.count().await?;
    let guild = Guild {
        id: Uuid::new_v4(),
        name,
        description,
        members: 1,
        max_members: state.config.guild_max_members,
        total_xp: 0,
        rank: existing as u32 + 1,
        icon: req.icon,
    };
    let guild = state.guilds.create(&guild).await?;
    move_membership(&state, &profile, Some(guild.id)).await?;

    info!(user_id = %auth.user_id, guild_id = %guild.id, name = %guild.name, "Guild created");
    state.realtime.broadcast(ServerEvent::GuildCreated {
        guild: guild.clone(),
    });

    Ok(Json(MembershipResponse {
        guild_id: Some(guild.id),
        guild: Some(guild),
    }))
}

pub async fn join_guild_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(guild_id): Path<Uuid>,
) -> Result<Json<MembershipResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    if profile.guild_id == Some(guild_id) {
        return Err(AppError::Conflict("Already a member of this guild".to_string()));
    }

    let guild = state
        .guilds
        .get(guild_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Guild not found".to_string()))?;
    if guild.is_full() {
        return Err(AppError::BadRequest("Guild is full!".to_string()));
    }

    move_membership(&state, &profile, Some(guild_id)).await?;
    state.guilds.increment_members(guild_id).await?;
    info!(user_id = %auth.user_id, guild_id = %guild_id, "Joined guild");

    let guild = state.guilds.get(guild_id).await?;
    Ok(Json(MembershipResponse {
        guild_id: Some(guild_id),
        guild,
    }))
}

pub async fn leave_guild_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<MembershipResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    let guild_id = profile
        .guild_id
        .ok_or_else(|| AppError::BadRequest("You are not in a guild".to_string()))?;

    move_membership(&state, &profile, None).await?;
    info!(user_id = %auth.user_id, guild_id = %guild_id, "Left guild");

    Ok(Json(MembershipResponse {
        guild_id: None,
        guild: None,
    }))
}

pub async fn members_handler(
    State(state): State<AppState>,
    Path(guild_id): Path<Uuid>,
) -> Result<Json<Vec<HeroSummary>>, AppError> {
    Ok(Json(state.profiles.guild_members(guild_id).await?))
}

fn require_member(profile: &UserProfile, guild_id: Uuid) -> Result<(), AppError> {
    if profile.guild_id == Some(guild_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only guild members can use the guild chat".to_string(),
        ))
    }
}

pub async fn messages_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(guild_id): Path<Uuid>,
) -> Result<Json<Vec<ChatMessage>>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    require_member(&profile, guild_id)?;

    let messages = state
        .messages
        .recent(guild_id, state.config.chat_history_limit)
        .await?;
    Ok(Json(messages))
}

#[derive(Deserialize)]
pub struct SendMessageRequest {
    content: String,
    /// Client-side id of the optimistic entry, echoed back on the push event
    #[serde(default)]
    client_ref: Option<String>,
}

pub async fn send_message_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Path(guild_id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    let content = validation::chat_message(&req.content)?;
    let profile = current_profile(&state, &auth).await?;
    require_member(&profile, guild_id)?;

    if !state.chat_limiter.check(auth.user_id) {
        return Err(AppError::RateLimited);
    }

    let message = state
        .messages
        .insert(&NewChatMessage {
            guild_id,
            user_id: auth.user_id,
            username: profile.username,
            content,
        })
        .await?;

    let reached = state.realtime.send_to_guild(
        guild_id,
        ServerEvent::GuildMessage {
            message: message.clone(),
            client_ref: req.client_ref,
        },
    );
    debug!(guild_id = %guild_id, reached, "Chat message fanned out");

    Ok(Json(message))
}
