//! Hero profile endpoints

use axum::{
    body::Bytes,
    extract::{Extension, Query, State},
    response::Json,
};
use axum_extra::{headers::ContentType, TypedHeader};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::AppState;
use crate::campaign::{ProgramMode, Stats, TrainingPath};
use crate::hero::evolution::{evolution_for, EvolutionProgress};
use crate::hero::leveling::xp_percent;
use crate::hero::validation;
use crate::hero::{Attributes, ClassType, Gender};
use crate::http::error::AppError;
use crate::http::middleware::AuthenticatedUser;
use crate::shop::effective_attributes;
use crate::store::profiles::{ProfileUpdate, UserProfile};

/// The caller's profile, created with starting values on first use
pub(crate) async fn current_profile(
    state: &AppState,
    auth: &AuthenticatedUser,
) -> Result<UserProfile, AppError> {
    let profile = state
        .profiles
        .ensure_profile(auth.user_id, auth.claims.hero_name())
        .await?;
    Ok(profile)
}

#[derive(Serialize)]
pub struct ProfileResponse {
    #[serde(flatten)]
    profile: UserProfile,
    needs_onboarding: bool,
    xp_percent: f64,
    /// Base attributes plus equipped item bonuses
    effective_attributes: Attributes,
}

impl ProfileResponse {
    fn build(mut profile: UserProfile, auth: &AuthenticatedUser, effective: Attributes) -> Self {
        // Avatars set by the identity provider win when none was uploaded
        if profile.avatar_url.is_none() {
            profile.avatar_url = auth.claims.user_metadata.avatar_url.clone();
        }
        Self {
            needs_onboarding: profile.needs_onboarding(),
            xp_percent: xp_percent(profile.current_xp, profile.max_xp),
            effective_attributes: effective,
            profile,
        }
    }
}

async fn respond(
    state: &AppState,
    auth: &AuthenticatedUser,
    profile: UserProfile,
) -> Result<Json<ProfileResponse>, AppError> {
    let inventory = state.inventory.list_for(auth.user_id).await?;
    let effective = effective_attributes(profile.attributes, &inventory);
    Ok(Json(ProfileResponse::build(profile, auth, effective)))
}

pub async fn get_profile_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<ProfileResponse>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    respond(&state, &auth, profile).await
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    username: String,
}

#[derive(Serialize)]
pub struct UsernameAvailability {
    username: String,
    available: bool,
}

pub async fn username_available_handler(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> Result<Json<UsernameAvailability>, AppError> {
    let username = validation::username(&query.username)?;
    let taken = state.profiles.username_taken(&username).await?;
    Ok(Json(UsernameAvailability {
        username,
        available: !taken,
    }))
}

#[derive(Deserialize)]
pub struct OnboardingRequest {
    #[serde(default)]
    username: Option<String>,
    class: ClassType,
    gender: Gender,
    height: f64,
    weight: f64,
    #[serde(default)]
    training_path: Option<TrainingPath>,
    #[serde(default)]
    stats: Option<Stats>,
}

pub async fn onboarding_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    let current = current_profile(&state, &auth).await?;

    let mut update = ProfileUpdate {
        class: Some(req.class),
        gender: Some(req.gender),
        height: Some(validation::height_cm(req.height)?),
        weight: Some(validation::weight_kg(req.weight)?),
        training_path: req.training_path,
        stats: req.stats.as_ref().map(validation::stats).transpose()?,
        ..ProfileUpdate::default()
    };

    if let Some(raw) = req.username.as_deref() {
        let username = validation::username(raw)?;
        if username.to_lowercase() != current.username.to_lowercase() {
            if state.profiles.username_taken(&username).await? {
                return Err(AppError::Conflict("Username already taken".to_string()));
            }
            update.username = Some(username);
        }
    }

    let profile = state.profiles.update_returning(auth.user_id, &update).await?;
    info!(user_id = %auth.user_id, class = ?req.class, "Onboarding complete");
    respond(&state, &auth, profile).await
}

#[derive(Deserialize)]
pub struct ClassRequest {
    class: ClassType,
}

pub async fn class_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<ClassRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    current_profile(&state, &auth).await?;
    let update = ProfileUpdate {
        class: Some(req.class),
        ..ProfileUpdate::default()
    };
    let profile = state.profiles.update_returning(auth.user_id, &update).await?;
    respond(&state, &auth, profile).await
}

pub async fn stats_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(stats): Json<Stats>,
) -> Result<Json<ProfileResponse>, AppError> {
    current_profile(&state, &auth).await?;
    let update = ProfileUpdate {
        stats: Some(validation::stats(&stats)?),
        ..ProfileUpdate::default()
    };
    let profile = state.profiles.update_returning(auth.user_id, &update).await?;
    respond(&state, &auth, profile).await
}

#[derive(Deserialize)]
pub struct TrainingPathRequest {
    training_path: TrainingPath,
}

pub async fn training_path_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<TrainingPathRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    current_profile(&state, &auth).await?;
    let update = ProfileUpdate {
        training_path: Some(req.training_path),
        ..ProfileUpdate::default()
    };
    let profile = state.profiles.update_returning(auth.user_id, &update).await?;
    respond(&state, &auth, profile).await
}

#[derive(Deserialize)]
pub struct ProgramModeRequest {
    program_mode: ProgramMode,
}

pub async fn program_mode_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    Json(req): Json<ProgramModeRequest>,
) -> Result<Json<ProfileResponse>, AppError> {
    current_profile(&state, &auth).await?;
    let update = ProfileUpdate {
        program_mode: Some(req.program_mode),
        ..ProfileUpdate::default()
    };
    let profile = state.profiles.update_returning(auth.user_id, &update).await?;
    info!(user_id = %auth.user_id, mode = ?req.program_mode, "Program mode changed");
    respond(&state, &auth, profile).await
}

#[derive(Serialize)]
pub struct AvatarResponse {
    avatar_url: String,
}

/// Raw image body; the content type picks the stored file extension
pub async fn avatar_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
    TypedHeader(content_type): TypedHeader<ContentType>,
    body: Bytes,
) -> Result<Json<AvatarResponse>, AppError> {
    current_profile(&state, &auth).await?;
    let avatar_url = state
        .avatars
        .upload(auth.user_id, &content_type.to_string(), body)
        .await?;

    let update = ProfileUpdate {
        avatar_url: Some(avatar_url.clone()),
        ..ProfileUpdate::default()
    };
    state.profiles.update_profile(auth.user_id, &update).await?;

    Ok(Json(AvatarResponse { avatar_url }))
}

pub async fn evolution_handler(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthenticatedUser>,
) -> Result<Json<EvolutionProgress>, AppError> {
    let profile = current_profile(&state, &auth).await?;
    Ok(Json(evolution_for(profile.level)))
}
