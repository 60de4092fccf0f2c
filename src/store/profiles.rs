//! Hero profile management

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::supabase::{Query, SupabaseClient, SupabaseError};
use crate::campaign::{ProgramMode, Stats, TrainingPath};
use crate::hero::leveling::{STARTING_GOLD, STARTING_MAX_XP};
use crate::hero::{Attributes, ClassType, Difficulty, Gender};

const DEFAULT_HEIGHT_CM: f64 = 175.0;
const DEFAULT_WEIGHT_KG: f64 = 75.0;

/// Row of the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub class: Option<ClassType>,
    #[serde(default)]
    pub training_path: Option<TrainingPath>,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub program_mode: Option<ProgramMode>,
    pub level: u32,
    pub current_xp: u32,
    pub max_xp: u32,
    pub gold: u32,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default)]
    pub stats: Stats,
    #[serde(default)]
    pub streak: u32,
    #[serde(default)]
    pub guild_id: Option<Uuid>,
    /// Ids of completed campaign nodes, in completion order
    #[serde(default)]
    pub completed_workouts: Vec<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new_default(id: Uuid, username: &str) -> Self {
        Self {
            id,
            username: username.to_string(),
            class: Some(ClassType::Warrior),
            training_path: Some(TrainingPath::Bodybuilding),
            difficulty: Some(Difficulty::Beginner),
            program_mode: Some(ProgramMode::Normal),
            level: 1,
            current_xp: 0,
            max_xp: STARTING_MAX_XP,
            gold: STARTING_GOLD,
            attributes: Attributes::default(),
            stats: Stats::default(),
            streak: 0,
            guild_id: None,
            completed_workouts: Vec::new(),
            gender: None,
            height: Some(DEFAULT_HEIGHT_CM),
            weight: Some(DEFAULT_WEIGHT_KG),
            avatar_url: None,
        }
    }

    pub fn path(&self) -> TrainingPath {
        self.training_path.unwrap_or_default()
    }

    pub fn mode(&self) -> ProgramMode {
        self.program_mode.unwrap_or_default()
    }

    /// Onboarding records the body measurements and class; until then the
    /// client shows character creation.
    pub fn needs_onboarding(&self) -> bool {
        self.class.is_none() || self.gender.is_none()
    }
}

/// Partial profile update; unset fields are left untouched
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub training_path: Option<TrainingPath>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<Difficulty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub program_mode: Option<ProgramMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_xp: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<Stats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak: Option<u32>,
    /// `Some(None)` clears the guild
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<Option<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_workouts: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Progress columns touched by a workout completion
    pub fn progress_of(profile: &UserProfile) -> Self {
        Self {
            level: Some(profile.level),
            current_xp: Some(profile.current_xp),
            max_xp: Some(profile.max_xp),
            gold: Some(profile.gold),
            streak: Some(profile.streak),
            completed_workouts: Some(profile.completed_workouts.clone()),
            ..Self::default()
        }
    }
}

/// Progress values a completion was computed from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub level: u32,
    pub current_xp: u32,
    pub gold: u32,
    pub streak: u32,
}

impl ProgressSnapshot {
    pub fn of(profile: &UserProfile) -> Self {
        Self {
            level: profile.level,
            current_xp: profile.current_xp,
            gold: profile.gold,
            streak: profile.streak,
        }
    }

    /// Narrow `query` to rows still holding these values
    fn guard(&self, query: Query) -> Query {
        query
            .eq("level", self.level)
            .eq("current_xp", self.current_xp)
            .eq("gold", self.gold)
            .eq("streak", self.streak)
    }
}

/// Public view of another hero
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeroSummary {
    pub id: Uuid,
    pub username: String,
    #[serde(default)]
    pub level: Option<u32>,
    #[serde(default)]
    pub class: Option<ClassType>,
    #[serde(default)]
    pub current_xp: Option<u32>,
}

const SUMMARY_COLUMNS: &str = "id,username,level,class,current_xp";

/// Read-modify-write rounds before giving up on a busy profile
pub const WRITE_ATTEMPTS: usize = 3;

/// Rows fetched when checking a name; `ilike` may return near matches
const NAME_CANDIDATES: u32 = 20;

fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Profile store operations
#[derive(Clone)]
pub struct ProfileStore {
    client: SupabaseClient,
}

impl ProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Get a user profile by ID
    pub async fn get_profile(&self, user_id: Uuid) -> Result<Option<UserProfile>, SupabaseError> {
        let query = Query::new().eq("id", user_id);
        self.client.get_one("profiles", &query).await
    }

    /// Exact username lookup
    pub async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<HeroSummary>, SupabaseError> {
        let query = Query::new().select(SUMMARY_COLUMNS).eq("username", username);
        let mut rows: Vec<HeroSummary> = self.client.get("profiles", &query).await?;
        Ok(if rows.is_empty() { None } else { Some(rows.remove(0)) })
    }

    /// Whether a name is already used, ignoring case
    pub async fn username_taken(&self, username: &str) -> Result<bool, SupabaseError> {
        #[derive(Deserialize)]
        struct NameOnly {
            username: String,
        }

        let query = Query::new()
            .select("username")
            .ilike("username", username)
            .limit(NAME_CANDIDATES);
        let rows: Vec<NameOnly> = self.client.get("profiles", &query).await?;
        Ok(rows.iter().any(|row| same_name(&row.username, username)))
    }

    /// Create a new user profile
    pub async fn create_profile(&self, profile: &UserProfile) -> Result<UserProfile, SupabaseError> {
        self.client.insert("profiles", profile).await
    }

    /// Update a user profile
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<(), SupabaseError> {
        let query = Query::new().eq("id", user_id);
        self.client.update("profiles", &query, update).await
    }

    /// Update and return the stored row
    pub async fn update_returning(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
    ) -> Result<UserProfile, SupabaseError> {
        let query = Query::new().eq("id", user_id);
        let rows: Vec<UserProfile> = self
            .client
            .update_returning("profiles", &query, update)
            .await?;
        rows.into_iter().next().ok_or(SupabaseError::NoRowReturned)
    }

    /// Set gold only if it still holds `expected`.
    ///
    /// Returns `None` when another request changed the balance first.
    pub async fn swap_gold(
        &self,
        user_id: Uuid,
        expected: u32,
        gold: u32,
    ) -> Result<Option<UserProfile>, SupabaseError> {
        let query = Query::new().eq("id", user_id).eq("gold", expected);
        let update = ProfileUpdate {
            gold: Some(gold),
            ..ProfileUpdate::default()
        };
        let rows: Vec<UserProfile> = self
            .client
            .update_returning("profiles", &query, &update)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Write progress only if the row still matches `seen`.
    ///
    /// Returns `None` when another request changed it in between.
    pub async fn update_progress(
        &self,
        user_id: Uuid,
        seen: &ProgressSnapshot,
        update: &ProfileUpdate,
    ) -> Result<Option<UserProfile>, SupabaseError> {
        let query = seen.guard(Query::new().eq("id", user_id));
        let rows: Vec<UserProfile> = self
            .client
            .update_returning("profiles", &query, update)
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Add gold on top of whatever the balance is now
    pub async fn credit_gold(
        &self,
        user_id: Uuid,
        amount: u32,
    ) -> Result<Option<UserProfile>, SupabaseError> {
        for _ in 0..WRITE_ATTEMPTS {
            let Some(profile) = self.get_profile(user_id).await? else {
                return Ok(None);
            };
            let credited = profile.gold.saturating_add(amount);
            if let Some(updated) = self.swap_gold(user_id, profile.gold, credited).await? {
                return Ok(Some(updated));
            }
        }
        Ok(None)
    }

    /// Get or create profile (ensures profile exists)
    pub async fn ensure_profile(
        &self,
        user_id: Uuid,
        default_name: &str,
    ) -> Result<UserProfile, SupabaseError> {
        match self.get_profile(user_id).await? {
            Some(profile) => Ok(profile),
            None => {
                self.create_profile(&UserProfile::new_default(user_id, default_name))
                    .await
            }
        }
    }

    /// Members of a guild, strongest first
    pub async fn guild_members(&self, guild_id: Uuid) -> Result<Vec<HeroSummary>, SupabaseError> {
        let query = Query::new()
            .select(SUMMARY_COLUMNS)
            .eq("guild_id", guild_id)
            .order("level", false);
        self.client.get("profiles", &query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_profile_matches_starting_values() {
        let profile = UserProfile::new_default(Uuid::nil(), "Novice");
        assert_eq!(profile.level, 1);
        assert_eq!(profile.max_xp, 1000);
        assert_eq!(profile.gold, 100);
        assert_eq!(profile.attributes, Attributes::default());
        assert_eq!(profile.path(), TrainingPath::Bodybuilding);
        assert!(profile.needs_onboarding());
    }

    #[test]
    fn profile_rows_tolerate_missing_columns() {
        let row = serde_json::json!({
            "id": Uuid::nil(),
            "username": "Hero",
            "class": null,
            "level": 3,
            "current_xp": 10,
            "max_xp": 1200,
            "gold": 40,
            "training_path": "Powerlifting",
            "program_mode": "heavy"
        });
        let profile: UserProfile = serde_json::from_value(row).unwrap();
        assert!(profile.completed_workouts.is_empty());
        assert_eq!(profile.mode(), ProgramMode::Heavy);
        assert_eq!(profile.path(), TrainingPath::Powerlifting);
        assert!(profile.needs_onboarding());
    }

    #[test]
    fn progress_writes_are_guarded_by_the_values_read() {
        let mut profile = UserProfile::new_default(Uuid::nil(), "Hero");
        profile.gold = 150;
        profile.current_xp = 900;
        profile.streak = 4;

        let query = ProgressSnapshot::of(&profile).guard(Query::new().eq("id", Uuid::nil()));
        let pairs = query.pairs();
        assert_eq!(pairs[0], ("id".to_string(), format!("eq.{}", Uuid::nil())));
        assert!(pairs.contains(&("gold".to_string(), "eq.150".to_string())));
        assert!(pairs.contains(&("current_xp".to_string(), "eq.900".to_string())));
        assert!(pairs.contains(&("level".to_string(), "eq.1".to_string())));
        assert!(pairs.contains(&("streak".to_string(), "eq.4".to_string())));

        // A purchase in between moves the balance and the snapshot no longer matches
        let mut after_purchase = profile.clone();
        after_purchase.gold -= 50;
        assert_ne!(ProgressSnapshot::of(&profile), ProgressSnapshot::of(&after_purchase));
    }

    #[test]
    fn name_check_ignores_case_but_not_wildcards() {
        assert!(same_name("IronLifter", "ironlifter"));
        assert!(same_name("Iron*", "IRON*"));
        assert!(!same_name("IronX", "Iron*"));
        assert!(!same_name("Iron_Lifter", "Iron*Lifter"));
    }

    #[test]
    fn update_serializes_only_set_fields() {
        let update = ProfileUpdate {
            guild_id: Some(None),
            gold: Some(5),
            ..ProfileUpdate::default()
        };
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            serde_json::json!({ "gold": 5, "guild_id": null })
        );
    }
}
