//! XP, level-up and reward arithmetic

use serde::Serialize;

use crate::store::profiles::UserProfile;

pub const STARTING_MAX_XP: u32 = 1000;
pub const STARTING_GOLD: u32 = 100;

/// Result of applying a workout's rewards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RewardOutcome {
    pub xp_gained: u32,
    pub gold_gained: u32,
    pub leveled_up: bool,
    pub level: u32,
}

/// Each level needs 20% more XP than the last, rounded down
pub fn next_max_xp(max_xp: u32) -> u32 {
    (u64::from(max_xp) * 6 / 5).min(u64::from(u32::MAX)) as u32
}

/// Apply a completed workout to a profile.
///
/// At most one level is gained per completion; surplus XP carries over.
pub fn apply_workout_rewards(
    profile: &mut UserProfile,
    node_id: &str,
    xp: u32,
    gold: u32,
) -> RewardOutcome {
    let total = profile.current_xp.saturating_add(xp);
    let leveled_up = total >= profile.max_xp;

    if leveled_up {
        profile.current_xp = total - profile.max_xp;
        profile.level += 1;
        profile.max_xp = next_max_xp(profile.max_xp);
    } else {
        profile.current_xp = total;
    }
    profile.gold = profile.gold.saturating_add(gold);
    profile.streak += 1;
    if !profile.completed_workouts.iter().any(|id| id == node_id) {
        profile.completed_workouts.push(node_id.to_string());
    }

    RewardOutcome {
        xp_gained: xp,
        gold_gained: gold,
        leveled_up,
        level: profile.level,
    }
}

/// Share of the current level already earned, 0-100
pub fn xp_percent(current_xp: u32, max_xp: u32) -> f64 {
    if max_xp == 0 {
        return 100.0;
    }
    (f64::from(current_xp) / f64::from(max_xp) * 100.0).min(100.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn hero() -> UserProfile {
        UserProfile::new_default(Uuid::new_v4(), "Tester")
    }

    #[test]
    fn rewards_accumulate_below_the_threshold() {
        let mut profile = hero();
        let outcome = apply_workout_rewards(&mut profile, "w-1", 100, 50);

        assert!(!outcome.leveled_up);
        assert_eq!(profile.current_xp, 100);
        assert_eq!(profile.gold, STARTING_GOLD + 50);
        assert_eq!(profile.streak, 1);
        assert_eq!(profile.completed_workouts, vec!["w-1".to_string()]);
    }

    #[test]
    fn crossing_the_threshold_levels_up_and_carries_surplus() {
        let mut profile = hero();
        profile.current_xp = 900;

        let outcome = apply_workout_rewards(&mut profile, "w-3", 300, 120);

        assert!(outcome.leveled_up);
        assert_eq!(outcome.level, 2);
        assert_eq!(profile.current_xp, 200);
        assert_eq!(profile.max_xp, 1200);
    }

    #[test]
    fn exact_threshold_counts_as_level_up() {
        let mut profile = hero();
        profile.current_xp = 800;
        assert!(apply_workout_rewards(&mut profile, "w-2", 200, 0).leveled_up);
        assert_eq!(profile.current_xp, 0);
    }

    #[test]
    fn only_one_level_per_completion() {
        let mut profile = hero();
        let outcome = apply_workout_rewards(&mut profile, "boss", 5000, 0);
        assert_eq!(outcome.level, 2);
        assert_eq!(profile.current_xp, 4000);
    }

    #[test]
    fn replaying_a_node_does_not_duplicate_it() {
        let mut profile = hero();
        apply_workout_rewards(&mut profile, "w-1", 10, 0);
        apply_workout_rewards(&mut profile, "w-1", 10, 0);
        assert_eq!(profile.completed_workouts.len(), 1);
        assert_eq!(profile.streak, 2);
    }

    #[test]
    fn max_xp_growth_floors() {
        assert_eq!(next_max_xp(1000), 1200);
        assert_eq!(next_max_xp(1200), 1440);
        assert_eq!(next_max_xp(1441), 1729);
    }

    #[test]
    fn xp_percent_is_capped() {
        assert_eq!(xp_percent(750, 1000), 75.0);
        assert_eq!(xp_percent(1500, 1000), 100.0);
        assert_eq!(xp_percent(0, 0), 100.0);
    }
}
