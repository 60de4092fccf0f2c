//! Workout campaigns: node types, the static catalog, the powerlifting
//! generator and sequential unlocking.

pub mod catalog;
pub mod powerlifting;
pub mod progression;

use serde::{Deserialize, Serialize};

pub use progression::{campaign_for, find_node};

/// Weight plates are loaded in 2.5 kg steps
pub const PLATE_INCREMENT_KG: f64 = 2.5;

/// Training path a hero follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrainingPath {
    #[serde(rename = "Bodybuilding")]
    Bodybuilding,
    #[serde(rename = "Powerlifting")]
    Powerlifting,
    #[serde(rename = "Crossfit")]
    Crossfit,
    #[serde(rename = "Home Workout")]
    Home,
    #[serde(rename = "Yoga & Stretching")]
    Stretching,
    #[serde(rename = "Custom")]
    Custom,
}

impl Default for TrainingPath {
    fn default() -> Self {
        Self::Bodybuilding
    }
}

/// Load scheme for the powerlifting block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramMode {
    Normal,
    Heavy,
}

impl Default for ProgramMode {
    fn default() -> Self {
        Self::Normal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Workout,
    Boss,
    Story,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeStatus {
    Locked,
    Available,
    Completed,
}

/// Which one-rep max a percentage-based exercise scales from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiftStat {
    #[serde(rename = "squat_1rm")]
    Squat,
    #[serde(rename = "bench_1rm")]
    Bench,
    #[serde(rename = "deadlift_1rm")]
    Deadlift,
}

/// Personal records in kilograms
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default)]
    pub squat_1rm: f64,
    #[serde(default)]
    pub bench_1rm: f64,
    #[serde(default)]
    pub deadlift_1rm: f64,
}

impl Stats {
    pub fn one_rep_max(&self, lift: LiftStat) -> f64 {
        match lift {
            LiftStat::Squat => self.squat_1rm,
            LiftStat::Bench => self.bench_1rm,
            LiftStat::Deadlift => self.deadlift_1rm,
        }
    }
}

/// Repetitions are either a count or an instruction such as "1RM" or "60s"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reps {
    Count(u32),
    Note(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: Reps,
    /// Fixed load, or the load resolved from `percent_1rm` at generation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, alias = "videoUrl", skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Fraction of the one-rep max, e.g. 0.75
    #[serde(default, alias = "percent1rm", skip_serializing_if = "Option::is_none")]
    pub percent_1rm: Option<f64>,
    #[serde(default, alias = "targetStat", skip_serializing_if = "Option::is_none")]
    pub target_stat: Option<LiftStat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<f64>,
    #[serde(default, alias = "customNote", skip_serializing_if = "Option::is_none")]
    pub custom_note: Option<String>,
}

impl Exercise {
    /// Exercise with a plain rep count and no load
    pub fn simple(id: impl Into<String>, name: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            sets,
            reps: Reps::Count(reps),
            weight: None,
            video_url: None,
            percent_1rm: None,
            target_stat: None,
            rpe: None,
            custom_note: None,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }

    /// Load to put on the bar for this hero.
    ///
    /// Percentage prescriptions win when the matching 1RM is known; otherwise
    /// the fixed weight is used, and bodyweight movements come out as 0.
    pub fn prescribed_weight(&self, stats: &Stats) -> f64 {
        if let (Some(percent), Some(lift)) = (self.percent_1rm, self.target_stat) {
            if let Some(load) = plate_load(stats.one_rep_max(lift), percent) {
                return load;
            }
        }
        self.weight.unwrap_or(0.0)
    }
}

/// Round a percentage of a one-rep max to the nearest loadable weight.
///
/// Returns `None` when the one-rep max is unknown (zero, negative or not finite).
pub fn plate_load(one_rep_max: f64, percent: f64) -> Option<f64> {
    if !one_rep_max.is_finite() || one_rep_max <= 0.0 {
        return None;
    }
    Some(round_to_plate(one_rep_max * percent))
}

pub fn round_to_plate(kg: f64) -> f64 {
    (kg / PLATE_INCREMENT_KG).round() * PLATE_INCREMENT_KG
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapPosition {
    pub x: u32,
    pub y: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutNode {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub status: NodeStatus,
    pub xp_reward: u32,
    pub gold_reward: u32,
    pub exercises: Vec<Exercise>,
    pub position: MapPosition,
    pub chapter: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_round_to_nearest_plate() {
        assert_eq!(round_to_plate(101.0), 100.0);
        assert_eq!(round_to_plate(101.3), 102.5);
        assert_eq!(round_to_plate(98.7), 97.5);
        assert_eq!(plate_load(140.0, 0.725), Some(102.5));
        assert_eq!(plate_load(0.0, 0.8), None);
        assert_eq!(plate_load(f64::NAN, 0.8), None);
    }

    #[test]
    fn prescribed_weight_prefers_percentage_when_known() {
        let stats = Stats {
            squat_1rm: 140.0,
            ..Stats::default()
        };
        let mut exercise = Exercise::simple("e", "Back Squat", 5, 5).with_weight(60.0);
        exercise.percent_1rm = Some(0.7);
        exercise.target_stat = Some(LiftStat::Squat);

        assert_eq!(exercise.prescribed_weight(&stats), 97.5);
        assert_eq!(exercise.prescribed_weight(&Stats::default()), 60.0);

        let pushups = Exercise::simple("p", "Pushups", 3, 15);
        assert_eq!(pushups.prescribed_weight(&stats), 0.0);
    }

    #[test]
    fn reps_accept_numbers_and_notes() {
        let count: Reps = serde_json::from_str("8").unwrap();
        let note: Reps = serde_json::from_str("\"1RM\"").unwrap();
        assert_eq!(count, Reps::Count(8));
        assert_eq!(note, Reps::Note("1RM".to_string()));
    }

    #[test]
    fn exercise_keys_are_snake_case_and_read_camel_case_logs() {
        let mut exercise = Exercise::simple("pl-w1-d1-e1", "Back Squat", 5, 5);
        exercise.percent_1rm = Some(0.7);
        exercise.target_stat = Some(LiftStat::Squat);
        let json = serde_json::to_value(&exercise).unwrap();
        assert_eq!(json["percent_1rm"], 0.7);
        assert!(json.get("target_stat").is_some());
        assert!(json.get("percent1rm").is_none());

        let logged: Exercise = serde_json::from_str(
            r#"{"id":"e","name":"Bench","sets":3,"reps":8,"percent1rm":0.6,"targetStat":"bench_1rm","customNote":"Slow"}"#,
        )
        .unwrap();
        assert_eq!(logged.percent_1rm, Some(0.6));
        assert_eq!(logged.target_stat, Some(LiftStat::Bench));
        assert_eq!(logged.custom_note.as_deref(), Some("Slow"));
    }

    #[test]
    fn training_path_uses_display_names_on_the_wire() {
        let json = serde_json::to_string(&TrainingPath::Stretching).unwrap();
        assert_eq!(json, "\"Yoga & Stretching\"");
        let path: TrainingPath = serde_json::from_str("\"Home Workout\"").unwrap();
        assert_eq!(path, TrainingPath::Home);
    }
}
