//! Periodized powerlifting block generator.
//!
//! An eight week block of three training days (squat, bench, deadlift). Loads
//! come from a phase table with a linear weekly step and are resolved against
//! the hero's one-rep maxes. The last week is a test week with no prescribed
//! loads.

use super::{
    plate_load, Exercise, LiftStat, MapPosition, NodeKind, NodeStatus, ProgramMode, Reps, Stats,
    WorkoutNode,
};

pub const BLOCK_WEEKS: u32 = 8;
pub const TEST_WEEK: u32 = BLOCK_WEEKS;
pub const DAYS_PER_WEEK: u32 = 3;

/// Load added each week inside a phase
const WEEKLY_STEP: f64 = 0.025;
/// Extra intensity in heavy mode
const HEAVY_OFFSET: f64 = 0.05;
const MAX_PERCENT: f64 = 0.95;

const SECONDARY_SETS: u32 = 3;
const SECONDARY_REPS: u32 = 8;
const SECONDARY_BASE: f64 = 0.60;
const SECONDARY_STEP: f64 = 0.0125;
const SECONDARY_HEAVY_OFFSET: f64 = 0.025;

const TEST_XP: u32 = 1000;
const TEST_GOLD: u32 = 500;

struct Phase {
    name: &'static str,
    first_week: u32,
    last_week: u32,
    sets: u32,
    reps: u32,
    start_percent: f64,
}

static PHASES: [Phase; 3] = [
    Phase {
        name: "Volume",
        first_week: 1,
        last_week: 3,
        sets: 5,
        reps: 5,
        start_percent: 0.70,
    },
    Phase {
        name: "Strength",
        first_week: 4,
        last_week: 5,
        sets: 5,
        reps: 3,
        start_percent: 0.80,
    },
    Phase {
        name: "Peak",
        first_week: 6,
        last_week: 7,
        sets: 3,
        reps: 2,
        start_percent: 0.875,
    },
];

enum AccessoryReps {
    Count(u32),
    Timed(&'static str),
}

struct Accessory {
    name: &'static str,
    sets: u32,
    reps: AccessoryReps,
}

struct TrainingDay {
    title: &'static str,
    primary: (LiftStat, &'static str),
    secondary: (LiftStat, &'static str),
    accessories: [Accessory; 2],
}

static DAYS: [TrainingDay; DAYS_PER_WEEK as usize] = [
    TrainingDay {
        title: "Squat Day",
        primary: (LiftStat::Squat, "Back Squat"),
        secondary: (LiftStat::Bench, "Bench Press"),
        accessories: [
            Accessory {
                name: "Romanian Deadlift",
                sets: 3,
                reps: AccessoryReps::Count(10),
            },
            Accessory {
                name: "Plank",
                sets: 3,
                reps: AccessoryReps::Timed("60s"),
            },
        ],
    },
    TrainingDay {
        title: "Bench Day",
        primary: (LiftStat::Bench, "Bench Press"),
        secondary: (LiftStat::Deadlift, "Deadlift"),
        accessories: [
            Accessory {
                name: "Barbell Row",
                sets: 4,
                reps: AccessoryReps::Count(8),
            },
            Accessory {
                name: "Triceps Dips",
                sets: 3,
                reps: AccessoryReps::Count(10),
            },
        ],
    },
    TrainingDay {
        title: "Deadlift Day",
        primary: (LiftStat::Deadlift, "Deadlift"),
        secondary: (LiftStat::Squat, "Back Squat"),
        accessories: [
            Accessory {
                name: "Pull-ups",
                sets: 4,
                reps: AccessoryReps::Count(6),
            },
            Accessory {
                name: "Hanging Leg Raise",
                sets: 3,
                reps: AccessoryReps::Count(12),
            },
        ],
    },
];

const X_POSITIONS: [u32; DAYS_PER_WEEK as usize] = [50, 30, 70];

fn phase_for(week: u32) -> Option<&'static Phase> {
    PHASES
        .iter()
        .find(|p| (p.first_week..=p.last_week).contains(&week))
}

/// Sets, reps and fraction of 1RM for the main lift, `None` in the test week
pub fn primary_scheme(week: u32, mode: ProgramMode) -> Option<(u32, u32, f64)> {
    let phase = phase_for(week)?;
    let mut percent = phase.start_percent + f64::from(week - phase.first_week) * WEEKLY_STEP;
    let mut reps = phase.reps;
    if mode == ProgramMode::Heavy {
        percent += HEAVY_OFFSET;
        reps = reps.saturating_sub(1).max(1);
    }
    Some((phase.sets, reps, percent.min(MAX_PERCENT)))
}

pub fn secondary_percent(week: u32, mode: ProgramMode) -> f64 {
    let mut percent = SECONDARY_BASE + f64::from(week.saturating_sub(1)) * SECONDARY_STEP;
    if mode == ProgramMode::Heavy {
        percent += SECONDARY_HEAVY_OFFSET;
    }
    percent
}

pub fn node_id(week: u32, day: u32) -> String {
    format!("pl-w{}-d{}", week, day)
}

fn lift_label(lift: LiftStat) -> &'static str {
    match lift {
        LiftStat::Squat => "squat",
        LiftStat::Bench => "bench",
        LiftStat::Deadlift => "deadlift",
    }
}

fn percent_exercise(
    id: String,
    name: &str,
    sets: u32,
    reps: u32,
    lift: LiftStat,
    percent: f64,
    stats: &Stats,
) -> Exercise {
    Exercise {
        weight: plate_load(stats.one_rep_max(lift), percent),
        percent_1rm: Some(percent),
        target_stat: Some(lift),
        ..Exercise::simple(id, name, sets, reps)
    }
}

fn training_node(week: u32, day: u32, stats: &Stats, mode: ProgramMode) -> Option<WorkoutNode> {
    let phase = phase_for(week)?;
    let (sets, reps, percent) = primary_scheme(week, mode)?;
    let template = &DAYS[(day - 1) as usize];
    let id = node_id(week, day);
    let (primary_lift, primary_name) = template.primary;
    let (secondary_lift, secondary_name) = template.secondary;

    let mut exercises = vec![
        percent_exercise(
            format!("{}-e1", id),
            primary_name,
            sets,
            reps,
            primary_lift,
            percent,
            stats,
        ),
        percent_exercise(
            format!("{}-e2", id),
            secondary_name,
            SECONDARY_SETS,
            SECONDARY_REPS,
            secondary_lift,
            secondary_percent(week, mode),
            stats,
        ),
    ];
    for (n, accessory) in template.accessories.iter().enumerate() {
        let exercise_id = format!("{}-e{}", id, n + 3);
        let exercise = match accessory.reps {
            AccessoryReps::Count(count) => {
                Exercise::simple(exercise_id, accessory.name, accessory.sets, count)
            }
            AccessoryReps::Timed(note) => Exercise {
                reps: Reps::Note(note.to_string()),
                ..Exercise::simple(exercise_id, accessory.name, accessory.sets, 0)
            },
        };
        exercises.push(exercise);
    }

    Some(WorkoutNode {
        title: format!("Week {}: {}", week, template.title),
        description: format!(
            "{} phase: {}x{} at {:.1}% of your {} max.",
            phase.name,
            sets,
            reps,
            percent * 100.0,
            lift_label(primary_lift)
        ),
        kind: NodeKind::Workout,
        status: NodeStatus::Locked,
        xp_reward: 150 + 25 * (week - 1),
        gold_reward: 60 + 10 * (week - 1),
        exercises,
        position: position(day),
        chapter: week,
        id,
    })
}

fn test_node(day: u32) -> WorkoutNode {
    let (lift, name) = DAYS[(day - 1) as usize].primary;
    let id = node_id(TEST_WEEK, day);
    let exercise = Exercise {
        reps: Reps::Note("1RM".to_string()),
        target_stat: Some(lift),
        custom_note: Some("Test".to_string()),
        ..Exercise::simple(format!("{}-e1", id), name, 1, 0)
    };

    WorkoutNode {
        title: format!("Week {}: {} Test", TEST_WEEK, name),
        description: format!("Work up to a new one-rep max on the {}.", lift_label(lift)),
        kind: NodeKind::Boss,
        status: NodeStatus::Locked,
        xp_reward: TEST_XP,
        gold_reward: TEST_GOLD,
        exercises: vec![exercise],
        position: position(day),
        chapter: TEST_WEEK,
        id,
    }
}

fn position(day: u32) -> MapPosition {
    MapPosition {
        x: X_POSITIONS[(day - 1) as usize],
        y: 10 + 30 * (day - 1),
    }
}

/// Build the whole block for a hero's current maxes and program mode
pub fn generate_powerlifting_nodes(stats: &Stats, mode: ProgramMode) -> Vec<WorkoutNode> {
    let mut nodes = Vec::with_capacity((BLOCK_WEEKS * DAYS_PER_WEEK) as usize);
    for week in 1..=BLOCK_WEEKS {
        for day in 1..=DAYS_PER_WEEK {
            if week == TEST_WEEK {
                nodes.push(test_node(day));
            } else if let Some(node) = training_node(week, day, stats, mode) {
                nodes.push(node);
            }
        }
    }
    nodes
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> Stats {
        Stats {
            squat_1rm: 140.0,
            bench_1rm: 100.0,
            deadlift_1rm: 180.0,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn block_has_every_day_of_every_week() {
        let nodes = generate_powerlifting_nodes(&stats(), ProgramMode::Normal);
        assert_eq!(nodes.len(), 24);
        assert_eq!(nodes[0].id, "pl-w1-d1");
        assert_eq!(nodes[23].id, "pl-w8-d3");
        assert!(nodes.iter().all(|n| n.status == NodeStatus::Locked));
        assert!(nodes.iter().all(|n| (1..=BLOCK_WEEKS).contains(&n.chapter)));
    }

    #[test]
    fn load_rises_linearly_inside_a_phase() {
        let (_, _, w1) = primary_scheme(1, ProgramMode::Normal).unwrap();
        let (_, _, w2) = primary_scheme(2, ProgramMode::Normal).unwrap();
        let (_, _, w3) = primary_scheme(3, ProgramMode::Normal).unwrap();
        assert!(approx(w1, 0.70));
        assert!(approx(w2 - w1, WEEKLY_STEP));
        assert!(approx(w3 - w2, WEEKLY_STEP));

        let (sets, reps, w4) = primary_scheme(4, ProgramMode::Normal).unwrap();
        assert_eq!((sets, reps), (5, 3));
        assert!(approx(w4, 0.80));
    }

    #[test]
    fn heavy_mode_adds_intensity_and_drops_a_rep() {
        let (_, normal_reps, normal) = primary_scheme(6, ProgramMode::Normal).unwrap();
        let (_, heavy_reps, heavy) = primary_scheme(6, ProgramMode::Heavy).unwrap();
        assert_eq!(normal_reps, 2);
        assert_eq!(heavy_reps, 1);
        assert!(approx(heavy - normal, HEAVY_OFFSET));

        let (_, reps, capped) = primary_scheme(7, ProgramMode::Heavy).unwrap();
        assert_eq!(reps, 1);
        assert!(approx(capped, MAX_PERCENT));
    }

    #[test]
    fn primary_loads_are_plate_rounded() {
        let nodes = generate_powerlifting_nodes(&stats(), ProgramMode::Normal);
        let squat_w1 = &nodes[0].exercises[0];
        assert_eq!(squat_w1.name, "Back Squat");
        // 140 * 0.70 = 98 -> 97.5
        assert_eq!(squat_w1.weight, Some(97.5));

        let bench_w2 = &nodes[4].exercises[0];
        assert_eq!(bench_w2.name, "Bench Press");
        // 100 * 0.725 = 72.5
        assert_eq!(bench_w2.weight, Some(72.5));

        for node in &nodes {
            for exercise in &node.exercises {
                if let Some(weight) = exercise.weight {
                    assert!(approx((weight / 2.5).fract(), 0.0), "{} not loadable", weight);
                }
            }
        }
    }

    #[test]
    fn secondary_lift_follows_its_own_line() {
        let nodes = generate_powerlifting_nodes(&stats(), ProgramMode::Normal);
        let secondary = &nodes[0].exercises[1];
        assert_eq!(secondary.target_stat, Some(LiftStat::Bench));
        assert_eq!(secondary.sets, SECONDARY_SETS);
        assert!(approx(secondary.percent_1rm.unwrap(), 0.60));
        assert!(approx(secondary_percent(5, ProgramMode::Normal), 0.65));
        assert!(approx(secondary_percent(1, ProgramMode::Heavy), 0.625));
    }

    #[test]
    fn test_week_has_no_computed_weight() {
        let nodes = generate_powerlifting_nodes(&stats(), ProgramMode::Heavy);
        let test_days: Vec<_> = nodes.iter().filter(|n| n.chapter == TEST_WEEK).collect();
        assert_eq!(test_days.len(), 3);
        for node in test_days {
            assert_eq!(node.kind, NodeKind::Boss);
            assert_eq!(node.xp_reward, TEST_XP);
            let exercise = &node.exercises[0];
            assert_eq!(exercise.weight, None);
            assert_eq!(exercise.percent_1rm, None);
            assert_eq!(exercise.reps, Reps::Note("1RM".to_string()));
            assert_eq!(exercise.custom_note.as_deref(), Some("Test"));
        }
        assert!(primary_scheme(TEST_WEEK, ProgramMode::Normal).is_none());
    }

    #[test]
    fn unknown_maxes_leave_loads_empty() {
        let nodes = generate_powerlifting_nodes(&Stats::default(), ProgramMode::Normal);
        assert!(nodes[0].exercises[0].weight.is_none());
        assert!(nodes[0].exercises[0].percent_1rm.is_some());
    }

    #[test]
    fn rewards_grow_with_the_week() {
        let nodes = generate_powerlifting_nodes(&stats(), ProgramMode::Normal);
        assert_eq!((nodes[0].xp_reward, nodes[0].gold_reward), (150, 60));
        let week7 = nodes.iter().find(|n| n.id == "pl-w7-d1").unwrap();
        assert_eq!((week7.xp_reward, week7.gold_reward), (300, 120));
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate_powerlifting_nodes(&stats(), ProgramMode::Heavy);
        let b = generate_powerlifting_nodes(&stats(), ProgramMode::Heavy);
        assert_eq!(a, b);
    }
}
