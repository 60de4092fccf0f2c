//! Fixed campaign maps

use super::{Exercise, MapPosition, NodeKind, NodeStatus, WorkoutNode};

fn node(
    id: &str,
    title: &str,
    description: &str,
    kind: NodeKind,
    (xp_reward, gold_reward): (u32, u32),
    (x, y): (u32, u32),
    chapter: u32,
    exercises: Vec<Exercise>,
) -> WorkoutNode {
    WorkoutNode {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        kind,
        status: NodeStatus::Locked,
        xp_reward,
        gold_reward,
        exercises,
        position: MapPosition { x, y },
        chapter,
    }
}

/// The bodybuilding campaign, chapters 1 and 2
pub fn bodybuilding() -> Vec<WorkoutNode> {
    vec![
        node(
            "w-1",
            "The Awakening",
            "Basic full body conditioning to wake up your muscles.",
            NodeKind::Story,
            (100, 50),
            (50, 10),
            1,
            Vec::new(),
        ),
        node(
            "w-2",
            "Goblin Drill",
            "High volume squats and pushups.",
            NodeKind::Workout,
            (150, 75),
            (30, 30),
            1,
            vec![
                Exercise::simple("ex-1", "Goblet Squat", 3, 12).with_weight(20.0),
                Exercise::simple("ex-2", "Pushups", 3, 15),
            ],
        ),
        node(
            "w-3",
            "Orc Stronghold",
            "Heavy compound movements.",
            NodeKind::Workout,
            (300, 120),
            (70, 50),
            1,
            vec![
                Exercise::simple("ex-3", "Barbell Squat", 5, 5).with_weight(100.0),
                Exercise::simple("ex-4", "Overhead Press", 5, 5).with_weight(45.0),
            ],
        ),
        node(
            "w-4",
            "The Iron Giant",
            "Boss Battle: Test your 1RM.",
            NodeKind::Boss,
            (1000, 500),
            (50, 80),
            1,
            vec![Exercise::simple("ex-5", "Deadlift PR Attempt", 1, 1).with_weight(185.0)],
        ),
        node(
            "w-5",
            "Valley of Cardio",
            "Endurance testing in the misty valley.",
            NodeKind::Story,
            (200, 100),
            (50, 20),
            2,
            Vec::new(),
        ),
        node(
            "w-6",
            "Troll Bridge",
            "High intensity interval training.",
            NodeKind::Workout,
            (350, 150),
            (20, 50),
            2,
            vec![
                Exercise::simple("ex-6", "Burpees", 4, 15),
                Exercise::simple("ex-7", "Jump Squats", 4, 20),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn bodybuilding_ids_are_unique_and_ordered_by_chapter() {
        let nodes = bodybuilding();
        let ids: HashSet<_> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids.len(), nodes.len());
        assert!(nodes.windows(2).all(|w| w[0].chapter <= w[1].chapter));
        assert_eq!(nodes[3].kind, NodeKind::Boss);
    }
}
