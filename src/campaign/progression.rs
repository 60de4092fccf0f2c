//! Sequential node unlocking

use super::{
    catalog, powerlifting::generate_powerlifting_nodes, NodeStatus, ProgramMode, Stats,
    TrainingPath, WorkoutNode,
};

/// Assign statuses from the set of completed node ids.
///
/// A node is completed when its id was completed, available when it is the
/// first node or its predecessor is completed, and locked otherwise.
pub fn apply_progress(mut nodes: Vec<WorkoutNode>, completed: &[String]) -> Vec<WorkoutNode> {
    let is_done = |id: &str| completed.iter().any(|c| c == id);

    let mut previous_done = true;
    for node in nodes.iter_mut() {
        let done = is_done(&node.id);
        node.status = if done {
            NodeStatus::Completed
        } else if previous_done {
            NodeStatus::Available
        } else {
            NodeStatus::Locked
        };
        previous_done = done;
    }
    nodes
}

/// Raw nodes of a training path, all locked
pub fn nodes_for(path: TrainingPath, stats: &Stats, mode: ProgramMode) -> Vec<WorkoutNode> {
    match path {
        TrainingPath::Bodybuilding => catalog::bodybuilding(),
        TrainingPath::Powerlifting => generate_powerlifting_nodes(stats, mode),
        TrainingPath::Crossfit
        | TrainingPath::Home
        | TrainingPath::Stretching
        | TrainingPath::Custom => Vec::new(),
    }
}

/// The campaign map a hero sees
pub fn campaign_for(
    path: TrainingPath,
    stats: &Stats,
    mode: ProgramMode,
    completed: &[String],
) -> Vec<WorkoutNode> {
    apply_progress(nodes_for(path, stats, mode), completed)
}

/// Look a node up across every campaign
pub fn find_node(id: &str, stats: &Stats, mode: ProgramMode) -> Option<WorkoutNode> {
    [TrainingPath::Bodybuilding, TrainingPath::Powerlifting]
        .into_iter()
        .flat_map(|path| nodes_for(path, stats, mode))
        .find(|node| node.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn statuses(nodes: &[WorkoutNode]) -> Vec<NodeStatus> {
        nodes.iter().map(|n| n.status).collect()
    }

    #[test]
    fn fresh_hero_only_sees_the_first_node() {
        let nodes = campaign_for(
            TrainingPath::Bodybuilding,
            &Stats::default(),
            ProgramMode::Normal,
            &[],
        );
        assert_eq!(nodes[0].status, NodeStatus::Available);
        assert!(nodes[1..].iter().all(|n| n.status == NodeStatus::Locked));
    }

    #[test]
    fn completing_a_node_unlocks_its_successor() {
        let nodes = apply_progress(catalog::bodybuilding(), &ids(&["w-1", "w-2"]));
        assert_eq!(
            statuses(&nodes)[..4],
            [
                NodeStatus::Completed,
                NodeStatus::Completed,
                NodeStatus::Available,
                NodeStatus::Locked
            ]
        );
    }

    #[test]
    fn out_of_order_completion_keeps_gaps_available() {
        // w-3 done without w-2: w-2 stays available, w-4 opens after w-3
        let nodes = apply_progress(catalog::bodybuilding(), &ids(&["w-1", "w-3"]));
        assert_eq!(
            statuses(&nodes)[..5],
            [
                NodeStatus::Completed,
                NodeStatus::Available,
                NodeStatus::Completed,
                NodeStatus::Available,
                NodeStatus::Locked
            ]
        );
    }

    #[test]
    fn unknown_completed_ids_are_ignored() {
        let nodes = apply_progress(catalog::bodybuilding(), &ids(&["custom-123"]));
        assert_eq!(nodes[0].status, NodeStatus::Available);
        assert_eq!(nodes[1].status, NodeStatus::Locked);
    }

    #[test]
    fn paths_without_a_map_are_empty() {
        for path in [TrainingPath::Custom, TrainingPath::Crossfit, TrainingPath::Stretching] {
            assert!(nodes_for(path, &Stats::default(), ProgramMode::Normal).is_empty());
        }
    }

    #[test]
    fn find_node_searches_all_campaigns() {
        let stats = Stats::default();
        assert_eq!(
            find_node("w-4", &stats, ProgramMode::Normal).map(|n| n.title),
            Some("The Iron Giant".to_string())
        );
        assert!(find_node("pl-w8-d2", &stats, ProgramMode::Heavy).is_some());
        assert!(find_node("nope", &stats, ProgramMode::Normal).is_none());
    }
}
