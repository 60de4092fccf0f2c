//! Sprite evolution stages unlocked by level

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpriteMilestone {
    pub level: u32,
    pub title: &'static str,
    pub image_url: &'static str,
}

pub const SPRITE_EVOLUTION: [SpriteMilestone; 6] = [
    SpriteMilestone {
        level: 1,
        title: "Novice",
        image_url: "https://picsum.photos/seed/lvl1/200/200",
    },
    SpriteMilestone {
        level: 5,
        title: "Apprentice",
        image_url: "https://picsum.photos/seed/lvl5/200/200",
    },
    SpriteMilestone {
        level: 10,
        title: "Adept",
        image_url: "https://picsum.photos/seed/lvl10/200/200",
    },
    SpriteMilestone {
        level: 20,
        title: "Expert",
        image_url: "https://picsum.photos/seed/lvl20/200/200",
    },
    SpriteMilestone {
        level: 30,
        title: "Master",
        image_url: "https://picsum.photos/seed/lvl30/200/200",
    },
    SpriteMilestone {
        level: 50,
        title: "Legend",
        image_url: "https://picsum.photos/seed/lvl50/200/200",
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvolutionProgress {
    pub current: SpriteMilestone,
    pub next: Option<SpriteMilestone>,
    pub levels_to_go: u32,
    /// Progress through the current stage, 0-100
    pub progress_percent: f64,
    pub unlocked: Vec<SpriteMilestone>,
}

pub fn evolution_for(level: u32) -> EvolutionProgress {
    let index = SPRITE_EVOLUTION
        .iter()
        .rposition(|stage| level >= stage.level)
        .unwrap_or(0);
    let current = SPRITE_EVOLUTION[index];
    let next = SPRITE_EVOLUTION.get(index + 1).copied();

    let (levels_to_go, progress_percent) = match next {
        Some(next) => {
            let span = f64::from(next.level - current.level);
            let gained = f64::from(level.saturating_sub(current.level));
            (
                next.level.saturating_sub(level),
                (gained / span * 100.0).clamp(0.0, 100.0),
            )
        }
        None => (0, 100.0),
    };

    EvolutionProgress {
        current,
        next,
        levels_to_go,
        progress_percent,
        unlocked: SPRITE_EVOLUTION
            .iter()
            .filter(|stage| level >= stage.level)
            .copied()
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_boundaries() {
        assert_eq!(evolution_for(1).current.title, "Novice");
        assert_eq!(evolution_for(4).current.title, "Novice");
        assert_eq!(evolution_for(5).current.title, "Apprentice");
        assert_eq!(evolution_for(49).current.title, "Master");
        assert_eq!(evolution_for(75).current.title, "Legend");
    }

    #[test]
    fn progress_inside_a_stage() {
        let progress = evolution_for(15);
        assert_eq!(progress.current.title, "Adept");
        assert_eq!(progress.next.map(|n| n.title), Some("Expert"));
        assert_eq!(progress.levels_to_go, 5);
        assert_eq!(progress.progress_percent, 50.0);
        assert_eq!(progress.unlocked.len(), 3);
    }

    #[test]
    fn last_stage_is_complete() {
        let progress = evolution_for(50);
        assert!(progress.next.is_none());
        assert_eq!(progress.levels_to_go, 0);
        assert_eq!(progress.progress_percent, 100.0);
    }

    #[test]
    fn level_zero_falls_back_to_first_stage() {
        let progress = evolution_for(0);
        assert_eq!(progress.current.title, "Novice");
        assert_eq!(progress.progress_percent, 0.0);
        assert!(progress.unlocked.is_empty());
    }
}
