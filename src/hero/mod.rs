//! Hero rules: classes, attributes, leveling, evolution stages and input
//! validation.

pub mod evolution;
pub mod leveling;
pub mod validation;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassType {
    Warrior,
    Scout,
    Monk,
}

impl Default for ClassType {
    fn default() -> Self {
        Self::Warrior
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::Beginner
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

/// Core RPG attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    /// Strength
    pub str: u32,
    /// Stamina
    pub sta: u32,
    /// Willpower
    pub will: u32,
}

impl Default for Attributes {
    fn default() -> Self {
        Self {
            str: 10,
            sta: 10,
            will: 10,
        }
    }
}

/// Partial attribute bonus granted by equipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatBonus {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub str: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub sta: u32,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub will: u32,
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}

impl Attributes {
    pub fn with_bonus(self, bonus: &StatBonus) -> Self {
        Self {
            str: self.str + bonus.str,
            sta: self.sta + bonus.sta,
            will: self.will + bonus.will,
        }
    }
}
