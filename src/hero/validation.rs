//! Input validation for hero, guild and chat forms

use crate::campaign::Stats;

pub const USERNAME_MIN: usize = 3;
pub const USERNAME_MAX: usize = 24;
pub const GUILD_NAME_MIN: usize = 3;
pub const GUILD_NAME_MAX: usize = 20;
pub const GUILD_DESCRIPTION_MIN: usize = 10;
pub const GUILD_DESCRIPTION_MAX: usize = 100;
pub const CHAT_MESSAGE_MAX: usize = 500;

const HEIGHT_CM: (f64, f64) = (100.0, 250.0);
const WEIGHT_KG: (f64, f64) = (30.0, 300.0);
const ONE_RM_MAX_KG: f64 = 500.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

fn text(
    field: &'static str,
    label: &str,
    raw: &str,
    min: usize,
    max: usize,
) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len == 0 {
        return Err(ValidationError::new(field, format!("{} is required", label)));
    }
    if len < min {
        return Err(ValidationError::new(
            field,
            format!("{} must be at least {} characters", label, min),
        ));
    }
    if len > max {
        return Err(ValidationError::new(
            field,
            format!("{} must be at most {} characters", label, max),
        ));
    }
    Ok(trimmed.to_string())
}

/// Returns the trimmed hero name
pub fn username(raw: &str) -> Result<String, ValidationError> {
    text("username", "Username", raw, USERNAME_MIN, USERNAME_MAX)
}

pub fn guild_name(raw: &str) -> Result<String, ValidationError> {
    text("name", "Guild name", raw, GUILD_NAME_MIN, GUILD_NAME_MAX)
}

pub fn guild_description(raw: &str) -> Result<String, ValidationError> {
    text(
        "description",
        "Description",
        raw,
        GUILD_DESCRIPTION_MIN,
        GUILD_DESCRIPTION_MAX,
    )
}

pub fn chat_message(raw: &str) -> Result<String, ValidationError> {
    text("content", "Message", raw, 1, CHAT_MESSAGE_MAX)
}

fn within(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<f64, ValidationError> {
    if value.is_finite() && (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ValidationError::new(
            field,
            format!("must be between {} and {}", min, max),
        ))
    }
}

pub fn height_cm(value: f64) -> Result<f64, ValidationError> {
    within("height", value, HEIGHT_CM)
}

pub fn weight_kg(value: f64) -> Result<f64, ValidationError> {
    within("weight", value, WEIGHT_KG)
}

pub fn stats(stats: &Stats) -> Result<Stats, ValidationError> {
    Ok(Stats {
        squat_1rm: within("squat_1rm", stats.squat_1rm, (0.0, ONE_RM_MAX_KG))?,
        bench_1rm: within("bench_1rm", stats.bench_1rm, (0.0, ONE_RM_MAX_KG))?,
        deadlift_1rm: within("deadlift_1rm", stats.deadlift_1rm, (0.0, ONE_RM_MAX_KG))?,
    })
}
