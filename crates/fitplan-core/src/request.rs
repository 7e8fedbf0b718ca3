//! Plan request parsing and validation.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shortest accepted daily workout, in minutes.
pub const MIN_DURATION_MINUTES: i64 = 5;
/// Longest accepted daily workout, in minutes.
pub const MAX_DURATION_MINUTES: i64 = 120;

/// Reasons a plan request is rejected before any I/O happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required fields: target_muscle and duration_minutes")]
    MissingFields,

    #[error("Duration must be between 5 and 120 minutes")]
    DurationOutOfRange(i64),

    #[error("invalid experience level {0:?} (expected beginner, intermediate, or advanced)")]
    InvalidExperienceLevel(String),
}

/// Training experience used to pitch the customised prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        };
        f.write_str(s)
    }
}

impl FromStr for ExperienceLevel {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(ValidationError::InvalidExperienceLevel(s.to_owned())),
        }
    }
}

/// Raw JSON body of `POST /api/workout/generate`, before validation.
///
/// Every field is optional here so that a missing field produces a
/// [`ValidationError`] rather than a deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlanRequestBody {
    pub target_muscle: Option<String>,
    pub duration_minutes: Option<i64>,
    pub experience_level: Option<String>,
    pub equipment: Option<Vec<String>>,
}

impl TryFrom<PlanRequestBody> for PlanRequest {
    type Error = ValidationError;

    fn try_from(body: PlanRequestBody) -> Result<Self, Self::Error> {
        let mut request = PlanRequest::new(body.target_muscle.as_deref(), body.duration_minutes)?;
        if let Some(level) = body.experience_level {
            request.experience_level = Some(level.parse()?);
        }
        if let Some(equipment) = body.equipment {
            request.equipment = equipment
                .into_iter()
                .map(|e| e.trim().to_owned())
                .filter(|e| !e.is_empty())
                .collect();
        }
        Ok(request)
    }
}

/// A validated request for a weekly plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRequest {
    pub target_muscle: String,
    pub duration_minutes: u32,
    pub experience_level: Option<ExperienceLevel>,
    /// Equipment the user has. Empty means no filtering.
    pub equipment: Vec<String>,
}

impl PlanRequest {
    /// Validate the two required fields.
    ///
    /// A blank target counts as missing. The duration must lie in
    /// `MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES`.
    pub fn new(
        target_muscle: Option<&str>,
        duration_minutes: Option<i64>,
    ) -> Result<Self, ValidationError> {
        let target_muscle = target_muscle
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ValidationError::MissingFields)?;
        let duration = duration_minutes.ok_or(ValidationError::MissingFields)?;

        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
            return Err(ValidationError::DurationOutOfRange(duration));
        }

        Ok(Self {
            target_muscle: target_muscle.to_owned(),
            // In range, so the cast cannot truncate.
            duration_minutes: duration as u32,
            experience_level: None,
            equipment: Vec::new(),
        })
    }

    /// Whether the request asks for the customised prompt.
    pub fn is_customized(&self) -> bool {
        self.experience_level.is_some() || !self.equipment.is_empty()
    }
}
