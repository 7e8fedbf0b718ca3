//! Plan shapes: what the model returns and what the API responds with.
//!
//! Fields the model adds beyond the contract (for example
//! `total_weekly_minutes` or `target_muscle`) are kept in `extra` maps and
//! written back out unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use fitplan_db::models::Exercise;

/// Repetitions: a count (`12`) or free text (`"12-15"`, `"30 seconds"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reps {
    Count(Number),
    Text(String),
}

/// One exercise slot in a day, referencing the catalog by id only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseAssignment {
    pub exercise_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exercise_name: Option<String>,
    pub sets: u32,
    pub reps: Reps,
    pub rest_seconds: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One day of the provisional plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanDay {
    pub day: u32,
    pub day_name: String,
    pub exercises: Vec<ExerciseAssignment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The plan as parsed from the model's output, before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvisionalPlan {
    pub plan: Vec<PlanDay>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An assignment with its catalog record attached.
///
/// `details` serializes as `null` when the id had no catalog match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedAssignment {
    #[serde(flatten)]
    pub assignment: ExerciseAssignment,
    pub details: Option<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedDay {
    pub day: u32,
    pub day_name: String,
    pub exercises: Vec<EnrichedAssignment>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The plan returned to API callers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrichedPlan {
    pub plan: Vec<EnrichedDay>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
