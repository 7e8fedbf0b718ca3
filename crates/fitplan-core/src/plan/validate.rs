//! Structural checks on a parsed plan before it is enriched.
//!
//! The model is asked for strict JSON but nothing forces it to comply.
//! Serde already rejects missing or mistyped fields; this module rejects
//! plans that parse but cannot be a weekly schedule, and logs softer
//! deviations from the prompt's ranges.

use thiserror::Error;
use tracing::warn;

use super::types::ProvisionalPlan;

/// Exercises per day the prompt asks for.
pub const EXERCISES_PER_DAY: std::ops::RangeInclusive<usize> = 4..=6;
/// Sets per exercise the prompt asks for.
pub const SETS_RANGE: std::ops::RangeInclusive<u32> = 3..=5;
/// Rest between sets the prompt asks for, in seconds.
pub const REST_SECONDS_RANGE: std::ops::RangeInclusive<u32> = 30..=90;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlanValidationError {
    #[error("expected {expected} days, got {actual}")]
    WrongDayCount { expected: usize, actual: usize },

    #[error("day {day} has no exercises")]
    EmptyDay { day: u32 },

    #[error("day {day} has an exercise with an empty exercise_id")]
    EmptyExerciseId { day: u32 },
}

/// Reject plans that are structurally unusable.
///
/// Out-of-range exercise counts, sets or rest periods are logged at `warn`
/// but do not fail the plan.
pub fn validate_plan(plan: &ProvisionalPlan, expected_days: usize) -> Result<(), PlanValidationError> {
    if plan.plan.len() != expected_days {
        return Err(PlanValidationError::WrongDayCount {
            expected: expected_days,
            actual: plan.plan.len(),
        });
    }

    for day in &plan.plan {
        if day.exercises.is_empty() {
            return Err(PlanValidationError::EmptyDay { day: day.day });
        }
        if !EXERCISES_PER_DAY.contains(&day.exercises.len()) {
            warn!(
                day = day.day,
                count = day.exercises.len(),
                "plan day outside requested exercise count"
            );
        }
        for assignment in &day.exercises {
            if assignment.exercise_id.trim().is_empty() {
                return Err(PlanValidationError::EmptyExerciseId { day: day.day });
            }
            if !SETS_RANGE.contains(&assignment.sets)
                || !REST_SECONDS_RANGE.contains(&assignment.rest_seconds)
            {
                warn!(
                    day = day.day,
                    exercise_id = %assignment.exercise_id,
                    sets = assignment.sets,
                    rest_seconds = assignment.rest_seconds,
                    "plan exercise outside requested sets/rest range"
                );
            }
        }
    }

    Ok(())
}
