//! Weekly plan types, structural validation, and enrichment.

pub mod enrich;
pub mod types;
pub mod validate;

pub use enrich::{enrich, extract_referenced_ids};
pub use types::{
    EnrichedAssignment, EnrichedDay, EnrichedPlan, ExerciseAssignment, PlanDay, ProvisionalPlan,
    Reps,
};
pub use validate::{PlanValidationError, validate_plan};
