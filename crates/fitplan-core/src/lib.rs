//! Workout plan generation: prompt construction, the AI client, plan
//! validation and enrichment, and the service that ties them to the
//! exercise catalog.

pub mod catalog;
pub mod generation;
pub mod plan;
pub mod prompt;
pub mod request;
pub mod service;

pub use catalog::{ExerciseStore, PgExerciseStore, StoreError};
pub use generation::{GeminiClient, GeminiConfig, GenerationError, PlanError, PlanGenerator, TextGenerator};
pub use plan::{EnrichedPlan, ProvisionalPlan, enrich, extract_referenced_ids};
pub use request::{ExperienceLevel, PlanRequest, ValidationError};
pub use service::{GeneratedPlan, ServiceError, WorkoutService};
