//! Workout service: the request pipeline behind the HTTP handlers.
//!
//! Fetch catalog, generate, collect referenced ids, fetch their details,
//! enrich. Each step is timed and logged. Nothing is cached; every request
//! reads the catalog again.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{error, info};

use fitplan_db::models::Exercise;

use crate::catalog::{ExerciseStore, StoreError};
use crate::generation::{PlanError, PlanGenerator};
use crate::plan::{EnrichedPlan, enrich, extract_referenced_ids};
use crate::request::PlanRequest;

/// Why a plan could not be produced.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("No exercises found in database")]
    EmptyCatalog,

    #[error(transparent)]
    Plan(#[from] PlanError),
}

/// A finished plan and when it was produced.
#[derive(Debug, Clone)]
pub struct GeneratedPlan {
    pub plan: EnrichedPlan,
    pub generated_at: DateTime<Utc>,
}

/// Explicitly constructed service shared by all request handlers.
#[derive(Clone)]
pub struct WorkoutService {
    store: Arc<dyn ExerciseStore>,
    generator: PlanGenerator,
}

impl WorkoutService {
    pub fn new(store: Arc<dyn ExerciseStore>, generator: PlanGenerator) -> Self {
        Self { store, generator }
    }

    /// Run the full generation pipeline for a validated request.
    pub async fn generate(&self, request: &PlanRequest) -> Result<GeneratedPlan, ServiceError> {
        let started = Instant::now();
        let result = self.run_pipeline(request).await;
        match &result {
            Ok(_) => info!(
                target_muscle = %request.target_muscle,
                elapsed_ms = elapsed_ms(started),
                "workout plan generated"
            ),
            Err(e) => error!(
                target_muscle = %request.target_muscle,
                elapsed_ms = elapsed_ms(started),
                error = %e,
                "workout plan generation failed"
            ),
        }
        result
    }

    async fn run_pipeline(&self, request: &PlanRequest) -> Result<GeneratedPlan, ServiceError> {
        let step = Instant::now();
        let catalog = self.store.all_exercises().await?;
        info!(
            count = catalog.len(),
            elapsed_ms = elapsed_ms(step),
            "fetched exercise catalog"
        );
        if catalog.is_empty() {
            return Err(ServiceError::EmptyCatalog);
        }

        let step = Instant::now();
        let provisional = self.generator.generate_plan(request, &catalog).await?;
        info!(
            days = provisional.plan.len(),
            elapsed_ms = elapsed_ms(step),
            "AI plan received"
        );

        let step = Instant::now();
        let ids: Vec<String> = extract_referenced_ids(&provisional).into_iter().collect();
        info!(
            unique_ids = ids.len(),
            elapsed_ms = elapsed_ms(step),
            "extracted exercise ids"
        );

        let step = Instant::now();
        let details = self.store.exercises_by_ids(&ids).await?;
        info!(
            found = details.len(),
            requested = ids.len(),
            elapsed_ms = elapsed_ms(step),
            "fetched exercise details"
        );

        let step = Instant::now();
        let plan = enrich(&provisional, &details);
        info!(elapsed_ms = elapsed_ms(step), "enriched plan");

        Ok(GeneratedPlan {
            plan,
            generated_at: Utc::now(),
        })
    }

    /// Look up a single exercise by id.
    pub async fn exercise(&self, id: &str) -> Result<Option<Exercise>, StoreError> {
        let started = Instant::now();
        let found = self
            .store
            .exercises_by_ids(&[id.to_owned()])
            .await?
            .into_iter()
            .next();
        info!(
            id,
            found = found.is_some(),
            elapsed_ms = elapsed_ms(started),
            "exercise lookup"
        );
        Ok(found)
    }

    /// The whole catalog, or the exercises matching `target` when given.
    pub async fn exercises(&self, target: Option<&str>) -> Result<Vec<Exercise>, StoreError> {
        match target.map(str::trim).filter(|t| !t.is_empty()) {
            Some(target) => self.store.exercises_by_target(target).await,
            None => self.store.all_exercises().await,
        }
    }
}

fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
