//! The `ExerciseStore` trait -- read access to the exercise catalog.
//!
//! The service depends on this trait rather than on a pool directly so that
//! handlers can be exercised against in-memory catalogs in tests.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

use fitplan_db::models::Exercise;
use fitplan_db::queries::exercises as exercise_db;

/// The catalog could not be read (connectivity or query failure).
#[derive(Debug, Error)]
#[error("{0:#}")]
pub struct StoreError(pub anyhow::Error);

impl From<anyhow::Error> for StoreError {
    fn from(err: anyhow::Error) -> Self {
        Self(err)
    }
}

/// Read-only view of the exercise catalog.
#[async_trait]
pub trait ExerciseStore: Send + Sync {
    /// Every exercise, with the reduced field set.
    async fn all_exercises(&self) -> Result<Vec<Exercise>, StoreError>;

    /// Full records for the given ids. Unknown ids produce no row; order is
    /// unspecified.
    async fn exercises_by_ids(&self, ids: &[String]) -> Result<Vec<Exercise>, StoreError>;

    /// Exercises whose target or body part contains `target`.
    async fn exercises_by_target(&self, target: &str) -> Result<Vec<Exercise>, StoreError>;
}

const _: () = {
    fn _assert_object_safe(_: &dyn ExerciseStore) {}
};

/// [`ExerciseStore`] backed by the PostgreSQL catalog.
#[derive(Debug, Clone)]
pub struct PgExerciseStore {
    pool: PgPool,
}

impl PgExerciseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExerciseStore for PgExerciseStore {
    async fn all_exercises(&self) -> Result<Vec<Exercise>, StoreError> {
        Ok(exercise_db::list_exercises(&self.pool).await?)
    }

    async fn exercises_by_ids(&self, ids: &[String]) -> Result<Vec<Exercise>, StoreError> {
        Ok(exercise_db::get_exercises_by_ids(&self.pool, ids).await?)
    }

    async fn exercises_by_target(&self, target: &str) -> Result<Vec<Exercise>, StoreError> {
        Ok(exercise_db::search_exercises_by_target(&self.pool, target).await?)
    }
}
