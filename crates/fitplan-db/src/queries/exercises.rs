//! Database query functions for the `exercises` catalog.
//!
//! All queries are read-only. Text columns other than `id` that the catalog
//! may leave NULL are coalesced to the empty string so every row decodes into
//! an [`Exercise`].

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::models::Exercise;

/// Columns returned by the catalog listing and the target search.
const SUMMARY_COLUMNS: &str = "id, \
     COALESCE(name, '') AS name, \
     COALESCE(bodypart, '') AS bodypart, \
     COALESCE(target, '') AS target, \
     COALESCE(equipment, '') AS equipment";

/// List every exercise with the reduced field set (id, name, body part,
/// target, equipment).
pub async fn list_exercises(pool: &PgPool) -> Result<Vec<Exercise>> {
    let query = format!("SELECT {SUMMARY_COLUMNS} FROM exercises");
    let exercises = sqlx::query_as::<_, Exercise>(&query)
        .fetch_all(pool)
        .await
        .context("failed to list exercises")?;

    Ok(exercises)
}

/// Fetch full records for every exercise whose id is in `ids`.
///
/// Row order is whatever the database returns. Ids with no matching row are
/// skipped; an empty `ids` slice returns an empty list without a round trip.
pub async fn get_exercises_by_ids(pool: &PgPool, ids: &[String]) -> Result<Vec<Exercise>> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let exercises = sqlx::query_as::<_, Exercise>(
        "SELECT id, \
                COALESCE(name, '') AS name, \
                COALESCE(bodypart, '') AS bodypart, \
                COALESCE(target, '') AS target, \
                COALESCE(equipment, '') AS equipment, \
                othermuscleslist, instructionslist, gifurl, gifid \
         FROM exercises \
         WHERE id = ANY($1::text[])",
    )
    .bind(ids)
    .fetch_all(pool)
    .await
    .context("failed to fetch exercises by id")?;

    Ok(exercises)
}

/// Find exercises whose target or body part contains `target`,
/// case-insensitively. Returns the reduced field set.
pub async fn search_exercises_by_target(pool: &PgPool, target: &str) -> Result<Vec<Exercise>> {
    let pattern = format!("%{}%", escape_like(target));
    let query = format!(
        "SELECT {SUMMARY_COLUMNS} FROM exercises \
         WHERE target ILIKE $1 OR bodypart ILIKE $1 \
         ORDER BY name"
    );
    let exercises = sqlx::query_as::<_, Exercise>(&query)
        .bind(pattern)
        .fetch_all(pool)
        .await
        .with_context(|| format!("failed to search exercises for target {target:?}"))?;

    Ok(exercises)
}

/// Escape `LIKE` wildcards so user input matches literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
