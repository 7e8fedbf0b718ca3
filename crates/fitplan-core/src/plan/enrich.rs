//! Joining model-chosen exercise ids back to catalog records.

use std::collections::{BTreeSet, HashMap};

use fitplan_db::models::Exercise;

use super::types::{EnrichedAssignment, EnrichedDay, EnrichedPlan, ProvisionalPlan};

/// Every exercise id referenced anywhere in the plan, duplicates collapsed.
pub fn extract_referenced_ids(plan: &ProvisionalPlan) -> BTreeSet<String> {
    plan.plan
        .iter()
        .flat_map(|day| day.exercises.iter())
        .map(|assignment| assignment.exercise_id.clone())
        .collect()
}

/// Build the response plan, attaching each assignment's catalog record.
///
/// Assignments whose id is not in `details` get `details: None`. When
/// `details` holds the same id twice the later record wins. Neither input is
/// modified.
pub fn enrich(plan: &ProvisionalPlan, details: &[Exercise]) -> EnrichedPlan {
    let by_id: HashMap<&str, &Exercise> = details.iter().map(|ex| (ex.id.as_str(), ex)).collect();

    let days = plan
        .plan
        .iter()
        .map(|day| EnrichedDay {
            day: day.day,
            day_name: day.day_name.clone(),
            exercises: day
                .exercises
                .iter()
                .map(|assignment| EnrichedAssignment {
                    assignment: assignment.clone(),
                    details: by_id
                        .get(assignment.exercise_id.as_str())
                        .map(|ex| (*ex).clone()),
                })
                .collect(),
            extra: day.extra.clone(),
        })
        .collect();

    EnrichedPlan {
        plan: days,
        extra: plan.extra.clone(),
    }
}
