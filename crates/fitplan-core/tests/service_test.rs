//! Tests for the workout service pipeline, using an in-memory catalog and a
//! canned model in place of PostgreSQL and Gemini.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use fitplan_core::catalog::{ExerciseStore, StoreError};
use fitplan_core::generation::{GenerationError, PlanError, PlanGenerator, TextGenerator};
use fitplan_core::request::PlanRequest;
use fitplan_core::service::{ServiceError, WorkoutService};
use fitplan_db::models::Exercise;

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryStore {
    exercises: Vec<Exercise>,
    fail: bool,
    id_lookups: Mutex<Vec<Vec<String>>>,
    full_listings: Mutex<usize>,
}

impl MemoryStore {
    fn with(exercises: Vec<Exercise>) -> Self {
        Self {
            exercises,
            ..Default::default()
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            Err(anyhow::anyhow!("connection refused").into())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ExerciseStore for MemoryStore {
    async fn all_exercises(&self) -> Result<Vec<Exercise>, StoreError> {
        self.check()?;
        *self.full_listings.lock().unwrap() += 1;
        Ok(self.exercises.clone())
    }

    async fn exercises_by_ids(&self, ids: &[String]) -> Result<Vec<Exercise>, StoreError> {
        self.check()?;
        self.id_lookups.lock().unwrap().push(ids.to_vec());
        Ok(self
            .exercises
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    async fn exercises_by_target(&self, target: &str) -> Result<Vec<Exercise>, StoreError> {
        self.check()?;
        let needle = target.to_lowercase();
        Ok(self
            .exercises
            .iter()
            .filter(|e| e.target.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

struct CannedModel {
    reply: String,
    calls: Mutex<usize>,
}

impl CannedModel {
    fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(0),
        }
    }
}

#[async_trait]
impl TextGenerator for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.reply.clone())
    }
}

struct DownModel;

#[async_trait]
impl TextGenerator for DownModel {
    fn name(&self) -> &str {
        "down"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Api {
            status: 503,
            message: "model overloaded".into(),
        })
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn exercise(id: &str, name: &str) -> Exercise {
    Exercise {
        id: id.into(),
        name: name.into(),
        body_part: "chest".into(),
        target: "pectorals".into(),
        equipment: "body weight".into(),
        other_muscles: Some(vec!["triceps".into()]),
        instructions: Some(vec!["Lower.".into(), "Press.".into()]),
        gif_url: None,
        gif_id: None,
    }
}

fn catalog() -> Vec<Exercise> {
    vec![
        exercise("0001", "push-up"),
        exercise("0002", "dip"),
        exercise("0003", "bench press"),
    ]
}

/// A seven-day reply that reuses ids across days and references one id the
/// catalog does not have.
fn week_reply() -> String {
    let days: Vec<serde_json::Value> = (1..=7)
        .map(|d| {
            serde_json::json!({
                "day": d,
                "day_name": format!("Day {d}"),
                "exercises": [
                    {"exercise_id": "0001", "sets": 3, "reps": "12", "rest_seconds": 45},
                    {"exercise_id": "0002", "sets": 3, "reps": "10", "rest_seconds": 60},
                    {"exercise_id": "0003", "sets": 4, "reps": "8", "rest_seconds": 90},
                    {"exercise_id": "ghost", "sets": 3, "reps": "30 seconds", "rest_seconds": 30}
                ]
            })
        })
        .collect();
    format!(
        "```json\n{}\n```",
        serde_json::json!({"plan": days, "total_weekly_minutes": 210, "target_muscle": "chest"})
    )
}

fn request() -> PlanRequest {
    PlanRequest::new(Some("chest"), Some(30)).unwrap()
}

fn service(store: Arc<MemoryStore>, model: Arc<dyn TextGenerator>) -> WorkoutService {
    WorkoutService::new(store, PlanGenerator::new(model))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generate_enriches_plan() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store.clone(), Arc::new(CannedModel::new(week_reply())));

    let generated = svc.generate(&request()).await.expect("pipeline should succeed");

    assert_eq!(generated.plan.plan.len(), 7);
    assert_eq!(generated.plan.extra["total_weekly_minutes"], 210);
    let monday = &generated.plan.plan[0];
    assert_eq!(
        monday.exercises[0].details.as_ref().map(|d| d.name.as_str()),
        Some("push-up")
    );
    assert_eq!(
        monday.exercises[0]
            .details
            .as_ref()
            .and_then(|d| d.instructions.as_ref())
            .map(Vec::len),
        Some(2)
    );
    assert!(monday.exercises[3].details.is_none(), "unknown id gets null details");
}

#[tokio::test]
async fn generate_looks_up_each_id_once() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store.clone(), Arc::new(CannedModel::new(week_reply())));

    svc.generate(&request()).await.unwrap();

    let lookups = store.id_lookups.lock().unwrap();
    assert_eq!(lookups.len(), 1, "details are fetched in a single call");
    let mut ids = lookups[0].clone();
    let total = ids.len();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), total, "no id is requested twice");
    assert_eq!(ids, vec!["0001", "0002", "0003", "ghost"]);
}

#[tokio::test]
async fn generate_rereads_catalog_every_request() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store.clone(), Arc::new(CannedModel::new(week_reply())));

    svc.generate(&request()).await.unwrap();
    svc.generate(&request()).await.unwrap();

    assert_eq!(*store.full_listings.lock().unwrap(), 2);
}

#[tokio::test]
async fn empty_catalog_skips_model() {
    let store = Arc::new(MemoryStore::with(vec![]));
    let model = Arc::new(CannedModel::new(week_reply()));
    let svc = service(store, model.clone());

    let err = svc.generate(&request()).await.unwrap_err();

    assert!(matches!(err, ServiceError::EmptyCatalog), "got {err:?}");
    assert_eq!(*model.calls.lock().unwrap(), 0);
}

#[tokio::test]
async fn store_failure_is_reported() {
    let store = Arc::new(MemoryStore::failing());
    let svc = service(store, Arc::new(CannedModel::new(week_reply())));

    let err = svc.generate(&request()).await.unwrap_err();

    assert!(matches!(err, ServiceError::Store(_)), "got {err:?}");
    assert_eq!(err.to_string(), "connection refused");
}

#[tokio::test]
async fn model_failure_is_generation_error() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store.clone(), Arc::new(DownModel));

    let err = svc.generate(&request()).await.unwrap_err();

    assert!(
        matches!(err, ServiceError::Plan(PlanError::Generation(_))),
        "got {err:?}"
    );
    assert!(store.id_lookups.lock().unwrap().is_empty());
}

#[tokio::test]
async fn malformed_reply_is_parse_error() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store, Arc::new(CannedModel::new("I cannot help with that.")));

    let err = svc.generate(&request()).await.unwrap_err();

    assert!(
        matches!(err, ServiceError::Plan(PlanError::Parse(_))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn exercise_lookup() {
    let store = Arc::new(MemoryStore::with(catalog()));
    let svc = service(store, Arc::new(CannedModel::new("")));

    let found = svc.exercise("0002").await.unwrap();
    assert_eq!(found.map(|e| e.name), Some("dip".to_string()));

    let missing = svc.exercise("nope").await.unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn exercises_listing_and_target_filter() {
    let mut exercises = catalog();
    exercises.push(Exercise {
        target: "abs".into(),
        ..exercise("0004", "crunch")
    });
    let store = Arc::new(MemoryStore::with(exercises));
    let svc = service(store, Arc::new(CannedModel::new("")));

    assert_eq!(svc.exercises(None).await.unwrap().len(), 4);
    assert_eq!(svc.exercises(Some("  ")).await.unwrap().len(), 4);
    let abs = svc.exercises(Some("ABS")).await.unwrap();
    assert_eq!(abs.len(), 1);
    assert_eq!(abs[0].id, "0004");
}
