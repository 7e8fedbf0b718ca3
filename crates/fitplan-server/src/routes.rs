use std::sync::Arc;

use anyhow::Result;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router, middleware};
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use fitplan_core::plan::EnrichedPlan;
use fitplan_core::request::{PlanRequest, PlanRequestBody};
use fitplan_core::service::{ServiceError, WorkoutService};
use fitplan_db::models::Exercise;

use crate::auth::require_api_key;

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
            details: None,
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, msg)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            e @ ServiceError::EmptyCatalog => Self::internal(e.to_string()),
            other => Self::internal("Failed to generate workout plan").with_details(other.to_string()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = match self.details {
            Some(details) => serde_json::json!({ "error": self.message, "details": details }),
            None => serde_json::json!({ "error": self.message }),
        };
        (self.status, Json(body)).into_response()
    }
}

// ---------------------------------------------------------------------------
// State and response types
// ---------------------------------------------------------------------------

/// Shared by every handler. Built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WorkoutService>,
    pub api_key: Arc<str>,
}

impl AppState {
    pub fn new(service: WorkoutService, api_key: &str) -> Self {
        Self {
            service: Arc::new(service),
            api_key: Arc::from(api_key),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub data: EnrichedPlan,
    pub generated_at: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExerciseFilter {
    pub target: Option<String>,
}

fn timestamp(at: chrono::DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn build_router(state: AppState) -> Router {
    let workout = Router::new()
        .route("/generate", post(generate_plan))
        .route("/exercise/{id}", get(get_exercise))
        .route("/exercises", get(list_exercises))
        .fallback(workout_not_found)
        .layer(middleware::from_fn_with_state(state.clone(), require_api_key));

    Router::new()
        .route("/health", get(health))
        .nest("/api/workout", workout)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub async fn run_serve(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    tracing::info!("fitplan listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("fitplan shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        timestamp: timestamp(Utc::now()),
    })
}

/// Unmatched paths under `/api/workout`. Sits behind the key check, so an
/// unauthenticated caller gets 401 here too.
async fn workout_not_found() -> AppError {
    AppError::not_found("Not found")
}

async fn generate_plan(
    State(state): State<AppState>,
    payload: Result<Json<PlanRequestBody>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let Json(body) = payload.map_err(|rej| AppError::bad_request(rej.body_text()))?;
    let request = PlanRequest::try_from(body).map_err(|e| AppError::bad_request(e.to_string()))?;

    tracing::info!(
        target_muscle = %request.target_muscle,
        duration_minutes = request.duration_minutes,
        customized = request.is_customized(),
        "generating workout plan"
    );

    let generated = state.service.generate(&request).await?;
    Ok(Json(GenerateResponse {
        success: true,
        data: generated.plan,
        generated_at: timestamp(generated.generated_at),
    }))
}

async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Exercise>, AppError> {
    match state.service.exercise(&id).await {
        Ok(Some(exercise)) => Ok(Json(exercise)),
        Ok(None) => Err(AppError::not_found("Exercise not found")),
        Err(e) => {
            tracing::error!(id = %id, error = %e, "exercise lookup failed");
            Err(AppError::internal(e.to_string()))
        }
    }
}

async fn list_exercises(
    State(state): State<AppState>,
    Query(filter): Query<ExerciseFilter>,
) -> Result<Json<Vec<Exercise>>, AppError> {
    let exercises = state
        .service
        .exercises(filter.target.as_deref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "exercise listing failed");
            AppError::internal(e.to_string())
        })?;
    Ok(Json(exercises))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
