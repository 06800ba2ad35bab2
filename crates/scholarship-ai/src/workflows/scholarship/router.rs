use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{ApplicantProfile, ScholarshipId};
use super::models::{ModelRepository, ModelScope};
use super::prediction::{PredictionService, PredictionServiceError};
use super::repository::{ApplicationHistory, ScholarshipCatalog};
use super::training::{TrainingService, TrainingServiceError};

const API_TRAINER: &str = "api";

/// Prediction and training services sharing one set of collaborators.
pub struct ScholarshipServices<C, H, R> {
    pub prediction: PredictionService<C, H, R>,
    pub training: TrainingService<C, H, R>,
}

/// Router builder exposing eligibility, probability and model lifecycle endpoints.
pub fn scholarship_router<C, H, R>(services: Arc<ScholarshipServices<C, H, R>>) -> Router
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/scholarships/:scholarship_id/eligibility",
            post(eligibility_handler::<C, H, R>),
        )
        .route(
            "/api/v1/scholarships/:scholarship_id/probability",
            post(probability_handler::<C, H, R>),
        )
        .route("/api/v1/models/:scope", get(model_state_handler::<C, H, R>))
        .route(
            "/api/v1/models/:scope/train",
            post(train_handler::<C, H, R>),
        )
        .route(
            "/api/v1/models/:scope/reset",
            post(reset_handler::<C, H, R>),
        )
        .with_state(services)
}

pub(crate) async fn eligibility_handler<C, H, R>(
    State(services): State<Arc<ScholarshipServices<C, H, R>>>,
    Path(scholarship_id): Path<String>,
    axum::Json(applicant): axum::Json<ApplicantProfile>,
) -> Response
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    let id = ScholarshipId(scholarship_id);
    match services.prediction.eligibility_check(&applicant, &id) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => prediction_error_response(error),
    }
}

pub(crate) async fn probability_handler<C, H, R>(
    State(services): State<Arc<ScholarshipServices<C, H, R>>>,
    Path(scholarship_id): Path<String>,
    axum::Json(applicant): axum::Json<ApplicantProfile>,
) -> Response
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    let id = ScholarshipId(scholarship_id);
    match services.prediction.predict(&applicant, &id) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => prediction_error_response(error),
    }
}

pub(crate) async fn train_handler<C, H, R>(
    State(services): State<Arc<ScholarshipServices<C, H, R>>>,
    Path(scope): Path<String>,
) -> Response
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    let scope = match scope.parse::<ModelScope>() {
        Ok(scope) => scope,
        Err(error) => return bad_request(error.to_string()),
    };

    let report = services.training.train_scope(&scope, API_TRAINER);
    (StatusCode::OK, axum::Json(report)).into_response()
}

pub(crate) async fn model_state_handler<C, H, R>(
    State(services): State<Arc<ScholarshipServices<C, H, R>>>,
    Path(scope): Path<String>,
) -> Response
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    let scope = match scope.parse::<ModelScope>() {
        Ok(scope) => scope,
        Err(error) => return bad_request(error.to_string()),
    };

    match services.training.model_state(&scope) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => training_error_response(error),
    }
}

pub(crate) async fn reset_handler<C, H, R>(
    State(services): State<Arc<ScholarshipServices<C, H, R>>>,
    Path(scope): Path<String>,
) -> Response
where
    C: ScholarshipCatalog + 'static,
    H: ApplicationHistory + 'static,
    R: ModelRepository + 'static,
{
    let scope = match scope.parse::<ModelScope>() {
        Ok(scope) => scope,
        Err(error) => return bad_request(error.to_string()),
    };

    match services.training.reset(&scope) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => training_error_response(error),
    }
}

fn prediction_error_response(error: PredictionServiceError) -> Response {
    let status = match &error {
        PredictionServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PredictionServiceError::ScholarshipNotFound(_) => StatusCode::NOT_FOUND,
        PredictionServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn training_error_response(error: TrainingServiceError) -> Response {
    let status = match &error {
        TrainingServiceError::ScholarshipNotFound(_) => StatusCode::NOT_FOUND,
        TrainingServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

fn bad_request(message: String) -> Response {
    let payload = json!({
        "error": message,
    });
    (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
}
