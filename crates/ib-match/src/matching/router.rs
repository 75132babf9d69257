use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::ProgramId;
use super::evaluation::MatchResult;
use super::profile::RawCandidateInput;
use super::repository::{ProgramRepository, RepositoryError};
use super::search::{CatalogFilter, SearchOptions};
use super::service::{MatchingService, MatchingServiceError};

/// Body of a catalog-wide match request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub profile: RawCandidateInput,
    #[serde(default)]
    pub filter: CatalogFilter,
    #[serde(flatten)]
    pub options: SearchOptions,
}

#[derive(Debug, Clone, Serialize)]
pub struct MatchResponse {
    pub count: usize,
    pub results: Vec<MatchResult>,
}

/// Router builder exposing the search and single-program evaluation endpoints.
pub fn matching_router<R>(service: Arc<MatchingService<R>>) -> Router
where
    R: ProgramRepository + 'static,
{
    Router::new()
        .route("/api/v1/matches", post(search_handler::<R>))
        .route("/api/v1/programs/:program_id", get(program_handler::<R>))
        .route(
            "/api/v1/programs/:program_id/eligibility",
            post(eligibility_handler::<R>),
        )
        .with_state(service)
}

pub(crate) async fn search_handler<R>(
    State(service): State<Arc<MatchingService<R>>>,
    axum::Json(request): axum::Json<MatchRequest>,
) -> Response
where
    R: ProgramRepository + 'static,
{
    // CPU-bound ranking runs off the async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        service.search(request.profile, &request.filter, &request.options)
    })
    .await;

    match outcome {
        Ok(Ok(results)) => {
            let response = MatchResponse {
                count: results.len(),
                results,
            };
            (StatusCode::OK, axum::Json(response)).into_response()
        }
        Ok(Err(error)) => error_response(error),
        Err(join_error) => {
            error!(error = %join_error, "programme search task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                axum::Json(json!({ "error": "programme search failed" })),
            )
                .into_response()
        }
    }
}

pub(crate) async fn eligibility_handler<R>(
    State(service): State<Arc<MatchingService<R>>>,
    Path(program_id): Path<String>,
    axum::Json(profile): axum::Json<RawCandidateInput>,
) -> Response
where
    R: ProgramRepository + 'static,
{
    match service.evaluate(profile, &ProgramId(program_id)) {
        Ok(result) => (StatusCode::OK, axum::Json(result)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn program_handler<R>(
    State(service): State<Arc<MatchingService<R>>>,
    Path(program_id): Path<String>,
) -> Response
where
    R: ProgramRepository + 'static,
{
    match service.program(&ProgramId(program_id)) {
        Ok(program) => (StatusCode::OK, axum::Json(program)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MatchingServiceError) -> Response {
    let status = match &error {
        MatchingServiceError::Profile(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchingServiceError::UnknownProgram(_)
        | MatchingServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        MatchingServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        MatchingServiceError::Cancelled(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
