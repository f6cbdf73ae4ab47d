//! HTTP surface for nebula-api.
//!
//! JSON in, JSON out.  Every route delegates to an [`interaction`](crate::interaction)
//! operation and maps [`InteractionError`] onto a status code with an `{ error }` body.

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, instrument};

use crate::{
    base::types::{AssignPayload, IngestPayload, ValidationError},
    interaction::{self, InteractionError},
    runtime::Runtime,
};

/// Build the application router over a runtime.
pub fn router(runtime: Runtime) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/tickets", get(list_tickets))
        .route("/tickets/ingest", post(ingest_ticket))
        .route("/tickets/{id}/assign", post(assign_ticket))
        .route("/technicians", get(list_technicians))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(runtime)
}

// Handlers.

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}

#[instrument(skip_all)]
async fn list_tickets(State(runtime): State<Runtime>) -> Result<Json<interaction::listing::TicketList>, InteractionError> {
    Ok(Json(interaction::listing::list_tickets(&runtime.db).await?))
}

#[instrument(skip_all)]
async fn ingest_ticket(State(runtime): State<Runtime>, payload: Result<Json<IngestPayload>, JsonRejection>) -> Result<Response, InteractionError> {
    let Json(payload) = payload.map_err(rejection_to_validation)?;

    let ingested = interaction::ingest::ingest_ticket(payload, &runtime.db, &runtime.llm).await?;

    Ok((StatusCode::CREATED, Json(ingested)).into_response())
}

#[instrument(skip_all)]
async fn list_technicians(State(runtime): State<Runtime>) -> Result<Json<interaction::listing::TechnicianList>, InteractionError> {
    Ok(Json(interaction::listing::list_technicians(&runtime.db).await?))
}

#[instrument(skip_all)]
async fn assign_ticket(
    State(runtime): State<Runtime>,
    Path(id): Path<String>,
    payload: Result<Json<AssignPayload>, JsonRejection>,
) -> Result<Json<interaction::assign::AssignedTicket>, InteractionError> {
    let Json(payload) = payload.map_err(rejection_to_validation)?;

    Ok(Json(interaction::assign::assign_ticket(&id, payload, &runtime.db, &runtime.notify).await?))
}

// Errors.

fn rejection_to_validation(rejection: JsonRejection) -> InteractionError {
    InteractionError::Validation(ValidationError::new(rejection.body_text()))
}

impl IntoResponse for InteractionError {
    fn into_response(self) -> Response {
        let status = match &self {
            InteractionError::Validation(_) => StatusCode::BAD_REQUEST,
            InteractionError::NotFound(_) => StatusCode::NOT_FOUND,
            InteractionError::Store(err) => {
                error!("Store error: {err:#}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
