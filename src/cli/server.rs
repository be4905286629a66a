//! HTTP server mode exposing the fetch and transform-load stages

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::cli::context::AppContext;
use crate::error::{Error, ErrorKind, Result};
use crate::types::{FetchRequest, InvocationInput, JsonValue};

/// Failed request: `{errorType, errorMessage}` with a matching status code
struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.kind() {
            ErrorKind::Config => StatusCode::BAD_REQUEST,
            ErrorKind::UnknownDataset | ErrorKind::ObjectNotFound => StatusCode::NOT_FOUND,
            ErrorKind::AccessDenied => StatusCode::FORBIDDEN,
            ErrorKind::MalformedInput | ErrorKind::SchemaViolation => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorKind::FetchFailure | ErrorKind::Storage | ErrorKind::PublishFailure => {
                StatusCode::BAD_GATEWAY
            }
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!(error = %self.0, status = status.as_u16(), "Request failed");
        (status, Json(self.0.to_failure_json())).into_response()
    }
}

/// Build the router
pub fn router(context: AppContext) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/datasets", get(list_datasets))
        .route("/run", post(run))
        .route("/fetch", post(fetch))
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(context))
}

/// Start the HTTP server
pub async fn serve(context: AppContext, port: u16) -> Result<()> {
    let app = router(context);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Starting HTTP server on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| Error::config(format!("Failed to bind to port {port}: {e}")))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| Error::config(format!("Server error: {e}")))?;

    Ok(())
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_datasets(State(context): State<Arc<AppContext>>) -> impl IntoResponse {
    Json(context.pipeline().registry().summaries())
}

/// Transform-load one raw object; accepts a bare or `Payload`-wrapped event
async fn run(
    State(context): State<Arc<AppContext>>,
    Json(event): Json<JsonValue>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let input = InvocationInput::from_event(event)?;
    let output = context.pipeline().run(&input).await?;
    Ok(Json(output))
}

/// Fetch a source URL into the raw bucket
async fn fetch(
    State(context): State<Arc<AppContext>>,
    Json(event): Json<JsonValue>,
) -> std::result::Result<impl IntoResponse, ApiError> {
    let request: FetchRequest = serde_json::from_value(event)
        .map_err(|e| Error::config(format!("Invalid fetch request: {e}")))?;
    let input = context.fetcher().fetch(&request).await?;
    Ok(Json(input))
}
