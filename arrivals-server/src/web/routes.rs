//! HTTP route handlers.

use askama::Template;
use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse},
    routing::get,
};
use tower_http::services::ServeDir;
use tracing::{error, warn};

use super::dto::*;
use super::state::AppState;
use super::templates::*;

/// Create the application router.
///
/// `static_dir` is the path to the static assets directory.
pub fn create_router(state: AppState, static_dir: &str) -> Router {
    Router::new()
        .route("/", get(index_page))
        .route("/health", get(health))
        .route("/stops", get(stops_page))
        .route("/api/trains", get(api_trains))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Arrivals board for the current snapshot.
async fn index_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let snapshot = state.snapshots.current().await;

    let html = IndexTemplate::from_snapshot(&snapshot)
        .render()
        .map_err(|e| AppError::Internal {
            message: format!("Template error: {}", e),
        })?;

    Ok(Html(html))
}

/// Stops on the route, fetched live on every request.
///
/// A failed fetch renders an empty list rather than an error page.
async fn stops_page(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let stops: Vec<StopView> = match state.mbta.fetch_route_stops().await {
        Ok(stops) => stops.iter().map(StopView::from_resource).collect(),
        Err(e) => {
            warn!("failed to fetch stops: {e}");
            Vec::new()
        }
    };

    let template = StopsTemplate {
        route: state.mbta.route_id().to_string(),
        stops,
    };
    let html = template.render().map_err(|e| AppError::Internal {
        message: format!("Template error: {}", e),
    })?;

    Ok(Html(html))
}

/// Current snapshot as JSON.
async fn api_trains(State(state): State<AppState>) -> Json<TrainsResponse> {
    let snapshot = state.snapshots.current().await;
    Json(TrainsResponse::from_snapshot(&snapshot))
}

async fn not_found(uri: Uri) -> AppError {
    AppError::NotFound {
        message: format!("no route for {}", uri.path()),
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    NotFound { message: String },
    Internal { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, "{message}");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
