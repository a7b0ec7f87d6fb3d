//! HTTP API server.
//!
//! Exposes course recommendation, FAQ lookup and grounded answering as JSON
//! endpoints.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::BuddyError;
use crate::orchestrator::Orchestrator;
use crate::rag::{CourseRecommendation, FaqLookup, RagResponse};
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

/// Build the API router.
pub fn router(state: Arc<AppState>, enable_cors: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/recommend-courses", post(recommend_courses))
        .route("/faq", post(faq))
        .route("/retrieve-faq-and-respond", post(retrieve_faq_and_respond))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app.layer(cors)
    } else {
        app
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    // Every service handle must be ready before accepting traffic.
    let orchestrator = Orchestrator::new(&settings)?;
    orchestrator.check_ready().await?;
    let state = Arc::new(AppState { orchestrator });
    let app = router(state, settings.server.enable_cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Learning Buddy API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Recommend", "POST /recommend-courses");
    Output::kv("FAQ", "POST /faq");
    Output::kv("Ask (RAG)", "POST /retrieve-faq-and-respond");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down..."),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down..."),
    }
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct RecommendRequest {
    #[serde(rename = "interestedAreas")]
    interested_areas: Vec<String>,
}

#[derive(Deserialize)]
struct FaqRequest {
    question: String,
}

#[derive(Deserialize)]
struct QueryRequest {
    query: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

/// Maps pipeline errors onto status codes: caller mistakes are 400,
/// everything else is a generic 500 carrying the cause.
struct ApiError(BuddyError);

impl From<BuddyError> for ApiError {
    fn from(err: BuddyError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match &self.0 {
            BuddyError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message.clone()),
            other => (StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
        };
        (status, Json(ErrorResponse { detail })).into_response()
    }
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

async fn recommend_courses(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> Result<Json<Vec<CourseRecommendation>>, ApiError> {
    let groups = state
        .orchestrator
        .recommend_courses(&req.interested_areas)
        .await?;
    Ok(Json(groups))
}

async fn faq(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FaqRequest>,
) -> Result<Json<FaqLookup>, ApiError> {
    Ok(Json(state.orchestrator.lookup_faq(&req.question).await?))
}

async fn retrieve_faq_and_respond(
    State(state): State<Arc<AppState>>,
    Json(req): Json<QueryRequest>,
) -> Result<Json<RagResponse>, ApiError> {
    Ok(Json(state.orchestrator.answer(&req.query).await?))
}
