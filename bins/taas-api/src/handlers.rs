// HTTP route handlers for the TaaS API.
// The only place pipeline failures become status codes.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use taas_common::error::PipelineError;
use taas_common::types::{GenerateTestRequest, TestFileInfo};
use tracing::{error, info};

use crate::metrics;
use crate::AppState;

/// POST /api/v1/generate-test - Run the full generation pipeline
pub async fn generate_test(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<GenerateTestRequest>,
) -> impl IntoResponse {
    match state.pipeline.run(&payload).await {
        Ok(response) => {
            info!(test_file = %response.test_file, "Generation succeeded");
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(PipelineError::Input(reason)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": reason,
            })),
        )
            .into_response(),
        Err(PipelineError::Validation(validation)) => (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({
                "success": false,
                "error": "Generated code failed validation",
                "validation": validation,
            })),
        )
            .into_response(),
        Err(e @ (PipelineError::Generation(_) | PipelineError::Persistence(_))) => {
            error!(error = %e, "Pipeline failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /api/v1/tests - List persisted test files
pub async fn list_tests(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.pipeline.store();

    let names = match store.list().await {
        Ok(names) => names,
        Err(e) => {
            error!(error = %e, "Failed to list test files");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "success": false,
                    "error": format!("Failed to list test files: {}", e),
                })),
            )
                .into_response();
        }
    };

    let mut tests = Vec::with_capacity(names.len());
    for file_name in names {
        let path = store.dir().join(&file_name);
        if let Ok(meta) = tokio::fs::metadata(&path).await {
            let modified_at = meta
                .modified()
                .map(DateTime::<Utc>::from)
                .unwrap_or_else(|_| Utc::now());
            tests.push(TestFileInfo {
                file_name,
                path,
                size_bytes: meta.len(),
                modified_at,
            });
        }
    }

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "success": true,
            "tests": tests,
        })),
    )
        .into_response()
}

/// GET /health - Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "service": "taas-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics - Prometheus exposition
pub async fn metrics_endpoint() -> impl IntoResponse {
    metrics::render()
}
