//! HTTP handlers

pub mod curses;
pub mod leaderboard;

use crate::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use curse_core::{BackendKind, StorageFailure, ValidationError};
use serde::Serialize;
use thiserror::Error;

/// Errors a handler can return to the client
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Storage(#[from] StorageFailure),

    #[error("unreadable request body: {0}")]
    Body(#[from] serde_json::Error),
}

fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: "Erreur du serveur".to_string(),
        }),
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(e) => (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
                .into_response(),
            ApiError::Storage(e) => {
                // Details stay in the log
                tracing::error!("Storage failure: {}", e);
                server_error()
            }
            ApiError::Body(e) => {
                tracing::warn!("Rejected request: {}", e);
                server_error()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    backend: BackendKind,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        backend: state.store.kind(),
    })
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::storage::MemoryStore;
    use crate::{router, AppState};
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::Router;
    use curse_core::{
        BackendKind, Curse, CurseStore, LeaderboardEntry, Result, StorageFailure,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    /// A store whose medium is always down
    pub struct BrokenStore;

    #[async_trait]
    impl CurseStore for BrokenStore {
        fn kind(&self) -> BackendKind {
            BackendKind::Relational
        }

        async fn add_curse(&self, _: &str, _: &str) -> Result<Curse> {
            Err(StorageFailure::Database(
                "connection refused: postgres://admin:secret@db".to_string(),
            ))
        }

        async fn get_recent_curses(&self, _: usize) -> Result<Vec<Curse>> {
            Err(StorageFailure::Database("connection refused".to_string()))
        }

        async fn get_curses_for_target(&self, _: &str) -> Result<Vec<Curse>> {
            Err(StorageFailure::Database("connection refused".to_string()))
        }

        async fn get_leaderboard(&self, _: usize) -> Result<Vec<LeaderboardEntry>> {
            Err(StorageFailure::Database("connection refused".to_string()))
        }
    }

    pub fn memory_app() -> (Router, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let app = router(AppState {
            store: store.clone(),
        });
        (app, store)
    }

    pub fn broken_app() -> Router {
        router(AppState {
            store: Arc::new(BrokenStore),
        })
    }

    pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    pub fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn post_raw(uri: &str, body: &'static str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::from(body))
            .unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health_reports_backend() {
        let (app, _) = memory_app();
        let (status, body) = send(app, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["backend"], "in_memory");
    }
}
