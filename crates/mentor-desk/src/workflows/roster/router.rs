use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::RosterKind;
use super::outcome::{export_failed_credentials, ImportFailure, FAILED_CREDENTIALS_FILE_NAME};
use super::progress::ImportProgress;
use super::repository::{AccountStore, CredentialNotifier};
use super::service::RosterImportService;
use super::template::{template_csv, template_file_name};

/// Shared handler state: the import service plus the per-row progress boards it feeds.
pub struct RosterRouterState<S, N> {
    pub service: Arc<RosterImportService<S, N>>,
    pub progress: Arc<ImportProgress>,
}

impl<S, N> Clone for RosterRouterState<S, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            progress: Arc::clone(&self.progress),
        }
    }
}

/// Router builder exposing roster import, template and export endpoints.
pub fn roster_router<S, N>(service: Arc<RosterImportService<S, N>>) -> Router
where
    S: AccountStore + 'static,
    N: CredentialNotifier + 'static,
{
    let state = RosterRouterState {
        service,
        progress: Arc::new(ImportProgress::default()),
    };

    Router::new()
        .route(
            "/api/v1/roster/failures/export",
            post(export_failures_handler),
        )
        .route("/api/v1/roster/:kind/import", post(import_handler::<S, N>))
        .route("/api/v1/roster/:kind/template", get(template_handler))
        .route("/api/v1/roster/:kind/progress", get(progress_handler::<S, N>))
        .with_state(state)
}

fn unknown_kind(raw: &str) -> Response {
    let payload = json!({
        "error": format!("unknown roster kind '{raw}'"),
    });
    (StatusCode::NOT_FOUND, Json(payload)).into_response()
}

fn csv_attachment(file_name: &str, body: String) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response()
}

pub(crate) async fn import_handler<S, N>(
    State(state): State<RosterRouterState<S, N>>,
    Path(kind): Path<String>,
    body: Bytes,
) -> Response
where
    S: AccountStore + 'static,
    N: CredentialNotifier + 'static,
{
    let Ok(kind) = RosterKind::from_str(&kind) else {
        return unknown_kind(&kind);
    };

    let board = state.progress.board(kind);
    board.clear();

    match state.service.import_reader(kind, &body[..], board).await {
        Ok(outcome) => {
            let summary = outcome.summary();
            let payload = json!({
                "kind": kind,
                "outcome": outcome,
                "summary": summary,
            });
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(error) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }
    }
}

pub(crate) async fn template_handler(Path(kind): Path<String>) -> Response {
    match RosterKind::from_str(&kind) {
        Ok(kind) => csv_attachment(&template_file_name(kind), template_csv(kind).to_string()),
        Err(_) => unknown_kind(&kind),
    }
}

pub(crate) async fn progress_handler<S, N>(
    State(state): State<RosterRouterState<S, N>>,
    Path(kind): Path<String>,
) -> Response
where
    S: AccountStore + 'static,
    N: CredentialNotifier + 'static,
{
    let Ok(kind) = RosterKind::from_str(&kind) else {
        return unknown_kind(&kind);
    };

    let payload = json!({
        "kind": kind,
        "rows": state.progress.board(kind).snapshot(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExportFailuresRequest {
    pub(crate) failures: Vec<ImportFailure>,
}

pub(crate) async fn export_failures_handler(
    Json(request): Json<ExportFailuresRequest>,
) -> Response {
    csv_attachment(
        FAILED_CREDENTIALS_FILE_NAME,
        export_failed_credentials(&request.failures),
    )
}
