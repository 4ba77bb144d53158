// src/handlers.rs
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::ess_client::EssClient;
use crate::ess_data::{AuthenticateRequest, LogConverterRequest, LoginResponse};
use crate::error::AppError;
use crate::timesheet::{build_sheet, ExportParams, SheetOptions};
use crate::xlsx::{write_xlsx, XLSX_CONTENT_TYPE};

pub const EXPORT_FILE_NAME: &str = "timesheet.xlsx";

#[derive(Clone)]
pub struct AppState {
    pub ess_client: EssClient,
    pub sheet_options: Arc<SheetOptions>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectListQuery {
    pub employee_id: String,
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/auth/login", post(handle_login))
        .route("/log-converter", post(handle_log_converter))
        .route("/projects", get(handle_project_list));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_login(
    State(state): State<AppState>,
    payload: Result<Json<AuthenticateRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, AppError> {
    info!("Handling /api/auth/login request...");
    let Json(input) = payload?;
    input.validate().map_err(AppError::Validation)?;
    let login = state
        .ess_client
        .login(&input.username, &input.password)
        .await?;
    Ok(Json(login))
}

impl From<&LogConverterRequest> for ExportParams {
    fn from(input: &LogConverterRequest) -> Self {
        ExportParams {
            project_filter: input.project_name.clone(),
            is_randomize_duration: input.randomize_log.is_random,
            min_duration: input.randomize_log.min_duration,
            max_duration: input.randomize_log.max_duration,
        }
    }
}

async fn handle_log_converter(
    State(state): State<AppState>,
    payload: Result<Json<LogConverterRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload?;
    info!(
        "Handling /api/log-converter request for employee {} ({:?}/{})",
        input.employee_id, input.months, input.year
    );
    input.validate().map_err(AppError::Validation)?;

    let params = ExportParams::from(&input);
    // Reject a bad range before spending any upstream calls on it.
    params.duration_mode()?;

    let activities = state
        .ess_client
        .fetch_activities_for_months(&input.token, &input.employee_id, &input.months, input.year)
        .await?;

    let sheet = build_sheet(
        &activities,
        &params,
        &state.sheet_options,
        &mut rand::thread_rng(),
    )?;
    let bytes = write_xlsx(&sheet, &state.sheet_options)?;
    info!(
        "Export ready: {} row(s), {} bytes",
        sheet.len(),
        bytes.len()
    );

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILE_NAME),
            ),
        ],
        bytes,
    )
        .into_response())
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AppError::MissingToken)
}

async fn handle_project_list(
    State(state): State<AppState>,
    headers: HeaderMap,
    query: Result<Query<ProjectListQuery>, QueryRejection>,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_token(&headers)?;
    let Query(query) = query?;
    info!(
        "Handling /api/projects request for employee {}",
        query.employee_id
    );
    if query.employee_id.trim().is_empty() {
        return Err(AppError::Validation(
            "missing required field(s): employee_id".to_string(),
        ));
    }

    let today = chrono::Local::now().date_naive();
    let names = state
        .ess_client
        .list_projects(token, &query.employee_id, today)
        .await?;
    Ok(Json(serde_json::json!({ "data": names })))
}
