// src/error.rs
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode as AxumStatusCode;
use axum::response::{IntoResponse, Json};
use thiserror::Error;
use tracing::error;

use crate::ess_client::EssError;
use crate::timesheet::ExportError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("Missing bearer token")]
    MissingToken,
    #[error("ESS API client error: {0}")]
    Ess(#[from] EssError),
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

impl AppError {
    pub fn status_code(&self) -> AxumStatusCode {
        match self {
            AppError::Validation(_) => AxumStatusCode::BAD_REQUEST,
            AppError::MissingToken => AxumStatusCode::UNAUTHORIZED,
            AppError::Ess(ess_err) => match ess_err {
                EssError::LoginFailed { .. } => AxumStatusCode::UNAUTHORIZED,
                EssError::FetchFailed { status, .. } => {
                    AxumStatusCode::from_u16(status.as_u16())
                        .ok()
                        .filter(|s| s.is_client_error() || s.is_server_error())
                        .unwrap_or(AxumStatusCode::BAD_GATEWAY)
                }
                EssError::Request(_) | EssError::Json(_) => AxumStatusCode::BAD_GATEWAY,
                EssError::UrlParse(_) => AxumStatusCode::INTERNAL_SERVER_ERROR,
            },
            AppError::Export(export_err) => match export_err {
                ExportError::MalformedDate(_) => AxumStatusCode::UNPROCESSABLE_ENTITY,
                ExportError::ProjectNotFound(_) => AxumStatusCode::NOT_FOUND,
                ExportError::InvalidDurationRange { .. } => AxumStatusCode::BAD_REQUEST,
                ExportError::Xlsx(_) => AxumStatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::MissingToken => {
                "Authorization header with a Bearer token is required.".to_string()
            }
            AppError::Ess(EssError::LoginFailed { status, .. }) => {
                format!("Login failed (status {}).", status.as_u16())
            }
            AppError::Ess(EssError::FetchFailed { status, .. }) => format!(
                "Failed to fetch data from ESS (status {}).",
                status.as_u16()
            ),
            AppError::Ess(EssError::Request(_)) => "Failed to connect to ESS API.".to_string(),
            AppError::Ess(EssError::Json(_)) => "ESS API returned a malformed payload.".to_string(),
            AppError::Ess(EssError::UrlParse(_)) => {
                "Internal server error (ESS URL config).".to_string()
            }
            AppError::Export(ExportError::Xlsx(_)) => {
                "Internal server error (spreadsheet).".to_string()
            }
            AppError::Export(export_err) => export_err.to_string(),
        }
    }
}

// Extractor rejections surface as validation errors.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        error!("Error occurred: {:?}", self);
        let status_code = self.status_code();
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status_code, body).into_response()
    }
}
