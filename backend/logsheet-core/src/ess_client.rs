// src/ess_client.rs

use chrono::{Datelike, NaiveDate};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::ess_data::{
    ActivityRecord, LogActResponse, LoginRequest, LoginResponse, ProjectTableResponse,
};
use crate::projects::merge_project_names;

pub const LOGIN_PATH: &str = "/auth/login";
pub const LOG_ACTIVITY_PATH: &str = "/log-act-detail-non-aj/table";
pub const PROJECTS_CURRENT_PATH: &str = "/project-assignment/table-for-home/";
pub const PROJECTS_PREVIOUS_PATH: &str = "/project-assignment/table-for-home-prev/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Error, Debug)]
pub enum EssError {
    #[error("HTTP request failed")]
    Request(#[from] reqwest::Error),

    #[error("JSON processing error")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error")]
    UrlParse(#[from] url::ParseError),

    #[error("login failed, status: {status}")]
    LoginFailed { status: StatusCode, body: String },

    #[error("fetch failed, status: {status}, body: {body}")]
    FetchFailed { status: StatusCode, body: String },
}

/// Thin client over the ESS REST API.
#[derive(Clone)]
pub struct EssClient {
    http_client: Client,
    base_url: String,
}

impl EssClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EssError> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(http_client, base_url))
    }

    fn with_client(http_client: Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint_url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, EssError> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn authorized(&self, method: Method, url: Url, token: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(ACCEPT, "application/json")
    }

    async fn send_and_deserialize<T: DeserializeOwned>(
        &self,
        request_builder: RequestBuilder,
        context_msg: &str,
    ) -> Result<T, EssError> {
        let response = request_builder.send().await.map_err(|e| {
            error!("HTTP execution failed for '{}': {}", context_msg, e);
            EssError::Request(e)
        })?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(
            "Received response for '{}': Status={}, {} bytes",
            context_msg,
            status,
            body.len()
        );

        if status != StatusCode::OK {
            let body = String::from_utf8_lossy(&body).into_owned();
            error!(
                "ESS API Error Response for '{}': Status={}, Body='{}'",
                context_msg, status, body
            );
            return Err(EssError::FetchFailed { status, body });
        }

        serde_json::from_slice::<T>(&body).map_err(|e| {
            error!("JSON deserialization failed for '{}': {}", context_msg, e);
            EssError::Json(e)
        })
    }

    // --- Auth ---

    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, EssError> {
        info!("Logging in to ESS as '{}'", username);
        let url = self.endpoint_url(LOGIN_PATH, &[])?;
        let request = self
            .http_client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            });

        match self.send_and_deserialize::<LoginResponse>(request, "login").await {
            Ok(login) => {
                info!(
                    "Login successful for employee {}",
                    login.user_info.employee_id
                );
                Ok(login)
            }
            Err(EssError::FetchFailed { status, body }) => {
                Err(EssError::LoginFailed { status, body })
            }
            Err(e) => Err(e),
        }
    }

    // --- Activity log ---

    pub async fn fetch_log_activity(
        &self,
        token: &str,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<ActivityRecord>, EssError> {
        let url = self.endpoint_url(
            LOG_ACTIVITY_PATH,
            &[
                ("sort", "date|asc".to_string()),
                ("idEmployee", employee_id.to_string()),
                ("months", month.to_string()),
                ("years", year.to_string()),
            ],
        )?;
        let request = self.authorized(Method::GET, url, token);
        let context = format!("log activity {}-{:02}", year, month);
        let response: LogActResponse = self.send_and_deserialize(request, &context).await?;
        info!(
            "Fetched {} activity record(s) for employee {} in {}-{:02}",
            response.data.len(),
            employee_id,
            year,
            month
        );
        Ok(response.data)
    }

    /// Fetches each month in turn; the first failure aborts the whole fetch.
    pub async fn fetch_activities_for_months(
        &self,
        token: &str,
        employee_id: &str,
        months: &[u32],
        year: i32,
    ) -> Result<Vec<ActivityRecord>, EssError> {
        let mut activities = Vec::new();
        for &month in months {
            let mut data = self
                .fetch_log_activity(token, employee_id, month, year)
                .await?;
            activities.append(&mut data);
        }
        Ok(activities)
    }

    // --- Projects ---

    pub async fn fetch_project_list(
        &self,
        path: &str,
        token: &str,
        employee_id: &str,
        month: u32,
        year: i32,
    ) -> Result<Vec<String>, EssError> {
        let url = self.endpoint_url(
            path,
            &[
                ("sort", "startDate|desc".to_string()),
                ("page", "1".to_string()),
                ("per_page", "10".to_string()),
                ("employeeId", employee_id.to_string()),
                ("months", month.to_string()),
                ("years", year.to_string()),
            ],
        )?;
        let request = self.authorized(Method::GET, url, token);
        let response: ProjectTableResponse = self.send_and_deserialize(request, path).await?;
        Ok(response
            .data
            .into_iter()
            .map(|p| p.project_name)
            .collect())
    }

    /// Project names assigned in `today`'s period and the one before it.
    pub async fn list_projects(
        &self,
        token: &str,
        employee_id: &str,
        today: NaiveDate,
    ) -> Result<BTreeSet<String>, EssError> {
        let (month, year) = (today.month(), today.year());
        let previous = self
            .fetch_project_list(PROJECTS_PREVIOUS_PATH, token, employee_id, month, year)
            .await?;
        let current = self
            .fetch_project_list(PROJECTS_CURRENT_PATH, token, employee_id, month, year)
            .await?;

        let names = merge_project_names(current, previous);
        info!(
            "Found {} distinct project(s) for employee {}",
            names.len(),
            employee_id
        );
        Ok(names)
    }
}
