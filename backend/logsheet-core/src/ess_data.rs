// src/ess_data.rs
use serde::{Deserialize, Serialize};

// --- ESS Auth API types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub kode: String,
    #[serde(default)]
    pub label: String,
    pub employee_id: i64,
    #[serde(default)]
    pub role_id: i64,
    // The upstream echoes this back; it is never logged or re-serialized.
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub employee_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub id_token: String,
    pub user_info: UserInfo,
    #[serde(default)]
    pub role_id: i64,
    #[serde(default)]
    pub list_menu: Vec<String>,
}

// --- ESS Activity Log API types ---

/// One logged unit of work as delivered by the activity-log table endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRecord {
    pub id: i64,
    /// Always `DD-MM-YYYY` on the wire.
    pub date_string: String,
    pub activity_detail: String,
    /// Hours.
    pub duration: i32,
    #[serde(default)]
    pub overtime: i32,
    pub project_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogActResponse {
    pub data: Vec<ActivityRecord>,
}

// --- ESS Project Assignment API types ---

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub project_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectTableResponse {
    pub data: Vec<ProjectResponse>,
}

// --- Inbound request bodies for our own API ---

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthenticateRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RandomizeLogRequest {
    #[serde(default)]
    pub is_random: bool,
    #[serde(default)]
    pub min_duration: i32,
    #[serde(default)]
    pub max_duration: i32,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConverterRequest {
    #[serde(default)]
    pub employee_id: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub months: Vec<u32>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub project_name: String,
    #[serde(default)]
    pub randomize_log: RandomizeLogRequest,
}

impl AuthenticateRequest {
    /// Both fields are required.
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.username.trim().is_empty() {
            missing.push("username");
        }
        if self.password.is_empty() {
            missing.push("password");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(format!("missing required field(s): {}", missing.join(", ")))
        }
    }
}

impl LogConverterRequest {
    pub fn validate(&self) -> Result<(), String> {
        let mut missing = Vec::new();
        if self.employee_id.trim().is_empty() {
            missing.push("employee_id");
        }
        if self.token.trim().is_empty() {
            missing.push("token");
        }
        if self.months.is_empty() {
            missing.push("months");
        }
        if self.year == 0 {
            missing.push("year");
        }
        if self.project_name.is_empty() {
            missing.push("project_name");
        }
        if !missing.is_empty() {
            return Err(format!("missing required field(s): {}", missing.join(", ")));
        }

        if let Some(bad) = self.months.iter().find(|m| !(1..=12).contains(*m)) {
            return Err(format!("month {} is outside 1..=12", bad));
        }
        Ok(())
    }
}
