use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ReportStatus, Role};

// -- JWT Claims --

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub role: Role,
    pub exp: usize,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub role: Role,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    pub token: String,
}

// -- Posts --

/// One row of the link editor. Rows with a blank field are skipped, so both
/// fields default to empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LinkInput {
    #[serde(default)]
    pub button_name: String,
    #[serde(default)]
    pub url: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub links: Vec<LinkInput>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub link_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub button_name: String,
    pub url: String,
    /// Present only when `url` is a shortened substitute.
    pub original_url: Option<String>,
    pub position: u32,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub links: Vec<LinkResponse>,
}

// -- Public --

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicLink {
    pub id: Uuid,
    pub button_name: String,
    pub url: String,
    pub position: u32,
    pub shortened: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicPostResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub links: Vec<PublicLink>,
}

// -- Reports --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateReportRequest {
    pub post_id: Uuid,
    pub link_id: Option<Uuid>,
    #[serde(default)]
    pub comment: String,
    pub reporter_email: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateReportResponse {
    pub id: Uuid,
    pub status: ReportStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReportResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub post_title: String,
    pub post_slug: String,
    pub link_id: Option<Uuid>,
    pub link_button_name: Option<String>,
    pub link_url: Option<String>,
    pub comment: String,
    pub reporter_email: Option<String>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateReportStatusRequest {
    pub status: ReportStatus,
}

// -- Settings --

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserSettings {
    pub enable_link_shortener: bool,
}

// -- Errors --

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}
