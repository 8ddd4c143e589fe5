use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use tellelink_db::models::ReportRow;
use tellelink_types::api::{Claims, ReportResponse, UpdateReportStatusRequest};
use tellelink_types::models::ReportStatus;

use crate::auth::AppState;
use crate::convert::{blocking, parse_timestamp, parse_uuid};
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ReportQuery {
    pub status: Option<ReportStatus>,
}

/// GET /api/admin/reports, newest first.
pub async fn list_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = blocking(&state, move |db| db.list_reports(query.status)).await?;
    let reports: Vec<ReportResponse> = rows.into_iter().map(report_response).collect();
    Ok(Json(reports))
}

/// PUT /api/admin/reports/{report_id}/status. Either direction is allowed,
/// and repeating the current status is a successful no-op.
pub async fn update_report_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(report_id): Path<Uuid>,
    Json(req): Json<UpdateReportStatusRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let status = req.status;
    let report = blocking(&state, move |db| {
        let id = report_id.to_string();
        if !db.set_report_status(&id, status)? {
            return Ok(None);
        }
        db.get_report(&id)
    })
    .await?
    .ok_or(ApiError::NotFound("report"))?;

    info!("Admin {} marked report {} as {}", claims.username, report_id, status);
    Ok(Json(report_response(report)))
}

fn report_response(row: ReportRow) -> ReportResponse {
    let status = row.status.parse().unwrap_or_else(|e| {
        warn!("Report {} has {}, showing as pending", row.id, e);
        ReportStatus::Pending
    });

    ReportResponse {
        id: parse_uuid(&row.id, "report id"),
        post_id: parse_uuid(&row.post_id, "post id"),
        post_title: row.post_title,
        post_slug: row.post_slug,
        link_id: row.link_id.as_deref().map(|id| parse_uuid(id, "link id")),
        link_button_name: row.link_button_name,
        link_url: row.link_url,
        comment: row.comment,
        reporter_email: row.reporter_email,
        status,
        created_at: parse_timestamp(&row.created_at),
    }
}
