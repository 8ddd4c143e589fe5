//! Anonymous endpoints: the published view of a post and report submission.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::info;
use uuid::Uuid;

use tellelink_db::models::NewReport;
use tellelink_types::api::{CreateReportRequest, CreateReportResponse, PublicLink, PublicPostResponse};
use tellelink_types::models::ReportStatus;

use crate::auth::AppState;
use crate::convert::{blocking, parse_uuid};
use crate::error::ApiError;
use crate::render;
use crate::slug::is_valid_slug;
use crate::validation::validate_report;

/// GET /{slug}: read-only HTML page. Unknown slugs get a "Post not found"
/// page with a 404 status.
pub async fn post_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Response, ApiError> {
    match load_public_post(&state, slug).await? {
        Some(post) => Ok(Html(render::post_page(&post)).into_response()),
        None => Ok((StatusCode::NOT_FOUND, Html(render::not_found_page())).into_response()),
    }
}

/// GET /api/public/posts/{slug}
pub async fn get_public_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PublicPostResponse>, ApiError> {
    load_public_post(&state, slug)
        .await?
        .map(Json)
        .ok_or(ApiError::NotFound("post"))
}

async fn load_public_post(state: &AppState, slug: String) -> Result<Option<PublicPostResponse>, ApiError> {
    if !is_valid_slug(&slug) {
        return Ok(None);
    }

    let found = blocking(state, move |db| {
        let Some(post) = db.get_post_by_slug(&slug)? else {
            return Ok(None);
        };
        let links = db.get_links_for_post(&post.id)?;
        Ok(Some((post, links)))
    })
    .await?;

    Ok(found.map(|(post, links)| PublicPostResponse {
        id: parse_uuid(&post.id, "post id"),
        title: post.title,
        slug: post.slug,
        links: links
            .into_iter()
            .map(|link| PublicLink {
                id: parse_uuid(&link.id, "link id"),
                shortened: link.original_url.is_some(),
                button_name: link.button_name,
                url: link.url,
                position: link.position.max(0) as u32,
            })
            .collect(),
    }))
}

enum ReportInsert {
    Created,
    UnknownPost,
    ForeignLink,
}

/// POST /api/reports: open to anonymous visitors.
pub async fn create_report(
    State(state): State<AppState>,
    Json(req): Json<CreateReportRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = validate_report(&req)?;

    let report_id = Uuid::new_v4();
    let post_id = req.post_id.to_string();
    let link_id = req.link_id.map(|id| id.to_string());

    let outcome = blocking(&state, move |db| {
        if db.get_post_by_id(&post_id)?.is_none() {
            return Ok(ReportInsert::UnknownPost);
        }
        if let Some(link_id) = &link_id {
            if !db.link_belongs_to_post(link_id, &post_id)? {
                return Ok(ReportInsert::ForeignLink);
            }
        }
        db.insert_report(&NewReport {
            id: &report_id.to_string(),
            post_id: &post_id,
            link_id: link_id.as_deref(),
            comment: &valid.comment,
            reporter_email: valid.reporter_email.as_deref(),
        })?;
        Ok(ReportInsert::Created)
    })
    .await?;

    match outcome {
        ReportInsert::Created => {
            info!("Report {} filed against post {}", report_id, req.post_id);
            Ok((
                StatusCode::CREATED,
                Json(CreateReportResponse {
                    id: report_id,
                    status: ReportStatus::Pending,
                }),
            ))
        }
        ReportInsert::UnknownPost => Err(ApiError::NotFound("post")),
        ReportInsert::ForeignLink => Err(ApiError::field("link_id", "Link does not belong to this post")),
    }
}
