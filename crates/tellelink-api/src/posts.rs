use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use tellelink_db::models::{LinkRow, NewLink, NewPost, PostRow};
use tellelink_types::api::{Claims, CreatePostRequest, LinkResponse, PostDetailResponse, PostSummary};

use crate::auth::AppState;
use crate::convert::{blocking, parse_timestamp, parse_uuid};
use crate::error::ApiError;
use crate::slug::generate_slug;
use crate::validation::validate_post;

/// Fresh suffixes to try before giving up on a title.
const SLUG_ATTEMPTS: usize = 5;

#[derive(Debug, Deserialize)]
pub struct PostQuery {
    /// Case-insensitive title filter.
    pub q: Option<String>,
}

/// POST /api/posts: validate, shorten (if the owner opted in), then insert
/// the post and its links atomically.
pub async fn create_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let valid = validate_post(&req)?;

    let owner_id = claims.sub.to_string();
    let uid = owner_id.clone();
    let shorten = blocking(&state, move |db| db.get_link_shortener_enabled(&uid))
        .await?
        .unwrap_or(false);

    let urls: Vec<String> = valid.links.iter().map(|l| l.url.clone()).collect();
    let outcomes = state.shortener.shorten_all(shorten, &urls).await;

    let links: Vec<NewLink> = valid
        .links
        .into_iter()
        .zip(outcomes)
        .map(|(link, outcome)| NewLink {
            id: Uuid::new_v4().to_string(),
            button_name: link.button_name,
            url: outcome.url,
            original_url: outcome.original_url,
        })
        .collect();

    let post_id = Uuid::new_v4();
    let title = valid.title;
    let (row, links) = blocking(&state, move |db| {
        let id = post_id.to_string();
        for attempt in 1..=SLUG_ATTEMPTS {
            let slug = generate_slug(&title);
            let post = NewPost {
                id: &id,
                title: &title,
                slug: &slug,
                owner_id: &owner_id,
            };
            if let Some(row) = db.create_post(&post, &links)? {
                return Ok((row, links));
            }
            warn!("Slug '{}' unavailable (attempt {}/{})", slug, attempt, SLUG_ATTEMPTS);
        }
        Err(anyhow::anyhow!("no free slug after {} attempts", SLUG_ATTEMPTS))
    })
    .await?;

    info!(
        "User {} created post {} ({} links, shortening {})",
        claims.username,
        row.slug,
        links.len(),
        if shorten { "on" } else { "off" }
    );

    let links = links
        .into_iter()
        .enumerate()
        .map(|(position, link)| LinkResponse {
            id: parse_uuid(&link.id, "link id"),
            button_name: link.button_name,
            url: link.url,
            original_url: link.original_url,
            position: position as u32,
        })
        .collect();

    Ok((StatusCode::CREATED, Json(detail(row, links))))
}

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<PostQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = claims.sub.to_string();
    let rows = blocking(&state, move |db| {
        db.list_posts_for_owner(&owner_id, query.q.as_deref())
    })
    .await?;

    let posts: Vec<PostSummary> = rows
        .into_iter()
        .map(|row| PostSummary {
            id: parse_uuid(&row.post.id, "post id"),
            created_at: parse_timestamp(&row.post.created_at),
            title: row.post.title,
            slug: row.post.slug,
            link_count: row.link_count.max(0) as usize,
        })
        .collect();

    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = claims.sub.to_string();
    let found = blocking(&state, move |db| {
        let Some(post) = db.get_owned_post(&owner_id, &post_id.to_string())? else {
            return Ok(None);
        };
        let links = db.get_links_for_post(&post.id)?;
        Ok(Some((post, links)))
    })
    .await?;

    let (post, links) = found.ok_or(ApiError::NotFound("post"))?;
    let links = links.into_iter().map(link_response).collect();
    Ok(Json(detail(post, links)))
}

/// DELETE /api/posts/{post_id}. Irreversible; links and reports go with it.
pub async fn delete_post(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(post_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let owner_id = claims.sub.to_string();
    let deleted = blocking(&state, move |db| db.delete_post(&owner_id, &post_id.to_string())).await?;

    if !deleted {
        return Err(ApiError::NotFound("post"));
    }

    info!("User {} deleted post {}", claims.username, post_id);
    Ok(StatusCode::NO_CONTENT)
}

fn detail(post: PostRow, links: Vec<LinkResponse>) -> PostDetailResponse {
    PostDetailResponse {
        id: parse_uuid(&post.id, "post id"),
        created_at: parse_timestamp(&post.created_at),
        title: post.title,
        slug: post.slug,
        links,
    }
}

fn link_response(row: LinkRow) -> LinkResponse {
    LinkResponse {
        id: parse_uuid(&row.id, "link id"),
        button_name: row.button_name,
        url: row.url,
        original_url: row.original_url,
        position: row.position.max(0) as u32,
    }
}
