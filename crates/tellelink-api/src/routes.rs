use axum::{
    Router,
    middleware,
    routing::{get, post, put},
};

use crate::auth::{self, AppState};
use crate::middleware::{require_admin, require_auth};
use crate::{posts, public, reports, settings};

/// All application routes with their auth layers. Transport concerns (CORS,
/// tracing, timeouts) are layered on by the server binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/api/public/posts/{slug}", get(public::get_public_post))
        .route("/api/reports", post(public::create_report))
        .route("/{slug}", get(public::post_page));

    let owner_routes = Router::new()
        .route("/api/posts", get(posts::list_posts).post(posts::create_post))
        .route("/api/posts/{post_id}", get(posts::get_post).delete(posts::delete_post))
        .route("/api/settings", get(settings::get_settings).put(settings::update_settings))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    let admin_routes = Router::new()
        .route("/api/admin/reports", get(reports::list_reports))
        .route("/api/admin/reports/{report_id}/status", put(reports::update_report_status))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(owner_routes)
        .merge(admin_routes)
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
