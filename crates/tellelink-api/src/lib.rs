pub mod auth;
pub mod convert;
pub mod error;
pub mod middleware;
pub mod posts;
pub mod public;
pub mod render;
pub mod reports;
pub mod routes;
pub mod settings;
pub mod shortener;
pub mod slug;
pub mod validation;

pub use auth::{AppState, AppStateInner};
pub use routes::router;
