use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::{info, warn};
use uuid::Uuid;

use tellelink_db::Database;
use tellelink_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use tellelink_types::models::Role;

use crate::convert::blocking;
use crate::error::ApiError;
use crate::shortener::Shortener;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    /// Usernames that receive the admin role.
    pub admin_usernames: Vec<String>,
    pub shortener: Shortener,
}

impl AppStateInner {
    fn role_for(&self, username: &str) -> Role {
        if self.admin_usernames.iter().any(|u| u == username) {
            Role::Admin
        } else {
            Role::User
        }
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::BadRequest);
    }
    if req.password.len() < 8 {
        return Err(ApiError::BadRequest);
    }

    let username = req.username.clone();
    let taken = blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .is_some();
    if taken {
        return Err(ApiError::Conflict("username already taken"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    let role = state.role_for(&req.username);

    // The name may have been claimed while hashing.
    let username = req.username.clone();
    let created = blocking(&state, move |db| {
        db.create_user(&user_id.to_string(), &username, &password_hash, role)
    })
    .await?;
    if !created {
        return Err(ApiError::Conflict("username already taken"));
    }

    info!("Registered user {} ({})", req.username, role.as_str());

    let token = create_token(&state.jwt_secret, user_id, &req.username, role)?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            role,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let username = req.username.clone();
    let user = blocking(&state, move |db| db.get_user_by_username(&username))
        .await?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("stored password hash for {} is unreadable: {}", user.username, e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;

    let role = user.role.parse::<Role>().unwrap_or_else(|e| {
        warn!("User {} has {}, treating as user", user.username, e);
        Role::User
    });

    let token = create_token(&state.jwt_secret, user_id, &user.username, role)?;

    Ok(Json(LoginResponse {
        user_id,
        username: user.username,
        role,
        token,
    }))
}

pub fn create_token(secret: &str, user_id: Uuid, username: &str, role: Role) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

pub fn decode_token(secret: &str, token: &str) -> Result<Claims, ApiError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Unauthorized)?;

    Ok(token_data.claims)
}
