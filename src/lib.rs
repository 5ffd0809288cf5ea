//! Backend for the personal dashboard: account management, API key
//! issuance with usage accounting, and the key-protected content endpoint.

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod services;

use crate::auth::{middleware as auth_middleware, AuthConfig, AuthService};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::services::{ApiKeyService, HistoryService, UsageService, UserService};
use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use std::time::Duration;

/// Shared application state handed to every handler and middleware.
pub struct AppState {
    pub config: AppConfig,
    pub db: Arc<DbPool>,
    pub auth: AuthService,
    pub users: UserService,
    pub api_keys: ApiKeyService,
    pub usage: UsageService,
    pub history: HistoryService,
}

impl AppState {
    pub fn new(config: AppConfig, db: DbPool) -> Self {
        let db = Arc::new(db);
        let auth = AuthService::new(AuthConfig::new(
            config.jwt_secret.clone(),
            Duration::from_secs(config.jwt_expiration),
            config.api_key_prefix.clone(),
        ));
        let history = HistoryService::new(Arc::clone(&db));

        Self {
            users: UserService::new(Arc::clone(&db), history.clone()),
            api_keys: ApiKeyService::new(Arc::clone(&db), auth.clone()),
            usage: UsageService::new(Arc::clone(&db)),
            history,
            auth,
            db,
            config,
        }
    }
}

/// Builds the full application router.
///
/// Three tiers: public (signup, login, health), session-only (profile and
/// key management), and session-or-key (the dashboard data read).
pub fn api_routes(state: Arc<AppState>) -> Router {
    let public = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/auth/signup", post(handlers::auth::signup))
        .route("/api/auth/login", post(handlers::auth::login));

    let session_only = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route(
            "/api/user/profile",
            get(handlers::users::get_profile).put(handlers::users::update_profile),
        )
        .route("/api/user/password", put(handlers::users::change_password))
        .route("/api/user/account", delete(handlers::users::delete_account))
        .route(
            "/api/api-keys",
            get(handlers::api_keys::list).post(handlers::api_keys::create),
        )
        .route("/api/api-keys/:id", delete(handlers::api_keys::remove))
        .route("/api/api-keys/:id/toggle", put(handlers::api_keys::toggle))
        .route("/api/api-keys/:id/usage", get(handlers::api_keys::usage))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware::session_auth,
        ));

    let key_or_session = Router::new()
        .route("/api/user/data", get(handlers::user_data::get_user_data))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth_middleware::api_key_or_session,
        ));

    Router::new()
        .merge(public)
        .merge(session_only)
        .merge(key_or_session)
        .with_state(state)
}
