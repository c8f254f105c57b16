/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use consulat_api::{app::AppState, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let state = AppState::new(pool, config);
/// let app = consulat_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{
    assistant::AssistantClient,
    config::Config,
    middleware::{route_guard::route_guard, security::SecurityHeadersLayer},
};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{delete, get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// LLM bridge client
    pub assistant: AssistantClient,
}

impl AppState {
    /// Creates new application state
    pub fn new(db: PgPool, config: Config) -> Self {
        let assistant = AssistantClient::new(config.assistant.clone());
        Self {
            db,
            config: Arc::new(config),
            assistant,
        }
    }

    /// Gets JWT secret for token operations
    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }

    /// Gets the portal frontend URL (redirect targets)
    pub fn site_url(&self) -> &str {
        self.config.api.site_url.trim_end_matches('/')
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                        # Health check (public)
/// ├── /v1/                           # API v1 (versioned)
/// │   ├── /auth/                     # OTP authentication (public)
/// │   │   ├── POST /register
/// │   │   ├── POST /otp/request
/// │   │   ├── POST /otp/verify
/// │   │   └── POST /refresh
/// │   ├── /profile                   # Caller's profile
/// │   ├── /consulates                # Consulate directory
/// │   ├── /procedures                # Active procedures of the caller's consulate
/// │   ├── /requests/                 # Citizen request lifecycle + messages
/// │   ├── /documents/                # Upload with LLM analysis
/// │   ├── /notifications/            # Visible notifications + read state
/// │   ├── /chat                      # AI assistant
/// │   ├── /agent/                    # Staff: consulate requests, status, notes
/// │   └── /admin/                    # Admin: procedures, consulates, fan-out
/// ```
///
/// # Middleware Stack
///
/// Applied in order (bottom to top):
/// 1. Logging (tower-http TraceLayer)
/// 2. CORS (tower-http CorsLayer)
/// 3. Security headers
/// 4. Route guard (public list → token → role table)
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Auth routes (public per the guard's route table)
    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/otp/request", post(routes::auth::request_otp))
        .route("/otp/verify", post(routes::auth::verify_otp))
        .route("/refresh", post(routes::auth::refresh));

    // Citizen-facing routes (any authenticated role)
    let citizen_routes = Router::new()
        .route("/profile", get(routes::profile::get_profile))
        .route("/profile", put(routes::profile::update_profile))
        .route("/consulates", get(routes::consulates::list_consulates))
        .route("/procedures", get(routes::procedures::list_procedures))
        .route("/procedures/:id", get(routes::procedures::get_procedure))
        .route("/requests", post(routes::requests::create_request))
        .route("/requests", get(routes::requests::list_requests))
        .route("/requests/:id", get(routes::requests::get_request))
        .route("/requests/:id", patch(routes::requests::update_request))
        .route("/requests/:id", delete(routes::requests::delete_request))
        .route(
            "/requests/:id/messages",
            get(routes::requests::list_messages),
        )
        .route(
            "/requests/:id/messages",
            post(routes::requests::post_message),
        )
        .route("/documents", post(routes::documents::upload_document))
        .route("/documents", get(routes::documents::list_documents))
        .route("/documents/:id", get(routes::documents::get_document))
        .route("/documents/:id", delete(routes::documents::delete_document))
        .route(
            "/notifications",
            get(routes::notifications::list_notifications),
        )
        .route(
            "/notifications/:id/viewed",
            post(routes::notifications::mark_viewed),
        )
        .route(
            "/notifications/read-all",
            post(routes::notifications::mark_all_viewed),
        )
        .route("/chat", post(routes::chat::chat));

    // Staff routes (guard restricts /v1/agent to agent+)
    let agent_routes = Router::new()
        .route("/requests", get(routes::agent::list_consulate_requests))
        .route("/requests/:id", get(routes::agent::get_consulate_request))
        .route("/requests/:id/status", patch(routes::agent::set_status))
        .route("/requests/:id/notes", get(routes::agent::list_notes))
        .route("/requests/:id/notes", post(routes::agent::post_note));

    // Admin routes (guard restricts /v1/admin to admin+)
    let admin_routes = Router::new()
        .route("/procedures", post(routes::admin::create_procedure))
        .route("/procedures/:id", put(routes::admin::update_procedure))
        .route("/procedures/:id", delete(routes::admin::delete_procedure))
        .route("/consulates", post(routes::admin::create_consulate))
        .route("/consulates/:id", put(routes::admin::update_consulate))
        .route(
            "/notifications",
            post(routes::admin::create_notification),
        );

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/agent", agent_routes)
        .nest("/admin", admin_routes)
        .merge(citizen_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        // Production mode: configure allowed origins
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    // Combine all routes with middleware stack
    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            route_guard,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}
