/// Common test utilities for integration tests
///
/// Builds the full router against a lazy connection pool pointed at an
/// unreachable address, so tests can exercise everything that runs before
/// a handler touches the database: the route guard, token handling, and
/// the security header stack.

use consulat_api::app::{build_router, AppState};
use consulat_api::config::{
    ApiConfig, AssistantConfig, Config, DatabaseConfig, JwtConfig, ProviderConfig,
};
use consulat_shared::auth::jwt::{create_token, Claims, TokenType};
use consulat_shared::db;
use consulat_shared::models::user::UserRole;
use uuid::Uuid;

/// Test context carrying the router and its configuration
pub struct TestContext {
    pub app: axum::Router,
    pub config: Config,
}

/// Frontend URL used by redirect assertions
pub const SITE_URL: &str = "http://localhost:3000";

const JWT_SECRET: &str = "integration-test-secret-0123456789abcdef";

impl TestContext {
    /// Builds a router with no reachable database
    ///
    /// Port 1 refuses connections immediately, so handlers that do reach
    /// the pool fail fast instead of hanging.
    pub fn new() -> Self {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                site_url: SITE_URL.to_string(),
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://127.0.0.1:1/consulat".to_string(),
                max_connections: 2,
            },
            jwt: JwtConfig {
                secret: JWT_SECRET.to_string(),
            },
            assistant: AssistantConfig {
                api_key: "test-key".to_string(),
                base_url: "http://127.0.0.1:1/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
            },
            providers: ProviderConfig {
                email_api_key: None,
                sms_api_key: None,
                upload_api_key: None,
            },
        };

        let pool = db::create_lazy_pool(&db::DatabaseConfig {
            url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            connect_timeout_seconds: 1,
            ..Default::default()
        })
        .unwrap();

        let state = AppState::new(pool, config.clone());
        let app = build_router(state);

        TestContext { app, config }
    }

    /// Issues a valid access token for a user with the given role
    pub fn token_for(&self, role: UserRole, consulate_id: Option<Uuid>) -> String {
        let claims = Claims::new(Uuid::new_v4(), role, consulate_id, TokenType::Access);
        create_token(&claims, &self.config.jwt.secret).unwrap()
    }

    /// Authorization header value for the given role
    pub fn auth_header(&self, role: UserRole) -> String {
        format!("Bearer {}", self.token_for(role, Some(Uuid::new_v4())))
    }
}
