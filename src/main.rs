pub mod auth;
pub mod config;
pub mod db;
pub mod models;
pub mod permissions;
pub mod query;
pub mod roles;
pub mod users;

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post, put},
    Json, Router,
};
use sqlx::PgPool;
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{AccessRepository, AuthService, TokenService};
use config::Config;
use permissions::{PermissionService, PermissionsRepository};
use roles::{RoleService, RolesRepository};
use users::{UserService, UsersRepository};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::login_handler,
        auth::handlers::login_json_handler,
        auth::handlers::refresh_handler,
        auth::handlers::logout_handler,
        auth::handlers::me_handler,
        auth::handlers::update_me_handler,
        auth::handlers::change_password_handler,
    ),
    components(
        schemas(
            auth::models::TokenResponse,
            auth::models::LoginForm,
            auth::models::LoginRequest,
            auth::models::RefreshRequest,
            auth::models::ChangePasswordRequest,
            auth::models::UpdateProfileRequest,
            auth::models::MessageResponse,
            auth::models::UserProfile,
            auth::models::RoleSummary,
            auth::models::PermissionSummary,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Authentication and profile endpoints")
    ),
    info(
        title = "Campus Admin API",
        version = "1.0.0",
        description = "University administration backend: authentication, roles and permissions"
    )
)]
struct ApiDoc;

/// Registers the bearer scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    db: PgPool,
    config: Arc<Config>,
    auth_service: AuthService,
    user_service: UserService,
    role_service: RoleService,
    permission_service: PermissionService,
}

impl AppState {
    /// Wire repositories and services around one pool and one configuration.
    pub fn new(db: PgPool, config: Config) -> Self {
        let config = Arc::new(config);
        let tokens = TokenService::new(&config);
        let auth_service = AuthService::new(AccessRepository::new(db.clone()), tokens);
        let user_service = UserService::new(UsersRepository::new(db.clone()));
        let role_service = RoleService::new(RolesRepository::new(db.clone()));
        let permission_service = PermissionService::new(PermissionsRepository::new(db.clone()));

        Self {
            db,
            config,
            auth_service,
            user_service,
            role_service,
            permission_service,
        }
    }
}

/// Handler for GET /api/health
/// Liveness probe verifying database connectivity
async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, axum::http::StatusCode> {
    match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await
    {
        Ok(_) => Ok(Json(serde_json::json!({
            "status": "ok",
            "message": "Campus Admin API is running"
        }))),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            Err(axum::http::StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds CORS middleware
pub fn create_router(state: AppState) -> Router {
    use tower_http::cors::{Any, CorsLayer};

    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Health
        .route("/api/health", get(health_handler))
        // Authentication
        .route("/api/auth/login", post(auth::handlers::login_handler))
        .route("/api/auth/login/json", post(auth::handlers::login_json_handler))
        .route("/api/auth/refresh", post(auth::handlers::refresh_handler))
        .route("/api/auth/logout", post(auth::handlers::logout_handler))
        .route(
            "/api/auth/me",
            get(auth::handlers::me_handler).put(auth::handlers::update_me_handler),
        )
        .route(
            "/api/auth/me/password",
            put(auth::handlers::change_password_handler),
        )
        // User administration
        .route(
            "/api/admin/users",
            get(users::handlers::list_users_handler).post(users::handlers::create_user_handler),
        )
        .route(
            "/api/admin/users/:user_id",
            get(users::handlers::get_user_handler)
                .put(users::handlers::update_user_handler)
                .delete(users::handlers::delete_user_handler),
        )
        .route(
            "/api/admin/users/:user_id/toggle-active",
            post(users::handlers::toggle_user_active_handler),
        )
        .route(
            "/api/admin/users/:user_id/roles",
            get(users::handlers::get_user_roles_handler)
                .put(users::handlers::set_user_roles_handler),
        )
        .route(
            "/api/admin/users/:user_id/reset-password",
            post(users::handlers::reset_user_password_handler),
        )
        .route(
            "/api/admin/users/:user_id/verify-email",
            post(users::handlers::verify_user_email_handler),
        )
        .route(
            "/api/admin/users/:user_id/permissions",
            get(users::handlers::get_user_permissions_handler),
        )
        .route(
            "/api/admin/users/:user_id/anonymize",
            post(users::handlers::anonymize_user_handler),
        )
        // Role administration
        .route(
            "/api/admin/roles",
            get(roles::handlers::list_roles_handler).post(roles::handlers::create_role_handler),
        )
        .route(
            "/api/admin/roles/:role_id",
            get(roles::handlers::get_role_handler)
                .put(roles::handlers::update_role_handler)
                .delete(roles::handlers::delete_role_handler),
        )
        .route(
            "/api/admin/roles/:role_id/duplicate",
            post(roles::handlers::duplicate_role_handler),
        )
        .route(
            "/api/admin/roles/:role_id/toggle-active",
            post(roles::handlers::toggle_role_active_handler),
        )
        .route(
            "/api/admin/roles/:role_id/permissions",
            get(roles::handlers::get_role_permissions_handler)
                .put(roles::handlers::set_role_permissions_handler),
        )
        .route(
            "/api/admin/roles/:role_id/users",
            get(roles::handlers::get_role_users_handler),
        )
        // Permission administration
        .route(
            "/api/admin/permissions",
            get(permissions::handlers::list_permissions_handler)
                .post(permissions::handlers::create_permission_handler),
        )
        .route(
            "/api/admin/permissions/matrix",
            get(permissions::handlers::get_permissions_matrix_handler),
        )
        .route(
            "/api/admin/permissions/:permission_id",
            get(permissions::handlers::get_permission_handler)
                .put(permissions::handlers::update_permission_handler)
                .delete(permissions::handlers::delete_permission_handler),
        )
        .route(
            "/api/admin/permissions/:permission_id/roles",
            get(permissions::handlers::get_permission_roles_handler),
        )
        .layer(cors)
        .with_state(state)
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Campus Admin API - Starting...");

    let config = Config::from_env();

    // Create database connection pool
    tracing::info!("Connecting to database...");
    let db_pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");

    // Run SQLx migrations on startup
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&db_pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Migrations completed successfully");

    let state = AppState::new(db_pool, config);
    let addr = format!("{}:{}", state.config.host, state.config.port);
    let app = create_router(state);

    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Campus Admin API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app)
        .await
        .expect("Server error");
}

#[cfg(test)]
mod tests;
