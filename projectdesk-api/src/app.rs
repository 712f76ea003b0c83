/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use projectdesk_api::{app::{build_router, AppState}, config::Config};
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let app = build_router(AppState::new(pool, config));
///
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::config::Config;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use projectdesk_shared::auth::middleware::authenticate_headers;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Shared application state, cloned into every handler
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: PgPool, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    pub fn jwt_secret(&self) -> &str {
        &self.config.jwt.secret
    }
}

/// Builds the complete router
///
/// ```text
/// /
/// ├── GET /health                                   (public)
/// └── /v1/
///     ├── /auth/
///     │   ├── POST /register                         (public)
///     │   ├── POST /login                            (public)
///     │   ├── POST /refresh                          (public)
///     │   └── GET  /me
///     └── /projects/
///         ├── POST, GET /
///         ├── GET, PATCH, DELETE /:project_id
///         ├── GET, POST /:project_id/members
///         ├── DELETE /:project_id/members/:nickname
///         ├── GET, POST /:project_id/tasks
///         ├── GET, PATCH, DELETE /:project_id/tasks/:task_id
///         └── PATCH, DELETE /:project_id/tasks/by-title/:title
/// ```
///
/// Everything except health, register, login, and refresh requires an access token.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let public_auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/refresh", post(routes::auth::refresh));

    let protected_auth_routes = Router::new()
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let project_routes = Router::new()
        .route(
            "/",
            post(routes::projects::create_project).get(routes::projects::list_projects),
        )
        .route(
            "/:project_id",
            get(routes::projects::get_project)
                .patch(routes::projects::update_project)
                .delete(routes::projects::delete_project),
        )
        .route(
            "/:project_id/members",
            get(routes::members::list_members).post(routes::members::add_member),
        )
        .route(
            "/:project_id/members/:nickname",
            axum::routing::delete(routes::members::remove_member),
        )
        .route(
            "/:project_id/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/:project_id/tasks/by-title/:title",
            axum::routing::patch(routes::tasks::update_task_by_title)
                .delete(routes::tasks::delete_task_by_title),
        )
        .route(
            "/:project_id/tasks/:task_id",
            get(routes::tasks::get_task)
                .patch(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", public_auth_routes.merge(protected_auth_routes))
        .nest("/projects", project_routes);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}

/// Validates the bearer token and puts the `AuthContext` on the request
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, crate::error::ApiError> {
    let auth_context = authenticate_headers(req.headers(), state.jwt_secret())?;

    tracing::trace!(user_id = %auth_context.user_id, "Request authenticated");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
