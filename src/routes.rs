use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full application router
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    let protected_routes = Router::new()
        .merge(organization_routes())
        .merge(role_routes())
        .merge(user_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), jwt_auth_middleware));

    let mut router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        // Protected API
        .merge(protected_routes)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.api.max_request_size_bytes)),
        );

    if let Some(cors) = cors_layer(&config) {
        router = router.layer(cors);
    }
    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn organization_routes() -> Router<AppState> {
    use protected::organizations;

    Router::new()
        .route("/api/organizations", get(organizations::list).post(organizations::create))
        .route(
            "/api/organizations/:id",
            get(organizations::get)
                .put(organizations::put)
                .patch(organizations::patch),
        )
        // Roles owned by one organization
        .route(
            "/api/organizations/:id/roles",
            get(organizations::roles_list).post(organizations::roles_create),
        )
}

fn role_routes() -> Router<AppState> {
    use protected::roles;

    Router::new()
        .route("/api/roles", get(roles::list).post(roles::create))
        .route("/api/roles/:id", get(roles::get).put(roles::put).patch(roles::patch))
}

fn user_routes() -> Router<AppState> {
    use protected::users;

    Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", get(users::get).put(users::put).patch(users::patch))
}

fn cors_layer(config: &AppConfig) -> Option<CorsLayer> {
    if config.environment == Environment::Development {
        return Some(CorsLayer::permissive());
    }
    if !config.security.enable_cors {
        return None;
    }

    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::PATCH])
            .allow_headers(Any),
    )
}
