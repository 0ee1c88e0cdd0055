use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::Method,
    routing::{get, post, put},
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors},
    services::UPLOAD_URL_PREFIX,
};

pub mod dealer;
pub mod property;

/// Builds the full HTTP surface for the given state.
pub fn router(state: AppState) -> Router {
    // 公开路由
    let public_routes = Router::new()
        .route("/", get(root))
        .route("/register", post(dealer::register))
        .route("/login", post(dealer::login))
        .route("/properties", get(property::list_properties));

    // 需要认证的经销商路由
    let protected_routes = Router::new()
        .route("/add-property", post(property::add_property))
        .route("/dealer/properties", get(property::dealer_properties))
        .route(
            "/dealer/properties/{id}",
            put(property::update_property).delete(property::delete_property),
        )
        .layer(DefaultBodyLimit::max(state.config.max_upload_bytes))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .nest_service(
            &format!("/{UPLOAD_URL_PREFIX}"),
            ServeDir::new(state.uploads.dir()),
        )
        .layer(axum::middleware::from_fn(log_errors))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn root() -> &'static str {
    "Server is working!"
}
