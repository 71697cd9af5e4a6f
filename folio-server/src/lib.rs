//! HTTP surface of the Folio portfolio site.
//!
//! [`create_app`] assembles the router: project CRUD with ordered image
//! galleries, contact and chatbot order intake, click analytics and the
//! static `/uploads` mount backing locally stored images.

pub mod handlers;
pub mod infra;
pub mod routes;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::get,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    set_header::SetResponseHeader,
    trace::TraceLayer,
};

use folio_core::storage::local::UPLOADS_MOUNT;

pub use infra::app_state::AppState;

pub fn create_app(state: AppState) -> Router {
    let config = state.config();

    let cors_layer = if config.dev_mode {
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors
            .allowed_origins
            .iter()
            .filter_map(|origin| HeaderValue::from_str(origin).ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE])
    };

    // uploaded SVGs must not script against the API origin
    let uploads = SetResponseHeader::overriding(
        SetResponseHeader::overriding(
            ServeDir::new(state.uploads_root()),
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static("sandbox"),
        ),
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );

    Router::new()
        .route("/health", get(handlers::health::health_handler))
        .nest("/api", routes::create_api_router())
        .nest_service(&format!("/{UPLOADS_MOUNT}"), uploads)
        .layer(DefaultBodyLimit::max(config.server.max_body_bytes))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
