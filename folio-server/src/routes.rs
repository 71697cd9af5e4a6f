use axum::{
    Router,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::{analytics, contact, projects},
};

/// Routes mounted under `/api`.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route(
            "/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route(
            "/projects/{id}",
            get(projects::get_project)
                .put(projects::update_project)
                .delete(projects::delete_project),
        )
        .route("/verify-email-send", post(contact::send_verification_code))
        .route(
            "/verify-email-confirm",
            post(contact::confirm_verification_code),
        )
        .route("/contact-send", post(contact::send_contact_request))
        .route("/chatbot-order", post(contact::place_chatbot_order))
        .route("/analytics/click", post(analytics::record_click))
        .route("/analytics/clicks", get(analytics::list_clicks))
}
