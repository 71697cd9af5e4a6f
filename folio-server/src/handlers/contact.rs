use axum::{
    extract::{State, rejection::JsonRejection},
    response::Json,
};

use folio_model::{
    ActionResponse, ContactRequest, OrderConfirmation, OrderRequest,
    VerificationConfirmRequest, VerificationSendRequest,
};

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn send_verification_code(
    State(state): State<AppState>,
    payload: Result<Json<VerificationSendRequest>, JsonRejection>,
) -> AppResult<Json<ActionResponse>> {
    let Json(request) = payload?;
    state.verifications.send_code(&request.email).await?;
    Ok(Json(ActionResponse::ok(
        "Verification code sent to your email. Please check your inbox.",
    )))
}

pub async fn confirm_verification_code(
    State(state): State<AppState>,
    payload: Result<Json<VerificationConfirmRequest>, JsonRejection>,
) -> AppResult<Json<ActionResponse>> {
    let Json(request) = payload?;
    state
        .verifications
        .confirm(&request.email, &request.code)
        .await?;
    Ok(Json(ActionResponse::ok("Email verified successfully!")))
}

pub async fn send_contact_request(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> AppResult<Json<ActionResponse>> {
    let Json(request) = payload?;
    state.contact.submit(request).await?;
    Ok(Json(ActionResponse::ok(
        "Your message has been sent successfully! We will contact you shortly.",
    )))
}

pub async fn place_chatbot_order(
    State(state): State<AppState>,
    payload: Result<Json<OrderRequest>, JsonRejection>,
) -> AppResult<Json<OrderConfirmation>> {
    let Json(request) = payload?;
    Ok(Json(state.orders.place(request).await?))
}
