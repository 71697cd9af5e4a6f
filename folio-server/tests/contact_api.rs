use axum::http::StatusCode;
use serde_json::{Value, json};

#[path = "support/mod.rs"]
mod support;
use support::{TestApp, build_test_app};

const OWNER: &str = "owner@example.com";

async fn issued_code(app: &TestApp, email: &str) -> String {
    let mail = app
        .mailer
        .last_to(email)
        .await
        .unwrap_or_else(|| panic!("no mail sent to {email}"));
    mail.body
        .split_whitespace()
        .find(|word| word.len() == 6 && word.chars().all(|c| c.is_ascii_digit()))
        .expect("six digit code in mail body")
        .to_string()
}

fn contact_body(email: &str) -> Value {
    json!({
        "name": "Ada",
        "email": email,
        "service": "Web Development",
        "message": "I need a storefront."
    })
}

#[tokio::test]
async fn verified_sender_can_submit_once() {
    let app = build_test_app().await;
    let email = "ada.lovelace@gmail.com";

    let sent = app
        .server
        .post("/api/verify-email-send")
        .json(&json!({ "email": "  Ada.Lovelace@Gmail.com " }))
        .await;
    sent.assert_status_ok();
    assert_eq!(sent.json::<Value>()["success"], true);

    let code = issued_code(&app, email).await;
    let confirmed = app
        .server
        .post("/api/verify-email-confirm")
        .json(&json!({ "email": email, "code": code }))
        .await;
    confirmed.assert_status_ok();
    assert_eq!(
        confirmed.json::<Value>()["message"],
        "Email verified successfully!"
    );

    let submitted = app
        .server
        .post("/api/contact-send")
        .json(&contact_body(email))
        .await;
    submitted.assert_status_ok();

    let owner_mail = app.mailer.last_to(OWNER).await.expect("owner mail");
    assert_eq!(
        owner_mail.subject,
        "New Quote Request: Web Development from Ada"
    );
    assert_eq!(owner_mail.reply_to.as_deref(), Some(email));
    let acknowledgement = app.mailer.last_to(email).await.expect("ack mail");
    assert_eq!(acknowledgement.subject, "Thank you for contacting us");

    // the verification is spent by the first submission
    let again = app
        .server
        .post("/api/contact-send")
        .json(&contact_body(email))
        .await;
    again.assert_status_bad_request();
    assert_eq!(
        again.json::<Value>()["error"],
        "Email not verified. Please verify your email first."
    );
}

#[tokio::test]
async fn verification_rejects_bad_input() {
    let app = build_test_app().await;

    app.server
        .post("/api/verify-email-send")
        .json(&json!({ "email": "someone@example.com" }))
        .await
        .assert_status_bad_request();
    assert!(app.mailer.sent().await.is_empty());

    app.server
        .post("/api/verify-email-send")
        .json(&json!({ "email": "grace@gmail.com" }))
        .await
        .assert_status_ok();

    let wrong = app
        .server
        .post("/api/verify-email-confirm")
        .json(&json!({ "email": "grace@gmail.com", "code": "000000" }))
        .await;
    wrong.assert_status_bad_request();
    assert_eq!(
        wrong.json::<Value>()["error"],
        "Invalid verification code. Please check and try again."
    );
}

#[tokio::test]
async fn contact_requires_every_field_and_verification() {
    let app = build_test_app().await;

    let missing = app
        .server
        .post("/api/contact-send")
        .json(&json!({ "name": "Ada", "email": "ada@gmail.com" }))
        .await;
    missing.assert_status_bad_request();
    assert_eq!(missing.json::<Value>()["error"], "All fields are required.");

    app.server
        .post("/api/contact-send")
        .json(&contact_body("ada@gmail.com"))
        .await
        .assert_status_bad_request();
    assert!(app.mailer.sent().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_a_client_error() {
    let app = build_test_app().await;

    let response = app
        .server
        .post("/api/contact-send")
        .content_type("application/json")
        .bytes("{ not json".into())
        .await;
    assert!(response.status_code().is_client_error());
    assert!(response.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn chatbot_order_confirms_and_notifies() {
    let app = build_test_app().await;

    let response = app
        .server
        .post("/api/chatbot-order")
        .json(&json!({
            "service": "Logo Design",
            "name": "Linus",
            "email": "linus@example.org",
            "phone": "+1 555 0100"
        }))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();

    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Order placed successfully");
    let order_id = body["orderId"].as_str().expect("orderId");
    assert!(order_id.starts_with("RHX-"));
    assert_eq!(order_id.len(), 12);

    let admin = app.mailer.last_to(OWNER).await.expect("admin mail");
    assert_eq!(admin.subject, "New Order from Chatbot - Logo Design");
    assert!(admin.body.contains("No additional details provided"));
    let customer = app
        .mailer
        .last_to("linus@example.org")
        .await
        .expect("customer mail");
    assert_eq!(customer.subject, "Order Confirmation - Logo Design");
}

#[tokio::test]
async fn chatbot_order_validates_input() {
    let app = build_test_app().await;

    let missing = app
        .server
        .post("/api/chatbot-order")
        .json(&json!({ "service": "Logo Design", "name": "Linus" }))
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "Missing required fields");

    let bad_email = app
        .server
        .post("/api/chatbot-order")
        .json(&json!({
            "service": "Logo Design",
            "name": "Linus",
            "email": "not-an-email",
            "phone": "123"
        }))
        .await;
    bad_email.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(bad_email.json::<Value>()["error"], "Invalid email format");
    assert!(app.mailer.sent().await.is_empty());
}
