use std::{fmt, sync::Arc};

use chrono::Utc;
use folio_model::{OrderConfirmation, OrderRequest};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use super::require_all;
use crate::error::{FolioError, Result};
use crate::mail::{Mailer, OutgoingMail};

static EMAIL_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex should compile")
});

const ORDER_ID_PREFIX: &str = "RHX-";

/// Takes service orders collected by the chatbot widget.
#[derive(Clone)]
pub struct OrderService {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

impl fmt::Debug for OrderService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderService")
            .field("admin_email", &self.admin_email)
            .finish_non_exhaustive()
    }
}

impl OrderService {
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: impl Into<String>) -> Self {
        Self {
            mailer,
            admin_email: admin_email.into(),
        }
    }

    pub async fn place(&self, request: OrderRequest) -> Result<OrderConfirmation> {
        let [service, name, email, phone] = require_all([
            request.service.as_str(),
            request.name.as_str(),
            request.email.as_str(),
            request.phone.as_str(),
        ])
        .ok_or_else(|| FolioError::validation("Missing required fields"))?;

        if !EMAIL_ADDRESS.is_match(email) {
            return Err(FolioError::validation("Invalid email format"));
        }

        let details = request
            .details
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("No additional details provided");
        let order_id = order_id(Utc::now().timestamp_millis());

        self.mailer
            .send(
                OutgoingMail::new(
                    &self.admin_email,
                    format!("New Order from Chatbot - {service}"),
                    format!(
                        "Order ID: {order_id}\nService: {service}\nName: {name}\n\
                         Email: {email}\nPhone: {phone}\n\nDetails:\n{details}\n"
                    ),
                )
                .with_reply_to(email),
            )
            .await?;

        self.mailer
            .send(OutgoingMail::new(
                email,
                format!("Order Confirmation - {service}"),
                format!(
                    "Hi {name},\n\nThanks for your order! Your order ID is {order_id}. \
                     Our team will contact you at {phone} shortly.\n\nDetails:\n{details}\n"
                ),
            ))
            .await?;

        info!(order_id = %order_id, service = %service, "chatbot order placed");
        Ok(OrderConfirmation {
            success: true,
            message: "Order placed successfully".to_string(),
            order_id,
        })
    }
}

/// `RHX-` followed by the last eight digits of the unix timestamp in millis.
fn order_id(unix_millis: i64) -> String {
    format!("{ORDER_ID_PREFIX}{:08}", unix_millis.rem_euclid(100_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mail::MemoryMailer;

    fn request() -> OrderRequest {
        OrderRequest {
            service: "Mobile App".into(),
            name: "Sam".into(),
            email: "sam@example.org".into(),
            phone: "+1 555 0100".into(),
            details: None,
        }
    }

    #[test]
    fn order_ids_keep_the_last_eight_digits() {
        assert_eq!(order_id(1_712_345_678_901), "RHX-45678901");
        assert_eq!(order_id(1_700_000_001_234), "RHX-00001234");
    }

    #[tokio::test]
    async fn places_order_and_mails_both_parties() {
        let mailer = Arc::new(MemoryMailer::default());
        let orders = OrderService::new(mailer.clone(), "admin@example.com");

        let confirmation = orders.place(request()).await.unwrap();

        assert!(confirmation.success);
        assert!(confirmation.order_id.starts_with("RHX-"));
        assert_eq!(confirmation.order_id.len(), 12);

        let admin = mailer.last_to("admin@example.com").await.unwrap();
        assert!(admin.body.contains(&confirmation.order_id));
        assert!(admin.body.contains("No additional details provided"));
        let customer = mailer.last_to("sam@example.org").await.unwrap();
        assert_eq!(customer.subject, "Order Confirmation - Mobile App");
    }

    #[tokio::test]
    async fn rejects_missing_fields_and_bad_emails() {
        let mailer = Arc::new(MemoryMailer::default());
        let orders = OrderService::new(mailer.clone(), "admin@example.com");

        let mut missing = request();
        missing.phone = String::new();
        assert_eq!(
            orders.place(missing).await.unwrap_err().to_string(),
            "Missing required fields"
        );

        let mut bad = request();
        bad.email = "sam at example".into();
        assert_eq!(
            orders.place(bad).await.unwrap_err().to_string(),
            "Invalid email format"
        );
        assert!(mailer.sent().await.is_empty());
    }
}
