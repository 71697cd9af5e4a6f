use std::{fmt, sync::Arc};

use folio_model::ContactRequest;
use tracing::info;

use super::{VerificationService, normalize_email, require_all};
use crate::error::{FolioError, Result};
use crate::mail::{Mailer, OutgoingMail};

/// Relays quote requests from verified visitors to the site owner.
#[derive(Clone)]
pub struct ContactService {
    verifications: VerificationService,
    mailer: Arc<dyn Mailer>,
    owner_email: String,
}

impl fmt::Debug for ContactService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContactService")
            .field("owner_email", &self.owner_email)
            .finish_non_exhaustive()
    }
}

impl ContactService {
    pub fn new(
        verifications: VerificationService,
        mailer: Arc<dyn Mailer>,
        owner_email: impl Into<String>,
    ) -> Self {
        Self {
            verifications,
            mailer,
            owner_email: owner_email.into(),
        }
    }

    pub async fn submit(&self, request: ContactRequest) -> Result<()> {
        let [name, email, service, message] = require_all([
            request.name.as_str(),
            request.email.as_str(),
            request.service.as_str(),
            request.message.as_str(),
        ])
        .ok_or_else(|| FolioError::validation("All fields are required."))?;
        let email = normalize_email(email);

        if !self.verifications.is_verified(&email).await? {
            return Err(FolioError::validation(
                "Email not verified. Please verify your email first.",
            ));
        }

        let owner_mail = OutgoingMail::new(
            &self.owner_email,
            format!("New Quote Request: {service} from {name}"),
            format!(
                "Name: {name}\nEmail: {email}\nService: {service}\n\nMessage:\n{message}\n"
            ),
        )
        .with_reply_to(&email);
        self.mailer.send(owner_mail).await?;

        let acknowledgement = OutgoingMail::new(
            &email,
            "Thank you for contacting us",
            format!(
                "Hi {name},\n\nWe received your request about {service} and will \
                 get back to you shortly.\n\nYour message:\n{message}\n"
            ),
        );
        self.mailer.send(acknowledgement).await?;

        self.verifications.consume(&email).await?;
        info!(email = %email, service = %service, "contact request relayed");
        Ok(())
    }
}
