//! Application services called by the HTTP layer.

pub mod analytics;
pub mod contact;
pub mod orders;
pub mod projects;
pub mod verification;

pub use analytics::AnalyticsService;
pub use contact::ContactService;
pub use orders::OrderService;
pub use projects::{ProjectForm, ProjectService};
pub use verification::VerificationService;

/// Canonical form used to key verification records.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_ascii_lowercase()
}

/// Trimmed values of `fields`, or `None` if any of them is blank.
pub(crate) fn require_all<const N: usize>(fields: [&str; N]) -> Option<[&str; N]> {
    let trimmed = fields.map(str::trim);
    if trimmed.iter().any(|value| value.is_empty()) {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn require_all_trims_and_rejects_blanks() {
        assert_eq!(require_all([" a ", "b"]), Some(["a", "b"]));
        assert_eq!(require_all(["a", "   "]), None);
    }

    #[test]
    fn emails_are_normalized() {
        assert_eq!(normalize_email("  Jane.Doe@GMAIL.com "), "jane.doe@gmail.com");
    }
}
