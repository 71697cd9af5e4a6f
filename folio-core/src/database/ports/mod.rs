//! Repository ports. Implementations live in `database::postgres` and
//! `database::memory`.

pub mod clicks;
pub mod projects;
pub mod verifications;

pub use clicks::ClickRepository;
pub use projects::ProjectRepository;
pub use verifications::{VerificationRecord, VerificationRepository};
