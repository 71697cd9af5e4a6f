pub mod analytics;
pub mod contact;
pub mod health;
pub mod multipart;
pub mod projects;
