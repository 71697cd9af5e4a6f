//! Configuration for the Folio server.
//!
//! Values are layered: process environment (optionally seeded from a
//! `.env` file) overrides a `folio.toml` file, which overrides built-in
//! defaults. [`ConfigLoader::load`] returns the composed [`Config`] along
//! with non-fatal [`ConfigWarnings`]; guard rails that would make the
//! server unsafe to run are reported as [`ConfigLoadError`]s instead.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    Config, ConfigMetadata, CorsConfig, DatabaseConfig, MailConfig, ServerConfig,
    StorageConfig, VerificationConfig,
};
pub use sources::{EnvConfig, FileConfig};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
