use thiserror::Error;
use url::Url;

use super::models::{
    Config, CorsConfig, DEFAULT_ADMIN_EMAIL, DEFAULT_MAIL_FROM,
};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("CORS wildcard origins are not allowed when DEV_MODE is false")]
    DangerousCorsWildcard,
    #[error("invalid CORS configuration: {reason}")]
    InvalidCorsConfig { reason: String },
    #[error("PUBLIC_BASE_URL must be an absolute http(s) URL, got '{value}'")]
    InvalidPublicBaseUrl { value: String },
    #[error("{field} must be greater than zero")]
    ZeroLimit { field: &'static str },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    if !config.dev_mode && config.cors.is_wildcard_included() {
        return Err(ConfigGuardRailError::DangerousCorsWildcard);
    }
    validate_cors(&config.cors)?;

    let base = Url::parse(&config.server.public_base_url).map_err(|_| {
        ConfigGuardRailError::InvalidPublicBaseUrl {
            value: config.server.public_base_url.clone(),
        }
    })?;
    if !matches!(base.scheme(), "http" | "https") {
        return Err(ConfigGuardRailError::InvalidPublicBaseUrl {
            value: config.server.public_base_url.clone(),
        });
    }

    if config.server.max_body_bytes == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "MAX_BODY_BYTES",
        });
    }
    if config.storage.upload_timeout_secs == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "UPLOAD_TIMEOUT_SECS",
        });
    }
    if config.verification.ttl_secs == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "VERIFICATION_TTL_SECS",
        });
    }
    if config.database.max_connections == 0 {
        return Err(ConfigGuardRailError::ZeroLimit {
            field: "DATABASE_MAX_CONNECTIONS",
        });
    }

    if config.database.url.is_none() {
        warnings.push_with_hint(
            "DATABASE_URL not configured; projects, verifications and click counts are kept in memory",
            "Set DATABASE_URL to a PostgreSQL connection string to persist data across restarts",
        );
    }

    if !config.dev_mode
        && matches!(base.host_str(), Some("localhost" | "127.0.0.1"))
    {
        warnings.push_with_hint(
            format!(
                "PUBLIC_BASE_URL is {} outside of dev mode; stored image URLs will not resolve for visitors",
                config.server.public_base_url
            ),
            "Set PUBLIC_BASE_URL to the public origin of this server",
        );
    }

    if config.mail.admin_email == DEFAULT_ADMIN_EMAIL {
        warnings.push_with_hint(
            "ADMIN_EMAIL not configured; contact requests and orders go to a placeholder address",
            "Set ADMIN_EMAIL to the inbox that should receive them",
        );
    }
    if config.mail.from == DEFAULT_MAIL_FROM && !config.dev_mode {
        warnings.push("MAIL_FROM not configured; using the placeholder sender address");
    }

    Ok(warnings)
}

fn validate_cors(cors: &CorsConfig) -> Result<(), ConfigGuardRailError> {
    for origin in &cors.allowed_origins {
        if origin == "*" {
            continue;
        }
        let parsed = Url::parse(origin).map_err(|err| {
            ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' is not a URL: {err}"),
            }
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' must use http or https"),
            });
        }
        if parsed.path() != "/" || parsed.query().is_some() {
            return Err(ConfigGuardRailError::InvalidCorsConfig {
                reason: format!("origin '{origin}' must not contain a path"),
            });
        }
    }
    Ok(())
}
