use serde::{Deserialize, Serialize};
use std::{path::PathBuf, str::FromStr};

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub storage: FileStorageConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub mail: FileMailConfig,
    #[serde(default)]
    pub verification: FileVerificationConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_body_bytes: Option<usize>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileStorageConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileMailConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_email: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileVerificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl_secs: Option<u64>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub public_base_url: Option<String>,
    pub max_body_bytes: Option<usize>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub storage_root: Option<PathBuf>,
    pub upload_timeout_secs: Option<u64>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub mail_from: Option<String>,
    pub admin_email: Option<String>,
    pub verification_ttl_secs: Option<u64>,
    pub dev_mode: Option<bool>,
    pub config_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            server_host: non_empty(lookup("SERVER_HOST")),
            server_port: parse_value(lookup("SERVER_PORT")),
            public_base_url: non_empty(lookup("PUBLIC_BASE_URL")),
            max_body_bytes: parse_value(lookup("MAX_BODY_BYTES")),
            database_url: non_empty(lookup("DATABASE_URL")),
            database_max_connections: parse_value(lookup("DATABASE_MAX_CONNECTIONS")),
            storage_root: non_empty(lookup("STORAGE_ROOT")).map(PathBuf::from),
            upload_timeout_secs: parse_value(lookup("UPLOAD_TIMEOUT_SECS")),
            cors_allowed_origins: parse_csv(lookup("CORS_ALLOWED_ORIGINS")),
            mail_from: non_empty(lookup("MAIL_FROM")),
            admin_email: non_empty(lookup("ADMIN_EMAIL")),
            verification_ttl_secs: parse_value(lookup("VERIFICATION_TTL_SECS")),
            dev_mode: parse_bool(lookup("DEV_MODE")),
            config_path: non_empty(lookup("FOLIO_CONFIG_PATH")).map(PathBuf::from),
        }
    }
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_value<T: FromStr>(raw: Option<String>) -> Option<T> {
    raw.and_then(|value| value.trim().parse().ok())
}

fn parse_csv(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|raw| {
        raw.split(',')
            .filter_map(|part| {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect()
    })
}

fn parse_bool(raw: Option<String>) -> Option<bool> {
    raw.and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> EnvConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn reads_typed_values() {
        let env = env(&[
            ("SERVER_PORT", "8080"),
            ("UPLOAD_TIMEOUT_SECS", " 12 "),
            ("DEV_MODE", "Yes"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, ,https://b.example"),
        ]);

        assert_eq!(env.server_port, Some(8080));
        assert_eq!(env.upload_timeout_secs, Some(12));
        assert_eq!(env.dev_mode, Some(true));
        assert_eq!(
            env.cors_allowed_origins,
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
    }

    #[test]
    fn ignores_blank_and_unparseable_values() {
        let env = env(&[
            ("SERVER_PORT", "eighty"),
            ("DATABASE_URL", "   "),
            ("DEV_MODE", "maybe"),
        ]);

        assert_eq!(env.server_port, None);
        assert_eq!(env.database_url, None);
        assert_eq!(env.dev_mode, None);
    }

    #[test]
    fn file_config_accepts_partial_sections() {
        let file: FileConfig = toml::from_str(
            r#"
            dev_mode = true

            [server]
            port = 7000

            [storage]
            upload_timeout_secs = 5
            "#,
        )
        .unwrap();

        assert_eq!(file.server.port, Some(7000));
        assert_eq!(file.storage.upload_timeout_secs, Some(5));
        assert_eq!(file.dev_mode, Some(true));
        assert!(file.database.url.is_none());
    }
}
