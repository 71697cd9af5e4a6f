use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;

use super::{
    models::{
        Config, ConfigMetadata, CorsConfig, DEFAULT_ADMIN_EMAIL,
        DEFAULT_DB_MAX_CONNECTIONS, DEFAULT_HOST, DEFAULT_MAIL_FROM,
        DEFAULT_MAX_BODY_BYTES, DEFAULT_PORT, DEFAULT_STORAGE_ROOT,
        DEFAULT_UPLOAD_TIMEOUT_SECS, DEFAULT_VERIFICATION_TTL_SECS,
        DatabaseConfig, MailConfig, ServerConfig, StorageConfig,
        VerificationConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![PathBuf::from("folio.toml"), PathBuf::from("config/folio.toml")]
});

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose from an already gathered environment. No `.env` file is
    /// read.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            self.compose_config(file_config, env, config_path, env_file_loaded)?;

        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, explicit) = match (&self.options.config_path, &env.config_path)
        {
            (Some(path), _) | (None, Some(path)) => (path.clone(), true),
            (None, None) => match DEFAULT_CONFIG_LOCATIONS
                .iter()
                .find(|candidate| candidate.exists())
            {
                Some(path) => (path.clone(), false),
                None => return Ok((None, None)),
            },
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|source| ConfigLoadError::Io {
                path: path.clone(),
                source,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|source| {
                ConfigLoadError::Parse {
                    path: path.clone(),
                    source,
                }
            })?;

        Ok((Some(file_config), Some(path)))
    }

    fn compose_config(
        &self,
        file_config: Option<FileConfig>,
        env: EnvConfig,
        config_path: Option<PathBuf>,
        env_file_loaded: bool,
    ) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
        let mut warnings = ConfigWarnings::default();

        if config_path.is_none() {
            warnings.push_with_hint(
                "No folio.toml detected; falling back to environment variables",
                "Create folio.toml or set FOLIO_CONFIG_PATH to use a configuration file",
            );
        }

        let FileConfig {
            server: file_server,
            database: file_database,
            storage: file_storage,
            cors: file_cors,
            mail: file_mail,
            verification: file_verification,
            dev_mode: file_dev_mode,
        } = file_config.unwrap_or_default();

        let port = env.server_port.or(file_server.port).unwrap_or(DEFAULT_PORT);
        let public_base_url = env
            .public_base_url
            .or(file_server.public_base_url)
            .unwrap_or_else(|| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_string();

        let server = ServerConfig {
            host: env
                .server_host
                .or(file_server.host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            public_base_url,
            max_body_bytes: env
                .max_body_bytes
                .or(file_server.max_body_bytes)
                .unwrap_or(DEFAULT_MAX_BODY_BYTES),
        };

        let database = DatabaseConfig {
            url: env
                .database_url
                .or(file_database.url)
                .filter(|url| !url.trim().is_empty()),
            max_connections: env
                .database_max_connections
                .or(file_database.max_connections)
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),
        };

        let storage = StorageConfig {
            root: env
                .storage_root
                .or(file_storage.root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STORAGE_ROOT)),
            upload_timeout_secs: env
                .upload_timeout_secs
                .or(file_storage.upload_timeout_secs)
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
        };

        let cors = CorsConfig {
            allowed_origins: env
                .cors_allowed_origins
                .or(file_cors.allowed_origins)
                .unwrap_or_else(default_cors_origins),
        };

        let mail = MailConfig {
            from: env
                .mail_from
                .or(file_mail.from)
                .unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
            admin_email: env
                .admin_email
                .or(file_mail.admin_email)
                .unwrap_or_else(|| DEFAULT_ADMIN_EMAIL.to_string()),
        };

        let verification = VerificationConfig {
            ttl_secs: env
                .verification_ttl_secs
                .or(file_verification.ttl_secs)
                .unwrap_or(DEFAULT_VERIFICATION_TTL_SECS),
        };

        let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

        let config = Config {
            server,
            database,
            storage,
            cors,
            mail,
            verification,
            dev_mode,
            metadata: ConfigMetadata {
                config_path,
                env_file_loaded,
            },
        };

        let guard_warnings = validation::apply_guard_rails(&config)?;
        warnings.extend(guard_warnings);

        Ok((config, warnings))
    }
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
