use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};

use crate::allocation::{AllocationConfig, StrategyKind, UnknownStrategy, WeightConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub audit: AuditConfig,
    pub allocation: AllocationSettings,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let directory = env::var("AUDIT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("logs"));

        let strategy = match non_empty_var("SCORING_STRATEGY") {
            Some(raw) => raw.parse::<StrategyKind>()?,
            None => StrategyKind::default(),
        };
        let config_path = non_empty_var("ALLOCATION_CONFIG").map(PathBuf::from);

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            audit: AuditConfig { directory },
            allocation: AllocationSettings {
                strategy,
                config_path,
            },
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Where audit records are written.
#[derive(Debug, Clone)]
pub struct AuditConfig {
    pub directory: PathBuf,
}

/// Scoring strategy and optional allocation config file.
#[derive(Debug, Clone)]
pub struct AllocationSettings {
    pub strategy: StrategyKind,
    pub config_path: Option<PathBuf>,
}

impl AllocationSettings {
    /// Loads the allocation config from `path` (or the configured file) and
    /// applies environment overrides on top.
    pub fn load_allocation_config(
        &self,
        path: Option<&Path>,
    ) -> Result<AllocationConfig, ConfigError> {
        let path = path.or(self.config_path.as_deref());
        let mut config = load_allocation_file(path)?;
        ConfigOverrides::from_env()?.apply(&mut config);
        Ok(config)
    }
}

/// Reads an allocation config file. Keys present in the file replace the
/// defaults; a `weights` object replaces the default weights entirely.
pub fn load_allocation_file(path: Option<&Path>) -> Result<AllocationConfig, ConfigError> {
    let Some(path) = path else {
        return Ok(AllocationConfig::default());
    };

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Key/value overrides for bounds and weights (`MIN_PER_AGENT`,
/// `MAX_PER_AGENT`, `WEIGHTS`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub min_per_agent: Option<f64>,
    pub max_per_agent: Option<f64>,
    pub weights: Option<WeightConfig>,
}

impl ConfigOverrides {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let number = |key: &'static str| -> Result<Option<f64>, ConfigError> {
            read(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<f64>()
                        .ok()
                        .filter(|parsed| !parsed.is_nan())
                        .ok_or(ConfigError::InvalidOverride { key, value })
                })
                .transpose()
        };

        let weights = read("WEIGHTS")
            .map(|value| {
                serde_json::from_str::<WeightConfig>(&value)
                    .map_err(|source| ConfigError::InvalidWeights { source })
            })
            .transpose()?;

        Ok(Self {
            min_per_agent: number("MIN_PER_AGENT")?,
            max_per_agent: number("MAX_PER_AGENT")?,
            weights,
        })
    }

    pub fn apply(self, config: &mut AllocationConfig) {
        if let Some(min) = self.min_per_agent {
            config.min_per_agent = Some(min);
        }
        if let Some(max) = self.max_per_agent {
            config.max_per_agent = Some(max);
        }
        if let Some(weights) = self.weights {
            config.weights.merge(weights);
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidStrategy(UnknownStrategy),
    InvalidOverride {
        key: &'static str,
        value: String,
    },
    InvalidWeights {
        source: serde_json::Error,
    },
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseFile {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidStrategy(err) => write!(f, "SCORING_STRATEGY: {err}"),
            ConfigError::InvalidOverride { key, value } => {
                write!(f, "{key} must be a number (got '{value}')")
            }
            ConfigError::InvalidWeights { source } => {
                write!(f, "WEIGHTS must be a JSON object of numbers: {source}")
            }
            ConfigError::ReadFile { path, .. } => {
                write!(f, "unable to read config file {}", path.display())
            }
            ConfigError::ParseFile { path, source } => {
                write!(f, "invalid config file {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidOverride { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidStrategy(err) => Some(err),
            ConfigError::InvalidWeights { source } => Some(source),
            ConfigError::ReadFile { source, .. } => Some(source),
            ConfigError::ParseFile { source, .. } => Some(source),
        }
    }
}

impl From<UnknownStrategy> for ConfigError {
    fn from(value: UnknownStrategy) -> Self {
        Self::InvalidStrategy(value)
    }
}
