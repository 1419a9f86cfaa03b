use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_MAX_RESOLUTION_ATTEMPTS: u8 = 3;
const MAX_RESOLUTION_ATTEMPTS_LIMIT: u8 = 10;
const DEFAULT_NOTIFY_RECIPIENT: &str = "studio@localhost";

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
    pub assessment: AssessmentConfig,
}

impl AppConfig {
    /// Read settings from the process environment, after loading any `.env` file.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&env_or("APP_ENV", "development"));
        let server = ServerConfig {
            host: env_or("APP_HOST", "127.0.0.1"),
            port: env_or("APP_PORT", "3000")
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort)?,
        };
        let telemetry = TelemetryConfig {
            log_level: env_or("APP_LOG_LEVEL", "info"),
        };

        Ok(Self {
            environment,
            server,
            telemetry,
            assessment: AssessmentConfig::from_env()?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
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

/// Assessment workflow dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssessmentConfig {
    /// Remedies allowed per attempt before the workflow forces a restart.
    pub max_resolution_attempts: u8,
    pub notify_recipient: String,
}

impl AssessmentConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_resolution_attempts = match env::var("APP_MAX_RESOLUTION_ATTEMPTS") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|attempts| (1..=MAX_RESOLUTION_ATTEMPTS_LIMIT).contains(attempts))
                .ok_or(ConfigError::InvalidResolutionAttempts(raw))?,
            Err(_) => DEFAULT_MAX_RESOLUTION_ATTEMPTS,
        };

        Ok(Self {
            max_resolution_attempts,
            notify_recipient: env_or("APP_NOTIFY_RECIPIENT", DEFAULT_NOTIFY_RECIPIENT),
        })
    }
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            max_resolution_attempts: DEFAULT_MAX_RESOLUTION_ATTEMPTS,
            notify_recipient: DEFAULT_NOTIFY_RECIPIENT.to_string(),
        }
    }
}

/// Rejected environment settings.
#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidResolutionAttempts(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidResolutionAttempts(value) => write!(
                f,
                "APP_MAX_RESOLUTION_ATTEMPTS must be between 1 and {} (found '{}')",
                MAX_RESOLUTION_ATTEMPTS_LIMIT, value
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidResolutionAttempts(_) => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
