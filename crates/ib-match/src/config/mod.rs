use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use crate::matching::ScoringConfig;

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
    pub catalog: CatalogConfig,
    pub scoring: ScoringConfig,
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
        let format = LogFormat::from_str(&env::var("APP_LOG_FORMAT").unwrap_or_default());

        let catalog = CatalogConfig::from_env()?;
        let scoring = scoring_from_env()?;

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level, format },
            catalog,
            scoring,
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
    pub format: LogFormat,
}

/// Output layout for the fmt subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

/// Location of the programme catalog feed. `None` selects the bundled sample catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogConfig {
    pub sources: Option<CatalogSources>,
}

/// Pair of CSV exports making up a programme catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSources {
    pub programs_csv: PathBuf,
    pub requirements_csv: PathBuf,
}

impl CatalogConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let programs = non_empty_var("CATALOG_PROGRAMS_CSV");
        let requirements = non_empty_var("CATALOG_REQUIREMENTS_CSV");

        match (programs, requirements) {
            (Some(programs), Some(requirements)) => Ok(Self {
                sources: Some(CatalogSources {
                    programs_csv: PathBuf::from(programs),
                    requirements_csv: PathBuf::from(requirements),
                }),
            }),
            (None, None) => Ok(Self::default()),
            _ => Err(ConfigError::IncompleteCatalogSources),
        }
    }
}

fn scoring_from_env() -> Result<ScoringConfig, ConfigError> {
    let defaults = ScoringConfig::default();

    Ok(ScoringConfig {
        points_weight: parse_var("SCORING_POINTS_WEIGHT")?.unwrap_or(defaults.points_weight),
        points_margin_cap: parse_var("SCORING_POINTS_MARGIN_CAP")?
            .unwrap_or(defaults.points_margin_cap),
        advisory_bonus: parse_var("SCORING_ADVISORY_BONUS")?.unwrap_or(defaults.advisory_bonus),
        grade_surplus_weight: parse_var("SCORING_GRADE_SURPLUS_WEIGHT")?
            .unwrap_or(defaults.grade_surplus_weight),
        grade_surplus_cap: parse_var("SCORING_GRADE_SURPLUS_CAP")?
            .unwrap_or(defaults.grade_surplus_cap),
    }
    .sanitized())
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_var<T: FromStr>(name: &'static str) -> Result<Option<T>, ConfigError> {
    match non_empty_var(name) {
        Some(value) => value
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidNumber {
                variable: name,
                value,
            }),
        None => Ok(None),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    IncompleteCatalogSources,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must be an IP address or 'localhost'")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be numeric (found '{value}')")
            }
            ConfigError::IncompleteCatalogSources => write!(
                f,
                "CATALOG_PROGRAMS_CSV and CATALOG_REQUIREMENTS_CSV must be set together"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::IncompleteCatalogSources => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for name in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "CATALOG_PROGRAMS_CSV",
            "CATALOG_REQUIREMENTS_CSV",
            "SCORING_POINTS_WEIGHT",
            "SCORING_POINTS_MARGIN_CAP",
            "SCORING_ADVISORY_BONUS",
            "SCORING_GRADE_SURPLUS_WEIGHT",
            "SCORING_GRADE_SURPLUS_CAP",
        ] {
            env::remove_var(name);
        }
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.catalog, CatalogConfig::default());
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn catalog_paths_must_be_paired() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("CATALOG_PROGRAMS_CSV", "/srv/catalog/programs.csv");
        let err = AppConfig::load().expect_err("half-configured catalog rejected");
        assert!(matches!(err, ConfigError::IncompleteCatalogSources));

        env::set_var("CATALOG_REQUIREMENTS_CSV", "/srv/catalog/requirements.csv");
        let config = AppConfig::load().expect("paired catalog paths load");
        let sources = config.catalog.sources.expect("sources configured");
        assert_eq!(
            sources.requirements_csv,
            PathBuf::from("/srv/catalog/requirements.csv")
        );
        reset_env();
    }

    #[test]
    fn scoring_overrides_are_parsed_and_sanitized() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("SCORING_ADVISORY_BONUS", "0.8");
        env::set_var("SCORING_GRADE_SURPLUS_CAP", "0");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.advisory_bonus, 0.8);
        assert_eq!(
            config.scoring.grade_surplus_cap,
            ScoringConfig::default().grade_surplus_cap
        );

        env::set_var("SCORING_POINTS_WEIGHT", "heavy");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { variable, value }) => {
                assert_eq!(variable, "SCORING_POINTS_WEIGHT");
                assert_eq!(value, "heavy");
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }
}
