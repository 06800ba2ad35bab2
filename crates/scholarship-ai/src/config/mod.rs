use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::workflows::scholarship::regression::{TrainingConfig, DEFAULT_MIN_SAMPLES};

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
    pub model: ModelConfig,
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

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            model: ModelConfig::from_env()?,
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

/// Training hyper-parameters and the model selection threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub min_samples_per_scholarship: usize,
    pub learning_rate: f64,
    pub epochs: usize,
    pub l2_coefficient: f64,
    pub train_split: f64,
    pub training_seed: Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let training = TrainingConfig::default();
        Self {
            min_samples_per_scholarship: DEFAULT_MIN_SAMPLES,
            learning_rate: training.learning_rate,
            epochs: training.epochs,
            l2_coefficient: training.l2_coefficient,
            train_split: training.split_fraction,
            training_seed: None,
        }
    }
}

impl ModelConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            min_samples_per_scholarship: parse_var(
                "APP_MIN_SAMPLES_PER_SCHOLARSHIP",
                defaults.min_samples_per_scholarship,
            )?,
            learning_rate: parse_var("APP_LEARNING_RATE", defaults.learning_rate)?,
            epochs: parse_var("APP_EPOCHS", defaults.epochs)?,
            l2_coefficient: parse_var("APP_L2_COEFFICIENT", defaults.l2_coefficient)?,
            train_split: parse_var("APP_TRAIN_SPLIT", defaults.train_split)?,
            training_seed: match env::var("APP_TRAINING_SEED") {
                Ok(raw) => Some(parse_value("APP_TRAINING_SEED", &raw)?),
                Err(_) => None,
            },
        };

        config
            .training()
            .validate()
            .map_err(|err| ConfigError::OutOfRange {
                message: err.to_string(),
            })?;
        Ok(config)
    }

    /// Training configuration sharing the selection threshold as its sample minimum.
    pub fn training(&self) -> TrainingConfig {
        TrainingConfig {
            learning_rate: self.learning_rate,
            epochs: self.epochs,
            l2_coefficient: self.l2_coefficient,
            split_fraction: self.train_split,
            min_samples: self.min_samples_per_scholarship,
            seed: self.training_seed,
            ..TrainingConfig::default()
        }
    }
}

fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => parse_value(name, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(name: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse::<T>().map_err(|_| ConfigError::InvalidNumber {
        variable: name,
        value: raw.to_string(),
    })
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { variable: &'static str, value: String },
    OutOfRange { message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { variable, value } => {
                write!(f, "{variable} must be numeric, got '{value}'")
            }
            ConfigError::OutOfRange { message } => write!(f, "model configuration: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::OutOfRange { .. } => None,
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
            "APP_MIN_SAMPLES_PER_SCHOLARSHIP",
            "APP_LEARNING_RATE",
            "APP_EPOCHS",
            "APP_L2_COEFFICIENT",
            "APP_TRAIN_SPLIT",
            "APP_TRAINING_SEED",
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
        assert_eq!(config.model, ModelConfig::default());
        assert_eq!(config.model.min_samples_per_scholarship, 30);
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
    fn model_overrides_flow_into_training_config() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_MIN_SAMPLES_PER_SCHOLARSHIP", "12");
        env::set_var("APP_EPOCHS", "250");
        env::set_var("APP_TRAINING_SEED", "7");
        let config = AppConfig::load().expect("config loads");
        let training = config.model.training();
        assert_eq!(training.min_samples, 12);
        assert_eq!(training.epochs, 250);
        assert_eq!(training.seed, Some(7));
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_learning_rate() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_LEARNING_RATE", "fast");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { variable, .. }) => {
                assert_eq!(variable, "APP_LEARNING_RATE")
            }
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_out_of_range_split() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_TRAIN_SPLIT", "1.5");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::OutOfRange { .. })
        ));
        reset_env();
    }
}
