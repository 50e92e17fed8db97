//! Configuration management for the heart risk service

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Environment variable overriding the model artifact location
pub const MODEL_PATH_ENV: &str = "MODEL_PATH";
/// Environment variable overriding the descriptor location
pub const META_PATH_ENV: &str = "META_PATH";

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub model: ModelConfig,
    pub server: ServerConfig,
    pub form: FormConfig,
    pub metrics: MetricsConfig,
    pub logging: LoggingConfig,
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// ONNX model file
    pub model_path: String,
    /// JSON descriptor with `model_type` and ordered `features`
    pub meta_path: String,
    /// Number of threads for ONNX inference
    pub onnx_threads: usize,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Form surface configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FormConfig {
    /// Value used for fields the user left blank.
    /// Only the form applies it; API callers must send every feature.
    pub unset_default: f64,
}

/// Metrics configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MetricsConfig {
    /// Seconds between logged summaries; 0 disables the reporter
    pub report_interval_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl AppConfig {
    /// Load configuration from the default file location
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/config.toml")
    }

    /// Load configuration from a specific path.
    ///
    /// Precedence, lowest first: built-in defaults, the file (optional),
    /// `HEART__SECTION__KEY` variables, then `MODEL_PATH` / `META_PATH`.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let defaults = Self::default();

        let config = Config::builder()
            .set_default("model.model_path", defaults.model.model_path)?
            .set_default("model.meta_path", defaults.model.meta_path)?
            .set_default("model.onnx_threads", defaults.model.onnx_threads as i64)?
            .set_default("server.host", defaults.server.host)?
            .set_default("server.port", defaults.server.port as i64)?
            .set_default("form.unset_default", defaults.form.unset_default)?
            .set_default(
                "metrics.report_interval_secs",
                defaults.metrics.report_interval_secs as i64,
            )?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("HEART")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("model.model_path", std::env::var(MODEL_PATH_ENV).ok())?
            .set_override_option("model.meta_path", std::env::var(META_PATH_ENV).ok())?
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig {
                model_path: "model/heart_model.onnx".to_string(),
                meta_path: "model/meta.json".to_string(),
                onnx_threads: 1,
            },
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            form: FormConfig { unset_default: 0.0 },
            metrics: MetricsConfig {
                report_interval_secs: 60,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }
}
