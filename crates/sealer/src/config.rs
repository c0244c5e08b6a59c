//! Bootstrap configuration loading and validation.
//!
//! These values are read from environment variables before anything else
//! runs. Everything else, including the sealing key, is hydrated from
//! Parameter Store under [`Config::config_path`].

use anyhow::{Context, Result};
use serde::Deserialize;

/// Validated bootstrap configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Parameter Store namespace holding this deployment's settings.
    #[serde(default = "default_config_path")]
    pub config_path: String,

    /// Port the HTTP server listens on.
    #[serde(default = "default_listen_port")]
    pub listen_port: u16,

    /// Associated data bound into every envelope. Must be identical across
    /// every instance that shares a key.
    #[serde(default = "default_auth_context")]
    pub auth_context: String,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Deadline for hydrating settings before startup is abandoned.
    #[serde(default = "default_startup_timeout")]
    pub startup_timeout_secs: u64,

    /// Optional SSM endpoint override.
    #[serde(default)]
    pub ssm_endpoint_url: Option<String>,

    /// Optional OTLP endpoint. Spans are only exported when set.
    #[serde(default)]
    pub otel_exporter_otlp_endpoint: Option<String>,

    /// Tracing log level (e.g. `"info"`, `"debug"`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_config_path() -> String {
    "example-app".into()
}
fn default_listen_port() -> u16 {
    8080
}
fn default_auth_context() -> String {
    "example-service-envelope".into()
}
fn default_max_body_bytes() -> usize {
    1024 * 1024
}
fn default_startup_timeout() -> u64 {
    30
}
fn default_log_level() -> String {
    "info".into()
}

impl Config {
    /// Load and validate configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable cannot be parsed or fails validation.
    pub fn from_env() -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()
            .context("failed to build configuration from environment")?;

        let c: Config = cfg
            .try_deserialize()
            .context("failed to deserialise configuration")?;

        c.validate()?;
        Ok(c)
    }

    /// Validate all fields, returning a descriptive error on the first failure.
    fn validate(&self) -> Result<()> {
        ensure_non_empty(&self.config_path, "CONFIG_PATH")?;
        ensure_non_empty(&self.auth_context, "AUTH_CONTEXT")?;

        if self.max_body_bytes == 0 {
            anyhow::bail!("MAX_BODY_BYTES must be > 0");
        }
        if self.startup_timeout_secs == 0 {
            anyhow::bail!("STARTUP_TIMEOUT_SECS must be > 0");
        }
        if let Some(endpoint) = &self.otel_exporter_otlp_endpoint {
            ensure_non_empty(endpoint, "OTEL_EXPORTER_OTLP_ENDPOINT")?;
        }
        Ok(())
    }
}

fn ensure_non_empty(value: &str, name: &str) -> Result<()> {
    if value.trim().is_empty() {
        anyhow::bail!("{name} is required and must not be empty");
    }
    Ok(())
}
