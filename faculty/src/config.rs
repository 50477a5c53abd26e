use config::{Config, Environment, File};
use serde::Deserialize;
use std::{collections::HashMap, env, path::Path};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Name reported by the tracer on every span.
    #[serde(default = "default_service_name")]
    pub service_name: String,
    pub format: LoggingFormat,
    pub filter: String,
    pub file: Option<LoggingFileConfig>,
    pub buffer_limit: usize,
    pub lossy: bool,
}

fn default_service_name() -> String {
    env!("CARGO_PKG_NAME").to_owned()
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingFileConfig {
    pub format: LoggingFormat,
    pub directory: String,
    pub filename: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    Json,
    Pretty,
    Full,
    Compact,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    pub fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

impl AppConfig {
    /// Loads `default`, then the `APP_ENV` file, then `local`, then
    /// `FACULTY_*` environment variables.
    pub fn new<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let run_mode = env::var("APP_ENV").ok();
        Self::load_with_options(path, run_mode, None)
    }

    pub fn load_with_options<P: AsRef<Path>>(
        path: P,
        run_mode: Option<String>,
        overrides: Option<HashMap<String, String>>,
    ) -> crate::Result<Self> {
        let dir = path.as_ref().to_string_lossy();
        let mut builder = Config::builder()
            .add_source(File::with_name(&format!("{dir}/default")));

        if let Some(run_mode) = run_mode.filter(|m| !m.is_empty()) {
            builder = builder.add_source(
                File::with_name(&format!("{dir}/{run_mode}")).required(false),
            );
        }

        // never committed
        builder = builder
            .add_source(
                File::with_name(&format!("{dir}/local")).required(false),
            )
            .add_source(
                Environment::with_prefix("FACULTY")
                    .prefix_separator("_")
                    .separator("__"),
            );

        if let Some(overrides) = overrides {
            for (key, value) in overrides {
                builder = builder
                    .set_override(key, value)
                    .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))?;
            }
        }

        builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| crate::Error::Config(anyhow::anyhow!(e)))
    }
}
