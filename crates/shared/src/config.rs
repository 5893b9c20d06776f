//! Application configuration management.

use serde::Deserialize;

use crate::types::Tolerance;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Ledger engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LogConfig,
}

/// Ledger engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Tolerance used for every balance comparison.
    #[serde(default)]
    pub tolerance: Tolerance,
    /// Maximum number of entry lines written per store call during import.
    #[serde(default = "default_import_batch_size")]
    pub import_batch_size: usize,
    /// Number of entry groups imported concurrently.
    #[serde(default = "default_import_workers")]
    pub import_workers: usize,
    /// Currency given to accounts and lines created without one.
    #[serde(default = "default_currency")]
    pub default_currency: String,
    /// Status assigned to imported entries (`draft`, `review`, `validated` or `posted`).
    #[serde(default = "default_import_status")]
    pub import_status: String,
    /// Whether the import creates accounts it has never seen.
    #[serde(default = "default_true")]
    pub create_missing_accounts: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            import_batch_size: default_import_batch_size(),
            import_workers: default_import_workers(),
            default_currency: default_currency(),
            import_status: default_import_status(),
            create_missing_accounts: true,
        }
    }
}

fn default_import_batch_size() -> usize {
    100
}

fn default_import_workers() -> usize {
    4
}

fn default_currency() -> String {
    "EUR".to_string()
}

fn default_import_status() -> String {
    "validated".to_string()
}

fn default_true() -> bool {
    true
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

fn default_filter() -> String {
    "grandlivre=info".to_string()
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("GRANDLIVRE").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
