use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "ops-status.toml";

/// Process-wide settings, built once at startup and passed to the handlers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Status table settings
    pub store: StoreConfig,
    /// Auth code settings
    pub auth: AuthConfig,
    /// Logical name to store id mapping
    pub status: StatusConfig,
    /// Business hours settings for the clock function
    pub business_hours: BusinessHoursConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    File,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Which backend holds the status table
    pub backend: StoreBackend,
    /// Table identifier
    pub table_name: String,
    /// Directory for the file backend
    pub data_dir: PathBuf,
}

/// Where `change_status` requests get their authorization checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthPolicy {
    /// The caller has already run `check_auth` in an earlier step
    Upstream,
    /// The request must carry an `auth_code` that passes the check
    Inline,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Accepted shared-secret codes
    pub valid_codes: Vec<String>,
    pub policy: AuthPolicy,
}

impl AuthConfig {
    pub fn valid_code_set(&self) -> HashSet<String> {
        self.valid_codes.iter().cloned().collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct StatusIdMapping {
    pub logical: String,
    pub store_id: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatusConfig {
    /// Logical names that are stored under a different id
    pub id_map: Vec<StatusIdMapping>,
}

impl StatusConfig {
    pub fn id_map(&self) -> HashMap<String, String> {
        self.id_map
            .iter()
            .map(|m| (m.logical.clone(), m.store_id.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusinessHoursConfig {
    /// Daily cutoff in 24-hour HH:MM
    pub closing_time: String,
    /// Fixed offset from UTC, in hours
    pub utc_offset_hours: i32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON log lines
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                backend: StoreBackend::File,
                table_name: "ops-status".to_string(),
                data_dir: PathBuf::from(".ops-status"),
            },
            auth: AuthConfig {
                valid_codes: vec!["123456".to_string(), "654321".to_string()],
                policy: AuthPolicy::Upstream,
            },
            status: StatusConfig {
                id_map: vec![
                    StatusIdMapping {
                        logical: "Emergency Mode".to_string(),
                        store_id: "SC Emergency Mode".to_string(),
                    },
                    StatusIdMapping {
                        logical: "Meeting Mode".to_string(),
                        store_id: "FES Meeting Mode".to_string(),
                    },
                ],
            },
            business_hours: BusinessHoursConfig {
                closing_time: "16:30".to_string(),
                utc_offset_hours: 10,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (`ops-status.toml`, or `path` when given)
    /// 3. Environment variables prefixed with `OPS_STATUS_` (`__` between sections)
    /// 4. The deployment variables `TABLE_NAME` and `BUSINESS_CLOSING_TIME`
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder =
            Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path).required(true));
            }
            None if Path::new(CONFIG_FILE).exists() => {
                builder = builder.add_source(File::with_name(CONFIG_FILE));
            }
            None => {}
        }

        builder = builder
            .add_source(
                Environment::with_prefix("OPS_STATUS")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.valid_codes")
                    .try_parsing(true),
            )
            .set_override_option("store.table_name", std::env::var("TABLE_NAME").ok())?
            .set_override_option(
                "business_hours.closing_time",
                std::env::var("BUSINESS_CLOSING_TIME").ok(),
            )?;

        let config = builder.build().context("Failed to build configuration")?;
        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to read configuration")?;

        tracing::debug!(
            table = %app_config.store.table_name,
            backend = ?app_config.store.backend,
            "Configuration loaded"
        );
        Ok(app_config)
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
        }
        Ok(())
    }
}
