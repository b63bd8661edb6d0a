//! Layered application configuration.
//!
//! Precedence, lowest first: built-in defaults, the TOML file (`bluread.toml`
//! or `--config`), `BLUREAD_*` environment variables, then CLI flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::core::transfer_engine::TransferEngineType;
use crate::disc::TitleFilter;

pub const DEFAULT_CONFIG_FILE: &str = "bluread.toml";
pub const ENV_PREFIX: &str = "BLUREAD_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory rip images are written to.
    pub output_directory: PathBuf,
    pub transfer_engine: TransferEngineType,
    pub dd_path: PathBuf,
    pub isoinfo_path: PathBuf,
    /// Block size used by `copy` when none is given.
    pub block_size: u64,
    /// Hash-compare source and destination after copying.
    pub verify: bool,
    pub keydb: Option<PathBuf>,
    pub title_filter: TitleFilter,
    /// Seconds; shorter titles are not reported.
    pub min_title_length: u32,
    pub simulation: bool,
    pub verbose: bool,
    pub json_logs: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output_directory: PathBuf::from("."),
            transfer_engine: TransferEngineType::Dd,
            dd_path: PathBuf::from("dd"),
            isoinfo_path: PathBuf::from("isoinfo"),
            block_size: 2048,
            verify: false,
            keydb: None,
            title_filter: TitleFilter::All,
            min_title_length: 0,
            simulation: false,
            verbose: false,
            json_logs: false,
        }
    }
}

impl AppConfig {
    /// Load the layered configuration. `overrides` is any serializable set of
    /// CLI values whose `None` fields are skipped.
    pub fn new<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Result<Self> {
        Self::figment(config_file, overrides)
            .extract()
            .context("Failed to load configuration")
    }

    pub fn figment<T: Serialize>(config_file: Option<&Path>, overrides: Option<&T>) -> Figment {
        let file = config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()))
            .merge(Toml::file(file))
            .merge(Env::prefixed(ENV_PREFIX));

        if let Some(overrides) = overrides {
            figment = figment.merge(Serialized::defaults(overrides));
        }

        figment
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[derive(Serialize)]
    struct Overrides {
        #[serde(skip_serializing_if = "Option::is_none")]
        block_size: Option<u64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        verify: Option<bool>,
    }

    #[test]
    fn test_defaults() {
        Jail::expect_with(|_jail| {
            let config = AppConfig::new(None, None::<&Overrides>).unwrap();
            assert_eq!(config, AppConfig::default());
            Ok(())
        });
    }

    #[test]
    fn test_file_then_env_then_cli() {
        Jail::expect_with(|jail| {
            jail.create_file(
                DEFAULT_CONFIG_FILE,
                r#"
                block_size = 4096
                transfer_engine = "native"
                verify = false
                output_directory = "/srv/rips"
                "#,
            )?;
            jail.set_env("BLUREAD_VERIFY", "true");
            jail.set_env("BLUREAD_BLOCK_SIZE", "8192");

            let from_env = AppConfig::new(None, None::<&Overrides>).unwrap();
            assert_eq!(from_env.block_size, 8192);
            assert!(from_env.verify);
            assert_eq!(from_env.transfer_engine, TransferEngineType::Native);
            assert_eq!(from_env.output_directory, PathBuf::from("/srv/rips"));

            let overrides = Overrides {
                block_size: Some(512),
                verify: None,
            };
            let from_cli = AppConfig::new(None, Some(&overrides)).unwrap();
            assert_eq!(from_cli.block_size, 512);
            assert!(from_cli.verify);
            Ok(())
        });
    }

    #[test]
    fn test_explicit_config_file() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "custom.toml",
                "title_filter = \"relevant\"\nmin_title_length = 300",
            )?;
            let file = Path::new("custom.toml");
            let config = AppConfig::new(Some(file), None::<&Overrides>).unwrap();
            assert_eq!(config.title_filter, TitleFilter::Relevant);
            assert_eq!(config.min_title_length, 300);
            Ok(())
        });
    }

    #[test]
    fn test_to_toml_round_trips() {
        let config = AppConfig {
            keydb: Some(PathBuf::from("/etc/keydb.cfg")),
            ..AppConfig::default()
        };
        let text = config.to_toml().unwrap();
        let parsed: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
