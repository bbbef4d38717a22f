use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{Result, ScraperError};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub site: SiteConfig,
    pub browser: BrowserConfig,
    pub output: OutputConfig,
    pub workitems: WorkItemsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SiteConfig {
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BrowserConfig {
    pub headless: bool,
    /// Upper bound for every wait-on-condition, in milliseconds.
    pub wait_timeout_ms: u64,
    /// How often a pending condition is re-checked, in milliseconds.
    pub poll_interval_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub excel_file: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WorkItemsConfig {
    pub input_file: PathBuf,
    pub output_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site: SiteConfig {
                base_url: "https://www.aljazeera.com/".to_string(),
            },
            browser: BrowserConfig {
                headless: true,
                wait_timeout_ms: 10_000,
                poll_interval_ms: 250,
            },
            output: OutputConfig {
                directory: PathBuf::from("./output"),
                excel_file: "task_extracted.xlsx".to_string(),
            },
            workitems: WorkItemsConfig {
                input_file: PathBuf::from("./devdata/work-items.json"),
                output_file: "work-items-output.json".to_string(),
            },
        }
    }
}

impl Config {
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.browser.wait_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.browser.poll_interval_ms)
    }

    pub fn excel_path(&self) -> PathBuf {
        self.output.directory.join(&self.output.excel_file)
    }

    pub fn workitems_output_path(&self) -> PathBuf {
        self.output.directory.join(&self.workitems.output_file)
    }
}

pub struct FileConfigManager {
    config_path: PathBuf,
}

impl FileConfigManager {
    pub fn new(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn load_config(&self) -> Result<Config> {
        info!("Loading configuration from {:?}", self.config_path);

        // check if config file exists, create default if not
        if !self.config_path.exists() {
            warn!(
                "Configuration file not found, creating default config at {:?}",
                self.config_path
            );
            self.create_default_config()?;
        }

        let config_content = fs::read_to_string(&self.config_path)
            .map_err(|e| ScraperError::Config(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&config_content)
            .map_err(|e| ScraperError::Config(format!("Failed to parse TOML config: {}", e)))?;

        self.validate_config(&config)?;

        info!("Configuration loaded successfully");
        Ok(config)
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        let toml_content = toml::to_string_pretty(config)
            .map_err(|e| ScraperError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&self.config_path, toml_content)
            .map_err(|e| ScraperError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }

    pub fn validate_config(&self, config: &Config) -> Result<()> {
        debug!("Validating configuration");

        if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
        {
            return Err(ScraperError::Config(
                "site.base_url must start with http:// or https://".to_string(),
            ));
        }

        if config.browser.wait_timeout_ms == 0 {
            return Err(ScraperError::Config(
                "browser.wait_timeout_ms must be greater than 0".to_string(),
            ));
        }
        if config.browser.poll_interval_ms == 0 {
            return Err(ScraperError::Config(
                "browser.poll_interval_ms must be greater than 0".to_string(),
            ));
        }
        if config.browser.poll_interval_ms > config.browser.wait_timeout_ms {
            return Err(ScraperError::Config(
                "browser.poll_interval_ms cannot exceed browser.wait_timeout_ms".to_string(),
            ));
        }

        if config.output.excel_file.trim().is_empty() {
            return Err(ScraperError::Config(
                "output.excel_file cannot be empty".to_string(),
            ));
        }
        if config.workitems.output_file.trim().is_empty() {
            return Err(ScraperError::Config(
                "workitems.output_file cannot be empty".to_string(),
            ));
        }

        debug!("Configuration validation passed");
        Ok(())
    }

    fn create_default_config(&self) -> Result<()> {
        let default_config = Config::default();

        // Create parent directory if it doesn't exist
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ScraperError::Config(format!("Failed to create config directory: {}", e)))?;
        }

        self.save_config(&default_config)?;
        info!("Default configuration file created at {:?}", self.config_path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_default_config() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = FileConfigManager::new(config_path.clone());

        let config = manager.load_config().unwrap();

        assert_eq!(config.site.base_url, "https://www.aljazeera.com/");
        assert_eq!(config.browser.wait_timeout_ms, 10_000);
        assert_eq!(config.output.excel_file, "task_extracted.xlsx");
        assert!(config_path.exists());
    }

    #[test]
    fn test_config_validation() {
        let manager = FileConfigManager::new(PathBuf::from("test.toml"));

        let valid_config = Config::default();
        assert!(manager.validate_config(&valid_config).is_ok());

        let mut invalid_config = Config::default();
        invalid_config.site.base_url = "aljazeera.com".to_string();
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.browser.wait_timeout_ms = 0;
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.browser.poll_interval_ms = 60_000;
        assert!(manager.validate_config(&invalid_config).is_err());

        let mut invalid_config = Config::default();
        invalid_config.output.excel_file = " ".to_string();
        assert!(manager.validate_config(&invalid_config).is_err());
    }

    #[test]
    fn test_derived_paths() {
        let config = Config::default();
        assert_eq!(config.excel_path(), PathBuf::from("./output/task_extracted.xlsx"));
        assert_eq!(
            config.workitems_output_path(),
            PathBuf::from("./output/work-items-output.json")
        );
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_round_trip() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        let manager = FileConfigManager::new(config_path);

        let mut config = Config::default();
        config.browser.headless = false;
        config.browser.wait_timeout_ms = 5_000;
        manager.save_config(&config).unwrap();

        let loaded = manager.load_config().unwrap();
        assert!(!loaded.browser.headless);
        assert_eq!(loaded.browser.wait_timeout_ms, 5_000);
    }
}
