use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fs;

/// Runtime configuration, stored as YAML.
///
/// Serde defaults keep old config files loadable when new fields appear.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Worker pool size when not in high-performance mode.
    pub threads: usize,

    /// Size the pool to the machine's available parallelism instead.
    pub high_performance: bool,

    /// Seconds the pool may sit idle before it is torn down.
    pub pool_timeout_secs: f64,

    /// Theme preset name (Dark, Light or Classic).
    pub theme: String,

    /// Global UI scale pushed to the backend every frame.
    pub global_scale: f32,

    /// Root window size.
    pub root_width: u32,
    pub root_height: u32,

    /// Pixels the mouse must travel before a drag callback fires.
    pub mouse_drag_threshold: f64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            threads: 2,
            high_performance: false,
            pool_timeout_secs: 30.0,
            theme: "Dark".to_string(),
            global_scale: 1.0,
            root_width: 1280,
            root_height: 800,
            mouse_drag_threshold: 6.0,
        }
    }
}

/// Configuration manager for loading and saving the YAML runtime config.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    config_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    /// The directory is created if it does not exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            config_path: config_dir.join("imframe.yaml"),
            config_dir,
        })
    }

    /// Load the runtime configuration, falling back to defaults when the
    /// file does not exist.
    pub fn load(&self) -> Result<RuntimeConfig> {
        if !self.config_path.exists() {
            tracing::warn!(
                "Config file not found at {}, using defaults",
                self.config_path
            );
            return Ok(RuntimeConfig::default());
        }

        let file_contents = fs::read_to_string(&self.config_path)
            .with_context(|| format!("Failed to read config: {}", self.config_path))?;

        let config: RuntimeConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse config: {}", self.config_path))?;

        tracing::info!("Loaded config from {}", self.config_path);
        Ok(config)
    }

    /// Save the runtime configuration.
    pub fn save(&self, config: &RuntimeConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize config to YAML")?;

        fs::write(&self.config_path, yaml_string)
            .with_context(|| format!("Failed to write config: {}", self.config_path))?;

        tracing::info!("Saved config to {}", self.config_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_config_manager() -> (ConfigManager, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config_path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let manager = ConfigManager::new(&config_path).unwrap();
        (manager, temp_dir)
    }

    #[test]
    fn test_default_config_values() {
        let config = RuntimeConfig::default();
        assert_eq!(config.threads, 2);
        assert!(!config.high_performance);
        assert_eq!(config.pool_timeout_secs, 30.0);
        assert_eq!(config.theme, "Dark");
        assert_eq!(config.global_scale, 1.0);
        assert_eq!((config.root_width, config.root_height), (1280, 800));
        assert_eq!(config.mouse_drag_threshold, 6.0);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        assert_eq!(manager.load().unwrap(), RuntimeConfig::default());
    }

    #[test]
    fn test_save_load_round_trip() {
        let (manager, _temp_dir) = create_test_config_manager();

        let config = RuntimeConfig {
            threads: 8,
            high_performance: true,
            pool_timeout_secs: 5.0,
            theme: "Light".to_string(),
            ..Default::default()
        };
        manager.save(&config).unwrap();

        assert_eq!(manager.load().unwrap(), config);
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let (manager, _temp_dir) = create_test_config_manager();
        fs::write(manager.config_dir().join("imframe.yaml"), "threads: 6\n").unwrap();

        let config = manager.load().unwrap();
        assert_eq!(config.threads, 6);
        assert_eq!(config.theme, "Dark");
    }
}
