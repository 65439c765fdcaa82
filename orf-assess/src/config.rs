//! Configuration management

use anyhow::{Context, Result};
use orf_correction::ForgivenessConfig;
use orf_ensemble::{MatcherConfig, PostMergeConfig};
use orf_vad::GhostConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Assessment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessConfig {
    /// Path to configuration file
    #[serde(skip)]
    pub config_path: PathBuf,

    /// JSONL trace log; no log is written when unset
    pub trace_log_path: Option<String>,

    /// Engine word matching thresholds
    pub matcher: MatcherConfig,

    /// Duplicate collapse and prefix absorption
    pub post_merge: PostMergeConfig,

    /// Ghost word detection thresholds
    pub ghost: GhostConfig,

    /// Proper-noun forgiveness
    pub forgiveness: ForgivenessConfig,
}

impl AssessConfig {
    /// Load configuration from the default location, or create it
    pub fn load() -> Result<Self> {
        Self::load_from(Self::default_config_path())
    }

    /// Load configuration from `path`, writing defaults there if it is absent
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config_path = path.as_ref().to_path_buf();

        let config = if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;

            let mut config: AssessConfig = toml::from_str(&contents)
                .context("Failed to parse config file")?;

            config.config_path = config_path;
            config
        } else {
            let config = Self {
                config_path,
                ..Self::default()
            };
            config.save()
                .context("Failed to save default config")?;
            config
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .context("Failed to create config directory")?;
            }
        }

        let contents = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        std::fs::write(&self.config_path, contents)
            .context("Failed to write config file")?;

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.matcher.validate().context("Invalid [matcher] section")?;
        self.post_merge.validate().context("Invalid [post_merge] section")?;
        self.ghost.validate().context("Invalid [ghost] section")?;
        self.forgiveness.validate().context("Invalid [forgiveness] section")?;
        Ok(())
    }

    /// Get default config path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("orf-assess")
            .join("config.toml")
    }
}
