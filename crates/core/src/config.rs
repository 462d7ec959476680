use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::continuity::CyclePolicy;
use crate::Settings;

/// Configuration manager for editor settings.
/// Keeps the schema of available options apart from the persisted values,
/// which live in config.json in the working directory by default.
pub struct ConfigManager {
    config_path: PathBuf,
    settings: Settings,
}

/// Available configuration options with validation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigSchema {
    pub show: ShowConfigSchema,
    pub editing: EditingConfigSchema,
    pub collision: CollisionConfigSchema,
    pub continuity: ContinuityConfigSchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowConfigSchema {
    pub default_num_beats: ConfigOption<u32>,
    pub default_num_dots: ConfigOption<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditingConfigSchema {
    pub history_limit: ConfigOption<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionConfigSchema {
    pub collision_detection: ConfigOption<bool>,
    pub collision_queue_capacity: ConfigOption<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContinuityConfigSchema {
    pub follow_leader_cycle: ConfigOption<CyclePolicy>,
}

/// Configuration option with validation and available choices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOption<T> {
    pub default: T,
    pub valid_range: Option<(T, T)>,
    pub valid_choices: Option<Vec<T>>,
    pub description: String,
    pub requires_restart: bool,
}

impl<T: PartialOrd> ConfigOption<T> {
    /// Check a value against the option's range and choices.
    pub fn accepts(&self, value: &T) -> bool {
        let in_range = self
            .valid_range
            .as_ref()
            .map_or(true, |(min, max)| value >= min && value <= max);
        let in_choices = self
            .valid_choices
            .as_ref()
            .map_or(true, |choices| choices.contains(value));
        in_range && in_choices
    }
}

/// Persisted configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    pub settings: Settings,
    pub created_at: String,
    pub modified_at: String,
}

impl ConfigManager {
    /// Create a new configuration manager
    /// If no path is provided, defaults to 'config.json' in the current working directory
    pub fn new(config_path: Option<PathBuf>) -> Self {
        let config_path = config_path.unwrap_or_else(|| PathBuf::from("config.json"));

        Self {
            config_path,
            settings: Settings::default(),
        }
    }

    /// Load settings from configuration file
    /// Writes a default file first if none exists
    pub fn load(&mut self) -> Result<Settings, ConfigError> {
        if !self.config_path.exists() {
            self.save()?;
            return Ok(self.settings.clone());
        }

        let content = fs::read_to_string(&self.config_path)
            .map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config_file: ConfigFile =
            serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        if config_file.version != env!("CARGO_PKG_VERSION") {
            log::warn!(
                "Config file version {} doesn't match application version {}. Using defaults for new settings.",
                config_file.version,
                env!("CARGO_PKG_VERSION")
            );
        }

        Self::validate_settings(&config_file.settings).map_err(ConfigError::ValidationError)?;
        self.settings = config_file.settings;
        Ok(self.settings.clone())
    }

    /// Save current settings to configuration file
    pub fn save(&self) -> Result<(), ConfigError> {
        // Ensure config directory exists (if config is in a subdirectory)
        if let Some(parent) = self.config_path.parent() {
            if parent != Path::new("") && parent != Path::new(".") {
                fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
            }
        }

        let now = chrono::Utc::now().to_rfc3339();
        let created_at = fs::read_to_string(&self.config_path)
            .ok()
            .and_then(|content| serde_json::from_str::<ConfigFile>(&content).ok())
            .map_or_else(|| now.clone(), |existing| existing.created_at);
        let config_file = ConfigFile {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings: self.settings.clone(),
            created_at,
            modified_at: now,
        };

        let content = serde_json::to_string_pretty(&config_file)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(&self.config_path, content)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Validate, update and save settings
    pub fn update_settings(&mut self, settings: Settings) -> Result<(), ConfigError> {
        Self::validate_settings(&settings).map_err(ConfigError::ValidationError)?;
        self.settings = settings;
        self.save()
    }

    /// Get current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Get configuration file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Get configuration schema with available options
    pub fn schema() -> ConfigSchema {
        let defaults = Settings::default();
        ConfigSchema {
            show: ShowConfigSchema {
                default_num_beats: ConfigOption {
                    default: defaults.default_num_beats,
                    valid_range: Some((1, 1024)),
                    valid_choices: None,
                    description: "Beat count of newly added sheets".to_string(),
                    requires_restart: false,
                },
                default_num_dots: ConfigOption {
                    default: defaults.default_num_dots,
                    valid_range: Some((0, 1000)),
                    valid_choices: None,
                    description: "Number of dots in a new show".to_string(),
                    requires_restart: false,
                },
            },
            editing: EditingConfigSchema {
                history_limit: ConfigOption {
                    default: defaults.history_limit,
                    valid_range: Some((1, 1000)),
                    valid_choices: None,
                    description: "Number of edits kept for undo".to_string(),
                    requires_restart: true,
                },
            },
            collision: CollisionConfigSchema {
                collision_detection: ConfigOption {
                    default: defaults.collision_detection,
                    valid_range: None,
                    valid_choices: None,
                    description: "Check for dots sharing a position after each edit".to_string(),
                    requires_restart: false,
                },
                collision_queue_capacity: ConfigOption {
                    default: defaults.collision_queue_capacity,
                    valid_range: None,
                    valid_choices: Some(vec![16, 64, 256, 1024]),
                    description: "Collision passes that can wait in the queue".to_string(),
                    requires_restart: true,
                },
            },
            continuity: ContinuityConfigSchema {
                follow_leader_cycle: ConfigOption {
                    default: defaults.follow_leader_cycle,
                    valid_range: None,
                    valid_choices: Some(vec![CyclePolicy::Continue, CyclePolicy::Halt]),
                    description: "What follow-the-leader paths do when they wrap around"
                        .to_string(),
                    requires_restart: false,
                },
            },
        }
    }

    /// Validate settings against schema
    pub fn validate_settings(settings: &Settings) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        let schema = Self::schema();

        if !schema.show.default_num_beats.accepts(&settings.default_num_beats) {
            errors.push("default_num_beats must be between 1 and 1024".to_string());
        }
        if !schema.show.default_num_dots.accepts(&settings.default_num_dots) {
            errors.push("default_num_dots must be between 0 and 1000".to_string());
        }
        if !schema.editing.history_limit.accepts(&settings.history_limit) {
            errors.push("history_limit must be between 1 and 1000".to_string());
        }
        if let Some(choices) = &schema.collision.collision_queue_capacity.valid_choices {
            if !choices.contains(&settings.collision_queue_capacity) {
                errors.push(format!(
                    "collision_queue_capacity must be one of: {:?}",
                    choices
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Reset settings to defaults
    pub fn reset_to_defaults(&mut self) -> Result<(), ConfigError> {
        self.settings = Settings::default();
        self.save()
    }
}

/// Configuration error types
#[derive(Debug)]
pub enum ConfigError {
    ReadError(String),
    WriteError(String),
    ParseError(String),
    SerializeError(String),
    ValidationError(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::ReadError(msg) => write!(f, "Failed to read config file: {}", msg),
            ConfigError::WriteError(msg) => write!(f, "Failed to write config file: {}", msg),
            ConfigError::ParseError(msg) => write!(f, "Failed to parse config file: {}", msg),
            ConfigError::SerializeError(msg) => write!(f, "Failed to serialize config: {}", msg),
            ConfigError::ValidationError(errors) => {
                write!(f, "Config validation errors: {}", errors.join(", "))
            }
        }
    }
}

impl std::error::Error for ConfigError {}
