//! # Configuration
//!
//! Manages the loading and parsing of the application's configuration file (`config.yaml`).
//! Defines the structs for the Matrix login, brain backend, command surface and schedule.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Main application configuration structure.
/// Matches the layout of `data/config.yaml`.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub services: ServicesConfig,
    #[serde(default)]
    pub brain: BrainConfig,
    #[serde(default)]
    pub commands: CommandsConfig,
    #[serde(default)]
    pub directory: DirectoryConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    /// Reads and parses a YAML config file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

/// Configuration for various connected services.
#[derive(Debug, Deserialize, Clone)]
pub struct ServicesConfig {
    pub matrix: MatrixConfig,
}

/// Specific configuration for the Matrix service.
#[derive(Debug, Deserialize, Clone)]
pub struct MatrixConfig {
    pub username: String,
    pub password: String,
    pub homeserver: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum BrainBackend {
    Memory,
    #[default]
    File,
    Redis,
}

/// Where plugin state is persisted.
#[derive(Debug, Deserialize, Clone)]
pub struct BrainConfig {
    #[serde(default)]
    pub backend: BrainBackend,
    /// JSON file used by the `file` backend, relative to the data directory.
    #[serde(default = "default_brain_file")]
    pub file: String,
    /// Connection string for the `redis` backend.
    #[serde(default)]
    pub url: Option<String>,
    /// Prefix applied to every Redis key.
    #[serde(default = "default_redis_prefix")]
    pub key_prefix: String,
}

impl Default for BrainConfig {
    fn default() -> Self {
        Self {
            backend: BrainBackend::default(),
            file: default_brain_file(),
            url: None,
            key_prefix: default_redis_prefix(),
        }
    }
}

fn default_brain_file() -> String {
    "brain.json".to_string()
}

fn default_redis_prefix() -> String {
    "brainbot:".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct CommandsConfig {
    /// Marker that addresses the bot and that the stats plugin counts as a command.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            prefix: default_prefix(),
        }
    }
}

fn default_prefix() -> String {
    "!".to_string()
}

/// Identity lookups that Matrix itself does not expose.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct DirectoryConfig {
    /// Matrix user ids of other bots; their reactions never count as votes.
    #[serde(default)]
    pub bots: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScheduleConfig {
    /// Display name of the timezone the jobs run in.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_offset")]
    pub utc_offset_minutes: i32,
    /// `HH:MM` of the daily mood reset.
    #[serde(default = "default_midnight")]
    pub mood_reset: String,
    /// Weekday of the stats broadcast, e.g. `Mon`.
    #[serde(default = "default_weekday")]
    pub stats_weekday: String,
    #[serde(default = "default_midnight")]
    pub stats_time: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            utc_offset_minutes: default_offset(),
            mood_reset: default_midnight(),
            stats_weekday: default_weekday(),
            stats_time: default_midnight(),
        }
    }
}

fn default_timezone() -> String {
    "Australia/Brisbane".to_string()
}

fn default_offset() -> i32 {
    600
}

fn default_midnight() -> String {
    "00:00".to_string()
}

fn default_weekday() -> String {
    "Mon".to_string()
}
