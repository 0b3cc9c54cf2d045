use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::Path;

use crate::model::BankId;

/// Application configuration module
/// This module handles the editor configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Directory holding one JSON file per language bank
    pub project_dir: String,

    /// REPL connection settings
    #[serde(default)]
    pub repl: ReplConfig,

    /// Editor behaviour
    #[serde(default)]
    pub editor: EditorConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// REPL connection configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ReplConfig {
    // @field: Host the game's REPL listens on
    #[serde(default = "default_repl_host")]
    pub host: String,

    // @field: REPL port
    #[serde(default = "default_repl_port")]
    pub port: u16,

    // @field: Connect/write timeout
    #[serde(default = "default_repl_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Rebuild game text after every successful save
    #[serde(default = "default_true")]
    pub auto_rebuild: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            host: default_repl_host(),
            port: default_repl_port(),
            timeout_secs: default_repl_timeout_secs(),
            auto_rebuild: true,
        }
    }
}

/// Editor behaviour configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EditorConfig {
    /// Bank being edited
    #[serde(default)]
    pub current_language: BankId,

    /// Bank scenes are copied from
    #[serde(default)]
    pub base_language: BankId,

    /// Text of an untouched filter box
    #[serde(default = "default_filter_placeholder")]
    pub filter_placeholder: String,

    /// Longest line summary before it is cut with "..."
    #[serde(default = "default_line_display_max_len")]
    pub line_display_max_len: usize,

    /// Select a scene as soon as it is added
    #[serde(default = "default_true")]
    pub add_new_scene_as_current: bool,

    /// Known speaker ids, in game order
    #[serde(default)]
    pub speakers: Vec<String>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            current_language: 0,
            base_language: 0,
            filter_placeholder: default_filter_placeholder(),
            line_display_max_len: default_line_display_max_len(),
            add_new_scene_as_current: true,
            speakers: Vec::new(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<&LogLevel> for log::LevelFilter {
    fn from(level: &LogLevel) -> Self {
        match level {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_repl_host() -> String {
    "127.0.0.1".to_string()
}

fn default_repl_port() -> u16 {
    8182
}

fn default_repl_timeout_secs() -> u64 {
    5
}

fn default_filter_placeholder() -> String {
    crate::editor::DEFAULT_FILTER_PLACEHOLDER.to_string()
}

fn default_line_display_max_len() -> usize {
    38
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Config pointing at a project directory, everything else default
    pub fn for_project(project_dir: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            ..Self::default()
        }
    }

    /// Read a config file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to open config file: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Write the config as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.project_dir.trim().is_empty() {
            return Err(anyhow!("project_dir must not be empty"));
        }

        if self.repl.port == 0 {
            return Err(anyhow!("REPL port must not be 0"));
        }

        if self.editor.line_display_max_len < 4 {
            return Err(anyhow!(
                "line_display_max_len must be at least 4, got {}",
                self.editor.line_display_max_len
            ));
        }

        let mut seen = HashSet::new();
        for speaker in &self.editor.speakers {
            if !seen.insert(speaker.as_str()) {
                return Err(anyhow!("Duplicate speaker id in config: {}", speaker));
            }
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            project_dir: "subtitles".to_string(),
            repl: ReplConfig::default(),
            editor: EditorConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}
