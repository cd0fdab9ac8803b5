//! # Configuration
//!
//! Settings are resolved once at startup and stay read-only for the rest of
//! the process.
//!
//! ## Sources
//!
//! In priority order:
//! 1. **Environment variables**: `DREAMSECHO_ANALYZER`, `DREAMSECHO_IMAGE_GENERATOR`,
//!    `DREAMSECHO_OPENAI_BASE_URL`, and the credential `OPENAI_API_KEY`.
//! 2. **Config file**: `<data dir>/config.json`, written by `dreamsecho config <key> <value>`.
//! 3. **Compiled defaults**.
//!
//! The data directory itself comes from `DREAMSECHO_HOME`, falling back to the
//! OS data directory (via the `directories` crate).
//!
//! ## Available Settings
//!
//! | Key | Default | Description |
//! |-----|---------|-------------|
//! | `default_style` | `fantasy` | Illustration style when none is given |
//! | `default_size` | `hd` | Illustration size preset when none is given |
//! | `analyze_by_default` | `true` | Run the analyzer unless `--no-analysis` |
//! | `analyzer` | `openai` | `openai` or `keyword` (offline) |
//! | `image_generator` | `openai` | `openai` or `disabled` |
//! | `openai_base_url` | `https://api.openai.com/v1` | Any OpenAI-compatible endpoint |
//! | `analysis_model` | `gpt-4o-mini` | Chat model used for analysis |
//! | `image_model` | `dall-e-3` | Image model |
//! | `request_timeout_secs` | `60` | Timeout for each service call |
//!
//! Credentials are never written to `config.json`.

use crate::error::{DreamError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILENAME: &str = "config.json";
pub const GENERATED_DIRNAME: &str = "generated";

pub const HOME_ENV: &str = "DREAMSECHO_HOME";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";
const ANALYZER_ENV: &str = "DREAMSECHO_ANALYZER";
const IMAGE_GENERATOR_ENV: &str = "DREAMSECHO_IMAGE_GENERATOR";
const BASE_URL_ENV: &str = "DREAMSECHO_OPENAI_BASE_URL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalyzerKind {
    OpenAi,
    Keyword,
}

impl FromStr for AnalyzerKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(AnalyzerKind::OpenAi),
            "keyword" | "local" => Ok(AnalyzerKind::Keyword),
            other => Err(format!(
                "Unknown analyzer '{}' (expected openai or keyword)",
                other
            )),
        }
    }
}

impl fmt::Display for AnalyzerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzerKind::OpenAi => write!(f, "openai"),
            AnalyzerKind::Keyword => write!(f, "keyword"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageGeneratorKind {
    OpenAi,
    Disabled,
}

impl FromStr for ImageGeneratorKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(ImageGeneratorKind::OpenAi),
            "disabled" | "none" | "off" => Ok(ImageGeneratorKind::Disabled),
            other => Err(format!(
                "Unknown image generator '{}' (expected openai or disabled)",
                other
            )),
        }
    }
}

impl fmt::Display for ImageGeneratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageGeneratorKind::OpenAi => write!(f, "openai"),
            ImageGeneratorKind::Disabled => write!(f, "disabled"),
        }
    }
}

/// Persisted settings, stored in `<data dir>/config.json`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DreamsConfig {
    #[serde(default = "default_style")]
    pub default_style: String,

    #[serde(default = "default_size")]
    pub default_size: String,

    #[serde(default = "default_true")]
    pub analyze_by_default: bool,

    #[serde(default = "default_analyzer")]
    pub analyzer: AnalyzerKind,

    #[serde(default = "default_image_generator")]
    pub image_generator: ImageGeneratorKind,

    #[serde(default = "default_base_url")]
    pub openai_base_url: String,

    #[serde(default = "default_analysis_model")]
    pub analysis_model: String,

    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
}

fn default_style() -> String {
    "fantasy".to_string()
}

fn default_size() -> String {
    "hd".to_string()
}

fn default_true() -> bool {
    true
}

fn default_analyzer() -> AnalyzerKind {
    AnalyzerKind::OpenAi
}

fn default_image_generator() -> ImageGeneratorKind {
    ImageGeneratorKind::OpenAi
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_analysis_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_timeout() -> u64 {
    60
}

impl Default for DreamsConfig {
    fn default() -> Self {
        Self {
            default_style: default_style(),
            default_size: default_size(),
            analyze_by_default: true,
            analyzer: default_analyzer(),
            image_generator: default_image_generator(),
            openai_base_url: default_base_url(),
            analysis_model: default_analysis_model(),
            image_model: default_image_model(),
            request_timeout_secs: default_timeout(),
        }
    }
}

pub const CONFIG_KEYS: &[&str] = &[
    "default_style",
    "default_size",
    "analyze_by_default",
    "analyzer",
    "image_generator",
    "openai_base_url",
    "analysis_model",
    "image_model",
    "request_timeout_secs",
];

impl DreamsConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(DreamError::Io)?;
        let config: DreamsConfig =
            serde_json::from_str(&content).map_err(DreamError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(DreamError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(DreamError::Serialization)?;
        fs::write(config_path, content).map_err(DreamError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        let value = match key {
            "default_style" => self.default_style.clone(),
            "default_size" => self.default_size.clone(),
            "analyze_by_default" => self.analyze_by_default.to_string(),
            "analyzer" => self.analyzer.to_string(),
            "image_generator" => self.image_generator.to_string(),
            "openai_base_url" => self.openai_base_url.clone(),
            "analysis_model" => self.analysis_model.clone(),
            "image_model" => self.image_model.clone(),
            "request_timeout_secs" => self.request_timeout_secs.to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Sets a key from its string form. Returns a user-facing message on bad input.
    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        match key {
            "default_style" => self.default_style = non_empty(key, value)?,
            "default_size" => self.default_size = non_empty(key, value)?,
            "analyze_by_default" => {
                self.analyze_by_default = parse_bool(value)
                    .ok_or_else(|| format!("Invalid value for {}: {}", key, value))?
            }
            "analyzer" => self.analyzer = value.parse()?,
            "image_generator" => self.image_generator = value.parse()?,
            "openai_base_url" => {
                self.openai_base_url = non_empty(key, value)?.trim_end_matches('/').to_string()
            }
            "analysis_model" => self.analysis_model = non_empty(key, value)?,
            "image_model" => self.image_model = non_empty(key, value)?,
            "request_timeout_secs" => {
                self.request_timeout_secs = value
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .ok_or_else(|| format!("Invalid value for {}: {}", key, value))?
            }
            "openai_api_key" | "api_key" => {
                return Err(format!(
                    "Credentials are not stored in the config; set {} instead",
                    API_KEY_ENV
                ))
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }

    pub fn list_all(&self) -> Vec<(&'static str, String)> {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|v| (*key, v)))
            .collect()
    }

    /// Applies environment overrides. `lookup` is `std::env::var` in production.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup(ANALYZER_ENV) {
            self.analyzer = v
                .parse()
                .map_err(|e| DreamError::Config(format!("{}: {}", ANALYZER_ENV, e)))?;
        }
        if let Some(v) = lookup(IMAGE_GENERATOR_ENV) {
            self.image_generator = v
                .parse()
                .map_err(|e| DreamError::Config(format!("{}: {}", IMAGE_GENERATOR_ENV, e)))?;
        }
        if let Some(v) = lookup(BASE_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.openai_base_url = v.trim().trim_end_matches('/').to_string();
        }
        Ok(())
    }
}

fn non_empty(key: &str, value: &str) -> std::result::Result<String, String> {
    if value.is_empty() {
        Err(format!("{} cannot be empty", key))
    } else {
        Ok(value.to_string())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

/// Where the journal keeps its files.
#[derive(Debug, Clone)]
pub struct DreamsPaths {
    pub data_dir: PathBuf,
    pub generated_dir: PathBuf,
}

impl DreamsPaths {
    pub fn new(data_dir: PathBuf) -> Self {
        let generated_dir = data_dir.join(GENERATED_DIRNAME);
        Self {
            data_dir,
            generated_dir,
        }
    }

    /// `DREAMSECHO_HOME` if set, otherwise the platform data directory.
    pub fn resolve() -> Result<Self> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(Self::new(PathBuf::from(home)));
        }
        let dirs = ProjectDirs::from("com", "dreamsecho", "dreamsecho").ok_or_else(|| {
            DreamError::Config("Could not determine a data directory; set DREAMSECHO_HOME".into())
        })?;
        Ok(Self::new(dirs.data_dir().to_path_buf()))
    }
}

/// Process-wide settings: read once at startup, never mutated afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: DreamsConfig,
    pub paths: DreamsPaths,
    pub api_key: Option<String>,
}

impl Settings {
    pub fn load(paths: DreamsPaths) -> Result<Self> {
        Self::load_with(paths, |key| std::env::var(key).ok())
    }

    pub fn load_with<F>(paths: DreamsPaths, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = DreamsConfig::load(&paths.data_dir)?;
        config.apply_env(&lookup)?;
        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Ok(Self {
            config,
            paths,
            api_key,
        })
    }
}
