//! # External Services
//!
//! Dream analysis and illustration are delegated to outside capabilities. Each
//! sits behind a small trait so the command layer can be tested with stubs and
//! the concrete provider is picked from [`Settings`] at startup.
//!
//! Both calls are blocking. A failure in either is never fatal to saving a
//! dream: the add command turns it into a message and carries on.

use crate::config::{AnalyzerKind, ImageGeneratorKind, Settings};
use crate::error::{DreamError, Result};
use crate::model::Analysis;
use std::path::Path;
use std::time::Duration;

pub mod analyzer;
pub mod image;

pub use analyzer::{KeywordAnalyzer, OpenAiAnalyzer};
pub use image::{DisabledImageGenerator, OpenAiImageGenerator};

/// Turns free dream text into structured emotional and thematic data.
pub trait DreamAnalyzer {
    fn name(&self) -> &str;

    fn analyze(&self, text: &str) -> Result<Analysis>;
}

/// Synthesizes an illustration and writes it to `output_path`.
///
/// Returns whether the provider reports success. Callers must still check that
/// `output_path` exists before trusting a `true`.
pub trait ImageGenerator {
    fn name(&self) -> &str;

    fn generate(
        &self,
        prompt: &str,
        style: &str,
        size_preset: &str,
        output_path: &Path,
    ) -> Result<bool>;
}

/// The service handles, built once per process.
pub struct Services {
    pub analyzer: Box<dyn DreamAnalyzer>,
    pub images: Box<dyn ImageGenerator>,
}

impl Services {
    pub fn new(analyzer: Box<dyn DreamAnalyzer>, images: Box<dyn ImageGenerator>) -> Self {
        Self { analyzer, images }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let config = &settings.config;
        let needs_http = config.analyzer == AnalyzerKind::OpenAi
            || config.image_generator == ImageGeneratorKind::OpenAi;
        let client = if needs_http {
            Some(build_client(config.request_timeout_secs)?)
        } else {
            None
        };

        let analyzer: Box<dyn DreamAnalyzer> = match (config.analyzer, &client) {
            (AnalyzerKind::OpenAi, Some(client)) => Box::new(OpenAiAnalyzer::new(
                client.clone(),
                &config.openai_base_url,
                &config.analysis_model,
                settings.api_key.clone(),
            )),
            _ => Box::new(KeywordAnalyzer::new()),
        };

        let images: Box<dyn ImageGenerator> = match (config.image_generator, &client) {
            (ImageGeneratorKind::OpenAi, Some(client)) => Box::new(OpenAiImageGenerator::new(
                client.clone(),
                &config.openai_base_url,
                &config.image_model,
                settings.api_key.clone(),
            )),
            _ => Box::new(DisabledImageGenerator),
        };

        tracing::debug!(
            analyzer = analyzer.name(),
            images = images.name(),
            "services ready"
        );
        Ok(Self::new(analyzer, images))
    }
}

/// Blocking HTTP client shared by the OpenAI-compatible providers.
pub fn build_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(DreamError::Http)
}

/// Reads a response body, turning non-2xx statuses into a readable message.
pub(crate) fn read_body(
    response: reqwest::blocking::Response,
    provider: &str,
) -> std::result::Result<String, String> {
    let status = response.status();
    let body = response
        .text()
        .map_err(|e| format!("Failed to read response from {}: {}", provider, e))?;

    if !status.is_success() {
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
            .unwrap_or_else(|| truncate(&body, 512));
        return Err(format!("{} returned {}: {}", provider, status, detail));
    }
    Ok(body)
}

/// Strips a markdown code fence some models wrap JSON answers in.
pub(crate) fn strip_markdown_json(text: &str) -> &str {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed;
    }
    let after_open = match trimmed.find('\n') {
        Some(pos) => &trimmed[pos + 1..],
        None => trimmed.trim_start_matches('`'),
    };
    after_open.trim_end().trim_end_matches("```").trim()
}

/// Keeps the first `max_chars` characters of `s`.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
