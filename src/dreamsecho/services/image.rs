use super::{read_body, truncate, ImageGenerator};
use crate::config::API_KEY_ENV;
use crate::error::{DreamError, Result};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// How much of the dream text goes into an illustration prompt.
pub const PROMPT_CONTENT_CHARS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageStyle {
    Fantasy,
    Surreal,
    Watercolor,
    Realistic,
    Anime,
    Nightmare,
}

impl ImageStyle {
    pub const ALL: [ImageStyle; 6] = [
        ImageStyle::Fantasy,
        ImageStyle::Surreal,
        ImageStyle::Watercolor,
        ImageStyle::Realistic,
        ImageStyle::Anime,
        ImageStyle::Nightmare,
    ];

    fn modifier(&self) -> &'static str {
        match self {
            ImageStyle::Fantasy => "Dreamlike fantasy art, soft glowing light, rich colors",
            ImageStyle::Surreal => "Surrealist painting, impossible geometry, melting forms",
            ImageStyle::Watercolor => "Delicate watercolor, loose brushwork, pastel washes",
            ImageStyle::Realistic => "Photorealistic, natural lighting, cinematic composition",
            ImageStyle::Anime => "Anime illustration, clean line art, vibrant cel shading",
            ImageStyle::Nightmare => "Dark gothic illustration, deep shadows, unsettling mood",
        }
    }
}

impl FromStr for ImageStyle {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ImageStyle::ALL
            .iter()
            .copied()
            .find(|style| style.to_string().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown style: {}", s))
    }
}

impl fmt::Display for ImageStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ImageStyle::Fantasy => "fantasy",
            ImageStyle::Surreal => "surreal",
            ImageStyle::Watercolor => "watercolor",
            ImageStyle::Realistic => "realistic",
            ImageStyle::Anime => "anime",
            ImageStyle::Nightmare => "nightmare",
        };
        write!(f, "{}", name)
    }
}

/// Prompt suffix for a style name. Unrecognised styles are passed through.
pub fn style_modifier(style: &str) -> String {
    match style.parse::<ImageStyle>() {
        Ok(known) => known.modifier().to_string(),
        Err(_) => format!("{} style", style.trim()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePreset {
    Standard,
    Hd,
    Landscape,
    Portrait,
}

impl SizePreset {
    /// Maps a preset name to a known preset, falling back to `Standard`.
    pub fn resolve(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" | "square" => SizePreset::Standard,
            "hd" => SizePreset::Hd,
            "landscape" | "wide" => SizePreset::Landscape,
            "portrait" | "tall" => SizePreset::Portrait,
            other => {
                tracing::debug!(preset = other, "unknown size preset, using standard");
                SizePreset::Standard
            }
        }
    }

    pub fn dimensions(&self) -> &'static str {
        match self {
            SizePreset::Standard | SizePreset::Hd => "1024x1024",
            SizePreset::Landscape => "1792x1024",
            SizePreset::Portrait => "1024x1792",
        }
    }

    pub fn quality(&self) -> &'static str {
        match self {
            SizePreset::Hd => "hd",
            _ => "standard",
        }
    }
}

/// The illustration prompt for a dream: the style plus the start of the text.
pub fn build_prompt(content: &str, style: &str) -> String {
    format!(
        "An illustration in {} style depicting: {}",
        style.trim(),
        truncate(content.trim(), PROMPT_CONTENT_CHARS)
    )
}

/// `dream_<id>_<unix ts>.png`
pub fn image_filename(dream_id: u64, unix_ts: i64) -> String {
    format!("dream_{}_{}.png", dream_id, unix_ts)
}

/// Generator backed by an OpenAI-compatible `/images/generations` endpoint.
pub struct OpenAiImageGenerator {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiImageGenerator {
    pub fn new(
        client: reqwest::blocking::Client,
        base_url: &str,
        model: &str,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    fn url(&self) -> String {
        format!("{}/images/generations", self.base_url)
    }

    /// Pulls the image bytes out of a generation response, following a URL
    /// when the provider does not inline base64.
    fn image_bytes(&self, body: &str) -> Result<Vec<u8>> {
        let value: serde_json::Value = serde_json::from_str(body)
            .map_err(|e| DreamError::ImageGeneration(format!("unreadable response: {}", e)))?;
        let first = &value["data"][0];

        if let Some(encoded) = first["b64_json"].as_str() {
            return STANDARD
                .decode(encoded)
                .map_err(|e| DreamError::ImageGeneration(format!("invalid image data: {}", e)));
        }

        if let Some(url) = first["url"].as_str() {
            let bytes = self
                .client
                .get(url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map_err(|e| DreamError::ImageGeneration(format!("download failed: {}", e)))?;
            return Ok(bytes.to_vec());
        }

        Err(DreamError::ImageGeneration(
            "response carried no image".to_string(),
        ))
    }
}

impl ImageGenerator for OpenAiImageGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    fn generate(
        &self,
        prompt: &str,
        style: &str,
        size_preset: &str,
        output_path: &Path,
    ) -> Result<bool> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            DreamError::ImageGeneration(format!("{} is not set", API_KEY_ENV))
        })?;

        let size = SizePreset::resolve(size_preset);
        let payload = json!({
            "model": self.model,
            "prompt": format!("{}. {}", prompt, style_modifier(style)),
            "n": 1,
            "size": size.dimensions(),
            "quality": size.quality(),
            "response_format": "b64_json"
        });

        let response = self
            .client
            .post(self.url())
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    DreamError::ImageGeneration("the image service timed out".to_string())
                } else {
                    DreamError::ImageGeneration(format!("request failed: {}", e))
                }
            })?;

        let body = read_body(response, "image service").map_err(DreamError::ImageGeneration)?;
        let bytes = self.image_bytes(&body)?;
        if bytes.is_empty() {
            return Ok(false);
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent).map_err(DreamError::Io)?;
        }
        fs::write(output_path, &bytes).map_err(DreamError::Io)?;
        tracing::info!(path = %output_path.display(), bytes = bytes.len(), "illustration written");
        Ok(true)
    }
}

/// Stand-in used when no image provider is configured.
pub struct DisabledImageGenerator;

impl ImageGenerator for DisabledImageGenerator {
    fn name(&self) -> &str {
        "disabled"
    }

    fn generate(&self, _: &str, _: &str, _: &str, _: &Path) -> Result<bool> {
        Err(DreamError::ImageGeneration(
            "image generation is disabled (see `dreamsecho config image_generator`)".to_string(),
        ))
    }
}
