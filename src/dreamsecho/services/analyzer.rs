use super::{read_body, strip_markdown_json, truncate, DreamAnalyzer};
use crate::config::API_KEY_ENV;
use crate::error::{DreamError, Result};
use crate::model::Analysis;
use serde_json::json;
use std::collections::BTreeMap;

const ANALYSIS_INSTRUCTIONS: &str = "You analyse dream journal entries. \
Reply with a single JSON object and nothing else, using these keys: \
\"emotions\" (object mapping lowercase emotion names to an intensity between 0 and 1), \
\"themes\" (array of short lowercase theme names), \
\"symbols\" (array of notable symbols or images from the dream), \
\"summary\" (one or two sentences interpreting the dream). \
Answer in the language of the dream.";

/// Longest dream text sent to the remote analyzer.
const MAX_ANALYSIS_CHARS: usize = 8000;

/// Analyzer backed by an OpenAI-compatible chat completions endpoint.
pub struct OpenAiAnalyzer {
    client: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl OpenAiAnalyzer {
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
        format!("{}/chat/completions", self.base_url)
    }

    fn payload(&self, text: &str) -> serde_json::Value {
        json!({
            "model": self.model,
            "temperature": 0.4,
            "response_format": { "type": "json_object" },
            "messages": [
                { "role": "system", "content": ANALYSIS_INSTRUCTIONS },
                { "role": "user", "content": truncate(text, MAX_ANALYSIS_CHARS) }
            ]
        })
    }
}

impl DreamAnalyzer for OpenAiAnalyzer {
    fn name(&self) -> &str {
        "openai"
    }

    fn analyze(&self, text: &str) -> Result<Analysis> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| DreamError::Analysis(format!("{} is not set", API_KEY_ENV)))?;

        let response = self
            .client
            .post(self.url())
            .bearer_auth(api_key)
            .json(&self.payload(text))
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    DreamError::Analysis("the analysis service timed out".to_string())
                } else {
                    DreamError::Analysis(format!("request failed: {}", e))
                }
            })?;

        let body = read_body(response, "analysis service").map_err(DreamError::Analysis)?;
        let wrapper: serde_json::Value = serde_json::from_str(&body)
            .map_err(|e| DreamError::Analysis(format!("unreadable response: {}", e)))?;
        let content = wrapper["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| DreamError::Analysis("response carried no content".to_string()))?;

        parse_analysis(content)
    }
}

/// Parses the model's answer into an [`Analysis`].
pub fn parse_analysis(content: &str) -> Result<Analysis> {
    let mut analysis: Analysis = serde_json::from_str(strip_markdown_json(content))
        .map_err(|e| DreamError::Analysis(format!("malformed analysis: {}", e)))?;
    analysis.emotions = analysis
        .emotions
        .into_iter()
        .filter(|(_, v)| v.is_finite())
        .map(|(name, v)| (name.trim().to_lowercase(), v))
        .collect();
    Ok(analysis)
}

/// (emotion, word stems)
const EMOTION_LEXICON: &[(&str, &[&str])] = &[
    (
        "fear",
        &[
            "afraid", "fear", "scared", "scary", "terrif", "panic", "chase", "chasing",
            "monster", "nightmare", "scream", "dark", "peur", "effray", "cauchemar",
        ],
    ),
    (
        "joy",
        &[
            "happy", "joy", "laugh", "smil", "delight", "fun", "celebrat", "heureu", "joie",
            "rire",
        ],
    ),
    (
        "sadness",
        &[
            "sad", "cry", "crying", "tears", "lonely", "alone", "grief", "lost", "miss",
            "triste", "pleur", "seul",
        ],
    ),
    (
        "anger",
        &[
            "angry", "anger", "furious", "rage", "shout", "fight", "yell", "colère", "furieu",
        ],
    ),
    (
        "anxiety",
        &[
            "anxious", "worr", "late", "exam", "nervous", "stress", "trapped", "stuck",
            "anxi", "retard", "coincé",
        ],
    ),
    (
        "wonder",
        &[
            "fly", "flying", "flew", "float", "magic", "glow", "wonder", "beautiful", "stars",
            "voler", "volais", "magique", "étoile",
        ],
    ),
    (
        "calm",
        &[
            "calm", "peace", "quiet", "gentle", "warm", "rest", "serene", "calme", "paisible",
            "douce",
        ],
    ),
];

/// (theme, word stems)
const THEME_LEXICON: &[(&str, &[&str])] = &[
    ("flight", &["fly", "flying", "flew", "float", "wings", "voler", "volais", "ailes"]),
    ("falling", &["fall", "fell", "falling", "drop", "tomb"]),
    ("pursuit", &["chase", "chasing", "chased", "run", "ran", "poursui", "fuir"]),
    ("water", &["water", "ocean", "sea", "river", "lake", "rain", "swim", "flood", "mer", "eau"]),
    ("home", &["house", "home", "room", "door", "maison", "chambre", "porte"]),
    ("family", &["mother", "father", "mom", "dad", "sister", "brother", "mère", "père"]),
    ("school", &["school", "exam", "teacher", "class", "école", "examen"]),
    ("death", &["death", "dead", "die", "dying", "funeral", "mort"]),
    ("travel", &["train", "car", "plane", "road", "journey", "voyage", "route"]),
    ("animals", &["dog", "cat", "wolf", "snake", "bird", "horse", "chien", "chat", "serpent"]),
];

const MAX_SYMBOLS: usize = 8;

/// Offline analyzer that scores emotions and themes from word stems.
///
/// Intensities are each emotion's share of all emotional cues found, so they
/// sum to 1.0 whenever any cue is present.
#[derive(Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn matches_stem(token: &str, stem: &str) -> bool {
    // Short stems must match whole words ("sad" should not hit "sadle").
    if stem.chars().count() <= 3 {
        token == stem
    } else {
        token.starts_with(stem)
    }
}

impl DreamAnalyzer for KeywordAnalyzer {
    fn name(&self) -> &str {
        "keyword"
    }

    fn analyze(&self, text: &str) -> Result<Analysis> {
        let words = tokens(text);
        if words.is_empty() {
            return Err(DreamError::Analysis("nothing to analyse".to_string()));
        }

        let mut hits: BTreeMap<String, usize> = BTreeMap::new();
        let mut symbols: Vec<String> = Vec::new();
        for (emotion, stems) in EMOTION_LEXICON {
            for word in &words {
                if stems.iter().any(|stem| matches_stem(word, stem)) {
                    *hits.entry(emotion.to_string()).or_default() += 1;
                    if symbols.len() < MAX_SYMBOLS && !symbols.contains(word) {
                        symbols.push(word.clone());
                    }
                }
            }
        }

        let total: usize = hits.values().sum();
        let emotions: BTreeMap<String, f64> = hits
            .into_iter()
            .map(|(name, n)| {
                let share = n as f64 / total as f64;
                (name, (share * 100.0).round() / 100.0)
            })
            .collect();

        let themes: Vec<String> = THEME_LEXICON
            .iter()
            .filter(|(_, stems)| {
                words
                    .iter()
                    .any(|w| stems.iter().any(|stem| matches_stem(w, stem)))
            })
            .map(|(theme, _)| theme.to_string())
            .collect();

        let mut analysis = Analysis {
            emotions,
            themes,
            symbols,
            ..Analysis::default()
        };
        analysis.summary = Some(summarize(&analysis));
        Ok(analysis)
    }
}

fn summarize(analysis: &Analysis) -> String {
    let mood = match analysis.dominant_emotion() {
        Some((emotion, _)) => format!("The dream is dominated by {}.", emotion),
        None => "No strong emotional cues were found.".to_string(),
    };
    if analysis.themes.is_empty() {
        mood
    } else {
        format!("{} Recurring motifs: {}.", mood, analysis.themes.join(", "))
    }
}
