use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const UNTITLED: &str = "Untitled";

/// Structured result produced by a [`crate::services::DreamAnalyzer`].
///
/// Only `emotions` is relied upon by the statistics code. Any key the analyzer
/// returns that is not modelled here is kept in `extra` and written back as-is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    /// Emotion name to intensity (analyzers in this crate emit 0.0..=1.0)
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub themes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub symbols: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Analysis {
    /// The emotion with the highest intensity, if any.
    pub fn dominant_emotion(&self) -> Option<(&str, f64)> {
        self.emotions
            .iter()
            .fold(None, |best: Option<(&str, f64)>, (name, &value)| match best {
                Some((_, top)) if top >= value => best,
                _ => Some((name.as_str(), value)),
            })
    }
}

/// One journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DreamRecord {
    pub id: u64,
    pub content: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(with = "timestamp")]
    pub created_at: DateTime<Local>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_path: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analysis: Option<Analysis>,

    /// Keys written by other tools or older versions
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DreamRecord {
    pub fn new(id: u64, content: String, created_at: DateTime<Local>) -> Self {
        Self {
            id,
            content,
            title: None,
            created_at,
            style: None,
            size: None,
            image_path: None,
            analysis: None,
            extra: Map::new(),
        }
    }

    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(UNTITLED)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// The illustration path, only when the file is actually on disk.
    pub fn existing_image(&self) -> Option<&Path> {
        self.image_path.as_deref().filter(|p| p.exists())
    }
}

/// What the intake form collects before a dream is saved.
#[derive(Debug, Clone, PartialEq)]
pub struct DreamDraft {
    pub content: String,
    pub title: Option<String>,
    pub style: Option<String>,
    pub size: Option<String>,
    pub analyze: bool,
    pub generate_image: bool,
    pub created_at: Option<DateTime<Local>>,
}

impl DreamDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            title: None,
            style: None,
            size: None,
            analyze: true,
            generate_image: false,
            created_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }

    pub fn with_size(mut self, size: impl Into<String>) -> Self {
        self.size = Some(size.into());
        self
    }

    pub fn with_analysis(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    pub fn with_image(mut self, generate: bool) -> Self {
        self.generate_image = generate;
        self
    }

    pub fn created_at(mut self, at: DateTime<Local>) -> Self {
        self.created_at = Some(at);
        self
    }
}

/// Parses the timestamp shapes found in journal files and on the command line.
///
/// Accepts RFC 3339 (`2024-03-01T07:12:00+01:00`), naive ISO-8601 without an
/// offset (`2024-03-01T07:12:00.123456`, read as local time) and a bare date
/// (`2024-03-01`, local midnight). A naive time that falls in a daylight
/// saving gap is moved forward past the gap.
pub fn parse_timestamp(input: &str) -> Option<DateTime<Local>> {
    use chrono::{NaiveDate, NaiveDateTime, TimeZone};

    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(input, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    local_from_naive(&Local, naive)
}

/// Wall-clock time in `tz`. Times skipped by a clock change resolve to the
/// first valid instant after the gap.
fn local_from_naive<Tz: chrono::TimeZone>(
    tz: &Tz,
    naive: chrono::NaiveDateTime,
) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive).earliest().or_else(|| {
        (1..=4)
            .map(|step| naive + chrono::Duration::minutes(30 * step))
            .find_map(|shifted| tz.from_local_datetime(&shifted).earliest())
    })
}

mod timestamp {
    use chrono::{DateTime, Local};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Local>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Local>, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, TimeZone, Timelike};

    #[test]
    fn parses_naive_iso_timestamps_as_local() {
        let dt = parse_timestamp("2023-11-05T06:30:15.250000").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.day(), 5);
        assert_eq!(dt.hour(), 6);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn parses_bare_dates_at_midnight() {
        let dt = parse_timestamp("2024-02-29").unwrap();
        assert_eq!((dt.month(), dt.day(), dt.hour()), (2, 29, 0));
    }

    /// Eastern time around the 2024-03-10 clock change: 02:00 jumps to 03:00.
    #[derive(Debug, Clone, Copy)]
    struct SpringForward;

    impl SpringForward {
        fn change() -> chrono::NaiveDateTime {
            chrono::NaiveDate::from_ymd_opt(2024, 3, 10)
                .unwrap()
                .and_hms_opt(2, 0, 0)
                .unwrap()
        }
        fn winter() -> chrono::FixedOffset {
            chrono::FixedOffset::west_opt(5 * 3600).unwrap()
        }
        fn summer() -> chrono::FixedOffset {
            chrono::FixedOffset::west_opt(4 * 3600).unwrap()
        }
    }

    impl TimeZone for SpringForward {
        type Offset = chrono::FixedOffset;

        fn from_offset(_: &chrono::FixedOffset) -> Self {
            SpringForward
        }

        fn offset_from_local_date(
            &self,
            local: &chrono::NaiveDate,
        ) -> chrono::LocalResult<chrono::FixedOffset> {
            self.offset_from_local_datetime(&local.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_local_datetime(
            &self,
            local: &chrono::NaiveDateTime,
        ) -> chrono::LocalResult<chrono::FixedOffset> {
            let change = Self::change();
            if *local < change {
                chrono::LocalResult::Single(Self::winter())
            } else if *local < change + chrono::Duration::hours(1) {
                chrono::LocalResult::None
            } else {
                chrono::LocalResult::Single(Self::summer())
            }
        }

        fn offset_from_utc_date(&self, utc: &chrono::NaiveDate) -> chrono::FixedOffset {
            self.offset_from_utc_datetime(&utc.and_hms_opt(0, 0, 0).unwrap())
        }

        fn offset_from_utc_datetime(&self, utc: &chrono::NaiveDateTime) -> chrono::FixedOffset {
            if *utc < Self::change() + chrono::Duration::hours(5) {
                Self::winter()
            } else {
                Self::summer()
            }
        }
    }

    #[test]
    fn times_in_a_clock_change_gap_move_past_it() {
        let skipped = SpringForward::change() + chrono::Duration::minutes(30);
        let dt = local_from_naive(&SpringForward, skipped).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (3, 0));
        assert_eq!(dt.offset(), &SpringForward::summer());

        let before = SpringForward::change() - chrono::Duration::hours(1);
        let dt = local_from_naive(&SpringForward, before).unwrap();
        assert_eq!((dt.hour(), dt.minute()), (1, 0));
    }

    #[test]
    fn rejects_garbage_timestamps() {
        assert!(parse_timestamp("last tuesday").is_none());
    }

    #[test]
    fn unknown_record_keys_survive_a_roundtrip() {
        let json = r#"{
            "id": 3,
            "content": "Flying over a frozen lake",
            "created_at": "2024-01-10T08:00:00",
            "generate_image": true,
            "mood": "calm",
            "analysis": {"emotions": {"joy": 0.8}, "archetypes": ["the hero"]}
        }"#;

        let record: DreamRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.extra.get("mood"), Some(&Value::from("calm")));
        let analysis = record.analysis.as_ref().unwrap();
        assert!(analysis.extra.contains_key("archetypes"));

        let written = serde_json::to_value(&record).unwrap();
        assert_eq!(written["generate_image"], Value::Bool(true));
        assert_eq!(written["analysis"]["archetypes"][0], "the hero");
        assert!(written.get("image_path").is_none());
    }

    #[test]
    fn display_title_falls_back_to_untitled() {
        let mut record = DreamRecord::new(1, "x".into(), Local.timestamp_opt(0, 0).unwrap());
        assert_eq!(record.display_title(), UNTITLED);
        record.title = Some("   ".into());
        assert_eq!(record.display_title(), UNTITLED);
        record.title = Some("The Tower".into());
        assert_eq!(record.display_title(), "The Tower");
    }

    #[test]
    fn dominant_emotion_picks_highest_intensity() {
        let mut analysis = Analysis::default();
        analysis.emotions.insert("fear".into(), 0.4);
        analysis.emotions.insert("wonder".into(), 0.9);
        analysis.emotions.insert("joy".into(), 0.2);
        assert_eq!(analysis.dominant_emotion(), Some(("wonder", 0.9)));
        assert_eq!(Analysis::default().dominant_emotion(), None);
    }

    #[test]
    fn existing_image_ignores_missing_files() {
        let mut record = DreamRecord::new(1, "x".into(), Local::now());
        record.image_path = Some(PathBuf::from("/definitely/not/here.png"));
        assert!(record.existing_image().is_none());
    }
}
