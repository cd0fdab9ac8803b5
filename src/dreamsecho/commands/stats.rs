//! Read-side aggregation over the journal.
//!
//! Everything here is a pure function of the loaded collection; [`run`] only
//! loads the session and bundles the figures into a [`DreamStats`].

use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::DreamRecord;
use crate::session::DreamSession;
use crate::store::DreamStore;
use chrono::{DateTime, Local, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// How many analysed dreams the overview shows.
pub const LATEST_ANALYSES: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tally {
    pub name: String,
    pub count: usize,
}

/// Mean intensity of one emotion over the dreams of one day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionPoint {
    pub date: NaiveDate,
    pub emotion: String,
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DreamStats {
    pub total: usize,
    pub most_recent: Option<DateTime<Local>>,
    pub most_common_style: Option<String>,
    pub average_word_count: f64,
    pub with_images: usize,
    pub with_analysis: usize,
    pub style_counts: Vec<Tally>,
    pub emotion_timeline: Vec<EmotionPoint>,
    pub recurring_themes: Vec<Tally>,
    pub latest_analyses: Vec<DreamRecord>,
}

impl DreamStats {
    pub fn compute(dreams: &[DreamRecord]) -> Self {
        let style_counts = style_counts(dreams);
        Self {
            total: dreams.len(),
            most_recent: most_recent(dreams),
            most_common_style: style_counts.first().map(|t| t.name.clone()),
            average_word_count: average_word_count(dreams),
            with_images: dreams.iter().filter(|d| d.existing_image().is_some()).count(),
            with_analysis: dreams.iter().filter(|d| d.analysis.is_some()).count(),
            style_counts,
            emotion_timeline: emotion_timeline(dreams),
            recurring_themes: recurring_themes(dreams),
            latest_analyses: latest_analyses(dreams, LATEST_ANALYSES),
        }
    }
}

pub fn run<S: DreamStore>(session: &mut DreamSession<S>) -> Result<CmdResult> {
    session.load()?;
    let dreams = session.dreams();
    let mut result = CmdResult::default();
    if dreams.is_empty() {
        result.add_message(CmdMessage::info(
            "No dreams recorded yet. Add one with `dreamsecho add`.",
        ));
        return Ok(result);
    }
    Ok(result.with_stats(DreamStats::compute(dreams)))
}

pub fn most_recent(dreams: &[DreamRecord]) -> Option<DateTime<Local>> {
    dreams.iter().map(|d| d.created_at).max()
}

/// The mode of the recorded styles; ties go to the style seen first.
pub fn most_common_style(dreams: &[DreamRecord]) -> Option<String> {
    style_counts(dreams).into_iter().next().map(|t| t.name)
}

/// Styles are compared case-insensitively, like the gallery filter.
pub fn style_counts(dreams: &[DreamRecord]) -> Vec<Tally> {
    let styles: Vec<String> = dreams
        .iter()
        .filter_map(|d| d.style.as_deref())
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    tally(styles.iter().map(String::as_str))
}

pub fn recurring_themes(dreams: &[DreamRecord]) -> Vec<Tally> {
    let themes: Vec<String> = dreams
        .iter()
        .filter_map(|d| d.analysis.as_ref())
        .flat_map(|a| a.themes.iter())
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    tally(themes.iter().map(String::as_str))
}

/// Counts in descending order. The sort is stable, so equal counts keep the
/// order in which each name first appeared.
fn tally<'a>(names: impl Iterator<Item = &'a str>) -> Vec<Tally> {
    let mut counts: Vec<Tally> = Vec::new();
    for name in names {
        match counts.iter_mut().find(|t| t.name == name) {
            Some(t) => t.count += 1,
            None => counts.push(Tally {
                name: name.to_string(),
                count: 1,
            }),
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn average_word_count(dreams: &[DreamRecord]) -> f64 {
    if dreams.is_empty() {
        return 0.0;
    }
    let words: usize = dreams.iter().map(DreamRecord::word_count).sum();
    words as f64 / dreams.len() as f64
}

/// Per local calendar day and emotion, the mean intensity across the day's
/// analysed dreams. Sorted by date, then emotion name.
pub fn emotion_timeline(dreams: &[DreamRecord]) -> Vec<EmotionPoint> {
    let mut sums: BTreeMap<(NaiveDate, String), (f64, usize)> = BTreeMap::new();
    for dream in dreams {
        let Some(analysis) = &dream.analysis else {
            continue;
        };
        let date = dream.created_at.date_naive();
        for (emotion, value) in &analysis.emotions {
            let entry = sums.entry((date, emotion.clone())).or_insert((0.0, 0));
            entry.0 += value;
            entry.1 += 1;
        }
    }

    sums.into_iter()
        .map(|((date, emotion), (sum, n))| EmotionPoint {
            date,
            emotion,
            intensity: sum / n as f64,
        })
        .collect()
}

/// The `limit` most recent dreams that carry an analysis, newest first.
pub fn latest_analyses(dreams: &[DreamRecord], limit: usize) -> Vec<DreamRecord> {
    let mut analysed: Vec<&DreamRecord> = dreams.iter().filter(|d| d.analysis.is_some()).collect();
    analysed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    analysed.into_iter().take(limit).cloned().collect()
}
