//! # Rendering Module
//!
//! Styled terminal output from the templates in `templates.rs`, with
//! automatic terminal color detection.
//!
//! Layout calculations (width, truncation, padding, bar lengths) stay in Rust
//! because they need Unicode-aware processing. Templates only choose styles
//! through the `style` filter, which becomes a no-op when color is off.

use super::styles::{names, DREAMS_THEME};
use super::templates::{
    CONFIG_TEMPLATE, DREAM_TEMPLATE, LIST_TEMPLATE, MESSAGES_TEMPLATE, STATS_TEMPLATE,
};
use chrono::{DateTime, Local};
use console::Term;
use dreamsecho::api::{CmdMessage, DreamStats, MessageLevel};
use dreamsecho::model::DreamRecord;
use minijinja::{Environment, Error, Value};
use serde::Serialize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const LINE_WIDTH: usize = 100;
pub const ID_WIDTH: usize = 5;
pub const TAG_WIDTH: usize = 11;
pub const TIME_WIDTH: usize = 14;
pub const BAR_WIDTH: usize = 20;
pub const IMAGE_MARKER: &str = "◆";

/// Shown before text styled with a name the theme does not define.
const MISSING_STYLE_INDICATOR: &str = "(!?)";

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn environment(use_color: bool) -> Environment<'static> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);
    env.add_filter("style", move |value: Value, name: String| -> String {
        let text = value.to_string();
        match DREAMS_THEME.get(name.as_str()) {
            Some(style) if use_color => style.clone().force_styling(true).apply_to(text).to_string(),
            Some(_) => text,
            None => format!("{} {}", MISSING_STYLE_INDICATOR, text),
        }
    });
    env
}

fn render_template<T: Serialize>(
    name: &'static str,
    template: &'static str,
    data: &T,
    use_color: bool,
) -> Result<String, Error> {
    let mut env = environment(use_color);
    env.add_template(name, template)?;
    env.get_template(name)?.render(data)
}

fn detect_color() -> bool {
    Term::stdout().features().colors_supported()
}

#[derive(Serialize)]
struct DreamLineData {
    id: String,
    title: String,
    gap: String,
    preview: String,
    padding: String,
    tag: String,
    marker: String,
    time_ago: String,
}

#[derive(Serialize)]
struct ListData {
    dreams: Vec<DreamLineData>,
    empty: bool,
}

/// One labelled bar, shared by the emotion and tally charts.
#[derive(Serialize)]
struct BarRow {
    name: String,
    padding: String,
    bar: String,
    value: String,
    date: String,
}

#[derive(Serialize)]
struct DreamData {
    id: String,
    title: String,
    date: String,
    time_ago: String,
    tags: String,
    content: String,
    image: Option<String>,
    analysed: bool,
    emotions: Vec<BarRow>,
    themes: String,
    symbols: String,
    summary: Option<String>,
}

#[derive(Serialize)]
struct LatestEntry {
    id: String,
    title: String,
    date: String,
    mood: String,
    summary: Option<String>,
}

#[derive(Serialize)]
struct StatsData {
    total: usize,
    most_recent: String,
    most_common_style: String,
    average_words: String,
    with_images: usize,
    with_analysis: usize,
    styles: Vec<BarRow>,
    themes: Vec<BarRow>,
    timeline: Vec<BarRow>,
    latest: Vec<LatestEntry>,
}

#[derive(Serialize)]
struct ConfigEntry {
    key: String,
    padding: String,
    value: String,
}

#[derive(Serialize)]
struct ConfigData {
    entries: Vec<ConfigEntry>,
}

#[derive(Serialize)]
struct MessageData {
    content: String,
    style: String,
}

#[derive(Serialize)]
struct MessagesData {
    messages: Vec<MessageData>,
}

/// Renders the gallery listing.
pub fn render_dream_list(dreams: &[DreamRecord]) -> String {
    render_dream_list_internal(dreams, Local::now(), detect_color())
}

fn render_dream_list_internal(
    dreams: &[DreamRecord],
    now: DateTime<Local>,
    use_color: bool,
) -> String {
    let lines = dreams
        .iter()
        .map(|dream| {
            let available =
                LINE_WIDTH.saturating_sub(ID_WIDTH + 1 + 1 + TAG_WIDTH + 3 + TIME_WIDTH);

            let title = truncate_to_width(dream.display_title(), available);
            let title_width = title.width();

            let room = available.saturating_sub(title_width + 1);
            let preview = if room >= 8 {
                truncate_to_width(first_line(&dream.content), room)
            } else {
                String::new()
            };
            let used = if preview.is_empty() {
                title_width
            } else {
                title_width + 1 + preview.width()
            };

            DreamLineData {
                id: format!("{:>width$}", format!("#{}", dream.id), width = ID_WIDTH),
                gap: if preview.is_empty() { "" } else { " " }.to_string(),
                title,
                preview,
                padding: " ".repeat(available.saturating_sub(used)),
                tag: pad_to_width(
                    &truncate_to_width(dream.style.as_deref().unwrap_or(""), TAG_WIDTH),
                    TAG_WIDTH,
                ),
                marker: if dream.existing_image().is_some() {
                    format!(" {} ", IMAGE_MARKER)
                } else {
                    "   ".to_string()
                },
                time_ago: format!(
                    "{:>width$}",
                    format_time_ago(dream.created_at, now),
                    width = TIME_WIDTH
                ),
            }
        })
        .collect::<Vec<_>>();

    let data = ListData {
        empty: lines.is_empty(),
        dreams: lines,
    };
    render_template("list", LIST_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders one dream in full, with its analysis.
pub fn render_dream(dream: &DreamRecord) -> String {
    render_dream_internal(dream, Local::now(), detect_color())
}

fn render_dream_internal(dream: &DreamRecord, now: DateTime<Local>, use_color: bool) -> String {
    let tags: Vec<&str> = [dream.style.as_deref(), dream.size.as_deref()]
        .into_iter()
        .flatten()
        .filter(|t| !t.trim().is_empty())
        .collect();

    let analysis = dream.analysis.as_ref();
    let emotions = analysis
        .map(|a| {
            let mut sorted: Vec<(&str, f64)> =
                a.emotions.iter().map(|(k, v)| (k.as_str(), *v)).collect();
            sorted.sort_by(|x, y| y.1.total_cmp(&x.1));
            let scale = sorted.first().map_or(1.0, |(_, v)| v.max(1.0));
            bar_rows(
                sorted
                    .into_iter()
                    .map(|(name, v)| (name.to_string(), v, format!("{:.2}", v), String::new())),
                scale,
            )
        })
        .unwrap_or_default();

    let data = DreamData {
        id: format!("#{}", dream.id),
        title: dream.display_title().to_string(),
        date: dream.created_at.format(DATE_FORMAT).to_string(),
        time_ago: format!("({})", format_time_ago(dream.created_at, now)),
        tags: if tags.is_empty() {
            String::new()
        } else {
            format!("  {}", tags.join(" · "))
        },
        content: dream.content.clone(),
        image: dream.existing_image().map(|p| p.display().to_string()),
        analysed: analysis.is_some(),
        emotions,
        themes: analysis.map(|a| a.themes.join(", ")).unwrap_or_default(),
        symbols: analysis.map(|a| a.symbols.join(", ")).unwrap_or_default(),
        summary: analysis.and_then(|a| a.summary.clone()),
    };

    render_template("dream", DREAM_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders the statistics overview.
pub fn render_stats(stats: &DreamStats) -> String {
    render_stats_internal(stats, detect_color())
}

fn render_stats_internal(stats: &DreamStats, use_color: bool) -> String {
    let tally_rows = |tallies: &[dreamsecho::commands::stats::Tally]| {
        let max = tallies.iter().map(|t| t.count).max().unwrap_or(1) as f64;
        bar_rows(
            tallies.iter().map(|t| {
                (t.name.clone(), t.count as f64, t.count.to_string(), String::new())
            }),
            max,
        )
    };

    let timeline = bar_rows(
        stats.emotion_timeline.iter().map(|p| {
            (
                p.emotion.clone(),
                p.intensity,
                format!("{:.2}", p.intensity),
                p.date.format("%Y-%m-%d").to_string(),
            )
        }),
        stats
            .emotion_timeline
            .iter()
            .map(|p| p.intensity)
            .fold(1.0, f64::max),
    );

    let latest = stats
        .latest_analyses
        .iter()
        .map(|dream| {
            let analysis = dream.analysis.as_ref();
            LatestEntry {
                id: format!("#{}", dream.id),
                title: dream.display_title().to_string(),
                date: dream.created_at.format(DATE_FORMAT).to_string(),
                mood: analysis
                    .and_then(|a| a.dominant_emotion())
                    .map(|(name, _)| format!("  {}", name))
                    .unwrap_or_default(),
                summary: analysis.and_then(|a| a.summary.clone()),
            }
        })
        .collect();

    let data = StatsData {
        total: stats.total,
        most_recent: stats
            .most_recent
            .map(|t| t.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".to_string()),
        most_common_style: stats
            .most_common_style
            .clone()
            .unwrap_or_else(|| "-".to_string()),
        average_words: format!("{:.1}", stats.average_word_count),
        with_images: stats.with_images,
        with_analysis: stats.with_analysis,
        styles: tally_rows(stats.style_counts.as_slice()),
        themes: tally_rows(stats.recurring_themes.as_slice()),
        timeline,
        latest,
    };

    render_template("stats", STATS_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders `key = value` lines.
pub fn render_config(entries: &[(&str, String)]) -> String {
    render_config_internal(entries, detect_color())
}

fn render_config_internal(entries: &[(&str, String)], use_color: bool) -> String {
    let key_width = entries.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
    let data = ConfigData {
        entries: entries
            .iter()
            .map(|(key, value)| ConfigEntry {
                key: key.to_string(),
                padding: " ".repeat(key_width - key.width()),
                value: value.clone(),
            })
            .collect(),
    };
    render_template("config", CONFIG_TEMPLATE, &data, use_color)
        .unwrap_or_else(|e| format!("Render error: {}\n", e))
}

/// Renders command messages using the template system with themed styles.
pub fn render_messages(messages: &[CmdMessage]) -> String {
    render_messages_internal(messages, detect_color())
}

fn render_messages_internal(messages: &[CmdMessage], use_color: bool) -> String {
    if messages.is_empty() {
        return String::new();
    }

    let data = MessagesData {
        messages: messages
            .iter()
            .map(|msg| MessageData {
                content: msg.content.clone(),
                style: match msg.level {
                    MessageLevel::Info => names::INFO,
                    MessageLevel::Success => names::SUCCESS,
                    MessageLevel::Warning => names::WARNING,
                    MessageLevel::Error => names::ERROR,
                }
                .to_string(),
            })
            .collect(),
    };

    render_template("messages", MESSAGES_TEMPLATE, &data, use_color).unwrap_or_else(|_| {
        messages
            .iter()
            .map(|m| format!("{}\n", m.content))
            .collect()
    })
}

/// Prints command messages to stderr, keeping stdout for machine output.
pub fn eprint_messages(messages: &[CmdMessage]) {
    let use_color = Term::stderr().features().colors_supported();
    let output = render_messages_internal(messages, use_color);
    if !output.is_empty() {
        eprint!("{}", output);
    }
}

/// Prints command messages to stdout using the template system.
pub fn print_messages(messages: &[CmdMessage]) {
    let output = render_messages(messages);
    if !output.is_empty() {
        print!("{}", output);
    }
}

/// `(name, value, label, date)` tuples to aligned bar rows scaled to `max`.
fn bar_rows(rows: impl Iterator<Item = (String, f64, String, String)>, max: f64) -> Vec<BarRow> {
    let rows: Vec<_> = rows.collect();
    let name_width = rows.iter().map(|(n, ..)| n.width()).max().unwrap_or(0);
    rows.into_iter()
        .map(|(name, value, label, date)| BarRow {
            padding: " ".repeat(name_width - name.width()),
            bar: bar(value, max),
            name,
            value: label,
            date,
        })
        .collect()
}

fn bar(value: f64, max: f64) -> String {
    if max <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value / max) * BAR_WIDTH as f64).round().clamp(0.0, BAR_WIDTH as f64) as usize;
    "█".repeat(len)
}

fn first_line(content: &str) -> &str {
    content.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("")
}

fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }

    let mut result = String::new();
    let mut current_width = 0;
    let limit = max_width.saturating_sub(1);

    for c in s.chars() {
        let char_width = c.width().unwrap_or(0);
        if current_width + char_width > limit {
            break;
        }
        result.push(c);
        current_width += char_width;
    }
    result.push('…');
    result
}

fn pad_to_width(s: &str, width: usize) -> String {
    format!("{}{}", s, " ".repeat(width.saturating_sub(s.width())))
}

fn format_time_ago(timestamp: DateTime<Local>, now: DateTime<Local>) -> String {
    let duration = now.signed_duration_since(timestamp);
    let formatter = timeago::Formatter::new();
    formatter.convert(duration.to_std().unwrap_or_default())
}
