use crate::commands::CmdResult;
use crate::error::Result;
use crate::model::DreamRecord;
use crate::session::DreamSession;
use crate::store::DreamStore;
use chrono::{DateTime, Duration, Local};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    #[default]
    All,
    Today,
    Week,
    Month,
}

impl Period {
    fn contains(&self, at: DateTime<Local>, now: DateTime<Local>) -> bool {
        match self {
            Period::All => true,
            Period::Today => at.date_naive() == now.date_naive(),
            Period::Week => at >= now - Duration::days(7),
            Period::Month => at >= now - Duration::days(30),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Period::All),
            "today" => Ok(Period::Today),
            "week" | "7d" => Ok(Period::Week),
            "month" | "30d" => Ok(Period::Month),
            other => Err(format!(
                "Unknown period '{}' (expected all, today, week or month)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DreamFilter {
    pub period: Period,
    /// Only dreams whose illustration is on disk
    pub images_only: bool,
    pub style: Option<String>,
}

impl DreamFilter {
    pub fn matches(&self, dream: &DreamRecord, now: DateTime<Local>) -> bool {
        if !self.period.contains(dream.created_at, now) {
            return false;
        }
        if self.images_only && dream.existing_image().is_none() {
            return false;
        }
        match &self.style {
            Some(wanted) => dream
                .style
                .as_deref()
                .is_some_and(|s| s.eq_ignore_ascii_case(wanted.trim())),
            None => true,
        }
    }
}

/// The gallery: matching dreams, newest first.
pub fn run<S: DreamStore>(
    session: &mut DreamSession<S>,
    filter: &DreamFilter,
    now: DateTime<Local>,
) -> Result<CmdResult> {
    session.load()?;

    let mut listed: Vec<DreamRecord> = session
        .dreams()
        .iter()
        .filter(|d| filter.matches(d, now))
        .cloned()
        .collect();
    listed.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    Ok(CmdResult::default().with_listed_dreams(listed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{record_at, JournalFixture};
    use chrono::TimeZone;

    fn now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 6, 15, 21, 0, 0).unwrap()
    }

    fn journal() -> DreamSession<crate::store::memory::InMemoryStore> {
        let store = JournalFixture::new()
            .with_styled_dream("old", "surreal", now() - Duration::days(40))
            .with_styled_dream("last week", "anime", now() - Duration::days(5))
            .with_dream("this morning", now() - Duration::hours(14))
            .with_styled_dream("tonight", "Surreal", now() - Duration::hours(1))
            .into_store();
        DreamSession::new(store)
    }

    fn contents(result: &CmdResult) -> Vec<&str> {
        result
            .listed_dreams
            .iter()
            .map(|d| d.content.as_str())
            .collect()
    }

    #[test]
    fn lists_newest_first() {
        let mut session = journal();
        let result = run(&mut session, &DreamFilter::default(), now()).unwrap();
        assert_eq!(
            contents(&result),
            vec!["tonight", "this morning", "last week", "old"]
        );
    }

    #[test]
    fn filters_by_period() {
        let mut session = journal();
        let today = DreamFilter {
            period: Period::Today,
            ..DreamFilter::default()
        };
        assert_eq!(
            contents(&run(&mut session, &today, now()).unwrap()),
            vec!["tonight", "this morning"]
        );

        let week = DreamFilter {
            period: Period::Week,
            ..DreamFilter::default()
        };
        assert_eq!(run(&mut session, &week, now()).unwrap().listed_dreams.len(), 3);

        let month = DreamFilter {
            period: Period::Month,
            ..DreamFilter::default()
        };
        assert_eq!(run(&mut session, &month, now()).unwrap().listed_dreams.len(), 3);
    }

    #[test]
    fn filters_by_style_ignoring_case() {
        let mut session = journal();
        let filter = DreamFilter {
            style: Some("surreal".into()),
            ..DreamFilter::default()
        };
        assert_eq!(
            contents(&run(&mut session, &filter, now()).unwrap()),
            vec!["tonight", "old"]
        );
    }

    #[test]
    fn images_only_skips_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("dream_1.png");
        std::fs::write(&present, b"png").unwrap();

        let mut with_image = record_at(1, "painted", now());
        with_image.image_path = Some(present);
        let mut broken = record_at(2, "lost painting", now());
        broken.image_path = Some(dir.path().join("gone.png"));

        let store = JournalFixture::new()
            .with_record(with_image)
            .with_record(broken)
            .into_store();
        let mut session = DreamSession::new(store);
        let filter = DreamFilter {
            images_only: true,
            ..DreamFilter::default()
        };
        assert_eq!(
            contents(&run(&mut session, &filter, now()).unwrap()),
            vec!["painted"]
        );
    }

    #[test]
    fn empty_journal_lists_nothing() {
        let mut session = DreamSession::new(crate::store::memory::InMemoryStore::new());
        let result = run(&mut session, &DreamFilter::default(), now()).unwrap();
        assert!(result.listed_dreams.is_empty());
    }

    #[test]
    fn parses_periods() {
        assert_eq!("7d".parse::<Period>(), Ok(Period::Week));
        assert_eq!("Today".parse::<Period>(), Ok(Period::Today));
        assert!("fortnight".parse::<Period>().is_err());
    }
}
