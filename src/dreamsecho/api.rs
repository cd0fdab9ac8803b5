//! # API Facade
//!
//! The single entry point for journal operations, whatever the client. It
//! owns the per-process state (session, services and settings) and dispatches
//! to `commands/*.rs`.
//!
//! The facade does no business logic and no I/O of its own. It fills in what
//! the commands take as arguments (the current time, the configured defaults)
//! and returns `Result<CmdResult>`.
//!
//! `DreamsApi<S: DreamStore>` is generic over storage:
//! - Production: `DreamsApi<JsonFileStore>`
//! - Testing: `DreamsApi<InMemoryStore>`

use crate::commands;
use crate::config::Settings;
use crate::error::Result;
use crate::model::DreamDraft;
use crate::services::Services;
use crate::session::DreamSession;
use crate::store::DreamStore;
use chrono::Local;

pub struct DreamsApi<S: DreamStore> {
    session: DreamSession<S>,
    services: Services,
    settings: Settings,
}

impl<S: DreamStore> DreamsApi<S> {
    pub fn new(store: S, services: Services, settings: Settings) -> Self {
        Self {
            session: DreamSession::new(store),
            services,
            settings,
        }
    }

    /// Saves a dream, enriching it as the draft asks.
    pub fn add_dream(&mut self, draft: DreamDraft) -> Result<commands::CmdResult> {
        commands::add::run(
            &mut self.session,
            &self.services,
            &self.settings.config,
            &self.settings.paths,
            draft,
            Local::now(),
        )
    }

    pub fn list_dreams(&mut self, filter: &DreamFilter) -> Result<commands::CmdResult> {
        commands::list::run(&mut self.session, filter, Local::now())
    }

    pub fn view_dream(&mut self, id: u64) -> Result<commands::CmdResult> {
        commands::view::run(&mut self.session, id)
    }

    pub fn stats(&mut self) -> Result<commands::CmdResult> {
        commands::stats::run(&mut self.session)
    }

    pub fn config(&self, action: ConfigAction) -> Result<commands::CmdResult> {
        commands::config::run(&self.settings.paths, action)
    }

    pub fn init(&self) -> Result<commands::CmdResult> {
        commands::init::run(&self.settings.paths)
    }

    /// A draft carrying the configured defaults.
    pub fn draft(&self, content: impl Into<String>) -> DreamDraft {
        DreamDraft::new(content).with_analysis(self.settings.config.analyze_by_default)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> &DreamSession<S> {
        &self.session
    }
}

pub use crate::commands::config::ConfigAction;
pub use commands::list::{DreamFilter, Period};
pub use commands::stats::DreamStats;
pub use commands::{CmdMessage, CmdResult, DreamsPaths, MessageLevel};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DreamsConfig, DreamsPaths};
    use crate::error::DreamError;
    use crate::store::memory::InMemoryStore;
    use crate::test_utils::{analysis_of, stub_services, StubAnalyzer, StubImageMode};

    fn api(config: DreamsConfig) -> (tempfile::TempDir, DreamsApi<InMemoryStore>) {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings {
            config,
            paths: DreamsPaths::new(dir.path().to_path_buf()),
            api_key: None,
        };
        let services = stub_services(
            StubAnalyzer::returning(analysis_of(&[("wonder", 1.0)], &["flight"])),
            StubImageMode::Writes,
        );
        (dir, DreamsApi::new(InMemoryStore::new(), services, settings))
    }

    #[test]
    fn add_then_list_view_and_stats() {
        let (_dir, mut api) = api(DreamsConfig::default());
        let draft = api.draft("Flying over rooftops");
        api.add_dream(draft).unwrap();
        api.add_dream(api.draft("Lost keys")).unwrap();

        let listed = api.list_dreams(&DreamFilter::default()).unwrap();
        assert_eq!(listed.listed_dreams.len(), 2);

        let viewed = api.view_dream(1).unwrap();
        assert_eq!(viewed.listed_dreams[0].content, "Flying over rooftops");

        let stats = api.stats().unwrap().stats.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.with_analysis, 2);
        assert_eq!(api.session().store().write_count(), 2);
    }

    #[test]
    fn drafts_follow_analyze_by_default() {
        let mut config = DreamsConfig::default();
        config.analyze_by_default = false;
        let (_dir, mut api) = api(config);
        let draft = api.draft("Unexamined");
        let result = api.add_dream(draft).unwrap();
        assert!(result.affected_dreams[0].analysis.is_none());
    }

    #[test]
    fn view_of_missing_dream_fails() {
        let (_dir, mut api) = api(DreamsConfig::default());
        assert!(matches!(api.view_dream(4), Err(DreamError::DreamNotFound(4))));
    }

    #[test]
    fn init_and_config_use_the_data_dir() {
        let (dir, api) = api(DreamsConfig::default());
        api.init().unwrap();
        assert!(dir.path().join("generated").is_dir());

        api.config(ConfigAction::Set("default_style".into(), "anime".into()))
            .unwrap();
        assert!(dir.path().join("config.json").exists());
    }
}
