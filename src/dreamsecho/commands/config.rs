use crate::commands::{CmdMessage, CmdResult, DreamsPaths};
use crate::config::DreamsConfig;
use crate::error::Result;

#[derive(Debug, Clone)]
pub enum ConfigAction {
    ShowAll,
    ShowKey(String),
    Set(String, String),
}

/// Reads or edits `config.json`. Environment overrides are not reflected
/// here: this shows what is persisted.
pub fn run(paths: &DreamsPaths, action: ConfigAction) -> Result<CmdResult> {
    let dir = &paths.data_dir;
    match action {
        ConfigAction::ShowAll => {
            let config = DreamsConfig::load(dir)?;
            Ok(CmdResult::default().with_config(config))
        }
        ConfigAction::ShowKey(key) => {
            let config = DreamsConfig::load(dir)?;
            let mut result = CmdResult::default();
            match config.get(&key) {
                Some(val) => result.add_message(CmdMessage::info(val)),
                None => {
                    result.add_message(CmdMessage::error(format!("Unknown config key: {}", key)))
                }
            }
            Ok(result)
        }
        ConfigAction::Set(key, value) => {
            let mut config = DreamsConfig::load(dir)?;
            if let Err(e) = config.set(&key, &value) {
                let mut result = CmdResult::default();
                result.add_message(CmdMessage::error(e));
                return Ok(result);
            }
            config.save(dir)?;
            tracing::debug!(key = key.as_str(), "config updated");

            let display_val = config.get(&key).unwrap_or_else(|| value.clone());
            let mut result = CmdResult::default().with_config(config);
            result.add_message(CmdMessage::success(format!(
                "{} set to {}",
                key, display_val
            )));
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::MessageLevel;
    use crate::config::AnalyzerKind;

    #[test]
    fn set_persists_and_show_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DreamsPaths::new(dir.path().to_path_buf());

        let result = run(
            &paths,
            ConfigAction::Set("analyzer".into(), "Keyword".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].content, "analyzer set to keyword");

        let shown = run(&paths, ConfigAction::ShowAll).unwrap();
        assert_eq!(shown.config.unwrap().analyzer, AnalyzerKind::Keyword);

        let key = run(&paths, ConfigAction::ShowKey("analyzer".into())).unwrap();
        assert_eq!(key.messages[0].content, "keyword");
    }

    #[test]
    fn invalid_values_are_reported_and_not_saved() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DreamsPaths::new(dir.path().to_path_buf());
        let result = run(
            &paths,
            ConfigAction::Set("request_timeout_secs".into(), "soon".into()),
        )
        .unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
        assert!(!dir.path().join("config.json").exists());
    }

    #[test]
    fn unknown_key_is_an_error_message() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DreamsPaths::new(dir.path().to_path_buf());
        let result = run(&paths, ConfigAction::ShowKey("theme".into())).unwrap();
        assert_eq!(result.messages[0].level, MessageLevel::Error);
    }
}
