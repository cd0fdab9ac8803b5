//! Records a new dream.
//!
//! The record is enriched before it is saved: the illustration is requested
//! first, then the analysis. Neither enrichment can stop the save. A failure
//! becomes a message on the result and the field is simply left unset.
//!
//! A journal that cannot be read is renamed to `dreams.json.corrupt-<unix ts>`
//! and the dream starts a fresh one; the result carries a warning naming the
//! backup. Only a failed write aborts the command, in which case nothing is
//! kept.

use crate::commands::{CmdMessage, CmdResult, DreamsPaths};
use crate::config::DreamsConfig;
use crate::error::{DreamError, Result};
use crate::model::{DreamDraft, DreamRecord};
use crate::services::image::{build_prompt, image_filename};
use crate::services::Services;
use crate::session::DreamSession;
use crate::store::DreamStore;
use chrono::{DateTime, Local};
use std::fs;

pub fn run<S: DreamStore>(
    session: &mut DreamSession<S>,
    services: &Services,
    config: &DreamsConfig,
    paths: &DreamsPaths,
    draft: DreamDraft,
    now: DateTime<Local>,
) -> Result<CmdResult> {
    let content = draft.content.trim();
    if content.is_empty() {
        return Err(DreamError::Api("Dream content cannot be empty".to_string()));
    }

    let mut result = CmdResult::default();

    if let Err(e) = session.load() {
        let tag = format!("corrupt-{}", now.timestamp());
        // If the unreadable data cannot be moved, do not write over it.
        match session.set_aside(&tag)? {
            Some(backup) => result.add_message(CmdMessage::warning(format!(
                "The journal could not be read ({}). It was moved to {} and a new one was started",
                e, backup
            ))),
            None => return Err(e),
        }
    }

    let style = non_blank(draft.style.as_deref()).unwrap_or(config.default_style.as_str());
    let size = non_blank(draft.size.as_deref()).unwrap_or(config.default_size.as_str());
    let id = session.next_id();

    let mut record = DreamRecord::new(id, content.to_string(), draft.created_at.unwrap_or(now));
    record.title = non_blank(draft.title.as_deref()).map(str::to_string);
    record.style = Some(style.to_string());
    record.size = Some(size.to_string());

    if draft.generate_image {
        let output = paths
            .generated_dir
            .join(image_filename(id, now.timestamp()));
        let prompt = build_prompt(content, style);

        match services.images.generate(&prompt, style, size, &output) {
            Ok(true) if output.exists() => {
                tracing::info!(id, path = %output.display(), "illustration attached");
                record.image_path = Some(output);
            }
            Ok(true) => {
                tracing::warn!(id, path = %output.display(), "generator reported success without a file");
                result.add_message(CmdMessage::warning(
                    "The image service reported success but no image was written",
                ));
            }
            Ok(false) => {
                tracing::warn!(id, "generator declined");
                result.add_message(CmdMessage::warning("No illustration was generated"));
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "illustration failed");
                result.add_message(CmdMessage::error(format!(
                    "Could not generate an illustration: {}",
                    e
                )));
            }
        }
    }

    if draft.analyze {
        match services.analyzer.analyze(content) {
            Ok(analysis) => {
                tracing::info!(id, analyzer = services.analyzer.name(), "analysis attached");
                record.analysis = Some(analysis);
            }
            Err(e) => {
                tracing::warn!(id, error = %e, "analysis failed");
                result.add_message(CmdMessage::warning(format!(
                    "Could not analyse the dream: {}",
                    e
                )));
            }
        }
    }

    let image = record.image_path.clone();
    let saved = match session.save(record) {
        Ok(saved) => saved.clone(),
        Err(e) => {
            if let Some(orphan) = image {
                let _ = fs::remove_file(orphan);
            }
            return Err(e);
        }
    };

    result.add_message(CmdMessage::success(format!(
        "Dream #{} saved: {}",
        saved.id,
        saved.display_title()
    )));
    Ok(result.with_affected_dreams(vec![saved]))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
