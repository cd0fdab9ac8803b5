use crate::commands::{CmdMessage, CmdResult, DreamsPaths};
use crate::error::Result;
use std::fs;

pub fn run(paths: &DreamsPaths) -> Result<CmdResult> {
    fs::create_dir_all(&paths.data_dir)?;
    fs::create_dir_all(&paths.generated_dir)?;
    let mut result = CmdResult::default()
        .with_paths(vec![paths.data_dir.clone(), paths.generated_dir.clone()]);
    result.add_message(CmdMessage::success(format!(
        "Initialized dream journal at {}",
        paths.data_dir.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_data_and_image_directories() {
        let dir = tempfile::tempdir().unwrap();
        let paths = DreamsPaths::new(dir.path().join("journal"));
        let result = run(&paths).unwrap();
        assert!(paths.generated_dir.is_dir());
        assert_eq!(result.paths.len(), 2);

        // Running twice is harmless.
        assert!(run(&paths).is_ok());
    }
}
