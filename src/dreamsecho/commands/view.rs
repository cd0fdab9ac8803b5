use crate::commands::CmdResult;
use crate::error::{DreamError, Result};
use crate::session::DreamSession;
use crate::store::DreamStore;

pub fn run<S: DreamStore>(session: &mut DreamSession<S>, id: u64) -> Result<CmdResult> {
    session.load()?;
    let dream = session.get(id).cloned().ok_or(DreamError::DreamNotFound(id))?;
    Ok(CmdResult::default().with_listed_dreams(vec![dream]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::JournalFixture;
    use chrono::Local;

    #[test]
    fn shows_one_dream() {
        let store = JournalFixture::new()
            .with_dream("first", Local::now())
            .with_dream("second", Local::now())
            .into_store();
        let mut session = DreamSession::new(store);
        let result = run(&mut session, 2).unwrap();
        assert_eq!(result.listed_dreams.len(), 1);
        assert_eq!(result.listed_dreams[0].content, "second");
    }

    #[test]
    fn unknown_id_is_not_found() {
        let mut session = DreamSession::new(JournalFixture::new().into_store());
        assert!(matches!(
            run(&mut session, 9),
            Err(DreamError::DreamNotFound(9))
        ));
    }
}
