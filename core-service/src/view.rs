//! View state for unit lists.

use core_catalog::{AudioFile, LibraryError};
use serde::{Deserialize, Serialize};

/// What a unit list screen shows.
///
/// An empty catalog is a normal outcome and is kept apart from a failed load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "data")]
pub enum UnitListState {
    #[default]
    Loading,
    Empty,
    Ready(Vec<AudioFile>),
    Failed(String),
}

impl UnitListState {
    pub fn from_result(result: Result<Vec<AudioFile>, LibraryError>) -> Self {
        match result {
            Ok(units) if units.is_empty() => UnitListState::Empty,
            Ok(units) => UnitListState::Ready(units),
            Err(err) => UnitListState::Failed(err.to_string()),
        }
    }

    /// Units to render; empty unless `Ready`.
    pub fn units(&self) -> &[AudioFile] {
        match self {
            UnitListState::Ready(units) => units,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, UnitListState::Loading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_catalog::{Category, Grade};

    #[test]
    fn classifies_results() {
        assert!(UnitListState::default().is_loading());
        assert_eq!(UnitListState::from_result(Ok(Vec::new())), UnitListState::Empty);

        let unit = AudioFile::new(Grade::Grade2, Category::Textbook, 1, "Unit 1", "u1.mp3");
        let ready = UnitListState::from_result(Ok(vec![unit.clone()]));
        assert_eq!(ready.units(), &[unit]);

        let failed = UnitListState::from_result(Err(LibraryError::CatalogUnavailable(
            "root missing".into(),
        )));
        assert_eq!(
            failed,
            UnitListState::Failed("Catalog unavailable: root missing".into())
        );
        assert!(failed.units().is_empty());
    }

    #[test]
    fn serializes_with_status_tag() {
        let json = serde_json::to_value(UnitListState::Failed("boom".into())).unwrap();
        assert_eq!(json["status"], "Failed");
        assert_eq!(json["data"], "boom");
        let json = serde_json::to_value(UnitListState::Empty).unwrap();
        assert_eq!(json["status"], "Empty");
    }
}
