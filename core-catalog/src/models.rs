//! Domain models for the lesson catalog

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::LibraryError;

// =============================================================================
// Grade
// =============================================================================

/// School grade. Declaration order is catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    #[serde(rename = "GRADE_1")]
    Grade1,
    #[serde(rename = "GRADE_2")]
    Grade2,
    #[serde(rename = "GRADE_3")]
    Grade3,
    #[serde(rename = "GRADE_4")]
    Grade4,
    #[serde(rename = "GRADE_5")]
    Grade5,
    #[serde(rename = "GRADE_6")]
    Grade6,
}

impl Grade {
    pub const ALL: [Grade; 6] = [
        Grade::Grade1,
        Grade::Grade2,
        Grade::Grade3,
        Grade::Grade4,
        Grade::Grade5,
        Grade::Grade6,
    ];

    /// Stable identifier used in unit ids, e.g. `GRADE_1`.
    pub fn code(&self) -> &'static str {
        match self {
            Grade::Grade1 => "GRADE_1",
            Grade::Grade2 => "GRADE_2",
            Grade::Grade3 => "GRADE_3",
            Grade::Grade4 => "GRADE_4",
            Grade::Grade5 => "GRADE_5",
            Grade::Grade6 => "GRADE_6",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Grade::Grade1 => "一年级",
            Grade::Grade2 => "二年级",
            Grade::Grade3 => "三年级",
            Grade::Grade4 => "四年级",
            Grade::Grade5 => "五年级",
            Grade::Grade6 => "六年级",
        }
    }

    /// First half of the asset folder name.
    pub fn folder_prefix(&self) -> &'static str {
        match self {
            Grade::Grade1 => "一年级上册",
            Grade::Grade2 => "二年级上册",
            Grade::Grade3 => "三年级上册",
            Grade::Grade4 => "四年级上册",
            Grade::Grade5 => "五年级上册",
            Grade::Grade6 => "六年级上册",
        }
    }

    /// Asset folder holding this grade's files of `category`.
    pub fn folder_for(&self, category: Category) -> String {
        format!("{}{}", self.folder_prefix(), category.folder_suffix())
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Grade {
    type Err = LibraryError;

    /// Accepts the code (`GRADE_3`), the display name (`三年级`) or a bare
    /// number (`3`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Grade::ALL
            .into_iter()
            .find(|grade| {
                grade.code().eq_ignore_ascii_case(s)
                    || grade.display_name() == s
                    || grade.code().strip_prefix("GRADE_") == Some(s)
            })
            .ok_or_else(|| LibraryError::InvalidInput {
                field: "grade".to_string(),
                message: format!("unknown grade '{s}'"),
            })
    }
}

// =============================================================================
// Category
// =============================================================================

/// Kind of lesson audio within a grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    Textbook,
    Vocabulary,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::Textbook, Category::Vocabulary];

    pub fn code(&self) -> &'static str {
        match self {
            Category::Textbook => "TEXTBOOK",
            Category::Vocabulary => "VOCABULARY",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Textbook => "课本",
            Category::Vocabulary => "单词",
        }
    }

    /// Second half of the asset folder name.
    pub fn folder_suffix(&self) -> &'static str {
        match self {
            Category::Textbook => "课本",
            Category::Vocabulary => "单词",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Category {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.code().eq_ignore_ascii_case(s) || category.display_name() == s)
            .ok_or_else(|| LibraryError::InvalidInput {
                field: "category".to_string(),
                message: format!("unknown category '{s}'"),
            })
    }
}

/// Every (grade, category) pair in catalog order.
pub fn catalog_pairs() -> impl Iterator<Item = (Grade, Category)> {
    Grade::ALL
        .into_iter()
        .flat_map(|grade| Category::ALL.into_iter().map(move |category| (grade, category)))
}

// =============================================================================
// Unit identity
// =============================================================================

/// Composite identity of a unit: `<GRADE>_<CATEGORY>_<number>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn new(grade: Grade, category: Category, unit_number: u32) -> Self {
        Self(format!("{}_{}_{}", grade.code(), category.code(), unit_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// AudioFile
// =============================================================================

/// One playable lesson unit.
///
/// Identity is `(grade, category, unit_number)`; `id` is derived from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioFile {
    pub id: UnitId,
    pub grade: Grade,
    pub category: Category,
    pub unit_number: u32,
    /// Display label such as "Unit 3" or "Project 2"
    pub unit_name: String,
    pub file_name: String,
    /// Logical asset path, `<folder>/<file_name>`
    pub file_path: String,
    /// Known duration; filled in by the player once prepared
    pub duration_ms: Option<u64>,
}

impl AudioFile {
    pub fn new(
        grade: Grade,
        category: Category,
        unit_number: u32,
        unit_name: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        let file_name = file_name.into();
        let file_path = bridge_traits::assets::asset_path(&grade.folder_for(category), &file_name);
        Self {
            id: UnitId::new(grade, category, unit_number),
            grade,
            category,
            unit_number,
            unit_name: unit_name.into(),
            file_name,
            file_path,
            duration_ms: None,
        }
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    /// Identity triple used for ordering and de-duplication.
    pub fn key(&self) -> (Grade, Category, u32) {
        (self.grade, self.category, self.unit_number)
    }

    /// "一年级 - 课本 - Unit 1"
    pub fn full_display_name(&self) -> String {
        format!(
            "{} - {} - {}",
            self.grade.display_name(),
            self.category.display_name(),
            self.unit_name
        )
    }

    pub fn short_display_name(&self) -> &str {
        &self.unit_name
    }

    pub fn is_project(&self) -> bool {
        self.unit_name.to_lowercase().contains("project")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grade_order_matches_declaration() {
        let mut shuffled = vec![Grade::Grade3, Grade::Grade1, Grade::Grade6, Grade::Grade2];
        shuffled.sort();
        assert_eq!(
            shuffled,
            vec![Grade::Grade1, Grade::Grade2, Grade::Grade3, Grade::Grade6]
        );
        assert!(Category::Textbook < Category::Vocabulary);
    }

    #[test]
    fn folder_names() {
        assert_eq!(Grade::Grade1.folder_for(Category::Textbook), "一年级上册课本");
        assert_eq!(Grade::Grade5.folder_for(Category::Vocabulary), "五年级上册单词");
    }

    #[test]
    fn catalog_pairs_cover_all_folders_in_order() {
        let pairs: Vec<_> = catalog_pairs().collect();
        assert_eq!(pairs.len(), 12);
        assert_eq!(pairs[0], (Grade::Grade1, Category::Textbook));
        assert_eq!(pairs[1], (Grade::Grade1, Category::Vocabulary));
        assert_eq!(pairs[11], (Grade::Grade6, Category::Vocabulary));
    }

    #[test]
    fn audio_file_derives_identity_and_path() {
        let file = AudioFile::new(Grade::Grade2, Category::Vocabulary, 3, "Unit 3", "unit 3.mp3");
        assert_eq!(file.id.as_str(), "GRADE_2_VOCABULARY_3");
        assert_eq!(file.file_path, "二年级上册单词/unit 3.mp3");
        assert_eq!(file.key(), (Grade::Grade2, Category::Vocabulary, 3));
        assert_eq!(file.duration_ms, None);
        assert_eq!(file.with_duration(1_000).duration_ms, Some(1_000));
    }

    #[test]
    fn display_names() {
        let unit = AudioFile::new(Grade::Grade1, Category::Textbook, 1, "Unit 1", "u1.mp3");
        assert_eq!(unit.full_display_name(), "一年级 - 课本 - Unit 1");
        assert_eq!(unit.short_display_name(), "Unit 1");
        assert!(!unit.is_project());

        let project = AudioFile::new(Grade::Grade1, Category::Textbook, 2, "Project 2", "p2.mp3");
        assert!(project.is_project());
    }

    #[test]
    fn parse_grade_and_category() {
        assert_eq!("GRADE_4".parse::<Grade>().unwrap(), Grade::Grade4);
        assert_eq!("grade_4".parse::<Grade>().unwrap(), Grade::Grade4);
        assert_eq!("四年级".parse::<Grade>().unwrap(), Grade::Grade4);
        assert_eq!("4".parse::<Grade>().unwrap(), Grade::Grade4);
        assert!("7".parse::<Grade>().is_err());

        assert_eq!("textbook".parse::<Category>().unwrap(), Category::Textbook);
        assert_eq!("单词".parse::<Category>().unwrap(), Category::Vocabulary);
        assert!(matches!(
            "music".parse::<Category>(),
            Err(LibraryError::InvalidInput { .. })
        ));
    }

    #[test]
    fn serde_uses_codes() {
        let file = AudioFile::new(Grade::Grade1, Category::Textbook, 1, "Unit 1", "u1.mp3");
        let json = serde_json::to_value(&file).unwrap();
        assert_eq!(json["id"], "GRADE_1_TEXTBOOK_1");
        assert_eq!(json["grade"], "GRADE_1");
        assert_eq!(json["category"], "TEXTBOOK");
    }
}
