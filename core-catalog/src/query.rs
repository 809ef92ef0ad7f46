//! Pure catalog queries.
//!
//! Every function is a linear scan over a catalog slice and works for any
//! input order; results are ordered by the enumeration or unit number.

use std::collections::BTreeSet;

use crate::models::{AudioFile, Category, Grade};

/// Distinct grades present, in grade order.
pub fn grades_in(files: &[AudioFile]) -> Vec<Grade> {
    files
        .iter()
        .map(|file| file.grade)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Distinct categories present for `grade`, in category order.
pub fn categories_in(files: &[AudioFile], grade: Grade) -> Vec<Category> {
    files
        .iter()
        .filter(|file| file.grade == grade)
        .map(|file| file.category)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Units of one (grade, category) pair, sorted by unit number.
pub fn units_in(files: &[AudioFile], grade: Grade, category: Category) -> Vec<AudioFile> {
    let mut units: Vec<AudioFile> = files
        .iter()
        .filter(|file| file.grade == grade && file.category == category)
        .cloned()
        .collect();
    units.sort_by_key(|file| file.unit_number);
    units
}

/// First unit matching the identity triple.
pub fn find_in(
    files: &[AudioFile],
    grade: Grade,
    category: Category,
    unit_number: u32,
) -> Option<AudioFile> {
    files
        .iter()
        .find(|file| file.key() == (grade, category, unit_number))
        .cloned()
}
