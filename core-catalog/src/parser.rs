//! Unit marker extraction from lesson file names.
//!
//! Bundled file names follow no fixed layout (`一上英课本unit 1.mp3`,
//! `【单词】Unit10.mp3`, `二上英课本project 3.mp3`). The only thing relied on
//! is the first `unit`/`project` keyword followed by a number.

use regex::Regex;
use std::sync::OnceLock;

/// Unit number and display label recovered from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedUnit {
    pub number: u32,
    /// "Unit 3", "Project 2"
    pub label: String,
}

/// Keyword, optional ASCII whitespace, ASCII digits; case-insensitive.
fn unit_pattern() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?i)(unit|project)(?-u:\s)*([0-9]+)").expect("unit pattern is a valid regex")
    })
}

/// Extract the unit marker from a file name.
///
/// Returns `None` when there is no keyword, no digits follow it, or the number
/// does not fit in a `u32`.
///
/// ```
/// use core_catalog::parser::parse_unit_from_file_name;
///
/// let unit = parse_unit_from_file_name("一上英课本unit 1.mp3").unwrap();
/// assert_eq!((unit.number, unit.label.as_str()), (1, "Unit 1"));
///
/// assert!(parse_unit_from_file_name("unit.mp3").is_none());
/// ```
pub fn parse_unit_from_file_name(file_name: &str) -> Option<ParsedUnit> {
    let captures = unit_pattern().captures(file_name)?;
    let keyword = capitalize_first(captures.get(1)?.as_str());
    let number = captures.get(2)?.as_str().parse::<u32>().ok()?;

    Some(ParsedUnit {
        number,
        label: format!("{keyword} {number}"),
    })
}

/// Whether the text contains a unit marker at all.
pub fn contains_unit_pattern(text: &str) -> bool {
    unit_pattern().is_match(text)
}

/// Just the unit number of the first marker.
pub fn extract_unit_number(text: &str) -> Option<u32> {
    parse_unit_from_file_name(text).map(|unit| unit.number)
}

fn capitalize_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
