//! # Lesson Catalog
//!
//! Builds and queries the catalog of bundled lesson audio.
//!
//! ## Overview
//!
//! Lessons are bundled as one asset folder per (grade, category) pair, named
//! `<grade prefix><category suffix>` (for example `一年级上册课本`). File names
//! are loosely formatted; the only structure relied on is a `unit N` or
//! `project N` marker somewhere in the name.
//!
//! - [`models`]: grades, categories and the [`AudioFile`](models::AudioFile) unit descriptor
//! - [`parser`]: unit marker extraction from file names
//! - [`loader`]: walks every folder and builds the ordered catalog
//! - [`query`]: pure filters over a catalog slice
//! - [`repository`]: lazily loaded in-memory catalog cache

pub mod error;
pub mod loader;
pub mod models;
pub mod parser;
pub mod query;
pub mod repository;

pub use error::{LibraryError, Result};
pub use loader::CatalogLoader;
pub use models::{AudioFile, Category, Grade, UnitId};
pub use parser::{parse_unit_from_file_name, ParsedUnit};
pub use repository::{CatalogRepository, InMemoryCatalogRepository};
