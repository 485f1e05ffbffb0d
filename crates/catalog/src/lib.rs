//! Year-indexed railway line datasets.

pub mod dataset;
pub mod load;
pub mod year_index;

pub use dataset::*;
pub use load::*;
pub use year_index::*;

use foundation::GeoError;

#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    /// No years registered; the timeline has nothing to show.
    EmptyIndex,
    InvalidYear(String),
    InvalidCoordinate {
        year: i32,
        line: String,
        vertex: usize,
        source: GeoError,
    },
    Parse {
        origin: String,
        message: String,
    },
    Io {
        path: String,
        message: String,
    },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::EmptyIndex => write!(f, "catalog has no years"),
            CatalogError::InvalidYear(raw) => write!(f, "invalid year key: {raw:?}"),
            CatalogError::InvalidCoordinate {
                year,
                line,
                vertex,
                source,
            } => write!(f, "year {year}, line {line:?}, vertex {vertex}: {source}"),
            CatalogError::Parse { origin, message } => {
                write!(f, "failed to parse {origin}: {message}")
            }
            CatalogError::Io { path, message } => write!(f, "failed to read {path}: {message}"),
        }
    }
}

impl std::error::Error for CatalogError {}
