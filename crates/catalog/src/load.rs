//! JSON loading for bundled per-year datasets.
//!
//! Per-year shape:
//!
//! ```json
//! {
//!   "description": "...",
//!   "lines": [{ "name": "...", "desc": "...", "coords": [[lat, lon], ...] }]
//! }
//! ```
//!
//! `coords` pairs are `[lat, lon]` in the canonical frame, the order the
//! datasets are authored in.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use foundation::CanonicalPoint;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{CatalogError, Line, LineCatalog};

#[derive(Debug, Deserialize)]
struct YearDocument {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    lines: Vec<LineDocument>,
}

#[derive(Debug, Deserialize)]
struct LineDocument {
    name: String,
    #[serde(default)]
    desc: String,
    coords: Vec<[f64; 2]>,
}

fn parse_year(raw: &str) -> Result<i32, CatalogError> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| CatalogError::InvalidYear(raw.to_string()))
}

fn convert_lines(year: i32, docs: Vec<LineDocument>) -> Result<Vec<Line>, CatalogError> {
    let mut out = Vec::with_capacity(docs.len());
    for doc in docs {
        let mut path = Vec::with_capacity(doc.coords.len());
        for (vertex, [lat, lon]) in doc.coords.iter().copied().enumerate() {
            let p = CanonicalPoint::new(lon, lat).map_err(|e| CatalogError::InvalidCoordinate {
                year,
                line: doc.name.clone(),
                vertex,
                source: e,
            })?;
            path.push(p);
        }
        out.push(Line {
            name: doc.name,
            desc: doc.desc,
            path,
        });
    }
    Ok(out)
}

#[derive(Debug, Default)]
struct CatalogBuilder {
    lines: BTreeMap<i32, Vec<Line>>,
    descriptions: BTreeMap<i32, String>,
}

impl CatalogBuilder {
    fn add(&mut self, year: i32, doc: YearDocument) -> Result<(), CatalogError> {
        let lines = convert_lines(year, doc.lines)?;
        self.lines.insert(year, lines);
        if let Some(desc) = doc.description {
            self.descriptions.insert(year, desc);
        }
        Ok(())
    }

    fn finish(self) -> Result<LineCatalog, CatalogError> {
        LineCatalog::new(self.lines, self.descriptions)
    }
}

impl LineCatalog {
    /// Parse a single document mapping year keys to per-year datasets.
    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        let docs: BTreeMap<String, YearDocument> =
            serde_json::from_str(text).map_err(|e| CatalogError::Parse {
                origin: "catalog document".to_string(),
                message: e.to_string(),
            })?;

        let mut builder = CatalogBuilder::default();
        for (key, doc) in docs {
            builder.add(parse_year(&key)?, doc)?;
        }
        builder.finish()
    }

    /// Load every `<year>.json` file in `root`. Other files are skipped.
    pub fn load_dir(root: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let root = root.as_ref();
        let io_err = |path: &Path, e: std::io::Error| CatalogError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let mut builder = CatalogBuilder::default();
        for entry in fs::read_dir(root).map_err(|e| io_err(root, e))? {
            let path = entry.map_err(|e| io_err(root, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                debug!("skipping non-dataset file {}", path.display());
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let year = parse_year(stem)?;

            let text = fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
            let doc: YearDocument =
                serde_json::from_str(&text).map_err(|e| CatalogError::Parse {
                    origin: path.display().to_string(),
                    message: e.to_string(),
                })?;
            builder.add(year, doc)?;
        }

        let catalog = builder.finish()?;
        info!(
            "loaded {} years ({} lines) from {}",
            catalog.index().years().len(),
            catalog.line_count(),
            root.display()
        );
        Ok(catalog)
    }
}
