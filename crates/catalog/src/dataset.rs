use std::collections::BTreeMap;

use foundation::CanonicalPoint;

use crate::{CatalogError, YearIndex};

/// A railway line as authored for one year. Vertex order defines the path.
#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub name: String,
    pub desc: String,
    pub path: Vec<CanonicalPoint>,
}

/// Content resolved for a requested year.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearView<'a> {
    pub requested: i32,
    /// Nearest known year; what the timeline should snap to.
    pub year: i32,
    pub lines: &'a [Line],
    pub description: &'a str,
}

/// Per-year line geometry and description text, indexed by year.
///
/// The index is built from the years that carry line data. Descriptions are
/// optional per year.
#[derive(Debug, Clone, PartialEq)]
pub struct LineCatalog {
    index: YearIndex,
    lines: BTreeMap<i32, Vec<Line>>,
    descriptions: BTreeMap<i32, String>,
}

impl LineCatalog {
    pub fn new(
        lines: BTreeMap<i32, Vec<Line>>,
        descriptions: BTreeMap<i32, String>,
    ) -> Result<Self, CatalogError> {
        let index = YearIndex::new(lines.keys().copied())?;
        Ok(Self {
            index,
            lines,
            descriptions,
        })
    }

    pub fn index(&self) -> &YearIndex {
        &self.index
    }

    pub fn nearest_year(&self, requested: i32) -> i32 {
        self.index.nearest(requested)
    }

    /// Lines and description for the year nearest to `requested`.
    ///
    /// Missing entries for the resolved year come back empty.
    pub fn dataset_for(&self, requested: i32) -> YearView<'_> {
        dataset_for(requested, &self.index, &self.lines, &self.descriptions)
    }

    pub fn line_count(&self) -> usize {
        self.lines.values().map(Vec::len).sum()
    }
}

/// Free-standing form of [`LineCatalog::dataset_for`] over independently
/// supplied maps.
pub fn dataset_for<'a>(
    requested: i32,
    index: &YearIndex,
    lines: &'a BTreeMap<i32, Vec<Line>>,
    descriptions: &'a BTreeMap<i32, String>,
) -> YearView<'a> {
    let year = index.nearest(requested);
    YearView {
        requested,
        year,
        lines: lines.get(&year).map(Vec::as_slice).unwrap_or(&[]),
        description: descriptions.get(&year).map(String::as_str).unwrap_or(""),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use foundation::CanonicalPoint;
    use pretty_assertions::assert_eq;

    use super::{Line, LineCatalog, dataset_for};
    use crate::{CatalogError, YearIndex};

    fn line(name: &str, pts: &[(f64, f64)]) -> Line {
        Line {
            name: name.to_string(),
            desc: String::new(),
            path: pts
                .iter()
                .map(|&(lon, lat)| CanonicalPoint::new(lon, lat).expect("valid"))
                .collect(),
        }
    }

    fn sample() -> LineCatalog {
        let mut lines = BTreeMap::new();
        lines.insert(1865, vec![line("demo", &[(116.35, 39.89), (116.36, 39.89)])]);
        lines.insert(
            1881,
            vec![line("tangxu", &[(118.18, 39.63), (118.37, 39.56)])],
        );
        lines.insert(1888, Vec::new());
        let mut descriptions = BTreeMap::new();
        descriptions.insert(1865, "first demonstration track".to_string());
        LineCatalog::new(lines, descriptions).expect("non-empty")
    }

    #[test]
    fn resolves_nearest_year_content() {
        let catalog = sample();
        let view = catalog.dataset_for(1870);
        assert_eq!(view.requested, 1870);
        assert_eq!(view.year, 1865);
        assert_eq!(view.lines.len(), 1);
        assert_eq!(view.lines[0].name, "demo");
        assert_eq!(view.description, "first demonstration track");
    }

    #[test]
    fn missing_description_is_empty() {
        let catalog = sample();
        let view = catalog.dataset_for(1880);
        assert_eq!(view.year, 1881);
        assert_eq!(view.lines[0].name, "tangxu");
        assert_eq!(view.description, "");
    }

    #[test]
    fn year_without_lines_is_empty() {
        let catalog = sample();
        let view = catalog.dataset_for(1900);
        assert_eq!(view.year, 1888);
        assert!(view.lines.is_empty());
        assert_eq!(view.description, "");
    }

    #[test]
    fn free_function_tolerates_unregistered_years() {
        let index = YearIndex::new([1865, 1870]).unwrap();
        let lines = BTreeMap::new();
        let descriptions = BTreeMap::new();
        let view = dataset_for(1869, &index, &lines, &descriptions);
        assert_eq!(view.year, 1870);
        assert!(view.lines.is_empty());
        assert_eq!(view.description, "");
    }

    #[test]
    fn catalog_without_lines_is_rejected() {
        let err = LineCatalog::new(BTreeMap::new(), BTreeMap::new()).unwrap_err();
        assert_eq!(err, CatalogError::EmptyIndex);
    }

    #[test]
    fn counts_lines_across_years() {
        assert_eq!(sample().line_count(), 2);
    }
}
