use crate::CatalogError;

/// Sorted, de-duplicated, non-empty set of years that have authored data.
///
/// Ordering contract:
/// - `years()` iterates in ascending order.
/// - Ties in `nearest` resolve to the earlier year.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearIndex {
    years: Vec<i32>,
}

impl YearIndex {
    pub fn new(years: impl IntoIterator<Item = i32>) -> Result<Self, CatalogError> {
        let mut years: Vec<i32> = years.into_iter().collect();
        if years.is_empty() {
            return Err(CatalogError::EmptyIndex);
        }
        years.sort_unstable();
        years.dedup();
        Ok(Self { years })
    }

    pub fn years(&self) -> &[i32] {
        &self.years
    }

    /// Earliest known year; the initial timeline position.
    pub fn first(&self) -> i32 {
        self.years[0]
    }

    pub fn last(&self) -> i32 {
        self.years[self.years.len() - 1]
    }

    pub fn contains(&self, year: i32) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    pub fn nearest(&self, requested: i32) -> i32 {
        // Non-empty by construction.
        nearest_known_year(requested, &self.years).unwrap_or(self.years[0])
    }
}

/// Resolve `requested` to the closest entry of `known`.
///
/// Returns `None` only for an empty slice. On equal distance the smaller year
/// wins regardless of slice order. Linear in `known.len()`.
pub fn nearest_known_year(requested: i32, known: &[i32]) -> Option<i32> {
    let mut best: Option<(i64, i32)> = None;
    for &year in known {
        let distance = (i64::from(year) - i64::from(requested)).abs();
        best = match best {
            Some((d, y)) if d < distance || (d == distance && y <= year) => Some((d, y)),
            _ => Some((distance, year)),
        };
    }
    best.map(|(_, year)| year)
}
