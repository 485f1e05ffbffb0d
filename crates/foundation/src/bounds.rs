/// Axis-aligned longitude/latitude box (degrees).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LonLatBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl LonLatBox {
    pub const fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        LonLatBox {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        }
    }

    /// Interior test. Points on any edge are outside.
    pub fn contains_strict(&self, lon: f64, lat: f64) -> bool {
        lon > self.min_lon && lon < self.max_lon && lat > self.min_lat && lat < self.max_lat
    }
}

#[cfg(test)]
mod tests {
    use super::LonLatBox;

    #[test]
    fn edges_are_outside() {
        let b = LonLatBox::new(0.0, 0.0, 10.0, 10.0);
        assert!(b.contains_strict(5.0, 5.0));
        assert!(!b.contains_strict(0.0, 5.0));
        assert!(!b.contains_strict(10.0, 5.0));
        assert!(!b.contains_strict(5.0, 0.0));
        assert!(!b.contains_strict(5.0, 10.0));
    }
}
