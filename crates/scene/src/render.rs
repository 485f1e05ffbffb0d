use foundation::DisplayPoint;
use serde::{Serialize, Serializer};

/// Everything the tile-rendering layer needs for one frame.
///
/// Coordinates are in the display frame and serialize as `[lon, lat]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderScene {
    pub year: i32,
    pub requested_year: i32,
    pub description: String,
    pub lines: Vec<LineFeature>,
    pub points: Vec<PointFeature>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineFeature {
    pub name: String,
    pub desc: String,
    #[serde(serialize_with = "display_path")]
    pub path: Vec<DisplayPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointFeature {
    /// Position in the display state's point list.
    pub index: usize,
    pub id: Option<String>,
    pub name: String,
    pub desc: String,
    pub images: Vec<String>,
    pub comment_count: usize,
    #[serde(serialize_with = "display_point")]
    pub position: DisplayPoint,
}

fn display_point<S: Serializer>(p: &DisplayPoint, ser: S) -> Result<S::Ok, S::Error> {
    [p.lon(), p.lat()].serialize(ser)
}

fn display_path<S: Serializer>(path: &[DisplayPoint], ser: S) -> Result<S::Ok, S::Error> {
    ser.collect_seq(path.iter().map(|p| [p.lon(), p.lat()]))
}

impl RenderScene {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.points.is_empty()
    }
}
