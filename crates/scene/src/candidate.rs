use foundation::math::to_canonical;
use foundation::{CanonicalPoint, DisplayPoint};
use points::NewSharePoint;

/// A share point the user is about to submit.
///
/// Holds only a canonical position; map clicks go through [`Self::from_click`].
#[derive(Debug, Clone, PartialEq)]
pub struct PointCandidate {
    position: CanonicalPoint,
    pub name: String,
    pub desc: String,
    pub images: Vec<String>,
}

impl PointCandidate {
    pub fn new(
        position: CanonicalPoint,
        name: impl Into<String>,
        desc: impl Into<String>,
        images: Vec<String>,
    ) -> Self {
        Self {
            position,
            name: name.into(),
            desc: desc.into(),
            images,
        }
    }

    /// Candidate for a click on the display map.
    pub fn from_click(
        click: DisplayPoint,
        name: impl Into<String>,
        desc: impl Into<String>,
        images: Vec<String>,
    ) -> Self {
        Self::new(to_canonical(click), name, desc, images)
    }

    pub fn position(&self) -> CanonicalPoint {
        self.position
    }

    pub fn into_payload(self) -> NewSharePoint {
        NewSharePoint::new(self.position, self.name, self.desc, self.images)
    }
}
