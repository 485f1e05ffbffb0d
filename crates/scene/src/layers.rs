//! Layer extraction: canonical content in, display-frame features out.

use catalog::Line;
use foundation::math::to_display;
use points::SharePoint;
use tracing::warn;

use crate::render::{LineFeature, PointFeature};
use crate::visibility::Visibility;

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct LineLayer {
    pub visibility: Visibility,
}

impl LineLayer {
    pub fn extract(&self, lines: &[Line]) -> Vec<LineFeature> {
        if !self.visibility.visible {
            return Vec::new();
        }
        lines
            .iter()
            .map(|line| LineFeature {
                name: line.name.clone(),
                desc: line.desc.clone(),
                path: line.path.iter().copied().map(to_display).collect(),
            })
            .collect()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct SharePointLayer {
    pub visibility: Visibility,
}

impl SharePointLayer {
    /// Points without a valid position are skipped.
    pub fn extract(&self, points: &[SharePoint]) -> Vec<PointFeature> {
        if !self.visibility.visible {
            return Vec::new();
        }
        let mut out = Vec::with_capacity(points.len());
        for (index, point) in points.iter().enumerate() {
            let position = match point.position() {
                Ok(p) => to_display(p),
                Err(e) => {
                    warn!("skipping share point {index}: {e}");
                    continue;
                }
            };
            out.push(PointFeature {
                index,
                id: point.id.clone(),
                name: point.name.clone(),
                desc: point.desc.clone(),
                images: point.images.clone(),
                comment_count: point.comments.len(),
                position,
            });
        }
        out
    }
}
