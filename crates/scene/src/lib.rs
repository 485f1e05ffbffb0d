//! Display state for the railway map: what is rendered for the current year,
//! which layers are visible, and the crowd-sourced share points.
//!
//! Everything held here is canonical. Conversion to the display frame
//! happens only in layer extraction, and clicks are converted back in
//! [`PointCandidate::from_click`].

pub mod candidate;
pub mod layers;
pub mod render;
pub mod state;
pub mod visibility;

pub use candidate::*;
pub use layers::*;
pub use render::*;
pub use state::*;
pub use visibility::*;
