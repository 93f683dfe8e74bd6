// palm-analyze/src/lib.rs
// ============================================================
// palm-analyze  –  Observation aggregation for PalmVision
// Turns one image's detections into label counts, a tree
// count and a three-way plant health class.
// ------------------------------------------------------------
// Pipeline: Vec<Observation> → Analysis → AnalysisSummary
// ------------------------------------------------------------
// Public API
//   * Analysis::new(observations)  – count + classify (total)
//   * Label::from(&str)            – raw class → Label, never fails
//   * fit_rect / to_display_rect   – box placement for renderers
// ============================================================

//! PalmVision – analysis layer
//!
//! Everything in this crate is pure and synchronous. An [`Analysis`] is a
//! snapshot of one detection run; it holds the observations it was built
//! from so a view can redraw or filter them by [`Label`], and it is replaced
//! wholesale when the image is detected again.
//!
//! ```
//! use palm_analyze::{Analysis, BoundingBox, Observation, PlantCondition};
//!
//! let analysis = Analysis::new(vec![
//!     Observation::new("healthy", 0.91, BoundingBox::new(0.1, 0.1, 0.2, 0.2)),
//!     Observation::new("banana",  0.55, BoundingBox::new(0.5, 0.5, 0.1, 0.1)),
//! ]);
//! assert_eq!(analysis.tree_count(), 1);
//! assert_eq!(analysis.plant_condition(), PlantCondition::Healthy);
//! ```

mod analysis;
mod geometry;
mod label;
mod observation;

pub use analysis::{
    condition_color, Analysis, AnalysisSummary, ParseConditionError, PlantCondition,
    HEALTHY_THRESHOLD, MALNUTRITION_THRESHOLD,
};
pub use geometry::{fit_rect, BoundingBox, DisplayRect};
pub use label::{Color, Label};
pub use observation::Observation;
