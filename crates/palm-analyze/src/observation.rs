use crate::{BoundingBox, Color, Label};
use serde::{Deserialize, Serialize};

/// One detected object in one image.
///
/// The raw label string is kept as the detector produced it; [`Label`]
/// mapping happens on read so unknown classes survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub label:        String,
    pub confidence:   f64,
    pub bounding_box: BoundingBox,
}

impl Observation {
    pub fn new(label: impl Into<String>, confidence: f64, bounding_box: BoundingBox) -> Self {
        Self { label: label.into(), confidence, bounding_box }
    }

    pub fn label(&self) -> Label {
        Label::from(self.label.as_str())
    }

    pub fn color(&self) -> Color {
        self.label().color()
    }
}
