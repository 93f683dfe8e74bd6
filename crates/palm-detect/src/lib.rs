// palm-detect/src/lib.rs
// ============================================================
// palm-detect  –  Detection boundary for PalmVision
// The analyzer never sees a model; it sees a `Detector` that
// turns decoded pixels into a finite list of observations.
// ------------------------------------------------------------
// Pipeline: RgbImage → Detector → Vec<Observation>
// ------------------------------------------------------------
// Public API
//   * Detector::detect(name, image)   – observations for one image
//   * Detector::detect_timed(..)      – same, plus wall time
//   * Postprocess::apply(obs)         – confidence filter + NMS
//   * RecordedDetector::from_path(p)  – replay a recorded run
// ============================================================

//! PalmVision – detection layer
//!
//! This crate provides the backend-agnostic [`Detector`] trait plus
//! [`RecordedDetector`], which replays the output of an earlier model run
//! stored as JSON. The model itself runs elsewhere; swapping in a live
//! backend means implementing one method.
//!
//! A detector always returns the *complete* observation list for an image;
//! there is no streaming of partial results.

use image::RgbImage;
use palm_analyze::Observation;
use std::time::{Duration, Instant};
use thiserror::Error;

mod postprocess;
mod recorded;

pub use postprocess::{non_max_suppression, Postprocess};
pub use recorded::{GeoPoint, RecordedDetector, RecordedImage, Recording};

#[derive(Debug, Error)]
pub enum DetectError {
    #[error("Failed to read recording: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed recording: {0}")]
    Json(#[from] serde_json::Error),
    #[error("No detections recorded for image {0:?}")]
    NotRecorded(String),
    #[error("Image {0:?} has no pixels")]
    EmptyImage(String),
}

pub type Result<T> = std::result::Result<T, DetectError>;

/// Observations for one image plus the time the detector took.
#[derive(Debug, Clone, PartialEq)]
pub struct Detections {
    pub observations: Vec<Observation>,
    pub elapsed:      Duration,
}

/// Trait for object detectors.
pub trait Detector {
    /// Detect objects in `image`. `name` identifies the capture (file name).
    fn detect(&self, name: &str, image: &RgbImage) -> Result<Vec<Observation>>;

    fn detect_timed(&self, name: &str, image: &RgbImage) -> Result<Detections> {
        let start = Instant::now();
        let observations = self.detect(name, image)?;
        let elapsed = start.elapsed();
        log::debug!("{name}: {} observations in {elapsed:?}", observations.len());
        Ok(Detections { observations, elapsed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palm_analyze::BoundingBox;

    struct Fixed(usize);

    impl Detector for Fixed {
        fn detect(&self, _name: &str, _image: &RgbImage) -> Result<Vec<Observation>> {
            Ok((0..self.0)
                .map(|_| Observation::new("young", 0.5, BoundingBox::default()))
                .collect())
        }
    }

    #[test]
    fn timed_detection_keeps_observations() {
        let image = RgbImage::new(2, 2);
        let out = Fixed(3).detect_timed("a.png", &image).unwrap();
        assert_eq!(out.observations.len(), 3);
    }
}
