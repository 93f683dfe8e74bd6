//! Replay of a recorded detection run.
//!
//! A recording is the JSON dump of running the palm model over a batch of
//! captures, keyed by file name:
//!
//! ```json
//! { "images": {
//!     "DJI_0042.JPG": {
//!       "location": { "latitude": 2.9264, "longitude": 101.6964 },
//!       "observations": [
//!         { "label": "healthy", "confidence": 0.91,
//!           "bounding_box": { "x": 0.12, "y": 0.40, "width": 0.08, "height": 0.09 } }
//!       ] } } }
//! ```

use crate::{DetectError, Detector, Postprocess, Result};
use image::RgbImage;
use palm_analyze::Observation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Where a capture was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude:  f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedImage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub observations: Vec<Observation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Recording {
    pub images: BTreeMap<String, RecordedImage>,
}

/// Detector that looks up observations by capture name.
#[derive(Debug, Clone)]
pub struct RecordedDetector {
    recording:   Recording,
    postprocess: Postprocess,
}

impl RecordedDetector {
    pub fn new(recording: Recording) -> Self {
        Self { recording, postprocess: Postprocess::default() }
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let recording: Recording = serde_json::from_reader(reader)?;
        Ok(Self::new(recording))
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let detector = Self::from_reader(BufReader::new(File::open(path)?))?;
        log::info!("Loaded recording {:?} ({} images)", path, detector.recording.images.len());
        Ok(detector)
    }

    pub fn with_postprocess(mut self, postprocess: Postprocess) -> Self {
        self.postprocess = postprocess;
        self
    }

    pub fn postprocess(&self) -> &Postprocess {
        &self.postprocess
    }

    pub fn location(&self, name: &str) -> Option<GeoPoint> {
        self.recording.images.get(name).and_then(|img| img.location)
    }

    /// Recorded capture names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.recording.images.keys().map(String::as_str)
    }
}

impl Detector for RecordedDetector {
    fn detect(&self, name: &str, image: &RgbImage) -> Result<Vec<Observation>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(DetectError::EmptyImage(name.to_string()));
        }
        let recorded = self
            .recording
            .images
            .get(name)
            .ok_or_else(|| DetectError::NotRecorded(name.to_string()))?;

        Ok(self.postprocess.apply(recorded.observations.clone()))
    }
}
