//! Confidence filtering and per-label non-maximum suppression.

use palm_analyze::Observation;
use serde::{Deserialize, Serialize};

const MAX_DETECTIONS: usize = 300;

/// Filtering applied to raw detector output before analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Postprocess {
    /// Observations scoring below this are dropped, as are NaN scores.
    /// `-inf` disables the filter entirely.
    pub confidence_threshold: f64,
    /// Same-label boxes overlapping a kept box by more than this are dropped.
    pub iou_threshold: f64,
    pub max_detections: usize,
}

impl Default for Postprocess {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.25,
            iou_threshold:        0.45,
            max_detections:       MAX_DETECTIONS,
        }
    }
}

impl Postprocess {
    /// Keeps everything: no threshold, no suppression, no cap.
    pub fn passthrough() -> Self {
        Self {
            confidence_threshold: f64::NEG_INFINITY,
            iou_threshold:        f64::INFINITY,
            max_detections:       usize::MAX,
        }
    }

    pub fn apply(&self, observations: Vec<Observation>) -> Vec<Observation> {
        let before = observations.len();
        let confident: Vec<Observation> = observations
            .into_iter()
            .filter(|o| self.confidence_threshold == f64::NEG_INFINITY || o.confidence >= self.confidence_threshold)
            .collect();

        let mut kept = non_max_suppression(confident, self.iou_threshold);
        kept.truncate(self.max_detections);
        log::trace!("postprocess kept {}/{before}", kept.len());
        kept
    }
}

/// Greedy NMS, highest confidence first. Boxes only suppress boxes of the
/// same label; the result is sorted by descending confidence.
pub fn non_max_suppression(observations: Vec<Observation>, iou_thr: f64) -> Vec<Observation> {
    let mut observations = observations;
    observations.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut keep: Vec<Observation> = Vec::with_capacity(observations.len());

    'outer: for o in observations {
        let label = o.label();
        for k in keep.iter().filter(|k| k.label() == label) {
            if o.bounding_box.iou(&k.bounding_box) > iou_thr {
                continue 'outer;
            }
        }
        keep.push(o);
    }
    keep
}
