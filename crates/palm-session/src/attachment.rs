//! One selected capture and its detection state.

use palm_analyze::{Analysis, PlantCondition};
use palm_detect::{DetectError, Detector, GeoPoint};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot decode image {path:?}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Detection failed: {0}")]
    Detect(#[from] DetectError),
    #[error("Detection worker failed: {0}")]
    Worker(String),
}

/// Decoded image facts recorded once detection finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Finished {
    pub width:   u32,
    pub height:  u32,
    pub elapsed: Duration,
}

/// Progress of loading and detecting one attachment.
#[derive(Debug, Clone)]
pub enum DetectionStatus {
    Loading,
    Finished(Finished),
    Failed(Arc<LoadError>),
}

impl DetectionStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, DetectionStatus::Failed(_))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, DetectionStatus::Finished(_))
    }
}

/// Result of a successful [`load_image`].
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub finished: Finished,
    pub analysis: Analysis,
}

/// Decode `path`, run `detector` over it and analyse the observations.
pub fn load_image(path: &Path, name: &str, detector: &dyn Detector) -> Result<LoadOutcome, LoadError> {
    let image = image::open(path)
        .map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })?
        .to_rgb8();

    let detections = detector.detect_timed(name, &image)?;
    let analysis = Analysis::new(detections.observations);

    Ok(LoadOutcome {
        finished: Finished {
            width:   image.width(),
            height:  image.height(),
            elapsed: detections.elapsed,
        },
        analysis,
    })
}

/// A capture chosen by the user.
///
/// The id is the file name, which is also the key the detector uses.
#[derive(Debug, Clone)]
pub struct ImageAttachment {
    id:          String,
    path:        PathBuf,
    location:    Option<GeoPoint>,
    status:      Option<DetectionStatus>,
    analysis:    Analysis,
    description: String,
}

impl ImageAttachment {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Self::with_id(id, path)
    }

    pub fn with_id(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id:          id.into(),
            path:        path.into(),
            location:    None,
            status:      None,
            analysis:    Analysis::default(),
            description: String::new(),
        }
    }

    pub fn with_location(mut self, location: Option<GeoPoint>) -> Self {
        self.location = location;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn location(&self) -> Option<GeoPoint> {
        self.location
    }

    pub fn status(&self) -> Option<&DetectionStatus> {
        self.status.as_ref()
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    /// Condition text once detection finished, empty before.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Condition of the finished analysis, `None` while not finished.
    pub fn condition(&self) -> Option<PlantCondition> {
        match self.status {
            Some(DetectionStatus::Finished(_)) => Some(self.analysis.plant_condition()),
            _ => None,
        }
    }

    /// Never loaded, or the last load failed.
    pub fn needs_load(&self) -> bool {
        self.status.as_ref().map_or(true, DetectionStatus::is_failed)
    }

    pub(crate) fn set_loading(&mut self) {
        self.status = Some(DetectionStatus::Loading);
    }

    pub(crate) fn complete(&mut self, result: Result<LoadOutcome, LoadError>) {
        match result {
            Ok(outcome) => {
                self.status = Some(DetectionStatus::Finished(outcome.finished));
                self.analysis = outcome.analysis;
                self.description = self.analysis.plant_condition().to_string();
            }
            Err(err) => {
                self.status = Some(DetectionStatus::Failed(Arc::new(err)));
            }
        }
    }
}
