use anyhow::{Context, Result};
use palm_detect::Postprocess;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for a batch of detections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Images decoded and detected at once
    pub workers: usize,
    /// Minimum detector confidence kept for analysis
    pub confidence_threshold: f64,
    /// Same-label overlap above which the weaker box is suppressed
    pub iou_threshold: f64,
    /// Upper bound on observations per image
    pub max_detections: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let pp = Postprocess::default();
        Self {
            workers: num_cpus::get(),
            confidence_threshold: pp.confidence_threshold,
            iou_threshold: pp.iou_threshold,
            max_detections: pp.max_detections,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file; missing fields take their defaults.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        Ok(config)
    }

    pub fn postprocess(&self) -> Postprocess {
        Postprocess {
            confidence_threshold: self.confidence_threshold,
            iou_threshold: self.iou_threshold,
            max_detections: self.max_detections,
        }
    }

    /// Worker count, never zero.
    pub fn workers(&self) -> usize {
        self.workers.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = PipelineConfig::default();
        assert!(config.workers >= 1);
        assert_eq!(config.confidence_threshold, 0.25);
        assert_eq!(config.iou_threshold, 0.45);
        assert_eq!(config.max_detections, 300);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "workers": 0, "confidence_threshold": 0.5 }}"#).unwrap();

        let config = PipelineConfig::from_path(file.path()).unwrap();
        assert_eq!(config.workers(), 1);
        assert_eq!(config.postprocess().confidence_threshold, 0.5);
        assert_eq!(config.postprocess().iou_threshold, 0.45);
    }

    #[test]
    fn test_config_serialization() {
        let config = PipelineConfig { workers: 3, ..Default::default() };
        let json = serde_json::to_string(&config).unwrap();
        let back: PipelineConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_missing_file_names_path() {
        let err = PipelineConfig::from_path(Path::new("/nonexistent/palm.json")).unwrap_err();
        assert!(err.to_string().contains("palm.json"));
    }
}
