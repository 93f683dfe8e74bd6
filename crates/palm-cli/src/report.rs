//! Per-image report lines and their JSON form.

use palm_analyze::{condition_color, AnalysisSummary, Color};
use palm_detect::GeoPoint;
use palm_session::{DetectionStatus, ImageAttachment};
use serde::Serialize;
use std::fmt::Write;

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub id:           String,
    pub path:         String,
    pub status:       &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error:        Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location:     Option<GeoPoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_ms:   Option<u128>,
    pub marker_color: Color,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary:      Option<AnalysisSummary>,
}

impl Report {
    pub fn from_attachment(attachment: &ImageAttachment) -> Self {
        let (status, error, elapsed_ms) = match attachment.status() {
            None                                 => ("pending", None, None),
            Some(DetectionStatus::Loading)       => ("loading", None, None),
            Some(DetectionStatus::Finished(f))   => ("finished", None, Some(f.elapsed.as_millis())),
            Some(DetectionStatus::Failed(err))   => ("failed", Some(err.to_string()), None),
        };
        let condition = attachment.condition();

        Self {
            id:           attachment.id().to_string(),
            path:         attachment.path().display().to_string(),
            status,
            error,
            location:     attachment.location(),
            elapsed_ms,
            marker_color: condition_color(condition),
            summary:      condition.map(|_| attachment.analysis().summary()),
        }
    }

    /// `DJI_0042.JPG: Healthy trees=4 healthy=3 nitrogen=1 cattle=1 (75% healthy, 12 ms)`
    pub fn text_line(&self) -> String {
        let mut line = format!("{}: ", self.id);
        match (&self.summary, &self.error) {
            (Some(summary), _) => {
                let _ = write!(line, "{} trees={}", summary.plant_condition, summary.tree_count);
                for (label, count) in &summary.object_counts {
                    let _ = write!(line, " {label}={count}");
                }
                let _ = write!(line, " ({:.0}% healthy", summary.healthy_fraction * 100.0);
                if let Some(ms) = self.elapsed_ms {
                    let _ = write!(line, ", {ms} ms");
                }
                line.push(')');
            }
            (None, Some(err)) => {
                let _ = write!(line, "FAILED: {err}");
            }
            (None, None) => line.push_str(self.status),
        }
        line
    }
}

/// Every report, failed ones included: a pretty JSON array or one text line each.
pub fn render(reports: &[Report], json: bool) -> serde_json::Result<String> {
    if json {
        return serde_json::to_string_pretty(reports);
    }
    Ok(reports.iter().map(Report::text_line).collect::<Vec<_>>().join("\n"))
}
