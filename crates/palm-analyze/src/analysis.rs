//! Per-image aggregation: label counts, tree count and health class.

use crate::{Color, Label, Observation};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Healthy fraction at or above which an image is [`PlantCondition::Healthy`].
pub const HEALTHY_THRESHOLD: f64 = 0.7;
/// Healthy fraction at or above which an image is at worst [`PlantCondition::Malnutrition`].
pub const MALNUTRITION_THRESHOLD: f64 = 0.3;

/// Coarse health class of one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlantCondition {
    Healthy,
    Malnutrition,
    Sick,
}

impl PlantCondition {
    /// Classify a healthy fraction. Thresholds are inclusive, checked high to low.
    pub fn from_fraction(fraction: f64) -> Self {
        if fraction >= HEALTHY_THRESHOLD {
            PlantCondition::Healthy
        } else if fraction >= MALNUTRITION_THRESHOLD {
            PlantCondition::Malnutrition
        } else {
            PlantCondition::Sick
        }
    }

    pub fn color(self) -> Color {
        match self {
            PlantCondition::Healthy      => Color::Green,
            PlantCondition::Malnutrition => Color::Orange,
            PlantCondition::Sick         => Color::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlantCondition::Healthy      => "Healthy",
            PlantCondition::Malnutrition => "Lack of Nutrition",
            PlantCondition::Sick         => "Sick",
        }
    }
}

impl fmt::Display for PlantCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognised plant condition: {0:?}")]
pub struct ParseConditionError(pub String);

impl FromStr for PlantCondition {
    type Err = ParseConditionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "healthy"                           => Ok(PlantCondition::Healthy),
            "malnutrition" | "lack of nutrition" => Ok(PlantCondition::Malnutrition),
            "sick"                              => Ok(PlantCondition::Sick),
            _ => Err(ParseConditionError(s.to_string())),
        }
    }
}

/// Marker color for an image that may not have a finished analysis yet.
pub fn condition_color(condition: Option<PlantCondition>) -> Color {
    condition.map_or(Color::Gray, PlantCondition::color)
}

/// Aggregate of one detection run over one image.
///
/// Built once from a complete observation list and never mutated; a new
/// detection run produces a new `Analysis`.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    observations:    Vec<Observation>,
    object_counts:   BTreeMap<Label, usize>,
    tree_count:      usize,
    plant_condition: PlantCondition,
}

impl Analysis {
    pub fn new(observations: Vec<Observation>) -> Self {
        let mut object_counts = BTreeMap::new();
        for observation in &observations {
            *object_counts.entry(observation.label()).or_insert(0) += 1;
        }

        let tree_count: usize = Label::TREES
            .iter()
            .map(|label| object_counts.get(label).copied().unwrap_or(0))
            .sum();

        let healthy = object_counts.get(&Label::Healthy).copied().unwrap_or(0);
        let plant_condition = PlantCondition::from_fraction(fraction(healthy, tree_count));

        Self { observations, object_counts, tree_count, plant_condition }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Counts per label. Labels that never occur have no entry.
    pub fn object_counts(&self) -> &BTreeMap<Label, usize> {
        &self.object_counts
    }

    pub fn count(&self, label: Label) -> usize {
        self.object_counts.get(&label).copied().unwrap_or(0)
    }

    /// healthy + nitrogen + ganoderma + young
    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    /// Share of trees labelled healthy; `0.0` when there are no trees.
    pub fn healthy_fraction(&self) -> f64 {
        fraction(self.count(Label::Healthy), self.tree_count)
    }

    pub fn plant_condition(&self) -> PlantCondition {
        self.plant_condition
    }

    pub fn display_color(&self) -> Color {
        self.plant_condition.color()
    }

    pub fn is_healthy(&self) -> bool {
        self.plant_condition == PlantCondition::Healthy
    }

    /// Observations of a single label, in detector order.
    pub fn with_label(&self, label: Label) -> impl Iterator<Item = &Observation> + '_ {
        self.observations.iter().filter(move |o| o.label() == label)
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            object_counts:    self.object_counts.clone(),
            tree_count:       self.tree_count,
            healthy_fraction: self.healthy_fraction(),
            plant_condition:  self.plant_condition,
            display_color:    self.display_color(),
        }
    }
}

// denominator floored at 1 so an image without trees classifies as Sick
fn fraction(healthy: usize, trees: usize) -> f64 {
    healthy as f64 / trees.max(1) as f64
}

impl Default for Analysis {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<Observation>> for Analysis {
    fn from(observations: Vec<Observation>) -> Self {
        Self::new(observations)
    }
}

impl FromIterator<Observation> for Analysis {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Serializable view of an [`Analysis`] handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub object_counts:    BTreeMap<Label, usize>,
    pub tree_count:       usize,
    pub healthy_fraction: f64,
    pub plant_condition:  PlantCondition,
    pub display_color:    Color,
}
