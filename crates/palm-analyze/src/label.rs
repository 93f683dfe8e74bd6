//! Detection labels and their display colors.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of categories the palm detector emits.
///
/// Raw detector strings are mapped with [`Label::from`], which never fails:
/// anything unrecognised becomes [`Label::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    Unknown,
    Healthy,
    Nitrogen,
    Ganoderma,
    Banana,
    Cattle,
    Young,
}

impl Label {
    pub const ALL: [Label; 7] = [
        Label::Unknown,
        Label::Healthy,
        Label::Nitrogen,
        Label::Ganoderma,
        Label::Banana,
        Label::Cattle,
        Label::Young,
    ];

    /// Labels that count as a palm tree.
    pub const TREES: [Label; 4] = [Label::Healthy, Label::Nitrogen, Label::Ganoderma, Label::Young];

    pub fn as_str(self) -> &'static str {
        match self {
            Label::Unknown   => "unknown",
            Label::Healthy   => "healthy",
            Label::Nitrogen  => "nitrogen",
            Label::Ganoderma => "ganoderma",
            Label::Banana    => "banana",
            Label::Cattle    => "cattle",
            Label::Young     => "young",
        }
    }

    /// `true` for labels that take part in the tree-health math.
    pub fn is_tree(self) -> bool {
        Self::TREES.contains(&self)
    }

    pub fn color(self) -> Color {
        match self {
            Label::Healthy   => Color::Green,
            Label::Nitrogen  => Color::Orange,
            Label::Banana    => Color::Yellow,
            Label::Ganoderma => Color::Red,
            Label::Cattle    => Color::Cyan,
            Label::Young     => Color::Teal,
            Label::Unknown   => Color::Gray,
        }
    }
}

impl From<&str> for Label {
    fn from(raw: &str) -> Self {
        match raw {
            "healthy"   => Label::Healthy,
            "nitrogen"  => Label::Nitrogen,
            // older exported models shipped the class as "ganoderna"
            "ganoderma" | "ganoderna" => Label::Ganoderma,
            "banana"    => Label::Banana,
            "cattle"    => Label::Cattle,
            "young"     => Label::Young,
            _           => Label::Unknown,
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display tag shared by label boxes and map markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Orange,
    Yellow,
    Red,
    Cyan,
    Teal,
    Gray,
}

impl Color {
    pub fn as_str(self) -> &'static str {
        match self {
            Color::Green  => "green",
            Color::Orange => "orange",
            Color::Yellow => "yellow",
            Color::Red    => "red",
            Color::Cyan   => "cyan",
            Color::Teal   => "teal",
            Color::Gray   => "gray",
        }
    }

    /// sRGB triple used when drawing onto an image.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Color::Green  => [52, 199, 89],
            Color::Orange => [255, 149, 0],
            Color::Yellow => [255, 204, 0],
            Color::Red    => [255, 59, 48],
            Color::Cyan   => [50, 173, 230],
            Color::Teal   => [48, 176, 199],
            Color::Gray   => [142, 142, 147],
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
