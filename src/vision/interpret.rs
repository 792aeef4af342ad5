//! Recognition result interpretation
//!
//! Turns raw recognizer records into [`Observation`]s. No filtering happens
//! here: every raw record yields exactly one observation.

use serde::{Deserialize, Serialize};
use std::fmt::Write;

use super::labels::LabelDictionary;

/// A polygon vertex in frame pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

/// One detection as emitted by the recognition engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Detection polygon
    #[serde(default)]
    pub points: Vec<Point>,
    /// Recognized label indices, in reading order
    #[serde(default)]
    pub label_indices: Vec<i32>,
    /// Recognition confidence
    pub confidence: f32,
    /// Orientation class index; absent (or negative) when classification was not run
    #[serde(default)]
    pub orientation_index: Option<i32>,
    #[serde(default)]
    pub orientation_confidence: Option<f32>,
}

/// Text orientation reported by the direction classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Upright,
    Rotated180,
}

impl Orientation {
    /// Map a classifier index: 1 is upside down, anything else upright
    pub fn from_index(index: i32) -> Self {
        if index == 1 {
            Orientation::Rotated180
        } else {
            Orientation::Upright
        }
    }

    /// Display label ("0" or "180")
    pub fn label(&self) -> &'static str {
        match self {
            Orientation::Upright => "0",
            Orientation::Rotated180 => "180",
        }
    }
}

/// Orientation classification for a text region
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationClass {
    pub orientation: Orientation,
    pub confidence: f32,
}

/// Structured textual observation of one recognized region
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub text: String,
    pub confidence: f32,
    pub orientation: Option<OrientationClass>,
    pub geometry: Vec<Point>,
}

impl Observation {
    /// Single-line description used in the recognition report
    pub fn describe(&self) -> String {
        let mut line = String::new();
        if !self.geometry.is_empty() {
            line.push_str("Det: ");
            for p in &self.geometry {
                let _ = write!(line, "({},{}) ", p.x, p.y);
            }
        }
        if !self.text.is_empty() {
            let _ = write!(line, "\n Rec: {},{}", self.text, self.confidence);
        }
        if let Some(cls) = &self.orientation {
            let _ = write!(line, " Cls: {},{}", cls.orientation.label(), cls.confidence);
        }
        line
    }
}

/// Interpret every raw record into an observation, in input order
pub fn interpret(records: &[RawRecord], labels: &LabelDictionary) -> Vec<Observation> {
    records
        .iter()
        .map(|record| Observation {
            text: labels.decode(&record.label_indices),
            confidence: record.confidence,
            orientation: record
                .orientation_index
                .filter(|&idx| idx >= 0)
                .map(|idx| OrientationClass {
                    orientation: Orientation::from_index(idx),
                    confidence: record.orientation_confidence.unwrap_or(0.0),
                }),
            geometry: record.points.clone(),
        })
        .collect()
}

/// Numbered multi-line report of all observations
pub fn render_report(observations: &[Observation]) -> String {
    let mut report = String::new();
    for (i, observation) in observations.iter().enumerate() {
        let _ = writeln!(report, "{}: {}", i + 1, observation.describe());
    }
    report
}
