//! Vision/OCR Layer
//!
//! The recognition engine itself is an external collaborator. This layer
//! defines the capability it must provide, decodes its raw output and turns
//! it into observations the classifier can consume.

pub mod interpret;
pub mod labels;

pub use interpret::{interpret, render_report, Observation, RawRecord};
pub use labels::LabelDictionary;

use std::io::ErrorKind;
use std::path::PathBuf;
use tracing::debug;

use crate::capture::CapturedFrame;
use crate::error::{Result, WatchError};

/// Text recognition capability
pub trait Recognizer {
    /// Detect and recognize every text region in a frame
    fn recognize(&self, frame: &CapturedFrame) -> Result<Vec<RawRecord>>;
}

/// Replays detections the recognition engine wrote to a JSON file.
///
/// The file is re-read on every call, so an engine running in another
/// process can refresh it between cycles.
pub struct ReplayRecognizer {
    path: PathBuf,
}

impl ReplayRecognizer {
    /// Create a recognizer reading detections from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse a JSON array of raw records
    pub fn parse(json: &str) -> Result<Vec<RawRecord>> {
        serde_json::from_str(json)
            .map_err(|e| WatchError::Recognition(format!("malformed detections: {}", e)))
    }
}

impl Recognizer for ReplayRecognizer {
    fn recognize(&self, frame: &CapturedFrame) -> Result<Vec<RawRecord>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                WatchError::Recognition(format!("no detections at {:?}", self.path))
            }
            _ => WatchError::Io(e),
        })?;
        let records = Self::parse(&content)?;
        debug!(
            "Replayed {} detections for frame captured at {}",
            records.len(),
            frame.captured_at
        );
        Ok(records)
    }
}

/// Fixed detections
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    pub records: Vec<RawRecord>,
}

#[cfg(test)]
impl Recognizer for StaticRecognizer {
    fn recognize(&self, _frame: &CapturedFrame) -> Result<Vec<RawRecord>> {
        Ok(self.records.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_replay_reads_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("detections.json");
        std::fs::write(
            &path,
            r#"[{"points":[{"x":0,"y":0}],"label_indices":[1,2],"confidence":0.8,"orientation_index":0,"orientation_confidence":0.9}]"#,
        )
        .unwrap();

        let records = ReplayRecognizer::new(&path).recognize(&CapturedFrame::blank()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].label_indices, vec![1, 2]);
        assert_eq!(records[0].orientation_index, Some(0));
    }

    #[test]
    fn test_replay_missing_file_is_recognition_error() {
        let recognizer = ReplayRecognizer::new("/nonexistent/detections.json");
        let result = recognizer.recognize(&CapturedFrame::blank());
        assert!(matches!(result, Err(WatchError::Recognition(_))));
    }

    #[test]
    fn test_replay_malformed_json() {
        assert!(matches!(
            ReplayRecognizer::parse("{not json"),
            Err(WatchError::Recognition(_))
        ));
    }
}
