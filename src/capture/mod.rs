//! Frame Capture Layer
//!
//! Supplies the frames each classification cycle recognizes. Pixels come from
//! an image file written by the capturing device, or a blank frame when the
//! recognizer works from replayed detections.

pub mod frame;

pub use frame::CapturedFrame;

use std::path::PathBuf;
use tracing::debug;

use crate::error::Result;

/// Where cycle frames come from
#[derive(Debug, Clone, Default)]
pub enum FrameSource {
    /// No pixels; recognizer output is supplied out of band
    #[default]
    Blank,
    /// Re-read this image file every cycle
    File(PathBuf),
}

impl FrameSource {
    /// Capture the frame for the next cycle
    pub fn next_frame(&self) -> Result<CapturedFrame> {
        match self {
            FrameSource::Blank => Ok(CapturedFrame::blank()),
            FrameSource::File(path) => {
                let frame = CapturedFrame::open(path)?;
                let (width, height) = frame.dimensions();
                debug!("Captured {}x{} frame from {:?}", width, height, path);
                Ok(frame)
            }
        }
    }
}
