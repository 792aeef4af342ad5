//! Frame data structures for captured screen content

use chrono::{DateTime, Local};
use image::RgbaImage;
use std::path::Path;

use crate::error::{Result, WatchError};

/// A captured frame handed to the recognizer
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// RGBA pixel data
    pub image: RgbaImage,
    /// Wall-clock time the frame was captured
    pub captured_at: DateTime<Local>,
}

impl CapturedFrame {
    /// Create a new captured frame stamped with the current time
    pub fn new(image: RgbaImage) -> Self {
        Self {
            image,
            captured_at: Local::now(),
        }
    }

    /// Placeholder frame for recognizers that do not read pixels
    pub fn blank() -> Self {
        Self::new(RgbaImage::new(1, 1))
    }

    /// Decode an image file into a frame
    pub fn open(path: &Path) -> Result<Self> {
        let image = image::open(path)
            .map_err(|e| {
                WatchError::Recognition(format!("failed to open frame {:?}: {}", path, e))
            })?
            .to_rgba8();
        Ok(Self::new(image))
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}
