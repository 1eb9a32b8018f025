// Copyright @yucwang 2026

use crate::core::error::ObserveResult;
use crate::io::png_utils::write_display_frame;
use crate::math::bitmap::Bitmap;
use std::path::PathBuf;

/// Receives the display frame while a pass is running.
pub trait PreviewSink: Send + Sync {
    fn refresh(&self, frame: &Bitmap) -> ObserveResult<()>;
}

/// Overwrites a PNG file with the latest frame.
pub struct PngPreview {
    path: PathBuf,
}

impl PngPreview {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl PreviewSink for PngPreview {
    fn refresh(&self, frame: &Bitmap) -> ObserveResult<()> {
        write_display_frame(frame, &self.path)
    }
}
