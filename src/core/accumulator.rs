// Copyright @yucwang 2026

//! Progressive accumulation of tristimulus samples.
//!
//! The tristimulus frame always holds the sample-weighted mean of everything
//! folded into it. A pass of `N` new sample units first attenuates the frame
//! by `A / (A + N)` and every contribution of the pass is then added with
//! weight `N / (A + N)`, where `A` is the number of units already folded in.
//!
//! When a pass spans several spectral channels, each channel's contribution is
//! added with the same weight and the contributions are summed into the same
//! cell. The channels partition the wavelength range, so their tristimulus
//! values sum to the full-band value and no division by the channel count is
//! applied. The pass is counted as `pixel_samples * channel_count` units.

use crate::math::bitmap::Bitmap;
use crate::math::colour::ciexyz_to_srgb;
use crate::math::constants::{Float, Vector3f};

/// Weights of an open pass. Consumed by `ProgressiveAccumulator::finish_pass`.
#[derive(Debug)]
pub struct PassWeights {
    added_weight: Float,
    total_samples: u64,
}

impl PassWeights {
    pub fn added_weight(&self) -> Float {
        self.added_weight
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }
}

pub struct ProgressiveAccumulator {
    xyz_frame: Bitmap,
    frame: Bitmap,
    accumulated_samples: u64,
}

impl ProgressiveAccumulator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            xyz_frame: Bitmap::new(width, height),
            frame: Bitmap::new(width, height),
            accumulated_samples: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.xyz_frame.width()
    }

    pub fn height(&self) -> usize {
        self.xyz_frame.height()
    }

    pub fn accumulated_samples(&self) -> u64 {
        self.accumulated_samples
    }

    /// Tristimulus (CIE XYZ) frame.
    pub fn xyz_frame(&self) -> &Bitmap {
        &self.xyz_frame
    }

    /// Display (sRGB) frame derived from the tristimulus frame.
    pub fn frame(&self) -> &Bitmap {
        &self.frame
    }

    /// Discard everything accumulated so far.
    pub fn reset(&mut self) {
        self.xyz_frame.clear();
        self.frame.clear();
        self.accumulated_samples = 0;
    }

    /// Open a pass of `new_samples` sample units and attenuate the existing
    /// frame to make room for it.
    pub fn begin_pass(&mut self, new_samples: u64) -> PassWeights {
        let total_samples = self.accumulated_samples + new_samples;
        let (previous_weight, added_weight) = if total_samples == 0 {
            (0.0, 0.0)
        } else {
            let total = total_samples as f64;
            (self.accumulated_samples as f64 / total, new_samples as f64 / total)
        };

        // Clears the frame when nothing has been counted yet, including the
        // leftovers of an aborted first pass.
        self.xyz_frame.scale(previous_weight as Float);
        if self.accumulated_samples == 0 {
            self.frame.clear();
        }

        PassWeights { added_weight: added_weight as Float, total_samples }
    }

    /// Fold one pixel contribution of the open pass.
    pub fn add_sample(&mut self, pass: &PassWeights, pixel: (usize, usize), xyz: &Vector3f) {
        let cell = &mut self.xyz_frame[pixel];
        *cell += xyz * pass.added_weight;
        self.frame[pixel] = ciexyz_to_srgb(cell);
    }

    pub fn finish_pass(&mut self, pass: PassWeights) {
        self.accumulated_samples = pass.total_samples;
    }
}
