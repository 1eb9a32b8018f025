// Copyright @yucwang 2026

use crate::core::error::{invalid, ObserveResult};
use crate::math::colour::{resample_ciexyz, ResampledCieXyz};
use crate::math::constants::Float;
use crate::math::spectrum::SampledSpectrum;

/// A wavelength sub-band sampled independently within a pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpectralChannel {
    pub min_wavelength: Float,
    pub max_wavelength: Float,
    pub bins: usize,
}

impl SpectralChannel {
    pub fn width(&self) -> Float {
        self.max_wavelength - self.min_wavelength
    }

    /// Zeroed spectrum with this channel's binning.
    pub fn new_spectrum(&self) -> SampledSpectrum {
        SampledSpectrum::new(self.min_wavelength, self.max_wavelength, self.bins)
    }

    pub fn resample_ciexyz(&self) -> ResampledCieXyz {
        resample_ciexyz(self.min_wavelength, self.max_wavelength, self.bins)
    }
}

/// Split `[min_wavelength, max_wavelength]` into `channel_count` equal,
/// contiguous sub-bands, each carrying `bins` spectral bins.
pub fn plan_channels(min_wavelength: Float,
                     max_wavelength: Float,
                     channel_count: usize,
                     bins: usize) -> ObserveResult<Vec<SpectralChannel>> {
    if channel_count < 1 {
        return invalid("spectral channel count must be at least 1");
    }
    if bins < 1 {
        return invalid("spectral sample count must be at least 1");
    }
    if !(min_wavelength > 0.0) || !(max_wavelength > min_wavelength) {
        return invalid(format!("wavelength range [{}, {}] is empty or negative", min_wavelength, max_wavelength));
    }

    let delta = (max_wavelength - min_wavelength) / channel_count as Float;
    let bound = |index: usize| {
        if index == channel_count {
            max_wavelength
        } else {
            min_wavelength + delta * index as Float
        }
    };

    Ok((0..channel_count)
        .map(|index| SpectralChannel {
            min_wavelength: bound(index),
            max_wavelength: bound(index + 1),
            bins,
        })
        .collect())
}
