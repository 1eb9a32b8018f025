// Copyright 2020 @TwoCookingMice

use super::constants::Float;

/// Spectral radiance binned over `[min_wavelength, max_wavelength]` (nm).
#[derive(Clone, Debug, PartialEq)]
pub struct SampledSpectrum {
    min_wavelength: Float,
    max_wavelength: Float,
    samples: Vec<Float>,
}

impl SampledSpectrum {
    pub fn new(min_wavelength: Float, max_wavelength: Float, bins: usize) -> Self {
        Self { min_wavelength, max_wavelength, samples: vec![0.0; bins] }
    }

    pub fn min_wavelength(&self) -> Float {
        self.min_wavelength
    }

    pub fn max_wavelength(&self) -> Float {
        self.max_wavelength
    }

    pub fn bins(&self) -> usize {
        self.samples.len()
    }

    pub fn delta_wavelength(&self) -> Float {
        (self.max_wavelength - self.min_wavelength) / (self.samples.len().max(1) as Float)
    }

    /// Centre wavelength of bin `index`.
    pub fn wavelength(&self, index: usize) -> Float {
        self.min_wavelength + self.delta_wavelength() * (index as Float + 0.5)
    }

    pub fn samples(&self) -> &[Float] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [Float] {
        &mut self.samples
    }

    pub fn fill(&mut self, value: Float) {
        for s in self.samples.iter_mut() {
            *s = value;
        }
    }

    pub fn scale(&mut self, factor: Float) {
        for s in self.samples.iter_mut() {
            *s *= factor;
        }
    }

    /// Bin-wise sum. Both spectra must share the same binning.
    pub fn accumulate(&mut self, other: &SampledSpectrum) {
        debug_assert_eq!(self.samples.len(), other.samples.len());
        for (a, b) in self.samples.iter_mut().zip(other.samples.iter()) {
            *a += *b;
        }
    }
}
