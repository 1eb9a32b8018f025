// Copyright @yucwang 2026

use crate::core::error::{invalid, ObserveResult};
use crate::math::constants::{Float, DEFAULT_MAX_WAVELENGTH, DEFAULT_MIN_WAVELENGTH};
use std::time::Duration;

/// Sampling configuration of a camera. Every setter validates its argument
/// and leaves the configuration untouched on rejection.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    sensitivity: Float,
    spectral_samples: usize,
    spectral_rays: usize,
    pixel_samples: u32,
    worker_count: usize,
    accumulate: bool,
    min_wavelength: Float,
    max_wavelength: Float,
    display_progress: bool,
    display_update_time: Duration,
    progress_interval: Duration,
    seed: Option<u64>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            spectral_samples: 20,
            spectral_rays: 1,
            pixel_samples: 100,
            worker_count: default_worker_count(),
            accumulate: false,
            min_wavelength: DEFAULT_MIN_WAVELENGTH,
            max_wavelength: DEFAULT_MAX_WAVELENGTH,
            display_progress: true,
            display_update_time: Duration::from_secs(10),
            progress_interval: Duration::from_secs(1),
            seed: None,
        }
    }
}

pub fn default_worker_count() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl CameraConfig {
    pub fn new(sensitivity: Float,
               spectral_samples: usize,
               spectral_rays: usize,
               pixel_samples: u32,
               worker_count: usize,
               accumulate: bool) -> ObserveResult<Self> {
        let mut config = Self::default();
        config.set_sensitivity(sensitivity)?;
        config.set_spectral_samples(spectral_samples)?;
        config.set_spectral_rays(spectral_rays)?;
        config.set_pixel_samples(pixel_samples)?;
        config.set_worker_count(worker_count)?;
        config.set_accumulate(accumulate);
        Ok(config)
    }

    pub fn sensitivity(&self) -> Float {
        self.sensitivity
    }

    pub fn set_sensitivity(&mut self, sensitivity: Float) -> ObserveResult<()> {
        if !(sensitivity > 0.0) || !sensitivity.is_finite() {
            return invalid(format!("sensitivity must be positive, got {}", sensitivity));
        }
        self.sensitivity = sensitivity;
        Ok(())
    }

    /// Spectral bins per channel.
    pub fn spectral_samples(&self) -> usize {
        self.spectral_samples
    }

    pub fn set_spectral_samples(&mut self, spectral_samples: usize) -> ObserveResult<()> {
        if spectral_samples < 1 {
            return invalid("spectral sample count must be at least 1");
        }
        self.spectral_samples = spectral_samples;
        Ok(())
    }

    /// Number of spectral channels the wavelength range is split into.
    pub fn spectral_rays(&self) -> usize {
        self.spectral_rays
    }

    pub fn set_spectral_rays(&mut self, spectral_rays: usize) -> ObserveResult<()> {
        if spectral_rays < 1 {
            return invalid("spectral channel count must be at least 1");
        }
        self.spectral_rays = spectral_rays;
        Ok(())
    }

    pub fn pixel_samples(&self) -> u32 {
        self.pixel_samples
    }

    pub fn set_pixel_samples(&mut self, pixel_samples: u32) -> ObserveResult<()> {
        if pixel_samples < 1 {
            return invalid("pixel sample count must be at least 1");
        }
        self.pixel_samples = pixel_samples;
        Ok(())
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn set_worker_count(&mut self, worker_count: usize) -> ObserveResult<()> {
        if worker_count < 1 {
            return invalid("worker count must be at least 1");
        }
        self.worker_count = worker_count;
        Ok(())
    }

    pub fn accumulate(&self) -> bool {
        self.accumulate
    }

    pub fn set_accumulate(&mut self, accumulate: bool) {
        self.accumulate = accumulate;
    }

    pub fn min_wavelength(&self) -> Float {
        self.min_wavelength
    }

    pub fn max_wavelength(&self) -> Float {
        self.max_wavelength
    }

    pub fn set_wavelength_range(&mut self, min_wavelength: Float, max_wavelength: Float) -> ObserveResult<()> {
        if !(min_wavelength > 0.0) || !(max_wavelength > min_wavelength) || !max_wavelength.is_finite() {
            return invalid(format!("wavelength range [{}, {}] is empty or negative", min_wavelength, max_wavelength));
        }
        self.min_wavelength = min_wavelength;
        self.max_wavelength = max_wavelength;
        Ok(())
    }

    pub fn display_progress(&self) -> bool {
        self.display_progress
    }

    pub fn set_display_progress(&mut self, display_progress: bool) {
        self.display_progress = display_progress;
    }

    pub fn display_update_time(&self) -> Duration {
        self.display_update_time
    }

    pub fn set_display_update_time(&mut self, interval: Duration) -> ObserveResult<()> {
        if interval.is_zero() {
            return invalid("display update time must be positive");
        }
        self.display_update_time = interval;
        Ok(())
    }

    pub fn progress_interval(&self) -> Duration {
        self.progress_interval
    }

    pub fn set_progress_interval(&mut self, interval: Duration) -> ObserveResult<()> {
        if interval.is_zero() {
            return invalid("progress interval must be positive");
        }
        self.progress_interval = interval;
        Ok(())
    }

    /// Base seed for pixel sampling. `None` draws a fresh seed every pass.
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn set_seed(&mut self, seed: Option<u64>) {
        self.seed = seed;
    }

    /// Sample units one pass adds to the accumulated image.
    pub fn pass_samples(&self) -> u64 {
        self.pixel_samples as u64 * self.spectral_rays as u64
    }
}
