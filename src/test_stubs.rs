// Copyright @yucwang 2026

//! Deterministic sensors and worlds shared by the unit tests.

use crate::core::channel::SpectralChannel;
use crate::core::error::{ObserveError, ObserveResult};
use crate::core::rng::LcgRng;
use crate::core::sensor::{PixelCoord, PixelSample, PixelSettings, Sensor};
use crate::core::world::World;
use crate::math::ray::Ray3f;
use crate::math::spectrum::SampledSpectrum;
use std::sync::Mutex;

pub struct EmptyWorld;

impl World for EmptyWorld {
    fn trace(&self, _ray: &Ray3f, spectrum: &mut SampledSpectrum, _rng: &mut LcgRng) -> ObserveResult<u64> {
        spectrum.fill(0.0);
        Ok(1)
    }
}

/// Returns a spectrum that depends only on the pixel and channel, and records
/// every `(channel start wavelength, pixel)` it is asked for.
pub struct RecordingSensor {
    calls: Mutex<Vec<(usize, PixelCoord)>>,
    fail_at: Option<PixelCoord>,
    panic_at: Option<PixelCoord>,
    constant: Option<f32>,
    rebuilds: usize,
}

impl RecordingSensor {
    pub fn new() -> Self {
        Self { calls: Mutex::new(Vec::new()), fail_at: None, panic_at: None, constant: None, rebuilds: 0 }
    }

    /// Every pixel of every channel returns a flat spectrum of `value`.
    pub fn constant(value: f32) -> Self {
        Self { constant: Some(value), ..Self::new() }
    }

    pub fn failing_at(pixel: PixelCoord) -> Self {
        Self { fail_at: Some(pixel), ..Self::new() }
    }

    pub fn panicking_at(pixel: PixelCoord) -> Self {
        Self { panic_at: Some(pixel), ..Self::new() }
    }

    pub fn calls(&self) -> Vec<(usize, PixelCoord)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn rebuilds(&self) -> usize {
        self.rebuilds
    }
}

impl Sensor for RecordingSensor {
    fn rebuild_pixels(&mut self, _width: usize, _height: usize) -> ObserveResult<()> {
        self.rebuilds += 1;
        Ok(())
    }

    fn sample_pixel(&self,
                    pixel: PixelCoord,
                    channel: &SpectralChannel,
                    _settings: &PixelSettings,
                    _world: &dyn World,
                    _rng: &mut LcgRng) -> ObserveResult<PixelSample> {
        self.calls.lock().unwrap().push((channel.min_wavelength.round() as usize, pixel));
        if self.fail_at == Some(pixel) {
            return Err(ObserveError::SamplingFailure(format!("stub failure at ({}, {})", pixel.0, pixel.1)));
        }
        if self.panic_at == Some(pixel) {
            panic!("stub panic at ({}, {})", pixel.0, pixel.1);
        }

        let mut spectrum = channel.new_spectrum();
        match self.constant {
            Some(value) => spectrum.fill(value),
            None => {
                let base = 1.0 + pixel.0 as f32 + 10.0 * pixel.1 as f32;
                for (i, s) in spectrum.samples_mut().iter_mut().enumerate() {
                    *s = base * (1.0 + 0.1 * i as f32) + 0.01 * channel.min_wavelength;
                }
            }
        }
        Ok(PixelSample { spectrum, ray_count: 10 })
    }
}

/// Sensor variant that never supplies its geometry rebuild step.
pub struct GeometrylessSensor;

impl Sensor for GeometrylessSensor {
    fn sample_pixel(&self,
                    _pixel: PixelCoord,
                    channel: &SpectralChannel,
                    _settings: &PixelSettings,
                    _world: &dyn World,
                    _rng: &mut LcgRng) -> ObserveResult<PixelSample> {
        Ok(PixelSample { spectrum: channel.new_spectrum(), ray_count: 0 })
    }
}
