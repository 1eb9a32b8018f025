// Copyright @yucwang 2026

use crate::core::channel::SpectralChannel;
use crate::core::error::{ObserveError, ObserveResult};
use crate::core::rng::LcgRng;
use crate::core::world::World;
use crate::math::constants::Float;
use crate::math::spectrum::SampledSpectrum;

pub type PixelCoord = (usize, usize);

/// Camera-wide parameters every pixel sample depends on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelSettings {
    pub pixel_samples: u32,
    pub sensitivity: Float,
}

#[derive(Clone, Debug)]
pub struct PixelSample {
    pub spectrum: SampledSpectrum,
    /// Rays traced to produce the sample. Only used for statistics.
    pub ray_count: u64,
}

/// Per-variant pixel geometry and sampling of a camera.
///
/// `sample_pixel` is called concurrently from sampling workers; it must not
/// rely on any mutable state other than the `rng` it is handed.
pub trait Sensor: Sync {
    /// Recompute per-pixel sampling geometry. Runs before every pass.
    fn rebuild_pixels(&mut self, _width: usize, _height: usize) -> ObserveResult<()> {
        Err(ObserveError::NotImplemented("rebuild_pixels"))
    }

    fn sample_pixel(&self,
                    pixel: PixelCoord,
                    channel: &SpectralChannel,
                    settings: &PixelSettings,
                    world: &dyn World,
                    rng: &mut LcgRng) -> ObserveResult<PixelSample>;

    fn describe(&self) -> String {
        String::from("Sensor")
    }
}
