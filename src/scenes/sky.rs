// Copyright @yucwang 2026

use crate::core::error::{invalid, ObserveResult};
use crate::core::rng::LcgRng;
use crate::core::world::World;
use crate::math::constants::Float;
use crate::math::ray::Ray3f;
use crate::math::spectrum::SampledSpectrum;

const PLANCK: f64 = 6.62607015e-34;
const LIGHT_SPEED: f64 = 2.99792458e8;
const BOLTZMANN: f64 = 1.380649e-23;

/// Blackbody spectral radiance at `wavelength` nm, relative to its value at 560nm.
pub fn relative_blackbody(wavelength: Float, temperature: Float) -> Float {
    let planck = |nm: f64| {
        let lambda = nm * 1e-9;
        let t = temperature as f64;
        2.0 * PLANCK * LIGHT_SPEED * LIGHT_SPEED
            / (lambda.powi(5) * ((PLANCK * LIGHT_SPEED / (lambda * BOLTZMANN * t)).exp() - 1.0))
    };
    (planck(wavelength as f64) / planck(560.0)) as Float
}

/// Open sky over a diffuse ground plane. The sky is a blackbody whose colour
/// temperature moves from the horizon value to the zenith value with elevation
/// (+y is up). Ground hits bounce once towards a cosine-distributed sky
/// direction.
pub struct SkyWorld {
    zenith_temperature: Float,
    horizon_temperature: Float,
    ground_albedo: Float,
    radiance: Float,
}

impl SkyWorld {
    pub fn new(zenith_temperature: Float,
               horizon_temperature: Float,
               ground_albedo: Float,
               radiance: Float) -> ObserveResult<Self> {
        if !(zenith_temperature > 0.0) || !(horizon_temperature > 0.0) {
            return invalid("sky temperatures must be positive");
        }
        if !(0.0..=1.0).contains(&ground_albedo) {
            return invalid(format!("ground albedo {} outside [0, 1]", ground_albedo));
        }
        if !(radiance > 0.0) {
            return invalid("sky radiance must be positive");
        }
        Ok(Self { zenith_temperature, horizon_temperature, ground_albedo, radiance })
    }

    fn sky(&self, elevation: Float, spectrum: &mut SampledSpectrum) {
        let e = elevation.max(0.0).min(1.0);
        let temperature = self.horizon_temperature + (self.zenith_temperature - self.horizon_temperature) * e;
        for i in 0..spectrum.bins() {
            let lambda = spectrum.wavelength(i);
            spectrum.samples_mut()[i] = self.radiance * relative_blackbody(lambda, temperature);
        }
    }
}

impl Default for SkyWorld {
    fn default() -> Self {
        Self {
            zenith_temperature: 12000.0,
            horizon_temperature: 4000.0,
            ground_albedo: 0.3,
            radiance: 1.0,
        }
    }
}

impl World for SkyWorld {
    fn trace(&self, ray: &Ray3f, spectrum: &mut SampledSpectrum, rng: &mut LcgRng) -> ObserveResult<u64> {
        let dir = ray.dir();
        if dir.y >= 0.0 {
            self.sky(dir.y, spectrum);
            return Ok(1);
        }

        // Cosine-weighted bounce off the ground: the elevation of the bounce is
        // the cosine to the ground normal.
        let elevation = rng.next_f32().sqrt();
        self.sky(elevation, spectrum);
        spectrum.scale(self.ground_albedo);
        Ok(2)
    }

    fn describe(&self) -> String {
        format!("SkyWorld: {}K zenith, {}K horizon, albedo {}",
                self.zenith_temperature, self.horizon_temperature, self.ground_albedo)
    }
}
