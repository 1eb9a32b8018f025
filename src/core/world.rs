// Copyright @yucwang 2026

use crate::core::error::ObserveResult;
use crate::core::rng::LcgRng;
use crate::math::ray::Ray3f;
use crate::math::spectrum::SampledSpectrum;

/// The scene a camera observes. Read-only while a pass is running and shared
/// by reference with every sampling worker.
pub trait World: Send + Sync {
    /// Fill `spectrum` with the radiance arriving back along `ray` over the
    /// spectrum's wavelength range. Returns the number of rays traced.
    fn trace(&self, ray: &Ray3f, spectrum: &mut SampledSpectrum, rng: &mut LcgRng) -> ObserveResult<u64>;

    fn describe(&self) -> String {
        String::from("World")
    }
}
