// Copyright @yucwang 2026

//! Spectrum to tristimulus to display colour conversions.
//!
//! The CIE 1931 matching functions use the multi-lobe Gaussian fit of
//! Wyman, Sloan and Shirley (JCGT 2013), which is within a few percent of the
//! tabulated curves across the visible range.

use super::constants::{Float, Vector3f};
use super::spectrum::SampledSpectrum;

pub const CIE_Y_INTEGRAL: Float = 106.856895;

// Sub-samples per bin when integrating the matching functions.
const BIN_SUBSAMPLES: usize = 8;

fn piecewise_gaussian(lambda: Float, mu: Float, sigma_low: Float, sigma_high: Float) -> Float {
    let sigma = if lambda < mu { sigma_low } else { sigma_high };
    let t = (lambda - mu) / sigma;
    (-0.5 * t * t).exp()
}

pub fn cie_x(lambda: Float) -> Float {
    1.056 * piecewise_gaussian(lambda, 599.8, 37.9, 31.0)
        + 0.362 * piecewise_gaussian(lambda, 442.0, 16.0, 26.7)
        - 0.065 * piecewise_gaussian(lambda, 501.1, 20.4, 26.2)
}

pub fn cie_y(lambda: Float) -> Float {
    0.821 * piecewise_gaussian(lambda, 568.8, 46.9, 40.5)
        + 0.286 * piecewise_gaussian(lambda, 530.9, 16.3, 31.1)
}

pub fn cie_z(lambda: Float) -> Float {
    1.217 * piecewise_gaussian(lambda, 437.0, 11.8, 36.0)
        + 0.681 * piecewise_gaussian(lambda, 459.0, 26.0, 13.8)
}

/// Matching functions integrated over each bin of a wavelength channel.
#[derive(Clone, Debug)]
pub struct ResampledCieXyz {
    weights: Vec<Vector3f>,
}

impl ResampledCieXyz {
    pub fn bins(&self) -> usize {
        self.weights.len()
    }
}

pub fn resample_ciexyz(min_wavelength: Float, max_wavelength: Float, bins: usize) -> ResampledCieXyz {
    let delta = (max_wavelength - min_wavelength) / (bins.max(1) as Float);
    let step = delta / BIN_SUBSAMPLES as Float;

    let weights = (0..bins)
        .map(|bin| {
            let start = min_wavelength + delta * bin as Float;
            let mut w = Vector3f::zeros();
            for k in 0..BIN_SUBSAMPLES {
                let lambda = start + step * (k as Float + 0.5);
                w += Vector3f::new(cie_x(lambda), cie_y(lambda), cie_z(lambda)) * step;
            }
            w / CIE_Y_INTEGRAL
        })
        .collect();

    ResampledCieXyz { weights }
}

pub fn spectrum_to_ciexyz(spectrum: &SampledSpectrum, resampled: &ResampledCieXyz) -> Vector3f {
    debug_assert_eq!(spectrum.bins(), resampled.bins());
    spectrum
        .samples()
        .iter()
        .zip(resampled.weights.iter())
        .fold(Vector3f::zeros(), |acc, (s, w)| acc + w * *s)
}

fn srgb_transfer(v: Float) -> Float {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Linear sRGB (D65) from CIE XYZ, without clamping.
pub fn ciexyz_to_linear_srgb(xyz: &Vector3f) -> Vector3f {
    Vector3f::new(
        3.2404542 * xyz.x - 1.5371385 * xyz.y - 0.4985314 * xyz.z,
        -0.9692660 * xyz.x + 1.8760108 * xyz.y + 0.0415560 * xyz.z,
        0.0556434 * xyz.x - 0.2040259 * xyz.y + 1.0572252 * xyz.z,
    )
}

/// Display-ready sRGB in `[0, 1]`.
pub fn ciexyz_to_srgb(xyz: &Vector3f) -> Vector3f {
    let linear = ciexyz_to_linear_srgb(xyz);
    linear.map(|c| srgb_transfer(c.max(0.0).min(1.0)))
}
