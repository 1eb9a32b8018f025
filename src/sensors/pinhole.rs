// Copyright @yucwang 2026

use crate::core::channel::SpectralChannel;
use crate::core::error::{invalid, ObserveError, ObserveResult};
use crate::core::rng::LcgRng;
use crate::core::sensor::{PixelCoord, PixelSample, PixelSettings, Sensor};
use crate::core::world::World;
use crate::math::constants::{Float, Vector3f, EPSILON};
use crate::math::ray::Ray3f;

/// Image plane layout, rebuilt before every pass.
#[derive(Clone, Copy, Debug, PartialEq)]
struct PixelGeometry {
    image_delta: Float,
    image_start_x: Float,
    image_start_y: Float,
}

/// Pinhole camera with an image plane one unit in front of the aperture.
pub struct PinholeCamera {
    origin: Vector3f,
    forward: Vector3f,
    right: Vector3f,
    up: Vector3f,
    fov: Float,
    sub_sample: bool,
    geometry: Option<PixelGeometry>,
}

impl PinholeCamera {
    /// `fov` is the full field of view across the larger image dimension, in degrees.
    pub fn new(origin: Vector3f, target: Vector3f, up: Vector3f, fov: Float) -> ObserveResult<Self> {
        let forward = target - origin;
        if forward.norm() <= EPSILON {
            return invalid("camera origin and target coincide");
        }
        let forward = forward.normalize();
        let right = forward.cross(&up);
        if right.norm() <= EPSILON {
            return invalid("camera up vector is parallel to the view direction");
        }
        let right = right.normalize();
        let up = right.cross(&forward).normalize();

        let mut camera = Self {
            origin,
            forward,
            right,
            up,
            fov: 45.0,
            sub_sample: false,
            geometry: None,
        };
        camera.set_fov(fov)?;
        Ok(camera)
    }

    pub fn fov(&self) -> Float {
        self.fov
    }

    pub fn set_fov(&mut self, fov: Float) -> ObserveResult<()> {
        if !(fov > 0.0) {
            return invalid("field of view angle can not be less than or equal to 0 degrees");
        }
        if !(fov < 180.0) {
            return invalid("field of view angle must be less than 180 degrees");
        }
        self.fov = fov;
        Ok(())
    }

    pub fn sub_sample(&self) -> bool {
        self.sub_sample
    }

    /// Jitter rays across the pixel footprint instead of using its centre.
    pub fn set_sub_sample(&mut self, sub_sample: bool) {
        self.sub_sample = sub_sample;
    }

    fn pixel_ray(&self, geometry: &PixelGeometry, pixel: PixelCoord, u: Float, v: Float) -> Ray3f {
        let px = -geometry.image_start_x + geometry.image_delta * (pixel.0 as Float + u);
        let py = geometry.image_start_y - geometry.image_delta * (pixel.1 as Float + v);
        let dir = self.forward + self.right * px + self.up * py;
        Ray3f::new(self.origin, dir)
    }
}

impl Sensor for PinholeCamera {
    fn rebuild_pixels(&mut self, width: usize, height: usize) -> ObserveResult<()> {
        let max_pixels = width.max(height);
        let geometry = if max_pixels > 1 {
            // Image plane one unit from the aperture.
            let image_max_width = 2.0 * (0.5 * self.fov).to_radians().tan();
            let image_delta = image_max_width / (max_pixels - 1) as Float;
            PixelGeometry {
                image_delta,
                image_start_x: 0.5 * width as Float * image_delta,
                image_start_y: 0.5 * height as Float * image_delta,
            }
        } else {
            // Single ray on axis.
            PixelGeometry { image_delta: 0.0, image_start_x: 0.0, image_start_y: 0.0 }
        };
        self.geometry = Some(geometry);
        Ok(())
    }

    fn sample_pixel(&self,
                    pixel: PixelCoord,
                    channel: &SpectralChannel,
                    settings: &PixelSettings,
                    world: &dyn World,
                    rng: &mut LcgRng) -> ObserveResult<PixelSample> {
        let geometry = self.geometry.as_ref().ok_or_else(|| {
            ObserveError::SamplingFailure(String::from("pinhole pixel geometry has not been built"))
        })?;

        let mut spectrum = channel.new_spectrum();
        let mut sample = channel.new_spectrum();
        let mut ray_count = 0u64;

        for _ in 0..settings.pixel_samples {
            let (u, v) = if self.sub_sample {
                (rng.next_f32(), rng.next_f32())
            } else {
                (0.5, 0.5)
            };
            let ray = self.pixel_ray(geometry, pixel, u, v);
            sample.fill(0.0);
            ray_count += world.trace(&ray, &mut sample, rng)?;
            spectrum.accumulate(&sample);
        }

        spectrum.scale(settings.sensitivity / settings.pixel_samples.max(1) as Float);
        Ok(PixelSample { spectrum, ray_count })
    }

    fn describe(&self) -> String {
        format!("PinholeCamera\n  origin: {:?}\n  forward: {:?}\n  fov: {}\n  sub_sample: {}",
                self.origin, self.forward, self.fov, self.sub_sample)
    }
}
