// Copyright @yucwang 2026

use crate::core::accumulator::ProgressiveAccumulator;
use crate::core::channel::plan_channels;
use crate::core::config::CameraConfig;
use crate::core::error::{invalid, ObserveError, ObserveResult};
use crate::core::sensor::{PixelSettings, Sensor};
use crate::core::statistics::{ObserveStatistics, ProgressReporter};
use crate::core::world::World;
use crate::io::exr_utils::write_xyz_frame;
use crate::io::png_utils::write_display_frame;
use crate::io::preview::PreviewSink;
use crate::math::bitmap::Bitmap;
use crate::renderers::parallel::ParallelEngine;
use crate::renderers::renderer::{Coordinator, PassJob, SamplingEngine};
use crate::renderers::sequential::SequentialEngine;
use std::path::Path;
use std::sync::Arc;

/// Progressive spectral camera. Each `observe` call samples every pixel of
/// every spectral channel once and folds the result into the frame.
pub struct Camera<S: Sensor> {
    sensor: S,
    config: CameraConfig,
    world: Option<Arc<dyn World>>,
    accumulator: ProgressiveAccumulator,
    preview: Option<Box<dyn PreviewSink>>,
}

impl<S: Sensor> Camera<S> {
    pub fn new(pixels: (usize, usize), config: CameraConfig, sensor: S) -> ObserveResult<Self> {
        check_pixels(pixels)?;
        Ok(Self {
            sensor,
            config,
            world: None,
            accumulator: ProgressiveAccumulator::new(pixels.0, pixels.1),
            preview: None,
        })
    }

    pub fn pixels(&self) -> (usize, usize) {
        (self.accumulator.width(), self.accumulator.height())
    }

    /// Change the image dimensions. Discards the accumulated frame.
    pub fn set_pixels(&mut self, pixels: (usize, usize)) -> ObserveResult<()> {
        check_pixels(pixels)?;
        if pixels != self.pixels() {
            self.accumulator = ProgressiveAccumulator::new(pixels.0, pixels.1);
        }
        Ok(())
    }

    pub fn config(&self) -> &CameraConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CameraConfig {
        &mut self.config
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub fn attach(&mut self, world: Arc<dyn World>) {
        self.world = Some(world);
    }

    pub fn detach(&mut self) -> Option<Arc<dyn World>> {
        self.world.take()
    }

    pub fn set_preview(&mut self, preview: Option<Box<dyn PreviewSink>>) {
        self.preview = preview;
    }

    pub fn accumulated_samples(&self) -> u64 {
        self.accumulator.accumulated_samples()
    }

    /// Tristimulus (CIE XYZ) frame.
    pub fn xyz_frame(&self) -> &Bitmap {
        self.accumulator.xyz_frame()
    }

    /// Display (sRGB) frame.
    pub fn frame(&self) -> &Bitmap {
        self.accumulator.frame()
    }

    /// Run one sampling pass over all spectral channels.
    ///
    /// An error part way through leaves the frame attenuated but not fully
    /// refilled and does not count the pass. Callers needing atomic passes
    /// must snapshot the frame themselves.
    pub fn observe(&mut self) -> ObserveResult<ObserveStatistics> {
        let world = self.world.clone().ok_or(ObserveError::NotConnected)?;

        if !self.config.accumulate() {
            self.accumulator.reset();
        }

        let channels = plan_channels(self.config.min_wavelength(),
                                     self.config.max_wavelength(),
                                     self.config.spectral_rays(),
                                     self.config.spectral_samples())?;

        let (width, height) = self.pixels();
        self.sensor.rebuild_pixels(width, height)?;

        let engine: Box<dyn SamplingEngine> = if self.config.worker_count() == 1 {
            Box::new(SequentialEngine)
        } else {
            Box::new(ParallelEngine::new(self.config.worker_count()))
        };
        let seed = self.config.seed().unwrap_or_else(rand::random);
        log::info!("Observing {} with {}: {}x{} pixels, {} channels, {} samples per pixel, seed {}.",
                   world.describe(), engine.describe(), width, height,
                   channels.len(), self.config.pixel_samples(), seed);

        let job = PassJob {
            sensor: &self.sensor,
            world: world.as_ref(),
            channels: &channels,
            settings: PixelSettings {
                pixel_samples: self.config.pixel_samples(),
                sensitivity: self.config.sensitivity(),
            },
            width,
            height,
            seed,
        };

        let display = self.config.display_progress();
        let mut reporter = ProgressReporter::start(width, height, channels.len(),
                                                   self.config.progress_interval(),
                                                   Some(self.config.display_update_time()),
                                                   display);
        let preview = if display { self.preview.as_deref() } else { None };
        let weights = self.accumulator.begin_pass(self.config.pass_samples());

        let outcome = {
            let mut coordinator = Coordinator::new(&mut self.accumulator, &weights, &mut reporter, preview);
            coordinator.refresh_preview();
            let outcome = engine.sample_pass(&job, &mut coordinator);
            coordinator.refresh_preview();
            outcome
        };

        if let Err(e) = outcome {
            reporter.abandon();
            return Err(e);
        }
        self.accumulator.finish_pass(weights);
        Ok(reporter.finish())
    }

    /// Push the current display frame to the preview sink, if any.
    pub fn display(&self) -> ObserveResult<()> {
        match &self.preview {
            Some(preview) => preview.refresh(self.frame()),
            None => Ok(()),
        }
    }

    /// Save the frame. `.exr` stores linear colour, any other format the
    /// image encoder supports stores the 8-bit display frame.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> ObserveResult<()> {
        let path = path.as_ref();
        let extension = path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if extension == "exr" {
            write_xyz_frame(self.xyz_frame(), &path.to_string_lossy())
        } else if image::ImageFormat::from_extension(&extension).is_some() {
            write_display_frame(self.frame(), path)
        } else {
            invalid(format!("unsupported image format: {}", path.display()))
        }
    }
}

fn check_pixels(pixels: (usize, usize)) -> ObserveResult<()> {
    if pixels.0 < 1 || pixels.1 < 1 {
        return invalid(format!("image dimensions must be positive, got {}x{}", pixels.0, pixels.1));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::colour::{resample_ciexyz, spectrum_to_ciexyz};
    use crate::math::constants::Vector3f;
    use crate::math::spectrum::SampledSpectrum;
    use crate::test_stubs::{EmptyWorld, GeometrylessSensor, RecordingSensor};
    use std::collections::HashSet;

    fn quiet_config(channels: usize, pixel_samples: u32, workers: usize, accumulate: bool) -> CameraConfig {
        let mut config = CameraConfig::new(1.0, 4, channels, pixel_samples, workers, accumulate).unwrap();
        config.set_display_progress(false);
        config.set_seed(Some(11));
        config
    }

    fn camera(sensor: RecordingSensor, config: CameraConfig) -> Camera<RecordingSensor> {
        let mut camera = Camera::new((2, 2), config, sensor).unwrap();
        camera.attach(Arc::new(EmptyWorld));
        camera
    }

    fn expected_xyz(value: f32, config: &CameraConfig) -> Vector3f {
        let resampled = resample_ciexyz(config.min_wavelength(), config.max_wavelength(), 4);
        let mut s = SampledSpectrum::new(config.min_wavelength(), config.max_wavelength(), 4);
        s.fill(value);
        spectrum_to_ciexyz(&s, &resampled)
    }

    #[test]
    fn test_observe_requires_world() {
        let mut camera = Camera::new((2, 2), quiet_config(1, 1, 1, false), RecordingSensor::new()).unwrap();
        assert!(matches!(camera.observe(), Err(ObserveError::NotConnected)));
        assert!(camera.sensor().calls().is_empty());
        assert_eq!(camera.sensor().rebuilds(), 0);

        camera.attach(Arc::new(EmptyWorld));
        assert!(camera.observe().is_ok());
        assert!(camera.detach().is_some());
        assert!(matches!(camera.observe(), Err(ObserveError::NotConnected)));
    }

    #[test]
    fn test_missing_geometry_hook_is_not_implemented() {
        let mut camera = Camera::new((2, 2), quiet_config(1, 1, 1, false), GeometrylessSensor).unwrap();
        camera.attach(Arc::new(EmptyWorld));
        assert!(matches!(camera.observe(), Err(ObserveError::NotImplemented(_))));
        assert_eq!(camera.accumulated_samples(), 0);
    }

    #[test]
    fn test_rejects_empty_image() {
        assert!(Camera::new((0, 2), quiet_config(1, 1, 1, false), RecordingSensor::new()).is_err());
        let mut camera = camera(RecordingSensor::new(), quiet_config(1, 1, 1, false));
        assert!(camera.set_pixels((3, 0)).is_err());
        assert_eq!(camera.pixels(), (2, 2));
    }

    #[test]
    fn test_two_by_two_constant_scene() {
        for workers in [1usize, 2] {
            let config = quiet_config(1, 1, workers, true);
            let expected = expected_xyz(0.5, &config);
            let mut camera = camera(RecordingSensor::constant(0.5), config);

            let stats = camera.observe().unwrap();
            assert_eq!(camera.accumulated_samples(), 1);
            assert_eq!(stats.rays, 40);
            assert_eq!(stats.pixels_sampled, 4);
            for y in 0..2 {
                for x in 0..2 {
                    assert!((camera.xyz_frame()[(x, y)] - expected).norm() < 1e-6);
                }
            }

            camera.observe().unwrap();
            assert_eq!(camera.accumulated_samples(), 2);
            for y in 0..2 {
                for x in 0..2 {
                    assert!((camera.xyz_frame()[(x, y)] - expected).norm() < 1e-6);
                }
            }
            assert_eq!(camera.sensor().rebuilds(), 2);
        }
    }

    #[test]
    fn test_weighted_mean_across_observe_calls() {
        let config = quiet_config(1, 2, 1, true);
        let mut camera = camera(RecordingSensor::constant(1.0), config);
        camera.observe().unwrap();

        *camera.sensor_mut() = RecordingSensor::constant(4.0);
        camera.config_mut().set_pixel_samples(6).unwrap();
        camera.observe().unwrap();

        assert_eq!(camera.accumulated_samples(), 8);
        let expected = (expected_xyz(1.0, camera.config()) * 2.0 + expected_xyz(4.0, camera.config()) * 6.0) / 8.0;
        assert!((camera.xyz_frame()[(1, 1)] - expected).norm() < 1e-5);
    }

    #[test]
    fn test_disabling_accumulation_resets() {
        let mut camera = camera(RecordingSensor::constant(3.0), quiet_config(1, 1, 2, true));
        camera.observe().unwrap();
        camera.observe().unwrap();

        *camera.sensor_mut() = RecordingSensor::constant(1.0);
        camera.config_mut().set_accumulate(false);
        camera.observe().unwrap();

        assert_eq!(camera.accumulated_samples(), 1);
        let expected = expected_xyz(1.0, camera.config());
        assert!((camera.xyz_frame()[(0, 1)] - expected).norm() < 1e-6);
    }

    #[test]
    fn test_channel_contributions_are_summed() {
        // Three channels of a flat spectrum reconstruct the full-band value,
        // and the pass counts three sample units per pixel sample.
        let config = quiet_config(3, 1, 1, false);
        let mut camera = camera(RecordingSensor::constant(1.0), config);
        camera.observe().unwrap();
        assert_eq!(camera.accumulated_samples(), 3);

        let mut expected = Vector3f::zeros();
        let plan = plan_channels(camera.config().min_wavelength(), camera.config().max_wavelength(), 3, 4).unwrap();
        for channel in &plan {
            let mut s = channel.new_spectrum();
            s.fill(1.0);
            expected += spectrum_to_ciexyz(&s, &channel.resample_ciexyz());
        }
        assert!((camera.xyz_frame()[(0, 0)] - expected).norm() < 1e-5);
    }

    #[test]
    fn test_engines_agree() {
        let mut sequential = camera(RecordingSensor::new(), quiet_config(2, 1, 1, false));
        let mut parallel = camera(RecordingSensor::new(), quiet_config(2, 1, 4, false));
        sequential.set_pixels((5, 3)).unwrap();
        parallel.set_pixels((5, 3)).unwrap();
        sequential.observe().unwrap();
        parallel.observe().unwrap();

        for y in 0..3 {
            for x in 0..5 {
                assert!((sequential.xyz_frame()[(x, y)] - parallel.xyz_frame()[(x, y)]).norm() < 1e-5);
            }
        }
        assert_eq!(sequential.frame(), parallel.frame());
    }

    #[test]
    fn test_every_pixel_sampled_once() {
        for workers in [1usize, 2, 9] {
            let mut camera = camera(RecordingSensor::new(), quiet_config(1, 1, workers, false));
            camera.observe().unwrap();
            let calls = camera.sensor().calls();
            let unique: HashSet<_> = calls.iter().cloned().collect();
            assert_eq!(calls.len(), 4);
            assert_eq!(unique.len(), 4);
        }
    }

    #[test]
    fn test_failed_pass_is_not_counted() {
        let mut camera = camera(RecordingSensor::constant(2.0), quiet_config(1, 1, 2, true));
        camera.observe().unwrap();
        let before = camera.xyz_frame()[(0, 0)];

        *camera.sensor_mut() = RecordingSensor::failing_at((1, 1));
        assert!(matches!(camera.observe(), Err(ObserveError::SamplingFailure(_))));
        assert_eq!(camera.accumulated_samples(), 1);
        // The frame was attenuated for the aborted pass; untouched pixels show it.
        let after = camera.xyz_frame()[(1, 1)];
        assert!((after - before * 0.5).norm() < 1e-6);
    }

    #[test]
    fn test_failed_first_pass_leaves_no_residue() {
        for workers in [1usize, 2] {
            let config = quiet_config(1, 1, workers, true);
            let expected = expected_xyz(1.0, &config);
            let mut camera = camera(RecordingSensor::failing_at((1, 1)), config);
            assert!(camera.observe().is_err());
            assert_eq!(camera.accumulated_samples(), 0);

            *camera.sensor_mut() = RecordingSensor::constant(1.0);
            camera.observe().unwrap();
            assert_eq!(camera.accumulated_samples(), 1);
            for y in 0..2 {
                for x in 0..2 {
                    assert!((camera.xyz_frame()[(x, y)] - expected).norm() < 1e-5,
                            "workers {}: pixel ({}, {}) kept data from the failed pass", workers, x, y);
                }
            }
        }
    }

    #[test]
    fn test_resizing_discards_frame() {
        let mut camera = camera(RecordingSensor::constant(1.0), quiet_config(1, 1, 1, true));
        camera.observe().unwrap();
        camera.set_pixels((2, 2)).unwrap();
        assert_eq!(camera.accumulated_samples(), 1);
        camera.set_pixels((3, 1)).unwrap();
        assert_eq!(camera.accumulated_samples(), 0);
        assert_eq!(camera.frame().width(), 3);
    }

    #[test]
    fn test_save_formats() {
        let mut camera = camera(RecordingSensor::constant(1.0), quiet_config(1, 1, 1, false));
        camera.observe().unwrap();
        let dir = std::env::temp_dir();
        let png = dir.join(format!("spectral_camera_save_{}.png", std::process::id()));
        camera.save(&png).unwrap();
        assert!(png.exists());
        let _ = std::fs::remove_file(&png);

        let bogus = dir.join("spectral_camera_save.unknown");
        assert!(matches!(camera.save(&bogus), Err(ObserveError::InvalidConfiguration(_))));
    }
}
