// Copyright @yucwang 2021

use crate::core::error::ObserveResult;
use crate::core::rng::LcgRng;
use crate::math::colour::spectrum_to_ciexyz;

use super::renderer::{Coordinator, PassJob, SampleResult, SamplingEngine};

/// Samples on the calling thread in raster order.
pub struct SequentialEngine;

impl SamplingEngine for SequentialEngine {
    fn sample_pass(&self, job: &PassJob, coordinator: &mut Coordinator) -> ObserveResult<()> {
        for (i_channel, channel) in job.channels.iter().enumerate() {
            let resampled_xyz = channel.resample_ciexyz();
            let mut rng = LcgRng::stream(job.seed, i_channel as u64);

            for y in 0..job.height {
                for x in 0..job.width {
                    let sample = job.sensor.sample_pixel((x, y), channel, &job.settings, job.world, &mut rng)?;
                    let xyz = spectrum_to_ciexyz(&sample.spectrum, &resampled_xyz);
                    coordinator.fold(i_channel, x + job.width * y, SampleResult {
                        pixel: (x, y),
                        xyz,
                        ray_count: sample.ray_count,
                    });
                }
            }
        }
        Ok(())
    }

    fn describe(&self) -> String {
        String::from("SequentialEngine")
    }
}
