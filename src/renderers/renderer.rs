// Copyright @yucwang 2021

use crate::core::accumulator::{PassWeights, ProgressiveAccumulator};
use crate::core::channel::SpectralChannel;
use crate::core::error::ObserveResult;
use crate::core::sensor::{PixelCoord, PixelSettings, Sensor};
use crate::core::statistics::ProgressReporter;
use crate::core::world::World;
use crate::io::preview::PreviewSink;
use crate::math::constants::Vector3f;

/// Outcome of sampling one pixel of one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct SampleResult {
    pub pixel: PixelCoord,
    pub xyz: Vector3f,
    pub ray_count: u64,
}

/// Read-only inputs of a pass, shared with every sampling context.
pub struct PassJob<'a> {
    pub sensor: &'a dyn Sensor,
    pub world: &'a dyn World,
    pub channels: &'a [SpectralChannel],
    pub settings: PixelSettings,
    pub width: usize,
    pub height: usize,
    pub seed: u64,
}

impl<'a> PassJob<'a> {
    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

/// Sole writer of the frame during a pass. Engines hand every result to it.
pub struct Coordinator<'a> {
    accumulator: &'a mut ProgressiveAccumulator,
    weights: &'a PassWeights,
    reporter: &'a mut ProgressReporter,
    preview: Option<&'a dyn PreviewSink>,
}

impl<'a> Coordinator<'a> {
    pub fn new(accumulator: &'a mut ProgressiveAccumulator,
               weights: &'a PassWeights,
               reporter: &'a mut ProgressReporter,
               preview: Option<&'a dyn PreviewSink>) -> Self {
        Self { accumulator, weights, reporter, preview }
    }

    /// Fold the `completed`-th result of `channel` into the frame.
    pub fn fold(&mut self, channel: usize, completed: usize, result: SampleResult) {
        self.accumulator.add_sample(self.weights, result.pixel, &result.xyz);
        self.reporter.update(channel, completed, result.ray_count);
        if self.reporter.refresh_due() {
            self.refresh_preview();
        }
    }

    pub fn refresh_preview(&self) {
        if let Some(preview) = self.preview {
            log::info!("Refreshing display...");
            if let Err(e) = preview.refresh(self.accumulator.frame()) {
                log::warn!("preview refresh failed: {}", e);
            }
        }
    }
}

pub trait SamplingEngine {
    /// Sample every pixel of every channel of `job` once, folding results
    /// through `coordinator`.
    fn sample_pass(&self, job: &PassJob, coordinator: &mut Coordinator) -> ObserveResult<()>;

    fn describe(&self) -> String;
}
