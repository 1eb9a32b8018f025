// Copyright @yucwang 2026

//! Worker-pool sampling.
//!
//! Every spectral channel gets a fresh pool: one producer thread enqueues all
//! pixel coordinates, `worker_count` workers sample them and the calling
//! thread acts as the coordinator, the only context that touches the frame.
//! Shutdown sentinels are sent only after the coordinator has received a
//! result for every pixel of the channel, one per worker.

use crate::core::channel::SpectralChannel;
use crate::core::error::{ObserveError, ObserveResult};
use crate::core::rng::LcgRng;
use crate::core::sensor::PixelCoord;
use crate::math::colour::{spectrum_to_ciexyz, ResampledCieXyz};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use super::renderer::{Coordinator, PassJob, SampleResult, SamplingEngine};

enum Task {
    Pixel(PixelCoord),
    Shutdown,
}

enum WorkerMessage {
    Sampled(SampleResult),
    Failed { pixel: PixelCoord, error: ObserveError },
}

pub struct ParallelEngine {
    worker_count: usize,
}

impl ParallelEngine {
    pub fn new(worker_count: usize) -> Self {
        debug_assert!(worker_count >= 1, "worker count must be at least 1");
        Self { worker_count }
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    fn sample_channel(&self,
                      job: &PassJob,
                      i_channel: usize,
                      channel: &SpectralChannel,
                      coordinator: &mut Coordinator) -> ObserveResult<()> {
        let resampled_xyz = channel.resample_ciexyz();
        let total_pixels = job.pixel_count();
        let (task_tx, task_rx) = unbounded::<Task>();
        let (result_tx, result_rx) = unbounded::<WorkerMessage>();

        thread::scope(|scope| {
            let producer = {
                let task_tx = task_tx.clone();
                let (width, height) = (job.width, job.height);
                scope.spawn(move || {
                    for y in 0..height {
                        for x in 0..width {
                            if task_tx.send(Task::Pixel((x, y))).is_err() {
                                return;
                            }
                        }
                    }
                })
            };

            let workers: Vec<_> = (0..self.worker_count)
                .map(|index| {
                    let tasks = task_rx.clone();
                    let results = result_tx.clone();
                    let rng = LcgRng::stream(job.seed, (i_channel * self.worker_count + index) as u64);
                    let resampled_xyz = &resampled_xyz;
                    scope.spawn(move || run_worker(index, job, channel, resampled_xyz, rng, tasks, results))
                })
                .collect();
            drop(result_tx);

            let mut failure: Option<ObserveError> = None;
            for completed in 0..total_pixels {
                match result_rx.recv() {
                    Ok(WorkerMessage::Sampled(result)) => coordinator.fold(i_channel, completed, result),
                    Ok(WorkerMessage::Failed { pixel, error }) => {
                        log::warn!("sampling pixel ({}, {}) failed, stopping {} workers: {}",
                                   pixel.0, pixel.1, self.worker_count, error);
                        failure = Some(error);
                        break;
                    }
                    Err(_) => {
                        failure = Some(ObserveError::SamplingFailure(
                            String::from("all workers exited before the channel was complete")));
                        break;
                    }
                }
            }

            if producer.join().is_err() && failure.is_none() {
                failure = Some(ObserveError::SamplingFailure(String::from("task producer panicked")));
            }
            if failure.is_some() {
                let discarded = task_rx.try_iter().count();
                log::debug!("discarded {} queued pixels of channel {}", discarded, i_channel + 1);
            }

            for _ in 0..self.worker_count {
                let _ = task_tx.send(Task::Shutdown);
            }

            let mut processed = 0usize;
            for handle in workers {
                match handle.join() {
                    Ok(count) => processed += count,
                    Err(_) => {
                        if failure.is_none() {
                            failure = Some(ObserveError::SamplingFailure(String::from("sampling worker panicked")));
                        }
                    }
                }
            }
            log::debug!("channel {}: {} workers sampled {} pixels", i_channel + 1, self.worker_count, processed);

            match failure {
                Some(error) => Err(error),
                None => Ok(()),
            }
        })
    }
}

impl SamplingEngine for ParallelEngine {
    fn sample_pass(&self, job: &PassJob, coordinator: &mut Coordinator) -> ObserveResult<()> {
        for (i_channel, channel) in job.channels.iter().enumerate() {
            self.sample_channel(job, i_channel, channel, coordinator)?;
        }
        Ok(())
    }

    fn describe(&self) -> String {
        format!("ParallelEngine: {} workers", self.worker_count)
    }
}

fn run_worker(index: usize,
              job: &PassJob,
              channel: &SpectralChannel,
              resampled_xyz: &ResampledCieXyz,
              mut rng: LcgRng,
              tasks: Receiver<Task>,
              results: Sender<WorkerMessage>) -> usize {
    let mut processed = 0usize;

    while let Ok(task) = tasks.recv() {
        let pixel = match task {
            Task::Pixel(pixel) => pixel,
            Task::Shutdown => break,
        };

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            job.sensor.sample_pixel(pixel, channel, &job.settings, job.world, &mut rng)
        }));
        let message = match outcome {
            Ok(Ok(sample)) => WorkerMessage::Sampled(SampleResult {
                pixel,
                xyz: spectrum_to_ciexyz(&sample.spectrum, resampled_xyz),
                ray_count: sample.ray_count,
            }),
            Ok(Err(error)) => WorkerMessage::Failed { pixel, error },
            Err(_) => WorkerMessage::Failed {
                pixel,
                error: ObserveError::SamplingFailure(format!("sampler panicked on pixel ({}, {})", pixel.0, pixel.1)),
            },
        };

        processed += 1;
        if results.send(message).is_err() {
            break;
        }
    }

    log::debug!("worker {} exiting after {} pixels", index, processed);
    processed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::accumulator::ProgressiveAccumulator;
    use crate::core::channel::plan_channels;
    use crate::core::sensor::PixelSettings;
    use crate::core::statistics::ProgressReporter;
    use crate::renderers::sequential::SequentialEngine;
    use crate::test_stubs::{EmptyWorld, RecordingSensor};
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    fn run_engine(engine: &dyn SamplingEngine,
                  sensor: &RecordingSensor,
                  width: usize,
                  height: usize,
                  channel_count: usize) -> (ObserveResult<()>, ProgressiveAccumulator, usize) {
        let world = EmptyWorld;
        let channels = plan_channels(400.0, 700.0, channel_count, 4).unwrap();
        let job = PassJob {
            sensor,
            world: &world,
            channels: &channels,
            settings: PixelSettings { pixel_samples: 1, sensitivity: 1.0 },
            width,
            height,
            seed: 3,
        };

        let mut accumulator = ProgressiveAccumulator::new(width, height);
        let mut reporter = ProgressReporter::start(width, height, channel_count, Duration::from_secs(3600), None, false);
        let weights = accumulator.begin_pass(channel_count as u64);
        let result = {
            let mut coordinator = Coordinator::new(&mut accumulator, &weights, &mut reporter, None);
            engine.sample_pass(&job, &mut coordinator)
        };
        if result.is_ok() {
            accumulator.finish_pass(weights);
        }
        let pixels = reporter.finish().pixels_sampled;
        (result, accumulator, pixels)
    }

    #[test]
    fn test_every_pixel_sampled_once_per_channel() {
        for workers in [1usize, 2, 5] {
            let sensor = RecordingSensor::new();
            let (result, _, pixels) = run_engine(&ParallelEngine::new(workers), &sensor, 4, 3, 2);
            assert!(result.is_ok());
            assert_eq!(pixels, 24);

            let calls = sensor.calls();
            assert_eq!(calls.len(), 24);
            let mut by_channel: HashMap<usize, HashSet<PixelCoord>> = HashMap::new();
            for (channel, pixel) in calls {
                by_channel.entry(channel).or_default().insert(pixel);
            }
            assert_eq!(by_channel.len(), 2);
            assert!(by_channel.values().all(|seen| seen.len() == 12));
        }
    }

    #[test]
    fn test_more_workers_than_pixels_shuts_down() {
        let sensor = RecordingSensor::new();
        let (result, _, pixels) = run_engine(&ParallelEngine::new(16), &sensor, 2, 2, 1);
        assert!(result.is_ok());
        assert_eq!(pixels, 4);
        assert_eq!(sensor.calls().len(), 4);
    }

    #[test]
    fn test_matches_sequential_engine() {
        let sequential = RecordingSensor::new();
        let (seq_result, seq_acc, _) = run_engine(&SequentialEngine, &sequential, 5, 4, 3);
        let parallel = RecordingSensor::new();
        let (par_result, par_acc, _) = run_engine(&ParallelEngine::new(3), &parallel, 5, 4, 3);
        assert!(seq_result.is_ok() && par_result.is_ok());

        for y in 0..4 {
            for x in 0..5 {
                let a = seq_acc.xyz_frame()[(x, y)];
                let b = par_acc.xyz_frame()[(x, y)];
                assert!((a - b).norm() < 1e-5, "pixel ({}, {}) differs: {:?} vs {:?}", x, y, a, b);
                assert_eq!(seq_acc.frame()[(x, y)], par_acc.frame()[(x, y)]);
            }
        }
    }

    #[test]
    fn test_worker_failure_propagates() {
        for workers in [1usize, 2, 8] {
            let sensor = RecordingSensor::failing_at((1, 1));
            let (result, acc, _) = run_engine(&ParallelEngine::new(workers), &sensor, 3, 3, 2);
            match result {
                Err(ObserveError::SamplingFailure(msg)) => assert!(msg.contains("(1, 1)")),
                other => panic!("unexpected result: {:?}", other),
            }
            assert_eq!(acc.accumulated_samples(), 0);
            // The second channel (starting at 550nm) is never started.
            assert!(sensor.calls().iter().all(|(c, _)| *c == 400));
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "worker count must be at least 1")]
    fn test_zero_workers_is_not_clamped() {
        let _ = ParallelEngine::new(0);
    }

    #[test]
    fn test_worker_panic_is_reported() {
        let sensor = RecordingSensor::panicking_at((0, 1));
        let (result, _, _) = run_engine(&ParallelEngine::new(2), &sensor, 2, 2, 1);
        assert!(matches!(result, Err(ObserveError::SamplingFailure(_))));
    }

    #[test]
    fn test_sequential_failure_aborts_immediately() {
        let sensor = RecordingSensor::failing_at((1, 0));
        let (result, _, pixels) = run_engine(&SequentialEngine, &sensor, 3, 2, 1);
        assert!(matches!(result, Err(ObserveError::SamplingFailure(_))));
        assert_eq!(pixels, 1);
        assert_eq!(sensor.calls().len(), 2);
    }
}
