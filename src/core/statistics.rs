// Copyright @yucwang 2026

use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

/// A progress notification, emitted at most once per reporting interval.
#[derive(Clone, Debug, PartialEq)]
pub struct ProgressReport {
    pub completion: f64,
    pub channel: usize,
    pub channel_count: usize,
    pub line: usize,
    pub line_count: usize,
    pub pixel: usize,
    pub pixel_count: usize,
    pub rays: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObserveStatistics {
    pub elapsed: Duration,
    pub rays: u64,
    pub pixels_sampled: usize,
}

/// Tracks timing and ray counts of a pass. Purely observational.
pub struct ProgressReporter {
    width: usize,
    height: usize,
    channel_count: usize,
    total_work: usize,
    rays_since_report: u64,
    total_rays: u64,
    pixels_sampled: usize,
    start_time: Instant,
    last_report: Instant,
    report_interval: Duration,
    last_refresh: Instant,
    refresh_interval: Option<Duration>,
    progress: ProgressBar,
}

impl ProgressReporter {
    pub fn start(width: usize,
                 height: usize,
                 channel_count: usize,
                 report_interval: Duration,
                 refresh_interval: Option<Duration>,
                 show_progress: bool) -> Self {
        let total_work = width * height * channel_count;
        let progress = if show_progress {
            let bar = ProgressBar::new(total_work as u64);
            bar.set_style(
                ProgressStyle::with_template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} pixels {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        } else {
            ProgressBar::hidden()
        };

        let now = Instant::now();
        Self {
            width,
            height,
            channel_count,
            total_work,
            rays_since_report: 0,
            total_rays: 0,
            pixels_sampled: 0,
            start_time: now,
            last_report: now,
            report_interval,
            last_refresh: now,
            refresh_interval,
            progress,
        }
    }

    /// Record the `pixel`-th result (0-based, per channel) of `channel`.
    pub fn update(&mut self, channel: usize, pixel: usize, ray_count: u64) -> Option<ProgressReport> {
        self.rays_since_report += ray_count;
        self.total_rays += ray_count;
        self.pixels_sampled += 1;
        self.progress.inc(1);

        if self.last_report.elapsed() <= self.report_interval {
            return None;
        }

        let total_pixels = self.width * self.height;
        let current_work = total_pixels * channel + pixel;
        let report = ProgressReport {
            completion: 100.0 * current_work as f64 / self.total_work.max(1) as f64,
            channel: channel + 1,
            channel_count: self.channel_count,
            line: (pixel + self.width) / self.width.max(1),
            line_count: self.height,
            pixel: pixel + 1,
            pixel_count: total_pixels,
            rays: self.rays_since_report,
        };
        log::info!("{:.2}% complete (channel {}/{}, line {}/{}, pixel {}/{}, {:.1}k rays)",
                   report.completion, report.channel, report.channel_count,
                   report.line, report.line_count, report.pixel, report.pixel_count,
                   report.rays as f64 / 1000.0);
        self.progress.set_message(format!("{:.1}k rays", report.rays as f64 / 1000.0));

        self.rays_since_report = 0;
        self.last_report = Instant::now();
        Some(report)
    }

    /// True once per refresh interval; drives the live preview.
    pub fn refresh_due(&mut self) -> bool {
        match self.refresh_interval {
            Some(interval) if self.last_refresh.elapsed() > interval => {
                self.last_refresh = Instant::now();
                true
            }
            _ => false,
        }
    }

    pub fn abandon(self) {
        self.progress.abandon();
        log::warn!("Render aborted after {:.3}s, {} of {} pixels sampled",
                   self.start_time.elapsed().as_secs_f64(), self.pixels_sampled, self.total_work);
    }

    pub fn finish(self) -> ObserveStatistics {
        self.progress.finish_and_clear();
        let elapsed = self.start_time.elapsed();
        log::info!("Render complete - time elapsed {:.3}s", elapsed.as_secs_f64());
        ObserveStatistics {
            elapsed,
            rays: self.total_rays,
            pixels_sampled: self.pixels_sampled,
        }
    }
}
