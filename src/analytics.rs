//! Crowd risk analytics over the reportable track set
//!
//! Three per-frame metrics feed a status classification:
//! crowd density (persons per grid cell), motion coherence (circular
//! standard deviation of movement directions) and kinetic energy (mean
//! squared speed, with spike detection against a moving average).

use crate::config::AnalyticsConfig;
use crate::snapshot::{
    AnalyticsSnapshot, CoherenceReport, DensityReport, KineticEnergyReport, Status, TrackReport,
};
use ndarray::prelude::*;
use std::collections::VecDeque;

/// Tracks slower than this (pixels per frame) are not considered moving
const MIN_MOVING_SPEED: f32 = 0.1;
/// Kinetic energy samples required before spike detection arms
const SPIKE_MIN_SAMPLES: usize = 10;

/// Per-frame crowd safety analytics engine
pub struct CrowdAnalytics {
    config: AnalyticsConfig,
    /// Bounded sliding window of past kinetic energy values
    ke_history: VecDeque<f32>,
    frame_count: u64,
}

/// Session-level counters, exposed for reporting
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct AnalyticsSummary {
    pub total_frames: u64,
    pub ke_history_length: usize,
    pub ke_history: Vec<f32>,
}

impl CrowdAnalytics {
    pub fn new(config: AnalyticsConfig) -> Self {
        let window = config.ke_window_size;
        Self {
            config,
            ke_history: VecDeque::with_capacity(window),
            frame_count: 0,
        }
    }

    /// Count track centers into a rows x cols grid over the frame extent.
    /// Returns the peak cell count and the full grid.
    pub fn crowd_density(&self, tracks: &[TrackReport]) -> (f32, Array2<f32>) {
        let rows = self.config.grid_rows;
        let cols = self.config.grid_cols;
        let mut grid = Array2::<f32>::zeros((rows, cols));

        let cell_width = self.config.frame_width / cols as f32;
        let cell_height = self.config.frame_height / rows as f32;

        for track in tracks {
            let [x1, y1, x2, y2] = track.bbox;
            let cx = (x1 + x2) / 2.0;
            let cy = (y1 + y2) / 2.0;

            // Clamp off-frame centers into the border cells
            let col = ((cx / cell_width) as isize).clamp(0, cols as isize - 1) as usize;
            let row = ((cy / cell_height) as isize).clamp(0, rows as isize - 1) as usize;
            grid[[row, col]] += 1.0;
        }

        let max_density = grid.iter().copied().fold(0.0, f32::max);
        (max_density, grid)
    }

    /// Circular standard deviation of motion angles across moving tracks,
    /// in degrees. Fewer than two moving tracks yields 0: not enough signal
    /// for a meaningful spread.
    pub fn motion_coherence(&self, tracks: &[TrackReport]) -> f32 {
        let angles: Vec<f32> = tracks
            .iter()
            .filter_map(|track| {
                let [vx, vy] = track.velocity;
                let speed = (vx * vx + vy * vy).sqrt();
                (speed > MIN_MOVING_SPEED).then(|| vy.atan2(vx))
            })
            .collect();

        if angles.len() < 2 {
            return 0.0;
        }

        // Unit-vector averaging handles angle wraparound
        let n = angles.len() as f32;
        let mean_x = angles.iter().map(|a| a.cos()).sum::<f32>() / n;
        let mean_y = angles.iter().map(|a| a.sin()).sum::<f32>() / n;

        let resultant = (mean_x * mean_x + mean_y * mean_y).sqrt();
        let circular_variance = 1.0 - resultant;
        if circular_variance <= 0.0 {
            return 0.0;
        }

        // Small-sample approximation of circular standard deviation
        (2.0 * circular_variance).sqrt().to_degrees()
    }

    /// Mean kinetic energy this frame, its moving average over the bounded
    /// window, and the spike signal. Spike detection stays disarmed until
    /// the window holds enough samples.
    pub fn kinetic_energy(&mut self, tracks: &[TrackReport]) -> (f32, f32, bool) {
        let current = if tracks.is_empty() {
            0.0
        } else {
            let total: f32 = tracks
                .iter()
                .map(|track| {
                    let [vx, vy] = track.velocity;
                    (vx * vx + vy * vy) / 2.0
                })
                .sum();
            total / tracks.len() as f32
        };

        if self.ke_history.len() == self.config.ke_window_size {
            self.ke_history.pop_front();
        }
        self.ke_history.push_back(current);

        let moving_average =
            self.ke_history.iter().sum::<f32>() / self.ke_history.len() as f32;

        let is_spike = self.ke_history.len() >= SPIKE_MIN_SAMPLES
            && moving_average > 0.0
            && current > moving_average * self.config.ke_spike_factor;

        (current, moving_average, is_spike)
    }

    /// Classify the frame; first matching level wins. A kinetic energy
    /// spike alone is enough for CRITICAL.
    pub fn classify(&self, max_density: f32, coherence: f32, ke_spike: bool) -> Status {
        if max_density >= self.config.density_critical
            || coherence >= self.config.coherence_critical
            || ke_spike
        {
            return Status::Critical;
        }
        if max_density >= self.config.density_warning || coherence >= self.config.coherence_warning
        {
            return Status::Warning;
        }
        Status::Normal
    }

    /// Compute the full analytics snapshot for one frame
    pub fn analyze(&mut self, tracks: &[TrackReport]) -> AnalyticsSnapshot {
        self.frame_count += 1;

        let (max_density, grid) = self.crowd_density(tracks);
        let coherence = self.motion_coherence(tracks);
        let (ke_current, ke_average, ke_spike) = self.kinetic_energy(tracks);
        let status = self.classify(max_density, coherence, ke_spike);

        if status != Status::Normal {
            log::debug!(
                "frame {}: status {:?} (density {max_density:.1}, coherence {coherence:.1}, spike {ke_spike})",
                self.frame_count,
                status
            );
        }

        AnalyticsSnapshot {
            frame_count: self.frame_count,
            timestamp: self.frame_count as f32 / self.config.processing_fps,
            person_count: tracks.len(),
            density: DensityReport {
                max_density,
                grid: grid.outer_iter().map(|row| row.to_vec()).collect(),
                threshold_warning: self.config.density_warning,
                threshold_critical: self.config.density_critical,
            },
            motion_coherence: CoherenceReport {
                std_deviation: coherence,
                threshold_warning: self.config.coherence_warning,
                threshold_critical: self.config.coherence_critical,
            },
            kinetic_energy: KineticEnergyReport {
                current: ke_current,
                moving_average: ke_average,
                spike_detected: ke_spike,
                spike_factor: self.config.ke_spike_factor,
            },
            status,
            trackers: tracks.to_vec(),
        }
    }

    /// Session statistics since construction
    pub fn summary(&self) -> AnalyticsSummary {
        AnalyticsSummary {
            total_frames: self.frame_count,
            ke_history_length: self.ke_history.len(),
            ke_history: self.ke_history.iter().copied().collect(),
        }
    }
}
