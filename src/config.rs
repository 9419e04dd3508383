//! Configuration for the tracker, the analytics engine and the pipeline
//!
//! All thresholds and tuning constants live here so nothing is hardcoded in
//! the processing modules. Configuration is supplied at construction time and
//! is not mutable mid-run.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for the multi-object tracker
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum frames to keep a track alive without a matching detection
    pub max_age: u32,
    /// Consecutive hits required before a track is reported
    pub min_hits: u32,
    /// Minimum IoU for associating a detection to a track
    pub iou_threshold: f32,
    /// Diagonal of the measurement noise covariance matrix,
    /// i.e. uncertainties of (x, y, s, r) measurements
    pub measurement_noise: [f32; 4],
    /// Diagonal of the process noise covariance matrix,
    /// i.e. uncertainties of (x, y, s, r, dx, dy, ds) during transition
    pub process_noise: [f32; 7],
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 30,
            min_hits: 3,
            iou_threshold: 0.3,
            measurement_noise: [1.0, 1.0, 10.0, 10.0],
            process_noise: [1.0, 1.0, 1.0, 1.0, 0.01, 0.01, 0.0001],
        }
    }
}

/// Configuration for the crowd analytics engine
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Density grid dimensions (rows, cols) over the frame
    pub grid_rows: usize,
    pub grid_cols: usize,
    /// Frame extent in pixels (width, height)
    pub frame_width: f32,
    pub frame_height: f32,
    /// Density thresholds in persons per grid cell
    pub density_warning: f32,
    pub density_critical: f32,
    /// Motion coherence thresholds, standard deviation of motion
    /// angles in degrees; higher means more chaotic movement
    pub coherence_warning: f32,
    pub coherence_critical: f32,
    /// A spike is a kinetic energy reading this many times above
    /// the moving average
    pub ke_spike_factor: f32,
    /// Kinetic energy moving average window, in frames
    pub ke_window_size: usize,
    /// Nominal processing rate, used only for snapshot timestamps
    pub processing_fps: f32,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            grid_rows: 10,
            grid_cols: 10,
            frame_width: 640.0,
            frame_height: 480.0,
            density_warning: 4.0,
            density_critical: 6.0,
            coherence_warning: 40.0,
            coherence_critical: 65.0,
            ke_spike_factor: 2.0,
            // 3 seconds at 15 fps
            ke_window_size: 45,
            processing_fps: 15.0,
        }
    }
}

/// Top-level configuration for the per-frame processing pipeline
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub analytics: AnalyticsConfig,
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.analytics.grid_rows == 0 || self.analytics.grid_cols == 0 {
            return Err(Error::Config("density grid must be non-empty".into()));
        }
        if self.analytics.frame_width <= 0.0 || self.analytics.frame_height <= 0.0 {
            return Err(Error::Config("frame resolution must be positive".into()));
        }
        if self.analytics.ke_window_size == 0 {
            return Err(Error::Config(
                "kinetic energy window must hold at least one sample".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.tracker.iou_threshold) {
            return Err(Error::Config("iou_threshold must be within [0, 1]".into()));
        }
        Ok(())
    }
}
