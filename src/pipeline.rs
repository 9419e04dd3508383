//! Per-frame processing pipeline
//!
//! Wires the tracker and the analytics engine into a single synchronous
//! step: detections in, reportable tracks and an analytics snapshot out.
//! One pipeline instance owns all mutable state for one video stream;
//! independent streams each need their own instance.

use crate::analytics::{AnalyticsSummary, CrowdAnalytics};
use crate::assignment::AssignmentSolver;
use crate::config::PipelineConfig;
use crate::detector::Detection;
use crate::error::Result;
use crate::snapshot::{AnalyticsSnapshot, TrackReport};
use crate::tracker::CrowdTracker;

/// Result of one pipeline step
#[derive(Debug, Clone)]
pub struct FrameOutput {
    /// Reportable tracks this frame
    pub tracks: Vec<TrackReport>,
    /// Analytics computed over those tracks
    pub snapshot: AnalyticsSnapshot,
}

/// Session counters for reporting endpoints
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PipelineStats {
    pub frame_count: u32,
    pub active_tracks: usize,
    pub analytics: AnalyticsSummary,
}

/// Detection -> tracking -> analytics pipeline for one stream
pub struct CorePipeline {
    tracker: CrowdTracker,
    analytics: CrowdAnalytics,
}

impl CorePipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        log::info!(
            "core pipeline initialized ({}x{} frame, {}x{} density grid)",
            config.analytics.frame_width,
            config.analytics.frame_height,
            config.analytics.grid_rows,
            config.analytics.grid_cols,
        );
        Ok(Self {
            tracker: CrowdTracker::new(config.tracker),
            analytics: CrowdAnalytics::new(config.analytics),
        })
    }

    /// Build a pipeline with an explicit assignment strategy
    pub fn with_solver(config: PipelineConfig, solver: Box<dyn AssignmentSolver>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            tracker: CrowdTracker::with_solver(config.tracker, solver),
            analytics: CrowdAnalytics::new(config.analytics),
        })
    }

    /// Process one frame of detections.
    ///
    /// Frames are strictly sequential: the next call must not start until
    /// this one returned. An empty slice is a valid frame and ages all
    /// tracks.
    pub fn process_frame(&mut self, detections: &[Detection]) -> Result<FrameOutput> {
        let tracks = self.tracker.update(detections)?;
        let snapshot = self.analytics.analyze(&tracks);
        Ok(FrameOutput { tracks, snapshot })
    }

    pub fn stats(&self) -> PipelineStats {
        PipelineStats {
            frame_count: self.tracker.frames_processed(),
            active_tracks: self.tracker.len(),
            analytics: self.analytics.summary(),
        }
    }
}
