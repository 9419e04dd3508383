//! # Crowdwatch - Crowd Safety Monitoring Core
//!
//! Real-time multi-object tracking and crowd risk analytics over noisy
//! bounding box detections. Each frame, detections are associated to
//! Kalman-filtered tracks (SORT-style), and the confirmed track set feeds
//! three risk metrics - crowd density, motion coherence and kinetic
//! energy - that classify an overall safety status.
//!
//! Detection, video decode and transport are external collaborators; the
//! crate consumes scored boxes and emits a JSON-ready snapshot per frame.
//!
//! ## Example
//!
//! ```rust
//! use crowdwatch::{CorePipeline, Detection, PipelineConfig};
//!
//! let mut pipeline = CorePipeline::new(PipelineConfig::default()).unwrap();
//!
//! let detections = vec![
//!     Detection::new(100.0, 100.0, 150.0, 200.0, 0.9),
//!     Detection::new(300.0, 150.0, 350.0, 250.0, 0.8),
//! ];
//! let output = pipeline.process_frame(&detections).unwrap();
//! println!("status: {:?}", output.snapshot.status);
//! ```

pub mod analytics;
pub mod assignment;
pub mod bbox;
pub mod config;
pub mod detector;
pub mod error;
pub mod kalman;
pub mod pipeline;
pub mod snapshot;
pub mod track;
pub mod tracker;

pub use analytics::{AnalyticsSummary, CrowdAnalytics};
pub use assignment::{AssignmentResult, AssignmentSolver, GreedySolver, HungarianSolver};
pub use bbox::Bbox;
pub use config::{AnalyticsConfig, PipelineConfig, TrackerConfig};
pub use detector::{Detection, Detector, Scenario, ScriptedDetector};
pub use error::{Error, Result};
pub use pipeline::{CorePipeline, FrameOutput, PipelineStats};
pub use snapshot::{AnalyticsSnapshot, Status, TrackReport};
pub use tracker::CrowdTracker;
