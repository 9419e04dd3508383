//! Track lifecycle management: the SORT-style multi-object tracker
//!
//! Owns the active track collection and runs the per-frame cycle:
//! predict all tracks, drop corrupt ones, associate detections, update
//! matched tracks, spawn tentative tracks for unmatched detections, then
//! report and reap in a single pass.

use crate::assignment::{associate, AssignmentSolver, HungarianSolver};
use crate::bbox::{iou_matrix, Bbox};
use crate::config::TrackerConfig;
use crate::detector::Detection;
use crate::error::Result;
use crate::snapshot::TrackReport;
use crate::track::BoxTrack;
use rayon::prelude::*;

/// Added to the internal counter so reported IDs are always positive and
/// ID 0 can mean "no ID" downstream.
const REPORT_ID_OFFSET: u32 = 1;

/// Multi-object tracker over noisy bounding box detections
pub struct CrowdTracker {
    config: TrackerConfig,
    solver: Box<dyn AssignmentSolver>,
    tracks: Vec<BoxTrack>,
    /// Monotonically increasing; IDs are never reused, even after deletion
    next_id: u32,
    frames_processed: u32,
}

impl CrowdTracker {
    /// Create a tracker with the optimal assignment solver
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_solver(config, Box::new(HungarianSolver))
    }

    /// Create a tracker with an explicit assignment strategy
    pub fn with_solver(config: TrackerConfig, solver: Box<dyn AssignmentSolver>) -> Self {
        log::debug!("tracker using {} assignment", solver.name());
        Self {
            config,
            solver,
            tracks: Vec::new(),
            next_id: 0,
            frames_processed: 0,
        }
    }

    /// Run one frame of the tracking cycle and return the reportable tracks.
    ///
    /// An empty detection slice is a normal frame: every track ages and
    /// nothing matches.
    pub fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackReport>> {
        self.frames_processed += 1;

        // Predict every live track first, regardless of detection count,
        // then drop any whose filter state went non-finite.
        let predictions: Vec<Bbox> = self.tracks.par_iter_mut().map(|t| t.predict()).collect();
        let finite: Vec<bool> = self.tracks.iter().map(|t| t.state_is_finite()).collect();

        let corrupt = finite.iter().filter(|&&ok| !ok).count();
        if corrupt > 0 {
            log::warn!("dropping {corrupt} tracks with non-finite state");
        }
        let mut idx = 0;
        self.tracks.retain(|_| {
            let keep = finite[idx];
            idx += 1;
            keep
        });
        let predicted: Vec<Bbox> = predictions
            .into_iter()
            .zip(&finite)
            .filter_map(|(bbox, &ok)| ok.then_some(bbox))
            .collect();

        let det_boxes: Vec<Bbox> = detections.iter().map(|d| d.bbox).collect();
        let ious = iou_matrix(&det_boxes, &predicted);
        let assignment = associate(ious.view(), self.config.iou_threshold, self.solver.as_ref());

        // Update matched tracks with their detection box; confidence plays
        // no part in the state. A failed correction removes the track.
        let mut failed = Vec::new();
        for &(det_idx, track_idx) in &assignment.matches {
            if self.tracks[track_idx].update(det_boxes[det_idx]).is_err() {
                failed.push(track_idx);
            }
        }
        failed.sort_unstable_by(|a, b| b.cmp(a));
        for track_idx in failed {
            log::warn!(
                "removing track {} after failed filter update",
                self.tracks[track_idx].id
            );
            self.tracks.remove(track_idx);
        }

        // Unmatched detections spawn new tentative tracks at zero velocity
        for det_idx in assignment.unmatched_detections {
            if let Some(track) = BoxTrack::new(
                self.next_id,
                det_boxes[det_idx],
                &self.config.measurement_noise,
                &self.config.process_noise,
            ) {
                self.tracks.push(track);
                self.next_id += 1;
            }
        }

        // Report and reap in one pass over the collection
        let mut reports = Vec::new();
        let mut i = 0;
        while i < self.tracks.len() {
            let track = &self.tracks[i];
            if self.is_reportable(track) {
                reports.push(Self::report(track));
            }
            if track.time_since_update > self.config.max_age {
                self.tracks.remove(i);
            } else {
                i += 1;
            }
        }

        Ok(reports)
    }

    /// A track surfaces when it matched this frame and either carries a full
    /// confirmation streak or the pipeline is still inside the start-up
    /// grace period.
    fn is_reportable(&self, track: &BoxTrack) -> bool {
        track.time_since_update < 1
            && (track.hit_streak >= self.config.min_hits
                || self.frames_processed <= self.config.min_hits)
    }

    fn report(track: &BoxTrack) -> TrackReport {
        TrackReport {
            id: track.id + REPORT_ID_OFFSET,
            bbox: track.bbox().to_corners(),
            velocity: track.velocity(),
            age: track.age,
            hits: track.hits,
        }
    }

    /// Number of active tracks, reportable or not
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Frames processed since start or the last [`CrowdTracker::clear`]
    pub fn frames_processed(&self) -> u32 {
        self.frames_processed
    }

    /// Drop all tracks and reset the frame and ID counters
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.next_id = 0;
        self.frames_processed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assignment::GreedySolver;

    fn config(max_age: u32, min_hits: u32) -> TrackerConfig {
        TrackerConfig {
            max_age,
            min_hits,
            ..TrackerConfig::default()
        }
    }

    fn two_people(shift: f32) -> Vec<Detection> {
        vec![
            Detection::new(100.0 + shift, 100.0, 150.0 + shift, 200.0, 0.9),
            Detection::new(300.0 + shift, 150.0, 350.0 + shift, 250.0, 0.8),
        ]
    }

    #[test]
    fn test_first_frame_creates_tentative_tracks() {
        let mut tracker = CrowdTracker::new(config(30, 3));
        let reports = tracker.update(&two_people(0.0)).unwrap();

        // Inside the start-up grace period both fresh tracks surface
        assert_eq!(reports.len(), 2);
        assert_eq!(tracker.len(), 2);
        for report in &reports {
            assert!(report.id >= 1);
            assert_eq!(report.hits, 1);
        }
    }

    #[test]
    fn test_ids_unique_and_monotonic() {
        let mut tracker = CrowdTracker::new(config(30, 1));
        let mut seen = Vec::new();

        for frame in 0..5 {
            // A new person appears far from the others every frame
            let mut dets = two_people(frame as f32);
            let x = 500.0 + frame as f32 * 60.0;
            dets.push(Detection::new(x, 400.0, x + 30.0, 460.0, 0.7));
            let reports = tracker.update(&dets).unwrap();

            let mut frame_ids: Vec<u32> = reports.iter().map(|r| r.id).collect();
            let n = frame_ids.len();
            frame_ids.sort_unstable();
            frame_ids.dedup();
            assert_eq!(frame_ids.len(), n, "duplicate ID within a frame");

            for id in frame_ids {
                if !seen.contains(&id) {
                    assert!(seen.iter().all(|&old| id > old), "IDs must increase");
                    seen.push(id);
                }
            }
        }
    }

    #[test]
    fn test_matching_across_frames_keeps_ids() {
        let mut tracker = CrowdTracker::new(config(30, 3));
        let first = tracker.update(&two_people(0.0)).unwrap();
        let second = tracker.update(&two_people(5.0)).unwrap();

        assert_eq!(second.len(), 2);
        let first_ids: Vec<u32> = first.iter().map(|r| r.id).collect();
        for report in &second {
            assert!(first_ids.contains(&report.id));
            assert_eq!(report.hits, 2);
            assert_eq!(tracker.frames_processed(), 2);
        }
    }

    #[test]
    fn test_track_deleted_after_max_age() {
        let mut tracker = CrowdTracker::new(config(2, 1));
        tracker.update(&two_people(0.0)).unwrap();
        assert_eq!(tracker.len(), 2);

        // max_age + 1 empty frames remove both tracks
        for _ in 0..3 {
            let reports = tracker.update(&[]).unwrap();
            assert!(reports.is_empty());
        }
        assert_eq!(tracker.len(), 0);
    }

    #[test]
    fn test_grace_period_is_pipeline_wide() {
        let mut tracker = CrowdTracker::new(config(30, 3));

        // Frames 1-3: the early track surfaces every frame
        for frame in 0..3 {
            let dets = vec![Detection::new(
                100.0 + frame as f32,
                100.0,
                150.0 + frame as f32,
                200.0,
                0.9,
            )];
            let reports = tracker.update(&dets).unwrap();
            assert_eq!(reports.len(), 1, "early track hidden in grace period");
        }

        // Frame 4: a newcomer past the grace period must first earn a
        // hit streak of min_hits
        for frame in 3..5 {
            let mut dets = vec![Detection::new(
                100.0 + frame as f32,
                100.0,
                150.0 + frame as f32,
                200.0,
                0.9,
            )];
            dets.push(Detection::new(400.0, 300.0, 440.0, 380.0, 0.8));
            let reports = tracker.update(&dets).unwrap();
            assert_eq!(reports.len(), 1, "newcomer reported too early");
        }

        // Third consecutive hit: the newcomer's streak reaches min_hits
        let dets = vec![
            Detection::new(105.0, 100.0, 155.0, 200.0, 0.9),
            Detection::new(400.0, 300.0, 440.0, 380.0, 0.8),
        ];
        let reports = tracker.update(&dets).unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_missed_frame_hides_track() {
        let mut tracker = CrowdTracker::new(config(30, 1));
        tracker.update(&two_people(0.0)).unwrap();

        let reports = tracker.update(&[]).unwrap();
        assert!(reports.is_empty());
        // Tracks are aged but retained
        assert_eq!(tracker.len(), 2);
    }

    #[test]
    fn test_degenerate_detection_is_skipped() {
        let mut tracker = CrowdTracker::new(config(30, 1));
        let dets = vec![
            Detection::new(100.0, 100.0, 150.0, 200.0, 0.9),
            // zero height, no measurement representation
            Detection::new(300.0, 150.0, 350.0, 150.0, 0.8),
        ];
        tracker.update(&dets).unwrap();
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_corrupt_track_dropped_without_disturbing_others() {
        let mut tracker = CrowdTracker::new(config(30, 1));

        // A huge box whose area overflows f32 to infinity corrupts the
        // filter state of its track at creation
        let dets = vec![
            Detection::new(100.0, 100.0, 150.0, 200.0, 0.9),
            Detection::new(0.0, 0.0, 3.0e19, 3.0e19, 0.8),
        ];
        tracker.update(&dets).unwrap();
        assert_eq!(tracker.len(), 2);

        // The next predict pass reaps the non-finite track; the healthy
        // one keeps matching and reporting as if nothing happened
        let healthy = vec![Detection::new(102.0, 100.0, 152.0, 200.0, 0.9)];
        let reports = tracker.update(&healthy).unwrap();

        assert_eq!(tracker.len(), 1);
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].id, 1);
        assert_eq!(reports[0].hits, 2);

        // Frames keep processing normally afterwards
        let reports = tracker.update(&healthy).unwrap();
        assert_eq!(reports.len(), 1);
    }

    #[test]
    fn test_greedy_solver_tracks_simple_scene() {
        let mut tracker = CrowdTracker::with_solver(config(30, 3), Box::new(GreedySolver));
        tracker.update(&two_people(0.0)).unwrap();
        let reports = tracker.update(&two_people(5.0)).unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn test_clear_resets_counters() {
        let mut tracker = CrowdTracker::new(config(30, 1));
        tracker.update(&two_people(0.0)).unwrap();
        tracker.clear();

        assert!(tracker.is_empty());
        assert_eq!(tracker.frames_processed(), 0);

        // IDs restart after a clear
        let reports = tracker.update(&two_people(0.0)).unwrap();
        assert_eq!(reports.iter().map(|r| r.id).min(), Some(1));
    }
}
