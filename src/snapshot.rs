//! Wire types for per-frame analytics output
//!
//! These structures are the JSON contract consumed by downstream transports
//! and dashboards; field names and nesting are stable.

use serde::{Deserialize, Serialize};

/// Overall safety status, in increasing severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Normal,
    Warning,
    Critical,
}

/// One reportable track, as exposed to analytics and downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    /// Positive, never-reused track identifier
    pub id: u32,
    /// Current box as [x1, y1, x2, y2]
    pub bbox: [f32; 4],
    /// Center velocity as [vx, vy], pixels per frame
    pub velocity: [f32; 2],
    /// Frames since the track was created
    pub age: u32,
    /// Successful measurement updates so far
    pub hits: u32,
}

/// Crowd density over the frame grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DensityReport {
    /// Highest per-cell person count this frame
    pub max_density: f32,
    /// Full rows x cols grid of per-cell counts
    pub grid: Vec<Vec<f32>>,
    pub threshold_warning: f32,
    pub threshold_critical: f32,
}

/// Spread of motion directions across moving tracks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceReport {
    /// Circular standard deviation of motion angles, in degrees
    pub std_deviation: f32,
    pub threshold_warning: f32,
    pub threshold_critical: f32,
}

/// Kinetic energy level and spike signal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KineticEnergyReport {
    /// Mean (vx^2 + vy^2) / 2 over reportable tracks this frame
    pub current: f32,
    /// Mean over the bounded history window
    pub moving_average: f32,
    /// True when the current value exceeds the moving average by the
    /// configured factor, after the warm-up period
    pub spike_detected: bool,
    pub spike_factor: f32,
}

/// Immutable per-frame analytics result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub frame_count: u64,
    /// Seconds since start at the nominal processing rate
    pub timestamp: f32,
    pub person_count: usize,
    pub density: DensityReport,
    pub motion_coherence: CoherenceReport,
    pub kinetic_energy: KineticEnergyReport,
    pub status: Status,
    /// Reportable tracks this snapshot was computed from
    pub trackers: Vec<TrackReport>,
}

impl AnalyticsSnapshot {
    /// Serialize for the downstream transport
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Status::Normal).unwrap(), "\"NORMAL\"");
        assert_eq!(
            serde_json::to_string(&Status::Critical).unwrap(),
            "\"CRITICAL\""
        );
    }

    #[test]
    fn test_snapshot_wire_field_names() {
        let snapshot = AnalyticsSnapshot {
            frame_count: 3,
            timestamp: 0.2,
            person_count: 1,
            density: DensityReport {
                max_density: 1.0,
                grid: vec![vec![0.0, 1.0], vec![0.0, 0.0]],
                threshold_warning: 4.0,
                threshold_critical: 6.0,
            },
            motion_coherence: CoherenceReport {
                std_deviation: 0.0,
                threshold_warning: 40.0,
                threshold_critical: 65.0,
            },
            kinetic_energy: KineticEnergyReport {
                current: 0.5,
                moving_average: 0.4,
                spike_detected: false,
                spike_factor: 2.0,
            },
            status: Status::Normal,
            trackers: vec![TrackReport {
                id: 1,
                bbox: [10.0, 10.0, 20.0, 30.0],
                velocity: [1.0, 0.0],
                age: 2,
                hits: 3,
            }],
        };

        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["frame_count"], 3);
        assert_eq!(json["density"]["max_density"], 1.0);
        assert_eq!(json["density"]["grid"][0][1], 1.0);
        assert_eq!(json["motion_coherence"]["std_deviation"], 0.0);
        assert_eq!(json["kinetic_energy"]["spike_detected"], false);
        assert_eq!(json["status"], "NORMAL");
        assert_eq!(json["trackers"][0]["id"], 1);
    }
}
