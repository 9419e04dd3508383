//! Per-object state estimation and lifecycle bookkeeping
//!
//! A [`BoxTrack`] follows one object through a constant-velocity Kalman
//! filter over the state [cx, cy, s, r, vcx, vcy, vs]: box center, area,
//! aspect ratio and the first derivatives of center and area. The aspect
//! ratio is held constant by the motion model.

use crate::bbox::Bbox;
use crate::error::Result;
use crate::kalman::{KalmanFilter, KalmanInit};
use nalgebra::{DMatrix, DVector};

/// Returned when a track has no usable geometry at all: no finite state
/// and no prediction history.
const FALLBACK_BBOX: Bbox = Bbox {
    x1: 0.0,
    y1: 0.0,
    x2: 50.0,
    y2: 50.0,
};

/// State estimator and lifecycle counters for a single tracked object
#[derive(Debug, Clone)]
pub struct BoxTrack {
    /// Raw counter value; reported IDs carry a fixed positive offset
    pub id: u32,
    kf: KalmanFilter,
    /// Frames since creation (each predict is one frame)
    pub age: u32,
    /// Total number of successful measurement updates, counting the
    /// detection that spawned the track
    pub hits: u32,
    /// Consecutive successful updates since the last gap
    pub hit_streak: u32,
    /// Frames since the last successful update; 0 means matched this frame
    pub time_since_update: u32,
    /// Prediction-only bbox history, cleared on every update. Serves as the
    /// fallback source when the state produces a non-finite box.
    history: Vec<Bbox>,
}

impl BoxTrack {
    /// Create a track at the given detection box with zero initial velocity.
    ///
    /// Returns `None` for boxes without positive width and height, which have
    /// no measurement representation.
    pub fn new(
        id: u32,
        bbox: Bbox,
        measurement_noise: &[f32; 4],
        process_noise: &[f32; 7],
    ) -> Option<Self> {
        let z = bbox.to_measurement()?;

        let kf = KalmanFilter::new(KalmanInit {
            x: DVector::from_vec(vec![z[0], z[1], z[2], z[3], 0.0, 0.0, 0.0]),
            p: DMatrix::from_diagonal(&DVector::from_vec(vec![
                10.0, 10.0, 10.0, 10.0, 10000.0, 10000.0, 10000.0,
            ])),
            f: DMatrix::from_row_slice(
                7,
                7,
                &[
                    1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, // cx' = cx + vcx
                    0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0, // cy' = cy + vcy
                    0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, // s'  = s + vs
                    0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, // r'  = r
                    0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, // vcx' = vcx
                    0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0, // vcy' = vcy
                    0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, // vs'  = vs
                ],
            ),
            h: DMatrix::from_row_slice(
                4,
                7,
                &[
                    1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
                    0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
                    0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, //
                    0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0,
                ],
            ),
            r: DMatrix::from_diagonal(&DVector::from_vec(measurement_noise.to_vec())),
            q: DMatrix::from_diagonal(&DVector::from_vec(process_noise.to_vec())),
        });

        Some(Self {
            id,
            kf,
            age: 0,
            hits: 1,
            hit_streak: 1,
            time_since_update: 0,
            history: Vec::new(),
        })
    }

    /// Advance the state by one frame and return the predicted box.
    ///
    /// A non-finite predicted box falls back to the most recent history
    /// entry; deletion is never decided here.
    pub fn predict(&mut self) -> Bbox {
        // A scale velocity that would drive the predicted area non-positive
        // is zeroed before the transition.
        if self.kf.x[6] + self.kf.x[2] <= 0.0 {
            self.kf.x[6] = 0.0;
        }

        self.kf.predict();
        self.age += 1;

        if self.time_since_update > 0 {
            self.hit_streak = 0;
        }
        self.time_since_update += 1;

        let predicted = self.state_bbox();
        if predicted.is_finite() {
            self.history.push(predicted);
            predicted
        } else {
            log::debug!("track {} produced a non-finite prediction", self.id);
            self.last_known_bbox()
        }
    }

    /// Correct the state with an observed box
    pub fn update(&mut self, bbox: Bbox) -> Result<()> {
        self.time_since_update = 0;
        self.history.clear();
        self.hits += 1;
        self.hit_streak += 1;

        // Degenerate observations carry no measurement; the match still
        // counts but no correction is applied.
        if let Some(z) = bbox.to_measurement() {
            self.kf.update(DVector::from_vec(z.to_vec()))?;
        }
        Ok(())
    }

    /// Current corrected box without advancing time
    pub fn bbox(&self) -> Bbox {
        let b = self.state_bbox();
        if b.is_finite() {
            b
        } else {
            self.last_known_bbox()
        }
    }

    /// Velocity of the box center, (vcx, vcy)
    pub fn velocity(&self) -> [f32; 2] {
        [self.kf.x[4], self.kf.x[5]]
    }

    /// True when every filter state component is finite
    pub fn state_is_finite(&self) -> bool {
        self.kf.state_is_finite()
    }

    fn state_bbox(&self) -> Bbox {
        let x = &self.kf.x;
        Bbox::from_measurement(&[x[0], x[1], x[2], x[3]])
    }

    fn last_known_bbox(&self) -> Bbox {
        self.history.last().copied().unwrap_or(FALLBACK_BBOX)
    }
}
