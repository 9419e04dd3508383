//! Linear Kalman filter used for per-object motion estimation

use crate::error::{Error, Result};
use nalgebra::{DMatrix, DVector};

/// Initial filter state and model matrices
#[derive(Debug, Clone)]
pub struct KalmanInit {
    /// Initial state
    pub x: DVector<f32>,
    /// Initial state covariance
    pub p: DMatrix<f32>,
    /// State transition matrix
    pub f: DMatrix<f32>,
    /// Observation matrix
    pub h: DMatrix<f32>,
    /// Observation noise covariance
    pub r: DMatrix<f32>,
    /// Process noise covariance
    pub q: DMatrix<f32>,
}

/// Plain linear Kalman filter over f32 state
#[derive(Debug, Clone)]
pub struct KalmanFilter {
    pub x: DVector<f32>,
    pub p: DMatrix<f32>,
    f: DMatrix<f32>,
    h: DMatrix<f32>,
    r: DMatrix<f32>,
    q: DMatrix<f32>,
}

impl KalmanFilter {
    pub fn new(init: KalmanInit) -> Self {
        Self {
            x: init.x,
            p: init.p,
            f: init.f,
            h: init.h,
            r: init.r,
            q: init.q,
        }
    }

    /// Advance the state by one time step
    pub fn predict(&mut self) {
        // x = F * x
        self.x = &self.f * &self.x;

        // P = F * P * F^T + Q
        self.p = &self.f * &self.p * self.f.transpose() + &self.q;
    }

    /// Correct the state with an observation
    pub fn update(&mut self, z: DVector<f32>) -> Result<()> {
        // Residual: y = z - H * x
        let y = z - &self.h * &self.x;

        // Innovation covariance: S = H * P * H^T + R
        let s = &self.h * &self.p * self.h.transpose() + &self.r;

        // Kalman gain: K = P * H^T * S^-1
        let s_inv = s.try_inverse().ok_or(Error::SingularInnovation)?;
        let k = &self.p * self.h.transpose() * s_inv;

        // x = x + K * y
        self.x = &self.x + &k * y;

        // P = (I - K * H) * P
        let dim = self.x.len();
        let i = DMatrix::identity(dim, dim);
        self.p = (i - k * &self.h) * &self.p;

        Ok(())
    }

    /// True when every state component is a finite number
    pub fn state_is_finite(&self) -> bool {
        self.x.iter().all(|v| v.is_finite())
    }
}
