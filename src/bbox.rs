//! Bounding box operations, IoU calculations and measurement conversions

use ndarray::prelude::*;
use rayon::prelude::*;
use std::fmt;

/// Axis-aligned bounding box in absolute pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bbox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl Bbox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    pub fn center_x(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }

    pub fn center_y(&self) -> f32 {
        (self.y1 + self.y2) / 2.0
    }

    pub fn is_finite(&self) -> bool {
        self.x1.is_finite() && self.y1.is_finite() && self.x2.is_finite() && self.y2.is_finite()
    }

    /// Convert to corner array [x1, y1, x2, y2]
    pub fn to_corners(&self) -> [f32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Convert to the measurement representation [center_x, center_y, scale, aspect_ratio]
    /// where scale is the box area and aspect_ratio is width / height.
    ///
    /// Returns `None` for boxes without positive width and height; such boxes
    /// cannot be represented and are skipped by callers.
    pub fn to_measurement(&self) -> Option<[f32; 4]> {
        let w = self.width();
        let h = self.height();
        if w <= 0.0 || h <= 0.0 {
            return None;
        }
        Some([self.center_x(), self.center_y(), w * h, w / h])
    }

    /// Reconstruct a box from the measurement representation.
    /// Exact inverse of [`Bbox::to_measurement`] for any positive-area box.
    pub fn from_measurement(z: &[f32; 4]) -> Self {
        let [cx, cy, scale, aspect] = *z;
        let w = (scale * aspect).sqrt();
        let h = scale / w;
        Self {
            x1: cx - w / 2.0,
            y1: cy - h / 2.0,
            x2: cx + w / 2.0,
            y2: cy + h / 2.0,
        }
    }
}

impl fmt::Display for Bbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bbox({}, {}, {}, {})", self.x1, self.y1, self.x2, self.y2)
    }
}

/// Calculate IoU between two bounding boxes; 0 when disjoint
pub fn iou(a: &Bbox, b: &Bbox) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    if x2 <= x1 || y2 <= y1 {
        return 0.0;
    }

    let intersection = (x2 - x1) * (y2 - y1);
    let union = a.area() + b.area() - intersection;

    if union > 0.0 {
        intersection / union
    } else {
        0.0
    }
}

/// Compute the IoU matrix between detections and track predictions in parallel.
/// Returns an (n_detections, n_tracks) matrix.
pub fn iou_matrix(detections: &[Bbox], tracks: &[Bbox]) -> Array2<f32> {
    let n_dets = detections.len();
    let n_tracks = tracks.len();

    if n_dets == 0 || n_tracks == 0 {
        return Array2::zeros((n_dets, n_tracks));
    }

    let data: Vec<f32> = detections
        .par_iter()
        .flat_map_iter(|det| tracks.iter().map(move |track| iou(det, track)))
        .collect();

    Array2::from_shape_vec((n_dets, n_tracks), data).unwrap()
}
