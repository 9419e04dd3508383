//! Upstream detection boundary
//!
//! Detection itself is an external capability; the core only consumes a list
//! of scored boxes per frame. [`Detector`] is the interface any real model
//! wrapper implements. [`ScriptedDetector`] is a deterministic stand-in that
//! emits synthetic crowd scenarios, used by the demos and integration tests.

use crate::bbox::Bbox;
use crate::error::Result;

/// One scored bounding box from the upstream detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub bbox: Bbox,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32) -> Self {
        Self {
            bbox: Bbox::new(x1, y1, x2, y2),
            confidence,
        }
    }
}

/// Common interface for per-frame detection producers
pub trait Detector: Send {
    /// Produce the detections for the next frame of the stream
    fn next_frame(&mut self) -> Result<Vec<Detection>>;

    /// Detector name, for logging
    fn name(&self) -> &str;
}

/// Synthetic crowd behaviors for demos and threshold tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// A few people spread out, drifting gently
    Calm,
    /// Many people packed into one region of the frame
    Congested,
    /// A crowd scattering outward from the frame center at speed
    Panic,
}

/// Deterministic detector stub that plays back a scripted scenario
pub struct ScriptedDetector {
    scenario: Scenario,
    frame: u64,
    width: f32,
    height: f32,
}

impl ScriptedDetector {
    pub fn new(scenario: Scenario, width: f32, height: f32) -> Self {
        log::info!("scripted detector playing {scenario:?} scenario");
        Self {
            scenario,
            frame: 0,
            width,
            height,
        }
    }

    fn calm_frame(&self) -> Vec<Detection> {
        // Four people spread across the frame with a slow sinusoidal drift
        let anchors = [
            (120.0, 150.0),
            (300.0, 200.0),
            (480.0, 180.0),
            (200.0, 320.0),
        ];
        let t = self.frame as f32;

        anchors
            .iter()
            .map(|&(x, y)| {
                let dx = 5.0 * (t * 0.1 + x * 0.01).sin();
                let dy = 3.0 * (t * 0.1 + y * 0.01).cos();
                Detection::new(x + dx, y + dy, x + dx + 40.0, y + dy + 80.0, 0.9)
            })
            .collect()
    }

    fn congested_frame(&self) -> Vec<Detection> {
        // Eight people crammed into a single region near the frame center,
        // shuffling in place
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        let t = self.frame as f32;

        (0..8)
            .map(|i| {
                let k = i as f32;
                let x = cx - 40.0 + (k % 4.0) * 18.0 + 2.0 * (t * 0.2 + k).sin();
                let y = cy - 40.0 + (k / 4.0).floor() * 30.0 + 2.0 * (t * 0.2 + k).cos();
                Detection::new(x, y, x + 30.0, y + 60.0, 0.85)
            })
            .collect()
    }

    fn panic_frame(&self) -> Vec<Detection> {
        // Six people radiating outward from the center, accelerating
        let cx = self.width / 2.0;
        let cy = self.height / 2.0;
        let spread = 20.0 + self.frame as f32 * 8.0;

        (0..6)
            .map(|i| {
                let angle = i as f32 * std::f32::consts::TAU / 6.0;
                let x = (cx + spread * angle.cos()).clamp(0.0, self.width - 40.0);
                let y = (cy + spread * angle.sin()).clamp(0.0, self.height - 80.0);
                Detection::new(x, y, x + 35.0, y + 75.0, 0.8)
            })
            .collect()
    }
}

impl Detector for ScriptedDetector {
    fn next_frame(&mut self) -> Result<Vec<Detection>> {
        let detections = match self.scenario {
            Scenario::Calm => self.calm_frame(),
            Scenario::Congested => self.congested_frame(),
            Scenario::Panic => self.panic_frame(),
        };
        self.frame += 1;
        Ok(detections)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
