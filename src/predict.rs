//! Constant-velocity trajectory prediction.
//!
//! No turn or acceleration modeling: over the short lookahead windows
//! used here (≤30 s) a linear extrapolation is close enough, and it keeps
//! every prediction a single multiply-add.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Position;
use crate::models::Aircraft;

/// Default lookahead window in seconds.
pub const DEFAULT_HORIZON_S: f64 = 30.0;
/// Default number of uniform sampling steps across the horizon.
pub const DEFAULT_STEPS: u32 = 30;

#[derive(Debug, Error, PartialEq)]
pub enum PredictError {
    #[error("prediction horizon must be finite and positive, got {0}")]
    InvalidHorizon(f64),
    #[error("prediction needs at least one step")]
    NoSteps,
}

/// Sampling parameters for trajectory prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionConfig {
    pub horizon_s: f64,
    pub steps: u32,
}

impl Default for PredictionConfig {
    fn default() -> Self {
        Self {
            horizon_s: DEFAULT_HORIZON_S,
            steps: DEFAULT_STEPS,
        }
    }
}

impl PredictionConfig {
    /// Validated constructor; rejects empty or non-finite horizons so the
    /// detection loops never see a malformed sampling plan.
    pub fn new(horizon_s: f64, steps: u32) -> Result<Self, PredictError> {
        if !horizon_s.is_finite() || horizon_s <= 0.0 {
            return Err(PredictError::InvalidHorizon(horizon_s));
        }
        if steps == 0 {
            return Err(PredictError::NoSteps);
        }
        Ok(Self { horizon_s, steps })
    }

    /// Time between consecutive samples in seconds.
    pub fn step_s(&self) -> f64 {
        self.horizon_s / self.steps as f64
    }
}

/// Restartable iterator over predicted positions at uniform time steps,
/// inclusive of both endpoints (`steps + 1` samples).
#[derive(Debug, Clone)]
pub struct Trajectory<'a> {
    aircraft: &'a Aircraft,
    config: PredictionConfig,
    next_step: u32,
}

impl<'a> Trajectory<'a> {
    pub fn new(aircraft: &'a Aircraft, config: PredictionConfig) -> Self {
        Self {
            aircraft,
            config,
            next_step: 0,
        }
    }

    /// Rewind to t = 0 so the samples can be walked again.
    pub fn restart(&mut self) {
        self.next_step = 0;
    }
}

impl Iterator for Trajectory<'_> {
    type Item = (f64, Position);

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_step > self.config.steps {
            return None;
        }
        let t = self.next_step as f64 * self.config.step_s();
        self.next_step += 1;
        Some((t, self.aircraft.predict_position(t)))
    }
}
