//! Tunable thresholds for the RWSL control loop.

use serde::{Deserialize, Serialize};

/// Configuration for the light controller.
///
/// Everything the algorithm leaves open is decided here rather than
/// hard-coded: grid granularity, the sampling plan, the AMBER/RED cutoff
/// and the staleness window all arrive as configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlRules {
    /// Spatial hash cell edge in meters
    pub cell_size_m: f64,
    /// Lookahead window for trajectory sampling in seconds
    pub prediction_horizon_s: f64,
    /// Number of uniform sampling steps across the horizon
    pub prediction_steps: u32,
    /// Buffer added to aircraft dimensions for pair separation (meters)
    pub safety_margin_m: f64,
    /// Predicted zone entry at or under this offset turns lights RED;
    /// later entries within the horizon turn them AMBER
    pub red_within_s: f64,
    /// Aircraft with no update for this long are evicted before a cycle
    pub stale_after_s: f64,
}

impl Default for ControlRules {
    fn default() -> Self {
        Self {
            cell_size_m: 50.0,
            prediction_horizon_s: 30.0,
            prediction_steps: 30,
            safety_margin_m: 10.0,
            red_within_s: 10.0,
            stale_after_s: 10.0,
        }
    }
}
