//! Conflict and zone-occupation detection.
//!
//! Both checks walk sampled trajectories over a fixed prediction horizon.
//! They are discrete-time approximations: an event strictly between two
//! sample instants can be missed, so the step resolution bounds detection
//! latency against the worst-case closing speed.

use serde::Serialize;

use crate::geometry::Position;
use crate::models::Aircraft;
use crate::predict::{PredictionConfig, Trajectory};
use crate::zones::ProtectionZone;

/// Default buffer added on top of aircraft dimensions, meters.
pub const DEFAULT_SAFETY_MARGIN_M: f64 = 10.0;

/// First predicted trajectory sample inside a protection zone.
///
/// The absence of an entry is expressed as `None` by the caller-facing
/// API, never as a sentinel time value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ZoneEntry {
    /// Offset from now in seconds; 0 means the zone is occupied already.
    pub time_to_entry_s: f64,
    /// Predicted position of the first sample inside the zone.
    pub position: Position,
}

/// Detection engine composing the trajectory predictor with zone and
/// pairwise separation checks.
#[derive(Debug, Clone, Copy)]
pub struct ConflictDetector {
    config: PredictionConfig,
    safety_margin_m: f64,
}

impl Default for ConflictDetector {
    fn default() -> Self {
        Self::new(PredictionConfig::default(), DEFAULT_SAFETY_MARGIN_M)
    }
}

impl ConflictDetector {
    pub fn new(config: PredictionConfig, safety_margin_m: f64) -> Self {
        Self {
            config,
            safety_margin_m,
        }
    }

    pub fn config(&self) -> PredictionConfig {
        self.config
    }

    pub fn safety_margin_m(&self) -> f64 {
        self.safety_margin_m
    }

    /// Walk the predicted trajectory in order and report the first sample
    /// inside `zone`, or `None` if the horizon never touches it.
    pub fn check_zone_occupation(
        &self,
        aircraft: &Aircraft,
        zone: &ProtectionZone,
    ) -> Option<ZoneEntry> {
        Trajectory::new(aircraft, self.config).find_map(|(t, position)| {
            zone.contains(position).then_some(ZoneEntry {
                time_to_entry_s: t,
                position,
            })
        })
    }

    /// Minimum allowed separation for a pair: the largest physical
    /// dimension of either aircraft plus the safety margin.
    pub fn min_separation_m(&self, a: &Aircraft, b: &Aircraft) -> f64 {
        a.wingspan_m
            .max(a.length_m)
            .max(b.wingspan_m)
            .max(b.length_m)
            + self.safety_margin_m
    }

    /// Whether two aircraft fall below safe separation at any shared
    /// sample instant within the horizon. Symmetric in its arguments.
    pub fn detect_pair_conflict(&self, a: &Aircraft, b: &Aircraft) -> bool {
        let min_separation = self.min_separation_m(a, b);
        let step = self.config.step_s();
        for i in 0..=self.config.steps {
            let t = i as f64 * step;
            let separation = a.predict_position(t).distance_to(&b.predict_position(t));
            if separation < min_separation {
                return true;
            }
        }
        false
    }
}
