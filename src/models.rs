//! Core data models for the RWSL system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::{Aabb, Position, Velocity};

/// Size class derived from the wake-turbulence category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AircraftClass {
    /// ICAO code A/B
    Small,
    /// ICAO code C/D
    Medium,
    /// ICAO code E/F
    Large,
}

impl AircraftClass {
    /// Map an ICAO aerodrome reference code letter. Returns `None` for
    /// anything outside A-F.
    pub fn from_wake_category(code: char) -> Option<Self> {
        match code.to_ascii_uppercase() {
            'A' | 'B' => Some(Self::Small),
            'C' | 'D' => Some(Self::Medium),
            'E' | 'F' => Some(Self::Large),
            _ => None,
        }
    }
}

/// One record of the aircraft update feed.
///
/// Updates may arrive in any order and repeat for the same callsign;
/// the registry applies overwrite semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AircraftUpdate {
    pub callsign: String,
    pub position: Position,
    pub velocity: Velocity,
    pub class: AircraftClass,
    pub wingspan_m: f64,
    pub length_m: f64,
    pub timestamp: DateTime<Utc>,
}

/// Current state of a tracked aircraft. Identity is the callsign;
/// everything else is overwritten on each report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Aircraft {
    pub callsign: String,
    pub position: Position,
    pub velocity: Velocity,
    pub class: AircraftClass,
    pub wingspan_m: f64,
    pub length_m: f64,
    pub last_update: DateTime<Utc>,
}

impl Aircraft {
    /// Create a registry entry from the first sighting.
    pub fn from_update(update: &AircraftUpdate) -> Self {
        Self {
            callsign: update.callsign.clone(),
            position: update.position,
            velocity: update.velocity,
            class: update.class,
            wingspan_m: update.wingspan_m,
            length_m: update.length_m,
            last_update: update.timestamp,
        }
    }

    /// Overwrite state from a subsequent report.
    pub fn apply(&mut self, update: &AircraftUpdate) {
        self.position = update.position;
        self.velocity = update.velocity;
        self.class = update.class;
        self.wingspan_m = update.wingspan_m;
        self.length_m = update.length_m;
        self.last_update = update.timestamp;
    }

    /// Constant-velocity position `dt` seconds ahead of the last report.
    pub fn predict_position(&self, dt: f64) -> Position {
        Position::new(
            self.position.x + self.velocity.vx * dt,
            self.position.y + self.velocity.vy * dt,
        )
    }

    /// Half the larger physical dimension, the radius of the conservative
    /// square footprint.
    pub fn footprint_radius(&self) -> f64 {
        self.wingspan_m.max(self.length_m) / 2.0
    }

    /// Conservative footprint at `now + dt` (current position for dt = 0).
    pub fn bounding_box(&self, dt: f64) -> Aabb {
        Aabb::around(self.predict_position(dt), self.footprint_radius())
    }
}

/// State of a single status light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightState {
    #[default]
    Off,
    /// Stop: occupied runway or imminent incursion
    Red,
    /// Caution: traffic approaching the protected area
    Amber,
}

/// Light class from the airport catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LightClass {
    /// Runway Entrance Lights
    Rel,
    /// Takeoff Hold Lights
    Thl,
}

/// One entry of the injected light catalog: which protection zone drives
/// which physical light. The mapping is airport topology, not algorithm,
/// so it arrives as configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LightConfig {
    pub id: String,
    pub class: LightClass,
    pub zone_id: String,
    #[serde(default)]
    pub runway_id: Option<String>,
}
