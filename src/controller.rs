//! Light-state controller: ties aircraft state, zone occupation and
//! light state together.
//!
//! One `run_cycle` call is a single atomic computation over the current
//! snapshot: evict stale aircraft, gather occupation and pair-conflict
//! facts, rebuild the light table. No partial state is observable
//! between cycles.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::conflict::ConflictDetector;
use crate::models::{Aircraft, AircraftUpdate, LightConfig, LightState};
use crate::predict::{PredictError, PredictionConfig};
use crate::rules::ControlRules;
use crate::spatial::SpatialHashGrid;
use crate::zones::ZoneRegistry;

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("light {light_id} is mapped to unknown zone {zone_id}")]
    UnknownZone { light_id: String, zone_id: String },
    #[error("light {0} appears twice in the catalog")]
    DuplicateLight(String),
    #[error(transparent)]
    Predict(#[from] PredictError),
}

/// A zone-occupation fact produced by one control cycle.
#[derive(Debug, Clone, Serialize)]
pub struct ZoneOccupation {
    pub zone_id: String,
    pub callsign: String,
    /// Seconds until the predicted trajectory enters the zone; 0 means
    /// the zone is occupied now.
    pub time_to_entry_s: f64,
}

/// A pairwise loss-of-separation fact. Callsigns are ordered so the pair
/// key is stable across cycles.
#[derive(Debug, Clone, Serialize)]
pub struct PairConflict {
    pub callsign_a: String,
    pub callsign_b: String,
}

/// Diagnostic output of one control cycle.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleReport {
    pub occupations: Vec<ZoneOccupation>,
    pub pair_conflicts: Vec<PairConflict>,
    pub evicted: Vec<String>,
}

/// Top-level orchestrator owning the aircraft registry, spatial index,
/// zone registry, conflict detector and light table.
#[derive(Debug)]
pub struct LightController {
    rules: ControlRules,
    detector: ConflictDetector,
    zones: ZoneRegistry,
    lights: Vec<LightConfig>,
    light_states: HashMap<String, LightState>,
    aircraft: HashMap<String, Aircraft>,
    grid: SpatialHashGrid,
}

impl LightController {
    /// Build a controller from the static zone and light catalogs.
    ///
    /// Every light starts OFF and the light-id key set never changes
    /// afterwards. A light mapped to a zone the registry does not know is
    /// a configuration error here, not a silently dark light later.
    pub fn new(
        zones: ZoneRegistry,
        lights: Vec<LightConfig>,
        rules: ControlRules,
    ) -> Result<Self, ControllerError> {
        let config = PredictionConfig::new(rules.prediction_horizon_s, rules.prediction_steps)?;

        let mut light_states = HashMap::with_capacity(lights.len());
        for light in &lights {
            if zones.get(&light.zone_id).is_none() {
                return Err(ControllerError::UnknownZone {
                    light_id: light.id.clone(),
                    zone_id: light.zone_id.clone(),
                });
            }
            if light_states
                .insert(light.id.clone(), LightState::Off)
                .is_some()
            {
                return Err(ControllerError::DuplicateLight(light.id.clone()));
            }
        }

        let detector = ConflictDetector::new(config, rules.safety_margin_m);
        let grid = SpatialHashGrid::new(rules.cell_size_m);
        tracing::info!(
            "RWSL controller initialized: {} zones, {} lights",
            zones.len(),
            lights.len()
        );

        Ok(Self {
            rules,
            detector,
            zones,
            lights,
            light_states,
            aircraft: HashMap::new(),
            grid,
        })
    }

    /// Ingest one feed record: upsert the registry entry and re-index the
    /// spatial grid so cell membership always matches the last-reported
    /// position.
    pub fn apply_update(&mut self, update: &AircraftUpdate) {
        match self.aircraft.get_mut(&update.callsign) {
            Some(aircraft) => aircraft.apply(update),
            None => {
                self.aircraft
                    .insert(update.callsign.clone(), Aircraft::from_update(update));
            }
        }
        self.grid.insert(&update.callsign, update.position);
    }

    /// Drop an aircraft from the registry and index. Unknown callsigns
    /// are a no-op, matching the eventual-consistency nature of the feed.
    pub fn remove_aircraft(&mut self, callsign: &str) {
        self.aircraft.remove(callsign);
        self.grid.remove(callsign);
    }

    pub fn aircraft_count(&self) -> usize {
        self.aircraft.len()
    }

    /// Read-only snapshot of the light table.
    pub fn light_states(&self) -> &HashMap<String, LightState> {
        &self.light_states
    }

    pub fn light_state(&self, light_id: &str) -> Option<LightState> {
        self.light_states.get(light_id).copied()
    }

    pub fn zones(&self) -> &ZoneRegistry {
        &self.zones
    }

    /// Run one control cycle against the current snapshot.
    pub fn run_cycle(&mut self, now: DateTime<Utc>) -> CycleReport {
        let evicted = self.evict_stale(now);
        let occupations = self.collect_occupations();
        let pair_conflicts = self.collect_pair_conflicts();
        self.apply_light_states(&occupations, &pair_conflicts);

        if !pair_conflicts.is_empty() {
            tracing::warn!("Detected {} pair conflict(s)", pair_conflicts.len());
        }
        tracing::debug!(
            "Cycle complete: {} aircraft, {} occupation(s), {} conflict(s), {} evicted",
            self.aircraft.len(),
            occupations.len(),
            pair_conflicts.len(),
            evicted.len()
        );

        CycleReport {
            occupations,
            pair_conflicts,
            evicted,
        }
    }

    /// Evict aircraft with no update inside the staleness window.
    fn evict_stale(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let window = chrono::Duration::milliseconds((self.rules.stale_after_s * 1000.0) as i64);
        let cutoff = now - window;

        let mut stale: Vec<String> = self
            .aircraft
            .values()
            .filter(|a| a.last_update < cutoff)
            .map(|a| a.callsign.clone())
            .collect();
        stale.sort();

        for callsign in &stale {
            self.aircraft.remove(callsign);
            self.grid.remove(callsign);
            tracing::debug!("Evicted stale aircraft {}", callsign);
        }
        stale
    }

    /// Zone-occupation facts for every zone, candidate aircraft
    /// pre-filtered through the spatial grid. Facts are ordered by zone
    /// registration order, then callsign.
    fn collect_occupations(&self) -> Vec<ZoneOccupation> {
        let mut occupations = Vec::new();
        if self.aircraft.is_empty() {
            return occupations;
        }

        let horizon = self.detector.config().horizon_s;
        let max_speed = self
            .aircraft
            .values()
            .map(|a| a.velocity.speed())
            .fold(0.0, f64::max);

        for zone in self.zones.iter() {
            // Anything farther than this cannot have a trajectory sample
            // inside the zone within the horizon.
            let reach = zone.bounding_radius() + max_speed * horizon;
            let mut candidates: Vec<String> =
                self.grid.query_nearby(zone.center(), reach).into_iter().collect();
            candidates.sort();

            for callsign in candidates {
                let Some(aircraft) = self.aircraft.get(&callsign) else {
                    continue;
                };
                if let Some(entry) = self.detector.check_zone_occupation(aircraft, zone) {
                    occupations.push(ZoneOccupation {
                        zone_id: zone.id().to_string(),
                        callsign,
                        time_to_entry_s: entry.time_to_entry_s,
                    });
                }
            }
        }
        occupations
    }

    /// Pairwise conflict facts among grid-nearby aircraft. Each pair is
    /// checked once, with the lexicographically smaller callsign first.
    fn collect_pair_conflicts(&self) -> Vec<PairConflict> {
        let mut conflicts = Vec::new();
        if self.aircraft.len() < 2 {
            return conflicts;
        }

        let horizon = self.detector.config().horizon_s;
        let max_speed = self
            .aircraft
            .values()
            .map(|a| a.velocity.speed())
            .fold(0.0, f64::max);
        let max_footprint = self
            .aircraft
            .values()
            .map(Aircraft::footprint_radius)
            .fold(0.0, f64::max);

        let mut callsigns: Vec<&String> = self.aircraft.keys().collect();
        callsigns.sort();

        for callsign in callsigns {
            let a = &self.aircraft[callsign];
            let reach = 2.0 * max_footprint
                + self.detector.safety_margin_m()
                + (a.velocity.speed() + max_speed) * horizon;

            let mut nearby: Vec<String> = self
                .grid
                .query_nearby(a.position, reach)
                .into_iter()
                .filter(|other| other.as_str() > callsign.as_str())
                .collect();
            nearby.sort();

            for other in nearby {
                let Some(b) = self.aircraft.get(&other) else {
                    continue;
                };
                if self.detector.detect_pair_conflict(a, b) {
                    conflicts.push(PairConflict {
                        callsign_a: callsign.clone(),
                        callsign_b: other,
                    });
                }
            }
        }
        conflicts
    }

    /// Rebuild the light table from this cycle's facts through the
    /// injected zone→light mapping. RED when a mapped zone is occupied
    /// now, entered within `red_within_s`, or touched by a pair conflict;
    /// AMBER when entry is predicted later in the horizon; OFF otherwise.
    fn apply_light_states(&mut self, occupations: &[ZoneOccupation], conflicts: &[PairConflict]) {
        // Zones containing either party of a pair conflict go RED.
        let mut conflict_zones: HashSet<String> = HashSet::new();
        for conflict in conflicts {
            for callsign in [&conflict.callsign_a, &conflict.callsign_b] {
                if let Some(aircraft) = self.aircraft.get(callsign) {
                    for zone in self.zones.containing(aircraft.position) {
                        conflict_zones.insert(zone.id().to_string());
                    }
                }
            }
        }

        let mut earliest_entry: HashMap<&str, f64> = HashMap::new();
        for occupation in occupations {
            earliest_entry
                .entry(occupation.zone_id.as_str())
                .and_modify(|t| *t = t.min(occupation.time_to_entry_s))
                .or_insert(occupation.time_to_entry_s);
        }

        for light in &self.lights {
            let state = if conflict_zones.contains(light.zone_id.as_str()) {
                LightState::Red
            } else {
                match earliest_entry.get(light.zone_id.as_str()) {
                    Some(&t) if t <= self.rules.red_within_s => LightState::Red,
                    Some(_) => LightState::Amber,
                    None => LightState::Off,
                }
            };
            if let Some(slot) = self.light_states.get_mut(&light.id) {
                *slot = state;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Position, Velocity};
    use crate::models::{AircraftClass, LightClass};
    use crate::zones::{ProtectionZone, ZoneKind};
    use chrono::TimeZone;

    fn runway_registry() -> ZoneRegistry {
        let mut registry = ZoneRegistry::new();
        registry
            .register(
                ProtectionZone::new(
                    "RW_14R_32L",
                    ZoneKind::Runway,
                    vec![
                        Position::new(-100.0, -30.0),
                        Position::new(3300.0, -30.0),
                        Position::new(3300.0, 30.0),
                        Position::new(-100.0, 30.0),
                    ],
                    Some("14R/32L".to_string()),
                )
                .unwrap(),
            )
            .unwrap();
        registry
    }

    fn rel_light(id: &str) -> LightConfig {
        LightConfig {
            id: id.to_string(),
            class: LightClass::Rel,
            zone_id: "RW_14R_32L".to_string(),
            runway_id: Some("14R/32L".to_string()),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn update(callsign: &str, x: f64, y: f64, vx: f64, vy: f64) -> AircraftUpdate {
        AircraftUpdate {
            callsign: callsign.to_string(),
            position: Position::new(x, y),
            velocity: Velocity::new(vx, vy),
            class: AircraftClass::Medium,
            wingspan_m: 30.0,
            length_m: 40.0,
            timestamp: now(),
        }
    }

    fn controller() -> LightController {
        LightController::new(
            runway_registry(),
            vec![rel_light("REL_B1_001"), rel_light("REL_B1_002")],
            ControlRules::default(),
        )
        .unwrap()
    }

    #[test]
    fn rejects_light_mapped_to_unknown_zone() {
        let mut light = rel_light("REL_X_001");
        light.zone_id = "NOPE".to_string();
        let err =
            LightController::new(runway_registry(), vec![light], ControlRules::default())
                .unwrap_err();
        assert!(matches!(err, ControllerError::UnknownZone { .. }));
    }

    #[test]
    fn rejects_duplicate_light_ids() {
        let err = LightController::new(
            runway_registry(),
            vec![rel_light("REL_B1_001"), rel_light("REL_B1_001")],
            ControlRules::default(),
        )
        .unwrap_err();
        assert!(matches!(err, ControllerError::DuplicateLight(_)));
    }

    #[test]
    fn lights_start_off_and_key_set_is_fixed() {
        let mut controller = controller();
        assert_eq!(controller.light_states().len(), 2);
        assert!(controller
            .light_states()
            .values()
            .all(|&s| s == LightState::Off));

        controller.run_cycle(now());
        assert_eq!(controller.light_states().len(), 2);
    }

    #[test]
    fn occupied_runway_turns_lights_red() {
        let mut controller = controller();
        controller.apply_update(&update("HL7501", 800.0, 0.0, 60.0, 0.0));

        let report = controller.run_cycle(now());
        assert_eq!(report.occupations.len(), 1);
        assert_eq!(report.occupations[0].time_to_entry_s, 0.0);
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Red));
        assert_eq!(controller.light_state("REL_B1_002"), Some(LightState::Red));
    }

    #[test]
    fn distant_approach_turns_lights_amber_then_red() {
        let mut controller = controller();
        // 230 m south of the runway edge at 10 m/s: entry near t=23,
        // beyond red_within_s (10 s) but inside the horizon.
        controller.apply_update(&update("HL7502", 800.0, -260.0, 0.0, 10.0));
        controller.run_cycle(now());
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Amber));

        // Closer in, entry drops under the RED cutoff.
        let mut closer = update("HL7502", 800.0, -80.0, 0.0, 10.0);
        closer.timestamp = now() + chrono::Duration::seconds(1);
        controller.apply_update(&closer);
        controller.run_cycle(now() + chrono::Duration::seconds(1));
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Red));
    }

    #[test]
    fn lights_return_to_off_when_traffic_clears() {
        let mut controller = controller();
        controller.apply_update(&update("HL7503", 800.0, 0.0, 60.0, 0.0));
        controller.run_cycle(now());
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Red));

        controller.remove_aircraft("HL7503");
        let report = controller.run_cycle(now());
        assert!(report.occupations.is_empty());
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Off));
    }

    #[test]
    fn pair_conflict_on_the_runway_forces_red() {
        let mut controller = controller();
        // Head-on on the runway centerline, conflict within the horizon.
        controller.apply_update(&update("HL7504", 500.0, 0.0, 50.0, 0.0));
        controller.apply_update(&update("HL7505", 700.0, 0.0, -50.0, 0.0));

        let report = controller.run_cycle(now());
        assert_eq!(report.pair_conflicts.len(), 1);
        assert_eq!(report.pair_conflicts[0].callsign_a, "HL7504");
        assert_eq!(report.pair_conflicts[0].callsign_b, "HL7505");
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Red));
    }

    #[test]
    fn stale_aircraft_are_evicted_before_the_cycle() {
        let mut controller = controller();
        controller.apply_update(&update("HL7506", 800.0, 0.0, 0.0, 0.0));

        // 30 s without an update, well past the 10 s window.
        let later = now() + chrono::Duration::seconds(30);
        let report = controller.run_cycle(later);

        assert_eq!(report.evicted, vec!["HL7506".to_string()]);
        assert_eq!(controller.aircraft_count(), 0);
        assert!(report.occupations.is_empty());
        assert_eq!(controller.light_state("REL_B1_001"), Some(LightState::Off));
    }

    #[test]
    fn unknown_callsign_removal_is_a_noop() {
        let mut controller = controller();
        controller.remove_aircraft("NOPE99");
        assert_eq!(controller.aircraft_count(), 0);
    }

    #[test]
    fn repeated_updates_overwrite_in_place() {
        let mut controller = controller();
        controller.apply_update(&update("HL7507", 0.0, -500.0, 0.0, 0.0));
        controller.apply_update(&update("HL7507", 800.0, 0.0, 60.0, 0.0));
        assert_eq!(controller.aircraft_count(), 1);

        let report = controller.run_cycle(now());
        assert_eq!(report.occupations.len(), 1);
        assert_eq!(report.occupations[0].callsign, "HL7507");
    }
}
