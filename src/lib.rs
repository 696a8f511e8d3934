//! Core algorithm for a runway status light (RWSL) system.
//!
//! Given live aircraft position/velocity updates, the crate predicts
//! short-horizon trajectories, detects conflicts between aircraft and
//! protected airport surfaces (runways, taxiways, intersections) and
//! drives a REL/THL light-state table — the automation equivalent of
//! traffic signals at runway/taxiway crossings.
//!
//! Feed parsing, coordinate conversion and light rendering live outside
//! this crate; it consumes already-projected planar updates plus static
//! zone and light catalogs, and exposes the light table and per-cycle
//! conflict facts.

pub mod conflict;
pub mod controller;
pub mod geometry;
pub mod models;
pub mod predict;
pub mod rules;
pub mod spatial;
pub mod zones;

pub use conflict::{ConflictDetector, ZoneEntry, DEFAULT_SAFETY_MARGIN_M};
pub use controller::{
    ControllerError, CycleReport, LightController, PairConflict, ZoneOccupation,
};
pub use geometry::{point_in_polygon, Aabb, Position, Velocity};
pub use models::{
    Aircraft, AircraftClass, AircraftUpdate, LightClass, LightConfig, LightState,
};
pub use predict::{PredictError, PredictionConfig, Trajectory};
pub use rules::ControlRules;
pub use spatial::{GridStatistics, SpatialHashGrid, DEFAULT_CELL_SIZE_M};
pub use zones::{ProtectionZone, ZoneDef, ZoneError, ZoneKind, ZoneRegistry};
