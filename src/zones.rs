//! Protection zones: runway, taxiway and intersection polygons.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{point_in_polygon, Position};

#[derive(Debug, Error, PartialEq)]
pub enum ZoneError {
    #[error("zone {id}: polygon needs at least 3 vertices, got {count}")]
    DegeneratePolygon { id: String, count: usize },
    #[error("zone {id}: polygon vertex {index} is not finite")]
    NonFiniteVertex { id: String, index: usize },
    #[error("zone {0} is already registered")]
    DuplicateZone(String),
}

/// Kind of protected surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneKind {
    Runway,
    Taxiway,
    Intersection,
}

/// One record of the externally-loaded zone catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZoneDef {
    pub zone_id: String,
    pub zone_type: ZoneKind,
    pub polygon: Vec<Position>,
    #[serde(default)]
    pub runway_id: Option<String>,
}

/// A polygonal protected area in the local planar frame.
///
/// Construction validates the polygon, so a zone that exists always has a
/// meaningful containment test. Zones are static for the lifetime of the
/// controller.
#[derive(Debug, Clone, Serialize)]
pub struct ProtectionZone {
    id: String,
    kind: ZoneKind,
    polygon: Vec<Position>,
    runway_id: Option<String>,
}

impl ProtectionZone {
    /// Build a zone, rejecting degenerate polygons here rather than
    /// letting a broken zone silently never match.
    pub fn new(
        id: impl Into<String>,
        kind: ZoneKind,
        polygon: Vec<Position>,
        runway_id: Option<String>,
    ) -> Result<Self, ZoneError> {
        let id = id.into();
        if polygon.len() < 3 {
            return Err(ZoneError::DegeneratePolygon {
                id,
                count: polygon.len(),
            });
        }
        if let Some(index) = polygon
            .iter()
            .position(|v| !v.x.is_finite() || !v.y.is_finite())
        {
            return Err(ZoneError::NonFiniteVertex { id, index });
        }
        Ok(Self {
            id,
            kind,
            polygon,
            runway_id,
        })
    }

    pub fn from_def(def: ZoneDef) -> Result<Self, ZoneError> {
        Self::new(def.zone_id, def.zone_type, def.polygon, def.runway_id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> ZoneKind {
        self.kind
    }

    pub fn runway_id(&self) -> Option<&str> {
        self.runway_id.as_deref()
    }

    pub fn polygon(&self) -> &[Position] {
        &self.polygon
    }

    /// Even-odd containment; boundary points are implementation-defined.
    pub fn contains(&self, point: Position) -> bool {
        point_in_polygon(point, &self.polygon)
    }

    /// Vertex centroid, the anchor for proximity queries.
    pub fn center(&self) -> Position {
        let n = self.polygon.len() as f64;
        let (sx, sy) = self
            .polygon
            .iter()
            .fold((0.0, 0.0), |acc, v| (acc.0 + v.x, acc.1 + v.y));
        Position::new(sx / n, sy / n)
    }

    /// Radius of the circle around `center()` covering every vertex.
    pub fn bounding_radius(&self) -> f64 {
        let center = self.center();
        self.polygon
            .iter()
            .map(|v| center.distance_to(v))
            .fold(0.0, f64::max)
    }
}

/// Static lookup from zone id to zone, loaded once at startup.
/// Iteration follows registration order.
#[derive(Debug, Default)]
pub struct ZoneRegistry {
    zones: Vec<ProtectionZone>,
    by_id: HashMap<String, usize>,
}

impl ZoneRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from a zone catalog, rejecting the whole catalog
    /// on the first malformed or duplicate entry.
    pub fn from_catalog(defs: Vec<ZoneDef>) -> Result<Self, ZoneError> {
        let mut registry = Self::new();
        for def in defs {
            registry.register(ProtectionZone::from_def(def)?)?;
        }
        Ok(registry)
    }

    pub fn register(&mut self, zone: ProtectionZone) -> Result<(), ZoneError> {
        if self.by_id.contains_key(zone.id()) {
            return Err(ZoneError::DuplicateZone(zone.id().to_string()));
        }
        self.by_id.insert(zone.id().to_string(), self.zones.len());
        self.zones.push(zone);
        Ok(())
    }

    pub fn get(&self, zone_id: &str) -> Option<&ProtectionZone> {
        self.by_id.get(zone_id).map(|&i| &self.zones[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ProtectionZone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// Zones whose polygon contains `point`.
    pub fn containing(&self, point: Position) -> impl Iterator<Item = &ProtectionZone> {
        self.zones.iter().filter(move |z| z.contains(point))
    }
}
