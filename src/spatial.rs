//! Spatial hash grid for amortized O(1) proximity lookups.

use std::collections::{HashMap, HashSet};

use crate::geometry::Position;

/// Default grid cell edge in meters.
pub const DEFAULT_CELL_SIZE_M: f64 = 50.0;

/// Grid-bucketed index of aircraft callsigns.
///
/// Cells are created lazily on first insertion and never destroyed.
/// Stale empty cells persist, but the live entry count is bounded by the
/// number of tracked aircraft rather than the airport footprint, so this
/// is a deliberate memory-for-simplicity tradeoff.
#[derive(Debug)]
pub struct SpatialHashGrid {
    cell_size_m: f64,
    cells: HashMap<(i64, i64), HashSet<String>>,
    /// Last cell each callsign was indexed into, so removal does not
    /// depend on the caller still knowing the old position.
    indexed_cells: HashMap<String, (i64, i64)>,
}

impl Default for SpatialHashGrid {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE_M)
    }
}

impl SpatialHashGrid {
    pub fn new(cell_size_m: f64) -> Self {
        Self {
            cell_size_m: cell_size_m.max(1.0),
            cells: HashMap::new(),
            indexed_cells: HashMap::new(),
        }
    }

    /// Cell key for a position: floor-divided coordinates.
    pub fn cell_index(&self, position: Position) -> (i64, i64) {
        (
            (position.x / self.cell_size_m).floor() as i64,
            (position.y / self.cell_size_m).floor() as i64,
        )
    }

    /// Index a callsign at `position`, moving it out of its previous cell
    /// first. Re-inserting the same callsign is the update path.
    pub fn insert(&mut self, callsign: &str, position: Position) {
        self.remove(callsign);
        let cell = self.cell_index(position);
        self.cells.entry(cell).or_default().insert(callsign.to_string());
        self.indexed_cells.insert(callsign.to_string(), cell);
    }

    /// Remove a callsign from its last-indexed cell. Unknown callsigns
    /// are a no-op.
    pub fn remove(&mut self, callsign: &str) {
        if let Some(cell) = self.indexed_cells.remove(callsign) {
            if let Some(members) = self.cells.get_mut(&cell) {
                members.remove(callsign);
            }
        }
    }

    /// Callsigns in the cell neighborhood covering `radius_m` around
    /// `position`.
    ///
    /// Scans the `(2r+1)²` cells with `r = ceil(radius / cell_size)` and
    /// unions their members. The result is a superset of the aircraft
    /// truly within the radius; callers re-filter by exact distance when
    /// they need a circle instead of cell granularity.
    pub fn query_nearby(&self, position: Position, radius_m: f64) -> HashSet<String> {
        let mut found = HashSet::new();
        if !radius_m.is_finite() || radius_m < 0.0 {
            return found;
        }

        let cell_radius = (radius_m / self.cell_size_m).ceil() as i64;
        let (cx, cy) = self.cell_index(position);
        for dx in -cell_radius..=cell_radius {
            for dy in -cell_radius..=cell_radius {
                if let Some(members) = self.cells.get(&(cx + dx, cy + dy)) {
                    found.extend(members.iter().cloned());
                }
            }
        }
        found
    }

    /// Number of indexed callsigns.
    pub fn len(&self) -> usize {
        self.indexed_cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed_cells.is_empty()
    }

    /// Occupancy statistics over the allocated cells.
    pub fn statistics(&self) -> GridStatistics {
        let max_per_cell = self.cells.values().map(HashSet::len).max().unwrap_or(0);
        GridStatistics {
            allocated_cells: self.cells.len(),
            indexed_aircraft: self.indexed_cells.len(),
            max_per_cell,
        }
    }
}

/// Snapshot of grid occupancy, for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridStatistics {
    pub allocated_cells: usize,
    pub indexed_aircraft: usize,
    pub max_per_cell: usize,
}
