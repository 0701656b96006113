//! Spatial hash grid for pointer hit testing on the canvas.
//!
//! Divides the canvas into uniform cells; each module is registered in every
//! cell its rectangle touches. A point query only inspects the cell under
//! the point, so cost does not grow with the number of modules.
//!
//! Entries are keyed by render slot (index into the frame's module list).
//! Later slots paint over earlier ones, so the highest matching slot wins.

use rustc_hash::FxHashMap;

use crate::engine::{Geometry, LayoutConfig};

// ───────────────────────────────────────────────────────────────────
// Aabb
// ───────────────────────────────────────────────────────────────────

/// Axis-aligned bounding box stored as min/max corners.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Aabb {
    #[inline]
    pub fn from_rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    #[inline]
    pub fn from_geometry(geometry: &Geometry) -> Self {
        Self::from_rect(
            geometry.x as f32,
            geometry.y as f32,
            geometry.width as f32,
            geometry.height as f32,
        )
    }

    /// Inclusive point test.
    #[inline]
    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.min_x && px <= self.max_x && py >= self.min_y && py <= self.max_y
    }
}

// ───────────────────────────────────────────────────────────────────
// Hit classification
// ───────────────────────────────────────────────────────────────────

/// Part of a module card under the pointer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitRegion {
    /// Drag handle: starts a free-mode move.
    Header,
    /// Bottom-right square: starts a resize.
    ResizeHandle,
    /// Content area: inline editing, no gesture.
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hit {
    pub slot: usize,
    pub region: HitRegion,
}

/// Which region of `geometry` the point falls in. The resize handle takes
/// precedence over the header on cards too short to separate them.
pub fn classify(geometry: &Geometry, px: f32, py: f32, config: &LayoutConfig) -> HitRegion {
    let handle = config.resize_handle as f32;
    let right = geometry.right() as f32;
    let bottom = geometry.bottom() as f32;
    if px >= right - handle && py >= bottom - handle {
        HitRegion::ResizeHandle
    } else if py <= geometry.y as f32 + config.header_height as f32 {
        HitRegion::Header
    } else {
        HitRegion::Body
    }
}

// ───────────────────────────────────────────────────────────────────
// SpatialIndex
// ───────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct CellKey(i32, i32);

/// Grid-based spatial hash over module rectangles.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    inv_cell_size: f32,
    grid: FxHashMap<CellKey, Vec<usize>>,
    bounds: Vec<Aabb>,
    geometry: Vec<Geometry>,
}

impl SpatialIndex {
    /// Default cell side; roughly one small module.
    pub const CELL_SIZE: f32 = 256.0;

    pub fn new(cell_size: f32) -> Self {
        assert!(cell_size > 0.0, "cell_size must be positive");
        Self {
            inv_cell_size: 1.0 / cell_size,
            grid: FxHashMap::default(),
            bounds: Vec::new(),
            geometry: Vec::new(),
        }
    }

    /// Index a frame's geometry; slot `i` is `geometry[i]`.
    pub fn build(geometry: &[Geometry]) -> Self {
        let mut index = Self::new(Self::CELL_SIZE);
        for rect in geometry {
            index.push(*rect);
        }
        index
    }

    #[inline]
    fn to_cell(&self, x: f32, y: f32) -> CellKey {
        CellKey(
            (x * self.inv_cell_size).floor() as i32,
            (y * self.inv_cell_size).floor() as i32,
        )
    }

    /// Append the next slot.
    pub fn push(&mut self, geometry: Geometry) -> usize {
        let slot = self.bounds.len();
        let aabb = Aabb::from_geometry(&geometry);
        let min = self.to_cell(aabb.min_x, aabb.min_y);
        let max = self.to_cell(aabb.max_x, aabb.max_y);
        for cx in min.0..=max.0 {
            for cy in min.1..=max.1 {
                self.grid.entry(CellKey(cx, cy)).or_default().push(slot);
            }
        }
        self.bounds.push(aabb);
        self.geometry.push(geometry);
        slot
    }

    /// Topmost slot whose rectangle contains the point.
    pub fn slot_at(&self, px: f32, py: f32) -> Option<usize> {
        let ids = self.grid.get(&self.to_cell(px, py))?;
        ids.iter()
            .rev()
            .copied()
            .find(|&slot| self.bounds[slot].contains(px, py))
    }

    /// Topmost module under the point and the card region that was hit.
    pub fn hit_test(&self, px: f32, py: f32, config: &LayoutConfig) -> Option<Hit> {
        let slot = self.slot_at(px, py)?;
        Some(Hit {
            slot,
            region: classify(&self.geometry[slot], px, py, config),
        })
    }

    pub fn len(&self) -> usize {
        self.bounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bounds.is_empty()
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aabb_contains_edges() {
        let b = Aabb::from_rect(0.0, 0.0, 100.0, 100.0);
        assert!(b.contains(0.0, 0.0));
        assert!(b.contains(100.0, 100.0));
        assert!(!b.contains(100.1, 50.0));
    }

    #[test]
    fn test_empty_index_misses() {
        let index = SpatialIndex::build(&[]);
        assert!(index.is_empty());
        assert_eq!(index.slot_at(10.0, 10.0), None);
    }

    #[test]
    #[should_panic]
    fn test_zero_cell_size_panics() {
        let _ = SpatialIndex::new(0.0);
    }

    #[test]
    fn test_slot_lookup() {
        let index = SpatialIndex::build(&[
            Geometry::new(20, 20, 360, 260),
            Geometry::new(400, 20, 360, 260),
        ]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.slot_at(100.0, 100.0), Some(0));
        assert_eq!(index.slot_at(500.0, 100.0), Some(1));
        assert_eq!(index.slot_at(390.0, 100.0), None);
    }

    #[test]
    fn test_overlap_prefers_later_slot() {
        let index = SpatialIndex::build(&[
            Geometry::new(0, 0, 400, 400),
            Geometry::new(200, 200, 400, 400),
        ]);
        assert_eq!(index.slot_at(300.0, 300.0), Some(1));
        assert_eq!(index.slot_at(50.0, 50.0), Some(0));
    }

    #[test]
    fn test_large_rect_spanning_many_cells() {
        let index = SpatialIndex::build(&[Geometry::new(0, 0, 2000, 2000)]);
        assert_eq!(index.slot_at(1900.0, 1900.0), Some(0));
    }

    #[test]
    fn test_regions() {
        let config = LayoutConfig::default();
        let index = SpatialIndex::build(&[Geometry::new(20, 20, 360, 260)]);

        let header = index.hit_test(100.0, 30.0, &config).unwrap();
        assert_eq!(header.region, HitRegion::Header);

        let body = index.hit_test(100.0, 150.0, &config).unwrap();
        assert_eq!(body.region, HitRegion::Body);

        let handle = index.hit_test(375.0, 275.0, &config).unwrap();
        assert_eq!(handle.region, HitRegion::ResizeHandle);
    }
}
