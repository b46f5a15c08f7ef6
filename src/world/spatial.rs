//! Uniform XZ spatial hash for static obstacles (broad phase).
//!
//! Each obstacle is inserted into every cell its bounding circle overlaps, so
//! a query only has to visit the cells covered by the query circle. Results
//! are candidates: callers always re-test exact geometry.

use hecs::Entity;
use rustc_hash::FxHashMap;

pub struct SpatialHashGrid {
    pub cell_size: f32,
    cells: FxHashMap<(i32, i32), Vec<Entity>>,
    len: usize,
}

impl SpatialHashGrid {
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            16.0
        };
        Self {
            cell_size,
            cells: FxHashMap::default(),
            len: 0,
        }
    }

    fn cell_coord(&self, v: f32) -> i32 {
        (v / self.cell_size).floor() as i32
    }

    /// Insert `entity` with a footprint of `radius` around `(x, z)`.
    pub fn insert(&mut self, entity: Entity, x: f32, z: f32, radius: f32) {
        let radius = radius.max(0.0);
        let (x0, x1) = (self.cell_coord(x - radius), self.cell_coord(x + radius));
        let (z0, z1) = (self.cell_coord(z - radius), self.cell_coord(z + radius));
        for cx in x0..=x1 {
            for cz in z0..=z1 {
                self.cells.entry((cx, cz)).or_default().push(entity);
            }
        }
        self.len += 1;
    }

    /// Write candidates near `(x, z)` within `radius` into `buf` (cleared first).
    /// An obstacle spanning several visited cells is reported once.
    pub fn query_into(&self, x: f32, z: f32, radius: f32, buf: &mut Vec<Entity>) {
        buf.clear();
        let radius = radius.max(0.0);
        let (x0, x1) = (self.cell_coord(x - radius), self.cell_coord(x + radius));
        let (z0, z1) = (self.cell_coord(z - radius), self.cell_coord(z + radius));
        for cx in x0..=x1 {
            for cz in z0..=z1 {
                if let Some(ids) = self.cells.get(&(cx, cz)) {
                    buf.extend_from_slice(ids);
                }
            }
        }
        if x1 > x0 || z1 > z0 {
            buf.sort_unstable();
            buf.dedup();
        }
    }

    pub fn query(&self, x: f32, z: f32, radius: f32) -> Vec<Entity> {
        let mut buf = Vec::new();
        self.query_into(x, z, radius, &mut buf);
        buf
    }

    /// Number of obstacles inserted (not cell entries).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }
}
