//! core/grid.rs — Fixed-capacity hex grid with walking cursors.
//!
//! The backing store is a square `SIDE x SIDE` array covering every axial
//! coordinate with `|q|, |r| <= MAX_RADIUS`. Only the hexagon of
//! `used_radius` is live; shrinking it never touches cell contents.

use rand::Rng;

use crate::core::cell::Cell;
use crate::core::cursor::{Cursor, default_start};
use crate::core::hex::{Direction, HexCoord, is_visible};

pub const MIN_RADIUS: i32 = 1;
pub const MAX_RADIUS: i32 = 16;
pub const DEFAULT_RADIUS: i32 = 4;
/// Row length of the backing array.
pub const SIDE: usize = (2 * MAX_RADIUS + 1) as usize;
pub const CELL_COUNT: usize = SIDE * SIDE;

/// Mirror-wrap passes before falling back to a radial clamp.
const MAX_WRAP_PASSES: usize = 64;

#[inline]
pub fn clamp_radius(radius: i64) -> i32 {
    radius.clamp(MIN_RADIUS as i64, MAX_RADIUS as i64) as i32
}

/// Backing-array offset for `coord`, if it is addressable at all.
#[inline]
pub fn cell_index(coord: HexCoord) -> Option<usize> {
    let q = coord.q + MAX_RADIUS;
    let r = coord.r + MAX_RADIUS;
    if q < 0 || r < 0 || q as usize >= SIDE || r as usize >= SIDE {
        return None;
    }
    Some(q as usize * SIDE + r as usize)
}

/// Inverse of [`cell_index`].
#[inline]
pub fn index_coord(index: usize) -> HexCoord {
    let q = (index / SIDE) as i32 - MAX_RADIUS;
    let r = (index % SIDE) as i32 - MAX_RADIUS;
    HexCoord::new(q, r)
}

/// Tile centres of the hexagonal torus for a hexagon of `radius`.
fn mirror_centres(radius: i32) -> [HexCoord; 6] {
    let a = HexCoord::new(2 * radius + 1, -radius);
    let b = HexCoord::new(radius, radius + 1);
    let c = HexCoord::new(-radius - 1, 2 * radius + 1);
    [a, b, c, -a, -b, -c]
}

/// Re-enters `coord` through the opposite edge of a hexagon of `radius`.
/// Coordinates already inside are returned unchanged.
pub fn wrap_coord(coord: HexCoord, radius: i32) -> HexCoord {
    let radius = radius.max(0);
    let mut c = coord;
    for _ in 0..MAX_WRAP_PASSES {
        if is_visible(c, radius) {
            return c;
        }
        let mut best = c;
        let mut best_ring = c.ring();
        for centre in mirror_centres(radius) {
            let candidate = c - centre;
            let ring = candidate.ring();
            if ring < best_ring {
                best = candidate;
                best_ring = ring;
            }
        }
        if best == c {
            break;
        }
        c = best;
    }
    if is_visible(c, radius) {
        c
    } else {
        clamp_to_ring(c, radius)
    }
}

/// Pulls `coord` radially inwards until it sits inside `radius`.
pub fn clamp_to_ring(coord: HexCoord, radius: i32) -> HexCoord {
    let ring = coord.ring();
    if ring <= radius {
        return coord;
    }
    let t = radius as f32 / ring as f32;
    let mut c = cube_round(coord.q as f32 * t, coord.r as f32 * t);
    while c.ring() > radius {
        c = HexCoord::new(c.q - c.q.signum(), c.r - c.r.signum());
    }
    c
}

fn cube_round(qf: f32, rf: f32) -> HexCoord {
    let sf = -qf - rf;
    let mut q = qf.round();
    let mut r = rf.round();
    let s = sf.round();
    let dq = (q - qf).abs();
    let dr = (r - rf).abs();
    let ds = (s - sf).abs();
    if dq > dr && dq > ds {
        q = -r - s;
    } else if dr > ds {
        r = -q - s;
    }
    HexCoord::new(q as i32, r as i32)
}

/// Hex grid state shared by `N` cursors.
#[derive(Clone, Debug)]
pub struct HexGrid<const N: usize> {
    cells: Box<[Cell]>,
    used_radius: i32,
    pub cursors: [Cursor; N],
}

impl<const N: usize> HexGrid<N> {
    pub fn new(radius: i32) -> Self {
        let used_radius = clamp_radius(radius as i64);
        let cursors = std::array::from_fn(|i| Cursor::at_default(i, N, used_radius));
        Self {
            cells: vec![Cell::SILENT; CELL_COUNT].into_boxed_slice(),
            used_radius,
            cursors,
        }
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.used_radius
    }

    #[inline]
    pub fn is_visible(&self, coord: HexCoord) -> bool {
        is_visible(coord, self.used_radius)
    }

    /// Writes a cell; ignored outside the backing array but allowed outside
    /// the active radius.
    pub fn set_cell(&mut self, coord: HexCoord, cell: Cell) {
        if let Some(i) = cell_index(coord) {
            self.cells[i] = Cell::new(cell.mode, cell.level);
        }
    }

    pub fn get_cell(&self, coord: HexCoord) -> Cell {
        cell_index(coord)
            .map(|i| self.cells[i])
            .unwrap_or_default()
    }

    /// Backing array in q-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Clamps and applies a new active radius. Cell contents are untouched.
    pub fn set_radius(&mut self, radius: i32) -> i32 {
        self.used_radius = clamp_radius(radius as i64);
        self.used_radius
    }

    /// One hex step for cursor `id` towards `dir`, wrapping at the edge.
    pub fn move_cursor(&mut self, id: usize, dir: Direction) {
        let radius = self.used_radius;
        let Some(cursor) = self.cursors.get_mut(id) else {
            return;
        };
        let clockwise = !cursor.diagonal_state;
        cursor.pos = cursor.pos.step(dir, clockwise);
        if dir.is_diagonal() {
            cursor.diagonal_state = !cursor.diagonal_state;
        }
        if !is_visible(cursor.pos, radius) {
            self.wrap_cursor(id);
        }
    }

    /// Brings cursor `id` back onto the live hexagon. Facing is kept.
    pub fn wrap_cursor(&mut self, id: usize) {
        let radius = self.used_radius;
        if let Some(cursor) = self.cursors.get_mut(id) {
            cursor.pos = wrap_coord(cursor.pos, radius);
        }
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::SILENT);
    }

    /// Re-rolls every cell inside the maximum hexagon.
    pub fn randomize<R: Rng + ?Sized>(&mut self, rng: &mut R, use_random: bool) {
        for (i, cell) in self.cells.iter_mut().enumerate() {
            if is_visible(index_coord(i), MAX_RADIUS) {
                *cell = Cell::random(rng, use_random);
            }
        }
    }

    /// Applies a new radius, re-seats every start position on the new edge
    /// and wraps live positions that fell outside. Returns `false` when the
    /// radius did not change.
    pub fn resize(&mut self, radius: i32) -> bool {
        let radius = clamp_radius(radius as i64);
        if radius == self.used_radius {
            return false;
        }
        self.used_radius = radius;
        for id in 0..N {
            self.cursors[id].start_pos = default_start(id, N, radius);
            if !is_visible(self.cursors[id].pos, radius) {
                self.wrap_cursor(id);
            }
        }
        true
    }
}

impl<const N: usize> Default for HexGrid<N> {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS)
    }
}
