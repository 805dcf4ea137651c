//! core/hex.rs — Axial hex coordinates and the 12-way compass.
//!
//! Layout is pointy-top. `q` runs along the columns (east is +q), `r` along
//! the rows (south is +r). The third cube axis is implied as `-q - r`.
//!
//! ```text
//!            (0,-1)   (+1,-1)
//!       (-1,0)    (0,0)    (+1,0)
//!            (-1,+1)  (0,+1)
//! ```

use serde::{Deserialize, Serialize};

/// Axial hex coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub const ORIGIN: HexCoord = HexCoord { q: 0, r: 0 };

    #[inline]
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// Implied third cube axis.
    #[inline]
    pub const fn s(self) -> i32 {
        -self.q - self.r
    }

    /// Hex distance from the origin (ring index).
    #[inline]
    pub fn ring(self) -> i32 {
        self.q.abs().max(self.r.abs()).max((self.q + self.r).abs())
    }

    #[inline]
    pub fn distance(self, other: HexCoord) -> i32 {
        (self - other).ring()
    }

    /// One step towards the true neighbour in `dir`. Diagonal directions
    /// resolve through [`Direction::neighbour_vec`].
    #[inline]
    pub fn step(self, dir: Direction, clockwise: bool) -> HexCoord {
        self + dir.neighbour_vec(clockwise)
    }
}

impl std::ops::Add for HexCoord {
    type Output = HexCoord;

    #[inline]
    fn add(self, rhs: HexCoord) -> HexCoord {
        HexCoord::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl std::ops::Sub for HexCoord {
    type Output = HexCoord;

    #[inline]
    fn sub(self, rhs: HexCoord) -> HexCoord {
        HexCoord::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl std::ops::Neg for HexCoord {
    type Output = HexCoord;

    #[inline]
    fn neg(self) -> HexCoord {
        HexCoord::new(-self.q, -self.r)
    }
}

/// Containment predicate: `true` iff `coord` lies inside a hexagon of `radius`.
#[inline]
pub fn is_visible(coord: HexCoord, radius: i32) -> bool {
    coord.ring() <= radius
}

/// Number of compass ticks in a full turn (30 degrees each).
pub const COMPASS_TICKS: u8 = 12;

/// Axial offsets of the six true neighbours, indexed by `odd_tick / 2`.
const NEIGHBOURS: [HexCoord; 6] = [
    HexCoord::new(1, -1), // 1 o'clock
    HexCoord::new(1, 0),  // 3 o'clock
    HexCoord::new(0, 1),  // 5 o'clock
    HexCoord::new(-1, 1), // 7 o'clock
    HexCoord::new(-1, 0), // 9 o'clock
    HexCoord::new(0, -1), // 11 o'clock
];

/// Facing on a 12-way compass: 0 is 12 o'clock, ticks run clockwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Direction(u8);

impl Direction {
    pub const TWELVE: Direction = Direction(0);
    pub const ONE: Direction = Direction(1);

    /// Wraps any integer into `0..12`.
    #[inline]
    pub fn from_ticks(ticks: i64) -> Self {
        Direction(ticks.rem_euclid(COMPASS_TICKS as i64) as u8)
    }

    #[inline]
    pub fn ticks(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn rotate(self, ticks: u8) -> Self {
        Direction((self.0 + ticks % COMPASS_TICKS) % COMPASS_TICKS)
    }

    /// Even ticks sit between two true neighbours.
    #[inline]
    pub fn is_diagonal(self) -> bool {
        self.0 % 2 == 0
    }

    /// Axial step for this facing. For a diagonal facing `clockwise` picks the
    /// neighbour one tick clockwise, otherwise the one anticlockwise.
    pub fn neighbour_vec(self, clockwise: bool) -> HexCoord {
        let tick = if self.is_diagonal() {
            if clockwise {
                self.rotate(1).0
            } else {
                self.rotate(COMPASS_TICKS - 1).0
            }
        } else {
            self.0
        };
        NEIGHBOURS[(tick / 2) as usize]
    }
}
