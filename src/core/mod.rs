//! Grid model: coordinates, cells, cursors and the sample clock.

pub mod cell;
pub mod cursor;
pub mod grid;
pub mod hex;
pub mod timebase;
