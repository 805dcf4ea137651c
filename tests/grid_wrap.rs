use std::collections::HashSet;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use hivewalk::core::cell::{Cell, CellMode};
use hivewalk::core::grid::{HexGrid, MAX_RADIUS, MIN_RADIUS, wrap_coord};
use hivewalk::core::hex::{Direction, HexCoord, is_visible};
use hivewalk::engine::hive::{EngineParams, HiveEngine};

#[test]
fn random_walks_never_leave_the_hexagon() {
    let mut rng = SmallRng::seed_from_u64(0xC0FFEE);
    for radius in MIN_RADIUS..=MAX_RADIUS {
        let mut grid = HexGrid::<1>::new(radius);
        for _ in 0..2_000 {
            let dir = Direction::from_ticks(rng.random_range(0..12));
            grid.move_cursor(0, dir);
            let pos = grid.cursors[0].pos;
            assert!(is_visible(pos, radius), "radius {radius} pos {pos:?}");
        }
    }
}

#[test]
fn straight_line_visits_every_cell_once_per_lap() {
    // On the hexagonal torus a true direction generates the whole grid, so
    // one lap is exactly the cell count 3R^2 + 3R + 1.
    for radius in MIN_RADIUS..=8 {
        let cells = (3 * radius * radius + 3 * radius + 1) as usize;
        for tick in (1..12).step_by(2) {
            let mut grid = HexGrid::<1>::new(radius);
            grid.cursors[0].pos = HexCoord::ORIGIN;
            let dir = Direction::from_ticks(tick);
            let mut seen = HashSet::new();
            for _ in 0..cells {
                grid.move_cursor(0, dir);
                assert!(seen.insert(grid.cursors[0].pos), "radius {radius} tick {tick}");
            }
            assert_eq!(grid.cursors[0].pos, HexCoord::ORIGIN, "radius {radius} tick {tick}");
            assert_eq!(seen.len(), cells);
        }
    }
}

#[test]
fn edge_exit_and_return_for_all_radii() {
    for radius in MIN_RADIUS..=MAX_RADIUS {
        for q in -radius..=radius {
            for r in -radius..=radius {
                let home = HexCoord::new(q, r);
                if home.ring() != radius {
                    continue;
                }
                for tick in (1..12).step_by(2) {
                    let dir = Direction::from_ticks(tick);
                    let out = wrap_coord(home.step(dir, true), radius);
                    assert!(is_visible(out, radius));
                    let back = wrap_coord(out.step(dir.rotate(6), true), radius);
                    assert_eq!(back, home, "radius {radius} home {home:?} tick {tick}");
                }
            }
        }
    }
}

#[test]
fn wrap_leaves_visible_coordinates_alone() {
    for radius in MIN_RADIUS..=MAX_RADIUS {
        for q in -radius..=radius {
            for r in -radius..=radius {
                let c = HexCoord::new(q, r);
                if c.ring() <= radius {
                    assert_eq!(wrap_coord(c, radius), c, "radius {radius}");
                }
            }
        }
    }

    let mut grid = HexGrid::<2>::new(5);
    let inside = [HexCoord::new(3, -5), HexCoord::new(-2, 1)];
    for (id, pos) in inside.into_iter().enumerate() {
        grid.cursors[id].pos = pos;
        grid.wrap_cursor(id);
        assert_eq!(grid.cursors[id].pos, pos);
    }
}

#[test]
fn diagonal_facing_alternates_neighbours() {
    let mut grid = HexGrid::<1>::new(8);
    grid.cursors[0].pos = HexCoord::ORIGIN;
    // 2 o'clock: first the 3 o'clock neighbour, then the 1 o'clock one.
    let dir = Direction::from_ticks(2);
    grid.move_cursor(0, dir);
    assert_eq!(grid.cursors[0].pos, HexCoord::new(1, 0));
    grid.move_cursor(0, dir);
    assert_eq!(grid.cursors[0].pos, HexCoord::new(2, -1));
    grid.move_cursor(0, dir);
    assert_eq!(grid.cursors[0].pos, HexCoord::new(3, -1));
}

#[test]
fn resize_down_and_up_preserves_hidden_cells() {
    let mut engine = HiveEngine::<4>::new(EngineParams::default(), Some(5));
    let far = HexCoord::new(4, -2);
    engine.set_cell(far, Cell::new(CellMode::Stochastic, 0.75));
    engine.resize(2);
    assert!(!engine.grid().is_visible(far));
    for c in &engine.grid().cursors {
        assert!(engine.grid().is_visible(c.pos));
        assert!(engine.grid().is_visible(c.start_pos));
    }
    engine.resize(4);
    assert_eq!(engine.get_cell(far), Cell::new(CellMode::Stochastic, 0.75));
}

#[test]
fn resize_clamps_to_supported_range() {
    let mut engine = HiveEngine::<4>::new(EngineParams::default(), Some(5));
    engine.resize(0);
    assert_eq!(engine.grid().radius(), MIN_RADIUS);
    engine.resize(1_000);
    assert_eq!(engine.grid().radius(), MAX_RADIUS);
}

#[test]
fn clear_reads_silent_everywhere() {
    let mut engine = HiveEngine::<4>::new(EngineParams::default(), Some(5));
    engine.randomize(true);
    engine.clear();
    assert!(engine.grid().cells().iter().all(|c| *c == Cell::SILENT));
}

#[test]
fn certainty_randomize_has_no_stochastic_cells() {
    let mut engine = HiveEngine::<4>::new(EngineParams::default(), Some(9));
    engine.randomize(false);
    let cells = engine.grid().cells();
    assert!(cells.iter().all(|c| c.mode != CellMode::Stochastic));
    assert!(cells.iter().any(|c| c.mode == CellMode::Always));

    engine.randomize(true);
    let cells = engine.grid().cells();
    assert!(cells.iter().any(|c| c.mode == CellMode::Stochastic));
}

#[test]
fn randomize_reaches_cells_beyond_active_radius() {
    let mut engine = HiveEngine::<4>::new(EngineParams::default(), Some(13));
    engine.randomize(false);
    let outside = engine
        .grid()
        .cells()
        .iter()
        .enumerate()
        .filter(|(i, c)| {
            let coord = hivewalk::core::grid::index_coord(*i);
            coord.ring() > 4 && c.mode != CellMode::Silent
        })
        .count();
    assert!(outside > 0);
}
