use rand::Rng;

/// What a cell does when a cursor steps onto it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellMode {
    #[default]
    Silent,
    Always,
    Stochastic,
}

impl CellMode {
    pub const ALL: [CellMode; 3] = [CellMode::Silent, CellMode::Always, CellMode::Stochastic];

    pub fn index(self) -> u8 {
        match self {
            CellMode::Silent => 0,
            CellMode::Always => 1,
            CellMode::Stochastic => 2,
        }
    }

    /// Unknown indices fall back to `Silent`.
    pub fn from_index(index: i64) -> Self {
        match index {
            1 => CellMode::Always,
            2 => CellMode::Stochastic,
            _ => CellMode::Silent,
        }
    }

    pub fn next(self) -> Self {
        match self {
            CellMode::Silent => CellMode::Always,
            CellMode::Always => CellMode::Stochastic,
            CellMode::Stochastic => CellMode::Silent,
        }
    }
}

/// Per-coordinate grid state. `level` stays in `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    pub mode: CellMode,
    pub level: f32,
}

/// Draws above this land in the top band (`Stochastic`, or `Always` in certainty mode).
pub const RANDOM_TOP_BAND: f32 = 0.8;
/// Draws above this (and not in the top band) become `Always`.
pub const RANDOM_ON_BAND: f32 = 0.6;

impl Cell {
    pub const SILENT: Cell = Cell {
        mode: CellMode::Silent,
        level: 0.0,
    };

    pub fn new(mode: CellMode, level: f32) -> Self {
        Self {
            mode,
            level: sanitize_level(level),
        }
    }

    /// Edit gesture: cycle the mode, re-rolling the level when entering `Always`.
    pub fn next_state<R: Rng + ?Sized>(self, rng: &mut R) -> Self {
        let mode = self.mode.next();
        let level = if mode == CellMode::Always {
            rng.random::<f32>()
        } else {
            self.level
        };
        Self { mode, level }
    }

    /// Cell for one randomize draw. `use_random` selects `Stochastic` over
    /// `Always` for the top band.
    pub fn from_draw(draw: f32, level: f32, use_random: bool) -> Self {
        if draw > RANDOM_TOP_BAND {
            let mode = if use_random {
                CellMode::Stochastic
            } else {
                CellMode::Always
            };
            Cell::new(mode, level)
        } else if draw > RANDOM_ON_BAND {
            Cell::new(CellMode::Always, level)
        } else {
            Cell::SILENT
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, use_random: bool) -> Self {
        let draw = rng.random::<f32>();
        let level = rng.random::<f32>();
        Self::from_draw(draw, level, use_random)
    }
}

#[inline]
pub fn sanitize_level(level: f32) -> f32 {
    if level.is_finite() {
        level.clamp(0.0, 1.0)
    } else {
        0.0
    }
}
