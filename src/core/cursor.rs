use crate::core::hex::{Direction, HexCoord};

/// Default success probability of the ratchet distribution.
pub const DEFAULT_RATCHETING_PROB: f32 = 0.35;

/// Angular increment applied on a turn edge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TurnMode {
    Thirty,
    #[default]
    Sixty,
    Ninety,
    OneTwenty,
    OneFifty,
    OneEighty,
}

impl TurnMode {
    pub const ALL: [TurnMode; 6] = [
        TurnMode::Thirty,
        TurnMode::Sixty,
        TurnMode::Ninety,
        TurnMode::OneTwenty,
        TurnMode::OneFifty,
        TurnMode::OneEighty,
    ];

    /// Compass ticks added per turn edge.
    pub fn ticks(self) -> u8 {
        match self {
            TurnMode::Thirty => 1,
            TurnMode::Sixty => 2,
            TurnMode::Ninety => 3,
            TurnMode::OneTwenty => 4,
            TurnMode::OneFifty => 5,
            TurnMode::OneEighty => 6,
        }
    }

    pub fn apply(self, dir: Direction) -> Direction {
        dir.rotate(self.ticks())
    }

    pub fn index(self) -> u8 {
        self.ticks() - 1
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            TurnMode::Thirty => "Half",
            TurnMode::Sixty => "Full",
            TurnMode::Ninety => "Full and Half",
            TurnMode::OneTwenty => "Double",
            TurnMode::OneFifty => "Double and Half",
            TurnMode::OneEighty => "Triple",
        }
    }
}

/// Mapping from a cell level in `[0, 1]` to an output voltage.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OutMode {
    Bi5V,
    Uni5V,
    #[default]
    Uni3V,
    Uni1V,
}

impl OutMode {
    pub const ALL: [OutMode; 4] = [OutMode::Bi5V, OutMode::Uni5V, OutMode::Uni3V, OutMode::Uni1V];

    pub fn scale(self, level: f32) -> f32 {
        match self {
            OutMode::Bi5V => level * 10.0 - 5.0,
            OutMode::Uni5V => level * 5.0,
            OutMode::Uni3V => level * 3.0,
            OutMode::Uni1V => level,
        }
    }

    pub fn index(self) -> u8 {
        match self {
            OutMode::Bi5V => 0,
            OutMode::Uni5V => 1,
            OutMode::Uni3V => 2,
            OutMode::Uni1V => 3,
        }
    }

    pub fn from_index(index: i64) -> Option<Self> {
        usize::try_from(index)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn label(self) -> &'static str {
        match self {
            OutMode::Bi5V => "-5..5V",
            OutMode::Uni5V => "0..5V",
            OutMode::Uni3V => "0..3V",
            OutMode::Uni1V => "0..1V",
        }
    }
}

/// Module-wide rotate gestures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShiftKind {
    Right1,
    Right2,
    Left1,
    Left2,
}

impl ShiftKind {
    pub const ALL: [ShiftKind; 4] = [
        ShiftKind::Right1,
        ShiftKind::Right2,
        ShiftKind::Left1,
        ShiftKind::Left2,
    ];

    /// Ticks added to a facing. Odd facings point at true neighbours, even
    /// ones between them, so the increment differs to land symmetrically.
    pub fn ticks_for(self, dir: Direction) -> u8 {
        let odd = !dir.is_diagonal();
        match (self, odd) {
            (ShiftKind::Right1, true) => 2,
            (ShiftKind::Right2, true) => 4,
            (ShiftKind::Left1, true) => 10,
            (ShiftKind::Left2, true) => 8,
            (ShiftKind::Right1 | ShiftKind::Right2, false) => 3,
            (ShiftKind::Left1 | ShiftKind::Left2, false) => 9,
        }
    }

    pub fn apply(self, dir: Direction) -> Direction {
        dir.rotate(self.ticks_for(dir))
    }
}

/// One walking agent, owned by a port.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cursor {
    pub pos: HexCoord,
    pub start_pos: HexCoord,
    pub dir: Direction,
    pub start_dir: Direction,
    pub turn_mode: TurnMode,
    pub out_mode: OutMode,
    /// Flips on every diagonal step; `false` takes the clockwise neighbour next.
    pub diagonal_state: bool,
    pub ratcheting_enabled: bool,
    pub ratcheting_prob: f32,
}

impl Cursor {
    /// Fresh cursor for `port` of `num_ports` on a grid of `radius`.
    pub fn at_default(port: usize, num_ports: usize, radius: i32) -> Self {
        let start = default_start(port, num_ports, radius);
        Self {
            pos: start,
            start_pos: start,
            dir: Direction::ONE,
            start_dir: Direction::ONE,
            turn_mode: TurnMode::default(),
            out_mode: OutMode::default(),
            diagonal_state: false,
            ratcheting_enabled: true,
            ratcheting_prob: DEFAULT_RATCHETING_PROB,
        }
    }

    pub fn restart(&mut self) {
        self.pos = self.start_pos;
        self.dir = self.start_dir;
    }

    pub fn turn(&mut self) {
        self.dir = self.turn_mode.apply(self.dir);
    }
}

/// Start positions are spread along the south-west edge.
pub fn default_start(port: usize, num_ports: usize, radius: i32) -> HexCoord {
    let num_ports = num_ports.max(1) as i32;
    HexCoord::new(-radius, (radius + 1) / num_ports * port as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hex::is_visible;

    #[test]
    fn turn_is_pure_modular_addition() {
        for tick in 0..12 {
            let dir = Direction::from_ticks(tick);
            for mode in TurnMode::ALL {
                let expected = (tick as u8 + mode.ticks()) % 12;
                assert_eq!(mode.apply(dir).ticks(), expected);
            }
        }
    }

    #[test]
    fn one_eighty_twice_is_identity() {
        for tick in 0..12 {
            let dir = Direction::from_ticks(tick);
            let mode = TurnMode::OneEighty;
            assert_eq!(mode.apply(mode.apply(dir)), dir);
        }
    }

    #[test]
    fn shift_ticks_depend_on_parity() {
        let odd = Direction::ONE;
        let even = Direction::TWELVE;
        assert_eq!(ShiftKind::Right1.apply(odd).ticks(), 3);
        assert_eq!(ShiftKind::Right2.apply(odd).ticks(), 5);
        assert_eq!(ShiftKind::Left1.apply(odd).ticks(), 11);
        assert_eq!(ShiftKind::Left2.apply(odd).ticks(), 9);
        assert_eq!(ShiftKind::Right1.apply(even).ticks(), 3);
        assert_eq!(ShiftKind::Right2.apply(even).ticks(), 3);
        assert_eq!(ShiftKind::Left1.apply(even).ticks(), 9);
        assert_eq!(ShiftKind::Left2.apply(even).ticks(), 9);
    }

    #[test]
    fn out_mode_scales() {
        assert_eq!(OutMode::Uni5V.scale(0.6), 3.0);
        assert_eq!(OutMode::Bi5V.scale(0.0), -5.0);
        assert_eq!(OutMode::Bi5V.scale(1.0), 5.0);
        assert_eq!(OutMode::Uni3V.scale(1.0), 3.0);
        assert_eq!(OutMode::Uni1V.scale(0.25), 0.25);
    }

    #[test]
    fn default_starts_are_on_the_edge() {
        for radius in 1..=16 {
            for port in 0..4 {
                let start = default_start(port, 4, radius);
                assert!(is_visible(start, radius));
                assert_eq!(start.ring(), radius);
            }
        }
        assert_eq!(default_start(3, 4, 4), HexCoord::new(-4, 3));
    }

    #[test]
    fn mode_indices_reject_out_of_range() {
        assert_eq!(TurnMode::from_index(5), Some(TurnMode::OneEighty));
        assert_eq!(TurnMode::from_index(6), None);
        assert_eq!(OutMode::from_index(-1), None);
        assert_eq!(OutMode::from_index(1), Some(OutMode::Uni5V));
    }
}
