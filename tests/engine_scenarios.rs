use approx::assert_relative_eq;

use hivewalk::core::cell::{Cell, CellMode};
use hivewalk::core::cursor::{OutMode, TurnMode};
use hivewalk::core::hex::{Direction, HexCoord, is_visible};
use hivewalk::engine::hive::{EngineParams, FrameInputs, HiveEngine, PortOutputs};

/// Longer than the post-reset guard at 48 kHz.
const SETTLE: usize = 64;

fn low_frame<const N: usize>() -> FrameInputs<N> {
    let mut frame = FrameInputs::default();
    frame.ports[0].clock = Some(0.0);
    frame.ports[0].reset = Some(0.0);
    frame.ports[0].turn = Some(0.0);
    frame
}

fn settled<const N: usize>(seed: u64) -> HiveEngine<N> {
    let mut engine = HiveEngine::new(EngineParams::default(), Some(seed));
    let low = low_frame::<N>();
    for _ in 0..SETTLE {
        engine.process(&low);
    }
    engine
}

/// One sample with `edit` applied to the low frame, then `tail` low samples.
fn edge<const N: usize>(
    engine: &mut HiveEngine<N>,
    edit: impl FnOnce(&mut FrameInputs<N>),
    tail: usize,
) -> Vec<[PortOutputs; N]> {
    let low = low_frame::<N>();
    let mut high = low;
    edit(&mut high);
    let mut frames = vec![*engine.process(&high)];
    for _ in 0..tail {
        frames.push(*engine.process(&low));
    }
    frames
}

fn clock<const N: usize>(engine: &mut HiveEngine<N>, tail: usize) -> Vec<[PortOutputs; N]> {
    edge(engine, |f| f.ports[0].clock = Some(10.0), tail)
}

fn fill_visible<const N: usize>(engine: &mut HiveEngine<N>, cell: Cell) {
    let radius = engine.grid().radius();
    for q in -radius..=radius {
        for r in -radius..=radius {
            let c = HexCoord::new(q, r);
            if is_visible(c, radius) {
                engine.set_cell(c, cell);
            }
        }
    }
}

#[test]
fn always_cell_emits_one_pulse_with_scaled_level() {
    let mut engine = settled::<1>(1);
    let target = HexCoord::new(-3, -1);
    engine.set_cell(target, Cell::new(CellMode::Always, 0.6));
    engine.set_out_mode(0, OutMode::Uni5V);

    let frames = clock(&mut engine, 200);
    assert_eq!(engine.grid().cursors[0].pos, target);
    assert_eq!(frames.iter().filter(|f| f[0].pulsed).count(), 1);
    assert_eq!(frames[0][0].gate, 10.0);
    assert_eq!(frames.iter().filter(|f| f[0].gate == 10.0).count(), 48);
    assert_relative_eq!(frames[200][0].level, 3.0, epsilon = 1e-5);
    assert_eq!(frames[200][0].gate, 0.0);
}

#[test]
fn bipolar_zero_level_is_minus_five() {
    let mut engine = settled::<1>(2);
    engine.set_cell(HexCoord::new(-3, -1), Cell::new(CellMode::Always, 0.0));
    engine.set_out_mode(0, OutMode::Bi5V);
    let frames = clock(&mut engine, 10);
    assert_relative_eq!(frames[10][0].level, -5.0);
}

#[test]
fn silent_step_holds_previous_level() {
    let mut engine = settled::<1>(3);
    engine.set_cell(HexCoord::new(-3, -1), Cell::new(CellMode::Always, 1.0));
    engine.set_out_mode(0, OutMode::Uni1V);
    clock(&mut engine, 100);
    let frames = clock(&mut engine, 100);
    assert!(frames.iter().all(|f| !f[0].pulsed && f[0].gate == 0.0));
    assert_relative_eq!(frames[100][0].level, 1.0);
}

#[test]
fn certain_ratchet_gives_one_sub_pulse_per_clock() {
    let mut engine = settled::<1>(4);
    fill_visible(&mut engine, Cell::new(CellMode::Stochastic, 0.5));
    engine.set_ratcheting_prob(0, 1.0);
    let mut pulses = 0;
    for _ in 0..10 {
        let frames = clock(&mut engine, 479);
        let n = frames.iter().filter(|f| f[0].pulsed).count();
        assert_eq!(n, 1);
        assert!(frames[0][0].pulsed, "first sub-pulse lands on the clock");
        pulses += n;
    }
    assert_eq!(pulses, 10);
}

#[test]
fn coin_flip_without_ratcheting() {
    let mut engine = settled::<1>(5);
    fill_visible(&mut engine, Cell::new(CellMode::Stochastic, 0.5));
    engine.set_ratcheting_enabled(0, false);
    let mut pulses = 0;
    for _ in 0..200 {
        let frames = clock(&mut engine, 60);
        let n = frames.iter().filter(|f| f[0].pulsed).count();
        assert!(n <= 1);
        pulses += n;
    }
    assert!((60..=140).contains(&pulses), "pulses={pulses}");
}

#[test]
fn reset_restarts_and_guards_following_clock() {
    let mut engine = settled::<1>(6);
    let start = engine.grid().cursors[0].start_pos;
    clock(&mut engine, 20);
    clock(&mut engine, 20);
    assert_ne!(engine.grid().cursors[0].pos, start);

    // Reset, then a clock 10 samples later is swallowed.
    edge(&mut engine, |f| f.ports[0].reset = Some(10.0), 10);
    assert_eq!(engine.grid().cursors[0].pos, start);
    assert_eq!(engine.grid().cursors[0].dir, Direction::ONE);
    clock(&mut engine, SETTLE);
    assert_eq!(engine.grid().cursors[0].pos, start);

    // Once the guard has elapsed clocks move again.
    clock(&mut engine, 10);
    assert_ne!(engine.grid().cursors[0].pos, start);
}

#[test]
fn reset_button_reaches_port_zero_without_cable() {
    let mut engine = HiveEngine::<1>::new(EngineParams::default(), Some(7));
    let mut low = FrameInputs::<1>::default();
    low.ports[0].clock = Some(0.0);
    for _ in 0..SETTLE {
        engine.process(&low);
    }
    let mut high = low;
    high.ports[0].clock = Some(10.0);
    engine.process(&high);
    let start = engine.grid().cursors[0].start_pos;
    assert_ne!(engine.grid().cursors[0].pos, start);

    let mut button = low;
    button.reset_button = 10.0;
    engine.process(&button);
    assert_eq!(engine.grid().cursors[0].pos, start);
}

#[test]
fn turn_edge_rotates_by_turn_mode() {
    let mut engine = settled::<1>(8);
    edge(&mut engine, |f| f.ports[0].turn = Some(10.0), 5);
    assert_eq!(engine.grid().cursors[0].dir.ticks(), 3);

    engine.set_turn_mode(0, TurnMode::OneFifty);
    edge(&mut engine, |f| f.ports[0].turn = Some(10.0), 5);
    assert_eq!(engine.grid().cursors[0].dir.ticks(), 8);
}

#[test]
fn turn_edge_inside_guard_is_ignored() {
    let mut engine = settled::<1>(9);
    edge(&mut engine, |f| f.ports[0].reset = Some(10.0), 5);
    edge(&mut engine, |f| f.ports[0].turn = Some(10.0), 5);
    assert_eq!(engine.grid().cursors[0].dir, Direction::ONE);
}

#[test]
fn shift_right_two_on_even_facing() {
    let mut engine = settled::<2>(10);
    edge(&mut engine, |f| f.ports[0].turn = Some(10.0), 5);
    engine.set_turn_mode(0, TurnMode::Thirty);
    // Both ports face 3; port 0 then turns 30 degrees, port 1 follows at 60.
    edge(&mut engine, |f| f.ports[0].turn = Some(10.0), 5);
    assert_eq!(engine.grid().cursors[0].dir.ticks(), 4);

    assert_eq!(engine.grid().cursors[1].dir.ticks(), 5);

    edge(&mut engine, |f| f.shift[1] = 10.0, 5);
    // Even +3, odd +4.
    assert_eq!(engine.grid().cursors[0].dir.ticks(), 7);
    assert_eq!(engine.grid().cursors[1].dir.ticks(), 9);
}

#[test]
fn lights_follow_gate_and_level() {
    let mut engine = settled::<1>(11);
    fill_visible(&mut engine, Cell::new(CellMode::Always, 1.0));
    engine.set_out_mode(0, OutMode::Bi5V);
    let low = low_frame::<1>();
    let mut high = low;
    high.ports[0].clock = Some(10.0);

    // Clocks every 100 samples keep the gate high often enough that a
    // 128-sample light refresh sees it.
    let mut seen = false;
    for _ in 0..8 {
        engine.process(&high);
        for _ in 0..99 {
            engine.process(&low);
            let light = engine.lights().ports[0];
            if light.trig == 1.0 {
                assert_eq!(light.level_pos, 1.0);
                assert_eq!(light.level_neg, 0.0);
                seen = true;
            }
        }
    }
    assert!(seen, "trigger light never lit");
}

#[test]
fn inactive_port_keeps_lights_dark() {
    let mut engine = settled::<1>(12);
    engine.set_active(0, false);
    fill_visible(&mut engine, Cell::new(CellMode::Always, 1.0));
    clock(&mut engine, 300);
    assert_eq!(engine.lights().ports[0].trig, 0.0);
    assert!(!engine.is_active(0));
}
