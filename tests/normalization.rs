use hivewalk::core::cell::{Cell, CellMode};
use hivewalk::core::cursor::TurnMode;
use hivewalk::engine::hive::{EngineParams, FrameInputs, HiveEngine};

fn low_frame() -> FrameInputs<2> {
    let mut frame = FrameInputs::default();
    frame.ports[0].clock = Some(0.0);
    frame.ports[0].reset = Some(0.0);
    frame.ports[0].turn = Some(0.0);
    frame
}

fn run(engine: &mut HiveEngine<2>, frame: &FrameInputs<2>, samples: usize) {
    engine.process(frame);
    let low = low_frame();
    for _ in 1..samples {
        engine.process(&low);
    }
}

/// Port 1 parked on port 0's start, then both restarted by one reset edge.
fn twin_engine(normalize: bool) -> HiveEngine<2> {
    let mut engine = HiveEngine::<2>::new(EngineParams::default(), Some(21));
    let start0 = engine.grid().cursors[0].start_pos;
    engine.toggle_module_state();
    assert!(engine.drag_start_pos(1, start0));
    engine.toggle_module_state();
    engine.set_normalize_ports(normalize);
    let mut reset = low_frame();
    reset.ports[0].reset = Some(10.0);
    run(&mut engine, &reset, 64);
    engine
}

#[test]
fn unwired_port_walks_in_lockstep_with_port_zero() {
    let mut engine = twin_engine(true);
    for c in engine.grid().cursors.iter() {
        assert_eq!(c.pos, engine.grid().cursors[0].start_pos);
    }
    engine.set_turn_mode(0, TurnMode::Thirty);
    engine.set_turn_mode(1, TurnMode::Thirty);

    let mut clock = low_frame();
    clock.ports[0].clock = Some(10.0);
    let mut turn = low_frame();
    turn.ports[0].turn = Some(10.0);

    for step in 0..40 {
        run(&mut engine, &clock, 10);
        if step % 3 == 0 {
            run(&mut engine, &turn, 10);
        }
        let [a, b] = engine.grid().cursors;
        assert_eq!(a.pos, b.pos, "step {step}");
        assert_eq!(a.dir, b.dir, "step {step}");
    }
}

#[test]
fn unwired_port_copies_pulses_from_its_own_cells() {
    let mut engine = twin_engine(true);
    engine.set_cell(
        hivewalk::core::hex::HexCoord::new(-3, -1),
        Cell::new(CellMode::Always, 1.0),
    );
    let mut clock = low_frame();
    clock.ports[0].clock = Some(10.0);
    let outputs = *engine.process(&clock);
    assert!(outputs[0].pulsed);
    assert!(outputs[1].pulsed);
}

#[test]
fn normalisation_off_leaves_port_idle() {
    let mut engine = twin_engine(false);
    // Without normalisation the reset did not reach port 1 either.
    let before = engine.grid().cursors[1];
    let mut clock = low_frame();
    clock.ports[0].clock = Some(10.0);
    for _ in 0..5 {
        run(&mut engine, &clock, 10);
    }
    assert_eq!(engine.grid().cursors[1], before);
    assert_ne!(engine.grid().cursors[0].pos, engine.grid().cursors[0].start_pos);
}

#[test]
fn wired_port_ignores_port_zero() {
    let mut engine = twin_engine(true);
    let before = engine.grid().cursors[1].pos;
    let mut clock = low_frame();
    clock.ports[0].clock = Some(10.0);
    clock.ports[1].clock = Some(0.0);
    for _ in 0..5 {
        engine.process(&clock);
        let mut low = low_frame();
        low.ports[1].clock = Some(0.0);
        for _ in 0..10 {
            engine.process(&low);
        }
    }
    assert_eq!(engine.grid().cursors[1].pos, before);
}

#[test]
fn toggling_normalisation_takes_effect_next_sample() {
    let mut engine = twin_engine(false);
    engine.set_normalize_ports(true);
    let before = engine.grid().cursors[1].pos;
    let mut clock = low_frame();
    clock.ports[0].clock = Some(10.0);
    engine.process(&clock);
    assert_ne!(engine.grid().cursors[1].pos, before);
}
