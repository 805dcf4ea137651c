//! engine/hive.rs — Per-sample driver for the hex sequencer.
//!
//! Every call to [`HiveEngine::process`] advances all ports by one sample:
//! shift gestures, then per port reset → clock → turn → outputs. Nothing in
//! the per-sample path allocates, blocks or logs.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::core::cell::{Cell, CellMode};
use crate::core::cursor::{Cursor, ShiftKind};
use crate::core::grid::{DEFAULT_RADIUS, HexGrid};
use crate::core::hex::HexCoord;
use crate::core::timebase::{Tick, Timebase};
use crate::engine::edit::ModuleState;
use crate::engine::lights::Lights;
use crate::engine::normalize::{Edges, PortNormalizer};
use crate::engine::ratchet::{ClockMultiplier, RatchetSampler};
use crate::engine::trigger::{ClockDivider, PulseGenerator, ResetGuard, SchmittTrigger};

/// Trigger inputs of one port for one sample. `None` means not wired.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortInputs {
    pub clock: Option<f32>,
    pub reset: Option<f32>,
    pub turn: Option<f32>,
}

/// Everything the engine reads for one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameInputs<const N: usize> {
    pub ports: [PortInputs; N],
    /// Panel reset button, summed into every wired reset input.
    pub reset_button: f32,
    /// Shift inputs in [`ShiftKind::ALL`] order.
    pub shift: [f32; 4],
}

impl<const N: usize> Default for FrameInputs<N> {
    fn default() -> Self {
        Self {
            ports: [PortInputs::default(); N],
            reset_button: 0.0,
            shift: [0.0; 4],
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortOutputs {
    pub gate: f32,
    /// Sample-and-hold level, updated only when a pulse is emitted.
    pub level: f32,
    /// A pulse or sub-pulse started on this sample.
    pub pulsed: bool,
}

/// Sample-domain engine constants.
#[derive(Clone, Copy, Debug)]
pub struct EngineParams {
    pub timebase: Timebase,
    pub pulse_ticks: Tick,
    pub reset_guard_ticks: Tick,
    pub trigger_low: f32,
    pub trigger_high: f32,
    pub gate_voltage: f32,
    pub light_division: u32,
}

impl EngineParams {
    pub fn new(timebase: Timebase) -> Self {
        Self {
            timebase,
            pulse_ticks: timebase.ms_to_ticks(1.0),
            reset_guard_ticks: timebase.ms_to_ticks(1.0),
            trigger_low: 0.1,
            trigger_high: 1.0,
            gate_voltage: 10.0,
            light_division: 128,
        }
    }

    pub fn from_config(cfg: &AppConfig) -> Self {
        let timebase = Timebase::new(cfg.audio.sample_rate as f32);
        Self {
            timebase,
            pulse_ticks: timebase.ms_to_ticks(cfg.engine.pulse_ms),
            reset_guard_ticks: timebase.ms_to_ticks(cfg.engine.reset_guard_ms),
            trigger_low: cfg.engine.trigger_low,
            trigger_high: cfg.engine.trigger_high,
            gate_voltage: cfg.engine.gate_voltage,
            light_division: cfg.engine.light_division.max(1),
        }
    }
}

impl Default for EngineParams {
    fn default() -> Self {
        Self::new(Timebase::new(48_000.0))
    }
}

#[derive(Clone, Debug)]
struct PortState {
    clock_trig: SchmittTrigger,
    reset_trig: SchmittTrigger,
    turn_trig: SchmittTrigger,
    guard: ResetGuard,
    pulse: PulseGenerator,
    multiplier: ClockMultiplier,
    sampler: RatchetSampler,
}

impl PortState {
    fn new(params: &EngineParams, prob: f32) -> Self {
        let trig = SchmittTrigger::new(params.trigger_low, params.trigger_high);
        Self {
            clock_trig: trig,
            reset_trig: trig,
            turn_trig: trig,
            guard: ResetGuard::default(),
            pulse: PulseGenerator::default(),
            multiplier: ClockMultiplier::default(),
            sampler: RatchetSampler::new(prob),
        }
    }
}

pub struct HiveEngine<const N: usize> {
    params: EngineParams,
    pub(crate) grid: HexGrid<N>,
    ports: [PortState; N],
    shift_trigs: [SchmittTrigger; 4],
    pub(crate) normalizer: PortNormalizer,
    pub(crate) rng: SmallRng,
    outputs: [PortOutputs; N],
    pub(crate) active: [bool; N],
    lights: Lights<N>,
    light_divider: ClockDivider,
    pub(crate) module_state: ModuleState,
    grid_generation: u64,
    tick: Tick,
}

impl<const N: usize> HiveEngine<N> {
    pub fn new(params: EngineParams, seed: Option<u64>) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        let trig = SchmittTrigger::new(params.trigger_low, params.trigger_high);
        let grid = HexGrid::new(DEFAULT_RADIUS);
        let ports = std::array::from_fn(|i| PortState::new(&params, grid.cursors[i].ratcheting_prob));
        let mut engine = Self {
            params,
            grid,
            ports,
            shift_trigs: [trig; 4],
            normalizer: PortNormalizer::default(),
            rng: SmallRng::seed_from_u64(seed),
            outputs: [PortOutputs::default(); N],
            active: [true; N],
            lights: Lights::default(),
            light_divider: ClockDivider::new(params.light_division),
            module_state: ModuleState::Grid,
            grid_generation: 0,
            tick: 0,
        };
        engine.reset();
        engine
    }

    /// Engine configured from an [`AppConfig`], including grid radius,
    /// normalisation and the default ratchet probability.
    pub fn from_config(cfg: &AppConfig) -> Self {
        let mut engine = Self::new(EngineParams::from_config(cfg), cfg.grid.seed);
        // Cursors are seated on the configured edge, not moved there.
        engine.grid.set_radius(cfg.grid.radius);
        engine.reset();
        engine.normalizer.enabled = cfg.grid.normalize_ports;
        for port in 0..N {
            engine.set_ratcheting_prob(port, cfg.grid.ratcheting_prob);
        }
        engine
    }

    /// Module reset: clears the grid and re-seats every cursor.
    pub fn reset(&mut self) {
        self.grid.clear();
        let radius = self.grid.radius();
        for (i, port) in self.ports.iter_mut().enumerate() {
            let cursor = Cursor::at_default(i, N, radius);
            *port = PortState::new(&self.params, cursor.ratcheting_prob);
            self.grid.cursors[i] = cursor;
        }
        self.outputs = [PortOutputs::default(); N];
        self.normalizer.enabled = true;
        self.touch();
        debug!("module reset, radius {radius}");
    }

    pub fn params(&self) -> &EngineParams {
        &self.params
    }

    pub fn grid(&self) -> &HexGrid<N> {
        &self.grid
    }

    pub fn cursor(&self, port: usize) -> Option<&Cursor> {
        self.grid.cursors.get(port)
    }

    pub fn outputs(&self) -> &[PortOutputs; N] {
        &self.outputs
    }

    pub fn lights(&self) -> &Lights<N> {
        &self.lights
    }

    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Bumped on every mutation made outside the per-sample step.
    pub fn grid_generation(&self) -> u64 {
        self.grid_generation
    }

    pub(crate) fn touch(&mut self) {
        self.grid_generation = self.grid_generation.wrapping_add(1);
    }

    pub fn normalize_ports(&self) -> bool {
        self.normalizer.enabled
    }

    pub fn set_normalize_ports(&mut self, enabled: bool) {
        self.normalizer.enabled = enabled;
        self.touch();
    }

    /// Marks whether a port's outputs are wired; only affects indicators
    /// and rendering.
    pub fn set_active(&mut self, port: usize, active: bool) {
        if let Some(slot) = self.active.get_mut(port) {
            *slot = active;
        }
    }

    pub fn is_active(&self, port: usize) -> bool {
        self.active.get(port).copied().unwrap_or(false)
    }

    pub fn set_cell(&mut self, coord: HexCoord, cell: Cell) {
        self.grid.set_cell(coord, cell);
        self.touch();
    }

    pub fn get_cell(&self, coord: HexCoord) -> Cell {
        self.grid.get_cell(coord)
    }

    pub fn clear(&mut self) {
        self.grid.clear();
        self.touch();
        info!("grid cleared");
    }

    /// `use_random` selects stochastic cells for the top band; `false` is
    /// the "certainty" variant.
    pub fn randomize(&mut self, use_random: bool) {
        self.grid.randomize(&mut self.rng, use_random);
        self.touch();
        info!(use_random, "grid randomized");
    }

    /// No-op when the clamped radius is unchanged.
    pub fn resize(&mut self, radius: i32) {
        if self.grid.resize(radius) {
            self.touch();
            info!("grid resized to radius {}", self.grid.radius());
        }
    }

    pub fn ratcheting_prob(&self, port: usize) -> Option<f32> {
        self.ports.get(port).map(|p| p.sampler.prob())
    }

    pub fn set_ratcheting_prob(&mut self, port: usize, prob: f32) {
        let (Some(state), Some(cursor)) = (self.ports.get_mut(port), self.grid.cursors.get_mut(port))
        else {
            return;
        };
        let prob = state.sampler.set_prob(prob);
        cursor.ratcheting_prob = prob;
        self.touch();
        debug!(port, prob, "ratchet probability changed");
    }

    /// Installs a full cursor record, keeping the port's sampler in step.
    pub(crate) fn install_cursor(&mut self, port: usize, cursor: Cursor) {
        if port >= N {
            return;
        }
        self.grid.cursors[port] = cursor;
        if !self.grid.is_visible(cursor.pos) {
            self.grid.wrap_cursor(port);
        }
        self.set_ratcheting_prob(port, cursor.ratcheting_prob);
    }

    /// Advances every port by one sample.
    pub fn process(&mut self, inputs: &FrameInputs<N>) -> &[PortOutputs; N] {
        self.tick = self.tick.wrapping_add(1);

        for (trig, (&v, kind)) in self
            .shift_trigs
            .iter_mut()
            .zip(inputs.shift.iter().zip(ShiftKind::ALL))
        {
            if trig.process(v) {
                for cursor in self.grid.cursors.iter_mut() {
                    cursor.dir = kind.apply(cursor.dir);
                }
            }
        }

        let guard_ticks = self.params.reset_guard_ticks;
        let mut primary = Edges::default();
        let mut primary_ready = false;

        for i in 0..N {
            let input = &inputs.ports[i];
            let port = &mut self.ports[i];

            // Reset. Port 0 always listens to its jack plus the button.
            let reset_v = if i == 0 {
                Some(input.reset.unwrap_or(0.0))
            } else {
                input.reset
            };
            let own_reset = reset_v.map(|v| port.reset_trig.process(v + inputs.reset_button));
            if own_reset == Some(true) {
                port.guard.reset();
            }
            let reset = self.normalizer.resolve(i, own_reset, primary.reset);
            if reset {
                self.grid.cursors[i].restart();
                port.multiplier.cancel();
            }

            port.guard.process();
            let ready = if i == 0 || input.reset.is_some() {
                port.guard.ready(guard_ticks)
            } else {
                primary_ready
            };
            if i == 0 {
                primary_ready = ready;
            }

            // Clock.
            let own_clock = input.clock.map(|v| port.clock_trig.process(v) && ready);
            let clock = self.normalizer.resolve(i, own_clock, primary.clock);
            let mut do_pulse = false;
            if clock {
                let dir = self.grid.cursors[i].dir;
                self.grid.move_cursor(i, dir);
                port.multiplier.tick();
                let cursor = &self.grid.cursors[i];
                match self.grid.get_cell(cursor.pos).mode {
                    CellMode::Silent => {}
                    CellMode::Always => do_pulse = true,
                    CellMode::Stochastic => {
                        if cursor.ratcheting_enabled {
                            let k = port.sampler.sample(&mut self.rng);
                            port.multiplier.trigger(k);
                        } else {
                            do_pulse = self.rng.random::<f32>() >= 0.5;
                        }
                    }
                }
            }

            // Turn.
            let own_turn = input.turn.map(|v| port.turn_trig.process(v) && ready);
            let turn = self.normalizer.resolve(i, own_turn, primary.turn);
            if turn {
                self.grid.cursors[i].turn();
            }

            if i == 0 {
                primary = Edges { clock, reset, turn };
            }

            // Outputs.
            let out = &mut self.outputs[i];
            out.pulsed = false;
            if port.multiplier.process() || do_pulse {
                port.pulse.trigger(self.params.pulse_ticks);
                let cursor = &self.grid.cursors[i];
                let cell = self.grid.get_cell(cursor.pos);
                out.level = cursor.out_mode.scale(cell.level);
                out.pulsed = true;
            }
            out.gate = if port.pulse.process() {
                self.params.gate_voltage
            } else {
                0.0
            };
        }

        if self.light_divider.process() {
            let dt = self.params.timebase.tick_to_sec(self.light_divider.division() as Tick);
            self.lights.update(&self.outputs, &self.active, dt);
        }

        &self.outputs
    }
}

impl<const N: usize> Default for HiveEngine<N> {
    fn default() -> Self {
        Self::new(EngineParams::default(), None)
    }
}
