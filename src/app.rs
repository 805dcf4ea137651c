//! Offline driver: feeds a synthetic clock into the engine and optionally
//! streams the outputs to a WAV file.

use std::sync::Arc;

use crossbeam_channel::bounded;
use tracing::{debug, info, warn};

use crate::audio::writer::WavOutput;
use crate::config::RenderConfig;
use crate::core::timebase::Tick;
use crate::engine::hive::{FrameInputs, HiveEngine};
use crate::engine::snapshot::snapshot_channel;
use crate::error::HiveError;

const BLOCK_FRAMES: usize = 512;
const WAV_QUEUE: usize = 16;
/// Output voltages are divided by this to fit a WAV sample.
const WAV_VOLTS_FULL_SCALE: f32 = 10.0;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderSummary<const N: usize> {
    pub samples: u64,
    pub clocks: u64,
    pub turns: u64,
    /// Pulses and sub-pulses started, per port.
    pub pulses: [u64; N],
    pub wav_frames: Option<u64>,
}

/// Square clock on port 0 with optional turn pulses. The first edge comes
/// after the post-reset guard so it is never swallowed.
#[derive(Clone, Copy, Debug)]
struct ClockSource {
    lead: Tick,
    period: Tick,
    high: Tick,
    turn_every: u64,
}

impl ClockSource {
    fn new(render: &RenderConfig, fs: f32, lead: Tick) -> Self {
        let hz = if render.clock_hz.is_finite() && render.clock_hz > 0.0 {
            render.clock_hz
        } else {
            warn!("invalid clock_hz {}; using 1 Hz", render.clock_hz);
            1.0
        };
        let period = ((fs / hz).round() as Tick).max(2);
        let high = ((render.clock_high_ms * 0.001 * fs).round() as Tick).clamp(1, period / 2);
        Self {
            lead: lead + 1,
            period,
            high,
            turn_every: render.turn_every as u64,
        }
    }

    /// (clock voltage, turn voltage) at sample `t`.
    fn at(&self, t: Tick) -> (f32, f32) {
        if t < self.lead {
            return (0.0, 0.0);
        }
        let t = t - self.lead;
        let index = t / self.period;
        let phase = t % self.period;
        let clock = if phase < self.high { 10.0 } else { 0.0 };
        // Turn pulses sit halfway through every n-th clock period.
        let half = self.period / 2;
        let turn = if self.turn_every > 0
            && (index + 1) % self.turn_every == 0
            && phase >= half
            && phase < half + self.high
        {
            10.0
        } else {
            0.0
        };
        (clock, turn)
    }
}

pub fn run_headless<const N: usize>(
    engine: &mut HiveEngine<N>,
    render: &RenderConfig,
    wav_path: Option<&str>,
) -> Result<RenderSummary<N>, HiveError> {
    let timebase = engine.params().timebase;
    let total = timebase.sec_to_tick(render.seconds.max(0.0));
    let source = ClockSource::new(render, timebase.fs, engine.params().reset_guard_ticks);
    info!(
        "rendering {:.2}s at {} Hz, clock period {} samples",
        render.seconds, timebase.fs, source.period
    );

    let channels = (2 * N) as u16;
    let (wav_tx, wav_handle) = match wav_path {
        Some(path) => {
            let (tx, rx) = bounded::<Arc<[f32]>>(WAV_QUEUE);
            let handle = WavOutput::run(rx, path.to_string(), timebase.fs as u32, channels);
            (Some(tx), Some(handle))
        }
        None => (None, None),
    };

    let (publisher, mut reader) = snapshot_channel::<N>(2);
    let report_every = timebase.sec_to_tick(1.0).max(1);

    let mut summary = RenderSummary {
        samples: 0,
        clocks: 0,
        turns: 0,
        pulses: [0; N],
        wav_frames: None,
    };
    let mut frame = FrameInputs::<N>::default();
    frame.ports[0].reset = Some(0.0);
    let mut block: Vec<f32> = Vec::with_capacity(BLOCK_FRAMES * 2 * N);
    let mut prev = (0.0f32, 0.0f32);

    let mut t: Tick = 0;
    while t < total {
        let (clock, turn) = source.at(t);
        if clock > 0.0 && prev.0 <= 0.0 {
            summary.clocks += 1;
        }
        if turn > 0.0 && prev.1 <= 0.0 {
            summary.turns += 1;
        }
        prev = (clock, turn);
        frame.ports[0].clock = Some(clock);
        frame.ports[0].turn = (source.turn_every > 0).then_some(turn);

        let outputs = engine.process(&frame);
        for (count, out) in summary.pulses.iter_mut().zip(outputs) {
            if out.pulsed {
                *count += 1;
            }
        }
        if wav_tx.is_some() {
            for out in outputs {
                block.push(out.gate / WAV_VOLTS_FULL_SCALE);
                block.push(out.level / WAV_VOLTS_FULL_SCALE);
            }
        }

        t += 1;
        if block.len() >= BLOCK_FRAMES * 2 * N || (t == total && !block.is_empty()) {
            if let Some(tx) = &wav_tx {
                let chunk: Arc<[f32]> = Arc::from(block.as_slice());
                if tx.send(chunk).is_err() {
                    warn!("wav writer stopped early");
                    break;
                }
            }
            block.clear();
        }
        if t % report_every == 0 {
            publisher.publish(engine);
            if let Some(snap) = reader.latest() {
                debug!(tick = snap.tick, radius = snap.radius, "progress {:?}", snap.active);
            }
        }
    }
    summary.samples = t;

    drop(wav_tx);
    if let Some(handle) = wav_handle {
        let frames = handle
            .join()
            .map_err(|_| HiveError::Io {
                path: wav_path.unwrap_or_default().to_string(),
                source: std::io::Error::other("wav writer thread panicked"),
            })??;
        summary.wav_frames = Some(frames);
    }

    info!(
        samples = summary.samples,
        clocks = summary.clocks,
        turns = summary.turns,
        "render finished, pulses per port {:?}",
        summary.pulses
    );
    Ok(summary)
}
