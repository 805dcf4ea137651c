//! Sample-rate edge and pulse primitives. All time is counted in ticks.

use crate::core::timebase::Tick;

/// Rising-edge detector with hysteresis.
#[derive(Clone, Copy, Debug)]
pub struct SchmittTrigger {
    low: f32,
    high: f32,
    state: bool,
}

impl SchmittTrigger {
    pub fn new(low: f32, high: f32) -> Self {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        Self {
            low,
            high,
            state: false,
        }
    }

    /// `true` on the sample the input first reaches `high`.
    #[inline]
    pub fn process(&mut self, v: f32) -> bool {
        if self.state {
            if v <= self.low {
                self.state = false;
            }
            false
        } else if v >= self.high {
            self.state = true;
            true
        } else {
            false
        }
    }

    pub fn is_high(&self) -> bool {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = false;
    }
}

impl Default for SchmittTrigger {
    fn default() -> Self {
        Self::new(0.1, 1.0)
    }
}

/// Retriggerable fixed-width gate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PulseGenerator {
    remaining: Tick,
}

impl PulseGenerator {
    /// Extends the pulse to at least `ticks` from now.
    #[inline]
    pub fn trigger(&mut self, ticks: Tick) {
        self.remaining = self.remaining.max(ticks);
    }

    /// Advances one sample; `true` while the pulse is high.
    #[inline]
    pub fn process(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.remaining = 0;
    }
}

/// Counts samples since the last reset edge.
#[derive(Clone, Copy, Debug, Default)]
pub struct ResetGuard {
    elapsed: Tick,
}

impl ResetGuard {
    pub fn reset(&mut self) {
        self.elapsed = 0;
    }

    #[inline]
    pub fn process(&mut self) -> Tick {
        self.elapsed = self.elapsed.saturating_add(1);
        self.elapsed
    }

    #[inline]
    pub fn ready(&self, guard: Tick) -> bool {
        self.elapsed >= guard
    }
}

/// Fires once every `division` calls.
#[derive(Clone, Copy, Debug)]
pub struct ClockDivider {
    division: u32,
    clock: u32,
}

impl ClockDivider {
    pub fn new(division: u32) -> Self {
        Self {
            division: division.max(1),
            clock: 0,
        }
    }

    pub fn division(&self) -> u32 {
        self.division
    }

    #[inline]
    pub fn process(&mut self) -> bool {
        self.clock += 1;
        if self.clock >= self.division {
            self.clock = 0;
            true
        } else {
            false
        }
    }
}
