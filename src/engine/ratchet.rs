//! Stochastic clock multiplication ("ratcheting").
//!
//! A burst count `k` is drawn as the number of Bernoulli trials up to and
//! including the first success, so `k >= 1`, `P(k) = p (1 - p)^(k - 1)` and
//! the mean burst is `1 / p`. With `p = 1` every burst is a single pulse.

use rand::Rng;
use rand_distr::{Distribution, Geometric};

use crate::core::cursor::DEFAULT_RATCHETING_PROB;
use crate::core::timebase::Tick;

pub const MIN_RATCHET_PROB: f32 = 0.01;
pub const MAX_RATCHET_COUNT: u32 = 64;

/// Menu presets as `(label, success probability)`. The label is the chance
/// that a burst carries more than one pulse.
pub const RATCHET_PRESETS: [(&str, f32); 6] = [
    ("50%", 0.5),
    ("60%", 0.4),
    ("65%", 0.35),
    ("70%", 0.3),
    ("80%", 0.2),
    ("90%", 0.1),
];

pub fn clamp_prob(prob: f32) -> f32 {
    if prob.is_finite() {
        prob.clamp(MIN_RATCHET_PROB, 1.0)
    } else {
        DEFAULT_RATCHETING_PROB
    }
}

/// Per-port burst-length distribution.
#[derive(Clone, Debug)]
pub struct RatchetSampler {
    prob: f32,
    dist: Option<Geometric>,
}

impl RatchetSampler {
    pub fn new(prob: f32) -> Self {
        let prob = clamp_prob(prob);
        Self {
            prob,
            dist: Geometric::new(prob as f64).ok(),
        }
    }

    pub fn prob(&self) -> f32 {
        self.prob
    }

    /// Builds the replacement first, then drops the old distribution in the
    /// same assignment.
    pub fn set_prob(&mut self, prob: f32) -> f32 {
        let next = RatchetSampler::new(prob);
        *self = next;
        self.prob
    }

    #[inline]
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        match &self.dist {
            Some(dist) => dist
                .sample(rng)
                .saturating_add(1)
                .min(MAX_RATCHET_COUNT as u64) as u32,
            None => 1,
        }
    }
}

impl Default for RatchetSampler {
    fn default() -> Self {
        Self::new(DEFAULT_RATCHETING_PROB)
    }
}

/// Spreads `k` sub-pulses evenly across the last measured clock period.
#[derive(Clone, Copy, Debug, Default)]
pub struct ClockMultiplier {
    clock: Tick,
    period: Tick,
    spacing: f64,
    next_at: f64,
    remaining: u32,
}

impl ClockMultiplier {
    /// Marks an accepted clock edge: latches the period and cancels any
    /// unfinished burst.
    #[inline]
    pub fn tick(&mut self) {
        self.period = self.clock;
        self.clock = 0;
        self.remaining = 0;
    }

    /// Arms `k` sub-pulses; the first fires on the next `process`.
    #[inline]
    pub fn trigger(&mut self, k: u32) {
        self.remaining = k;
        self.spacing = if k > 0 {
            self.period as f64 / k as f64
        } else {
            0.0
        };
        self.next_at = self.clock as f64;
    }

    #[inline]
    pub fn cancel(&mut self) {
        self.remaining = 0;
    }

    /// Advances one sample; `true` when a sub-pulse is due.
    #[inline]
    pub fn process(&mut self) -> bool {
        let now = self.clock as f64;
        self.clock = self.clock.saturating_add(1);
        if self.remaining > 0 && now >= self.next_at {
            self.remaining -= 1;
            self.next_at += self.spacing;
            true
        } else {
            false
        }
    }

    pub fn period(&self) -> Tick {
        self.period
    }

    pub fn pending(&self) -> u32 {
        self.remaining
    }
}
