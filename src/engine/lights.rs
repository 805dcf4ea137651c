//! Indicator brightness, refreshed at a divided rate.

use crate::engine::hive::PortOutputs;

/// Fade-out rate of a released light, per second.
const LAMBDA: f32 = 30.0;
/// Level magnitude that drives a level light to full brightness.
const FULL_SCALE_V: f32 = 5.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PortLights {
    pub trig: f32,
    pub level_pos: f32,
    pub level_neg: f32,
}

/// Lights jump up instantly and decay exponentially.
#[inline]
fn smooth(value: &mut f32, target: f32, dt: f32) {
    if target >= *value {
        *value = target;
    } else {
        *value += (target - *value) * (LAMBDA * dt).min(1.0);
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Lights<const N: usize> {
    pub ports: [PortLights; N],
}

impl<const N: usize> Default for Lights<N> {
    fn default() -> Self {
        Self {
            ports: [PortLights::default(); N],
        }
    }
}

impl<const N: usize> Lights<N> {
    /// `dt` is the wall time covered by one divided update.
    pub fn update(&mut self, outputs: &[PortOutputs; N], active: &[bool; N], dt: f32) {
        for ((light, out), &active) in self.ports.iter_mut().zip(outputs).zip(active) {
            let trig = if active && out.gate > 0.0 { 1.0 } else { 0.0 };
            let level = if active { out.level } else { 0.0 };
            let pos = (level / FULL_SCALE_V).clamp(0.0, 1.0);
            let neg = (-level / FULL_SCALE_V).clamp(0.0, 1.0);
            smooth(&mut light.trig, trig, dt);
            smooth(&mut light.level_pos, pos, dt);
            smooth(&mut light.level_neg, neg, dt);
        }
    }
}
