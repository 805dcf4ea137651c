pub type Tick = u64;

#[derive(Clone, Copy, Debug)]
pub struct Timebase {
    pub fs: f32,
}

impl Timebase {
    pub fn new(fs: f32) -> Self {
        let fs = if fs.is_finite() && fs > 0.0 { fs } else { 48_000.0 };
        Self { fs }
    }

    pub fn tick_to_sec(&self, t: Tick) -> f32 {
        t as f32 / self.fs
    }

    pub fn sec_to_tick(&self, s: f32) -> Tick {
        if s <= 0.0 || !s.is_finite() {
            return 0;
        }
        let tick = (s as f64 * self.fs as f64).round();
        tick as Tick
    }

    /// Duration in ticks, never shorter than one sample.
    pub fn ms_to_ticks(&self, ms: f32) -> Tick {
        self.sec_to_tick(ms / 1000.0).max(1)
    }
}
