//! Port normalisation: unwired trigger inputs on ports 1.. borrow port 0's
//! accepted edges. Resolved at read time every sample, never copied into
//! the fallback port's own trigger state.

/// Accepted edges of one port for the current sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Edges {
    pub clock: bool,
    pub reset: bool,
    pub turn: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PortNormalizer {
    pub enabled: bool,
}

impl Default for PortNormalizer {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PortNormalizer {
    /// `own` is `None` when the port's input is not wired. Port 0 never
    /// falls back.
    #[inline]
    pub fn resolve(&self, port: usize, own: Option<bool>, primary: bool) -> bool {
        match own {
            Some(edge) => edge,
            None if port == 0 => false,
            None => self.enabled && primary,
        }
    }
}
