//! Patch persistence as JSON.
//!
//! Writing is a plain serde derive. Reading goes through a
//! [`serde_json::Value`] so that every field falls back to its default on
//! its own: a state file with a missing `gridCv` or a string where a number
//! belongs still restores everything else.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::core::cell::{Cell, CellMode};
use crate::core::cursor::{Cursor, OutMode, TurnMode};
use crate::core::grid::{CELL_COUNT, DEFAULT_RADIUS, clamp_radius, wrap_coord};
use crate::core::hex::{Direction, HexCoord};
use crate::engine::hive::HiveEngine;
use crate::error::HiveError;

/// Saved settings of one port. Absent fields keep the port's defaults.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_start_pos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_start_pos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_dir: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q_pos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r_pos: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagonal_state: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_mode: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratcheting_prob: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratcheting_enabled: Option<bool>,
}

impl PortRecord {
    fn from_cursor(c: &Cursor) -> Self {
        Self {
            q_start_pos: Some(c.start_pos.q),
            r_start_pos: Some(c.start_pos.r),
            start_dir: Some(c.start_dir.ticks() as i64),
            q_pos: Some(c.pos.q),
            r_pos: Some(c.pos.r),
            dir: Some(c.dir.ticks() as i64),
            turn_mode: Some(c.turn_mode.index() as i64),
            diagonal_state: Some(c.diagonal_state),
            out_mode: Some(c.out_mode.index() as i64),
            ratcheting_prob: Some(c.ratcheting_prob),
            ratcheting_enabled: Some(c.ratcheting_enabled),
        }
    }

    fn from_value(v: &Value, defaulted: &mut usize) -> Self {
        let obj = v.as_object();
        Self {
            q_start_pos: field(obj, "qStartPos", defaulted).and_then(as_i32),
            r_start_pos: field(obj, "rStartPos", defaulted).and_then(as_i32),
            start_dir: field(obj, "startDir", defaulted).and_then(Value::as_i64),
            q_pos: field(obj, "qPos", defaulted).and_then(as_i32),
            r_pos: field(obj, "rPos", defaulted).and_then(as_i32),
            dir: field(obj, "dir", defaulted).and_then(Value::as_i64),
            turn_mode: field(obj, "turnMode", defaulted).and_then(Value::as_i64),
            diagonal_state: field(obj, "diagonalState", defaulted).and_then(Value::as_bool),
            out_mode: field(obj, "outMode", defaulted).and_then(Value::as_i64),
            ratcheting_prob: field(obj, "ratchetingProb", defaulted).and_then(as_f32),
            ratcheting_enabled: field(obj, "ratchetingEnabled", defaulted).and_then(Value::as_bool),
        }
    }

    /// Overlays the saved fields on `base`.
    fn to_cursor(&self, base: Cursor) -> Cursor {
        let mut c = base;
        c.start_pos = HexCoord::new(
            self.q_start_pos.unwrap_or(base.start_pos.q),
            self.r_start_pos.unwrap_or(base.start_pos.r),
        );
        c.pos = HexCoord::new(self.q_pos.unwrap_or(base.pos.q), self.r_pos.unwrap_or(base.pos.r));
        if let Some(d) = self.start_dir {
            c.start_dir = Direction::from_ticks(d);
        }
        if let Some(d) = self.dir {
            c.dir = Direction::from_ticks(d);
        }
        if let Some(m) = self.turn_mode.and_then(TurnMode::from_index) {
            c.turn_mode = m;
        }
        if let Some(m) = self.out_mode.and_then(OutMode::from_index) {
            c.out_mode = m;
        }
        c.diagonal_state = self.diagonal_state.unwrap_or(base.diagonal_state);
        c.ratcheting_enabled = self.ratcheting_enabled.unwrap_or(base.ratcheting_enabled);
        c.ratcheting_prob = self.ratcheting_prob.unwrap_or(base.ratcheting_prob);
        c
    }
}

/// Full patch state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "Value")]
pub struct HiveState {
    /// Cell modes, backing array in q-major order.
    pub grid: Vec<u8>,
    /// Cell levels, same layout as `grid`.
    pub grid_cv: Vec<f32>,
    pub ports: Vec<PortRecord>,
    pub used_radius: i32,
    pub normalize_ports: bool,
    /// Older files stored ratcheting once for the whole module.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratcheting_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ratcheting_prob: Option<f32>,
    /// Number of fields that were absent or unreadable when parsed.
    #[serde(skip)]
    pub defaulted: usize,
}

impl Default for HiveState {
    fn default() -> Self {
        Self {
            grid: Vec::new(),
            grid_cv: Vec::new(),
            ports: Vec::new(),
            used_radius: DEFAULT_RADIUS,
            normalize_ports: true,
            ratcheting_enabled: None,
            ratcheting_prob: None,
            defaulted: 0,
        }
    }
}

/// Looks up `key`, counting it as defaulted when absent.
fn field<'a>(obj: Option<&'a Map<String, Value>>, key: &str, defaulted: &mut usize) -> Option<&'a Value> {
    let found = obj.and_then(|o| o.get(key));
    if found.is_none() {
        *defaulted += 1;
    }
    found
}

fn as_i32(v: &Value) -> Option<i32> {
    v.as_i64().map(|x| x.clamp(i32::MIN as i64, i32::MAX as i64) as i32)
}

fn as_f32(v: &Value) -> Option<f32> {
    v.as_f64().map(|x| x as f32)
}

impl From<Value> for HiveState {
    fn from(root: Value) -> Self {
        let empty = Map::new();
        let obj = root.as_object().unwrap_or(&empty);
        let mut state = HiveState::default();
        let mut defaulted = 0usize;

        match obj.get("grid").and_then(Value::as_array) {
            Some(items) => {
                state.grid = items
                    .iter()
                    .take(CELL_COUNT)
                    .map(|v| v.as_i64().map(|i| CellMode::from_index(i).index()).unwrap_or(0))
                    .collect();
            }
            None => defaulted += 1,
        }
        match obj.get("gridCv").and_then(Value::as_array) {
            Some(items) => {
                state.grid_cv = items
                    .iter()
                    .take(CELL_COUNT)
                    .map(|v| as_f32(v).unwrap_or(0.0))
                    .collect();
            }
            None => defaulted += 1,
        }
        match obj.get("ports").and_then(Value::as_array) {
            Some(items) => {
                state.ports = items
                    .iter()
                    .map(|v| PortRecord::from_value(v, &mut defaulted))
                    .collect();
            }
            None => defaulted += 1,
        }
        match obj.get("usedRadius").and_then(Value::as_i64) {
            Some(r) => state.used_radius = clamp_radius(r),
            None => defaulted += 1,
        }
        match obj.get("normalizePorts").and_then(Value::as_bool) {
            Some(b) => state.normalize_ports = b,
            None => defaulted += 1,
        }
        state.ratcheting_enabled = obj.get("ratchetingEnabled").and_then(Value::as_bool);
        state.ratcheting_prob = obj.get("ratchetingProb").and_then(as_f32);
        state.defaulted = defaulted;
        state
    }
}

impl HiveState {
    /// Records everything needed to restore `engine`.
    pub fn capture<const N: usize>(engine: &HiveEngine<N>) -> Self {
        let cells = engine.grid().cells();
        Self {
            grid: cells.iter().map(|c| c.mode.index()).collect(),
            grid_cv: cells.iter().map(|c| c.level).collect(),
            ports: engine.grid().cursors.iter().map(PortRecord::from_cursor).collect(),
            used_radius: engine.grid().radius(),
            normalize_ports: engine.normalize_ports(),
            ratcheting_enabled: None,
            ratcheting_prob: None,
            defaulted: 0,
        }
    }

    /// Restores into `engine`. Cursors left outside the active radius are
    /// wrapped back onto it; extra saved ports are ignored.
    pub fn apply<const N: usize>(&self, engine: &mut HiveEngine<N>) {
        let radius = engine.grid.set_radius(self.used_radius);

        for (i, cell) in engine.grid.cells_mut().iter_mut().enumerate() {
            let mode = self.grid.get(i).map(|&m| CellMode::from_index(m as i64)).unwrap_or_default();
            let level = self.grid_cv.get(i).copied().unwrap_or(0.0);
            *cell = Cell::new(mode, level);
        }

        for port in 0..N {
            let base = Cursor::at_default(port, N, radius);
            let mut cursor = match self.ports.get(port) {
                Some(record) => record.to_cursor(base),
                None => base,
            };
            if let Some(enabled) = self.ratcheting_enabled {
                cursor.ratcheting_enabled = enabled;
                if let Some(prob) = self.ratcheting_prob {
                    cursor.ratcheting_prob = prob;
                }
            }
            cursor.start_pos = wrap_coord(cursor.start_pos, radius);
            engine.install_cursor(port, cursor);
        }

        engine.normalizer.enabled = self.normalize_ports;
        engine.touch();

        if self.defaulted > 0 {
            warn!("state restored with {} defaulted field(s)", self.defaulted);
        }
        info!(radius, ports = self.ports.len().min(N), "state restored");
    }

    pub fn to_json(&self) -> Result<String, HiveError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, HiveError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, HiveError> {
        let text = fs::read_to_string(path).map_err(|source| HiveError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn save(&self, path: &Path) -> Result<(), HiveError> {
        let text = self.to_json()?;
        fs::write(path, text).map_err(|source| HiveError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}
