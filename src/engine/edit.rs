//! Edit-mode contract used by the UI collaborator: cell toggling, start
//! position placement and per-port menu settings.

use tracing::debug;

use crate::core::cursor::{OutMode, TurnMode};
use crate::core::hex::{Direction, HexCoord};
use crate::engine::hive::HiveEngine;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModuleState {
    /// Cells are edited, cursors walk.
    #[default]
    Grid,
    /// Start positions and per-port settings are edited.
    Edit,
}

impl<const N: usize> HiveEngine<N> {
    pub fn module_state(&self) -> ModuleState {
        self.module_state
    }

    pub fn toggle_module_state(&mut self) -> ModuleState {
        self.module_state = match self.module_state {
            ModuleState::Grid => ModuleState::Edit,
            ModuleState::Edit => ModuleState::Grid,
        };
        self.touch();
        self.module_state
    }

    /// Cycles the mode of the cell at `coord`, in grid mode only. Ignored
    /// outside the live grid.
    pub fn cell_next_state(&mut self, coord: HexCoord) -> bool {
        if self.module_state != ModuleState::Grid || !self.grid.is_visible(coord) {
            return false;
        }
        let next = self.grid.get_cell(coord).next_state(&mut self.rng);
        self.grid.set_cell(coord, next);
        self.touch();
        true
    }

    /// Port whose start position sits on `coord`, in edit mode only.
    pub fn select_port_at(&self, coord: HexCoord) -> Option<usize> {
        if self.module_state != ModuleState::Edit {
            return None;
        }
        self.grid.cursors.iter().position(|c| c.start_pos == coord)
    }

    /// Moves a port's start position in edit mode; rejected outside the
    /// active radius.
    pub fn drag_start_pos(&mut self, port: usize, coord: HexCoord) -> bool {
        if self.module_state != ModuleState::Edit || !self.grid.is_visible(coord) {
            return false;
        }
        let Some(cursor) = self.grid.cursors.get_mut(port) else {
            return false;
        };
        cursor.start_pos = coord;
        self.touch();
        debug!(port, q = coord.q, r = coord.r, "start position moved");
        true
    }

    pub fn set_start_dir(&mut self, port: usize, dir: Direction) {
        if let Some(cursor) = self.grid.cursors.get_mut(port) {
            cursor.start_dir = dir;
            self.touch();
        }
    }

    pub fn set_turn_mode(&mut self, port: usize, mode: TurnMode) {
        if let Some(cursor) = self.grid.cursors.get_mut(port) {
            cursor.turn_mode = mode;
            self.touch();
        }
    }

    pub fn set_out_mode(&mut self, port: usize, mode: OutMode) {
        if let Some(cursor) = self.grid.cursors.get_mut(port) {
            cursor.out_mode = mode;
            self.touch();
        }
    }

    pub fn set_ratcheting_enabled(&mut self, port: usize, enabled: bool) {
        if let Some(cursor) = self.grid.cursors.get_mut(port) {
            cursor.ratcheting_enabled = enabled;
            self.touch();
        }
    }

    pub fn toggle_ratcheting(&mut self, port: usize) -> bool {
        let enabled = self
            .grid
            .cursors
            .get(port)
            .map(|c| !c.ratcheting_enabled)
            .unwrap_or(false);
        self.set_ratcheting_enabled(port, enabled);
        enabled
    }
}
