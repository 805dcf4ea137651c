//! Renderer handoff. The audio side fills preallocated snapshots and passes
//! them over bounded channels; the reader keeps the newest and hands stale
//! buffers back. Neither side blocks or allocates after setup.

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::core::cell::Cell;
use crate::core::cursor::Cursor;
use crate::core::grid::CELL_COUNT;
use crate::core::timebase::Tick;
use crate::engine::edit::ModuleState;
use crate::engine::hive::HiveEngine;
use crate::engine::lights::PortLights;

#[derive(Clone, Debug)]
pub struct HiveSnapshot<const N: usize> {
    /// Generation the copied cells belong to.
    pub grid_generation: u64,
    pub tick: Tick,
    pub radius: i32,
    pub module_state: ModuleState,
    pub normalize_ports: bool,
    pub cells: Box<[Cell]>,
    pub cursors: [Cursor; N],
    pub active: [bool; N],
    pub lights: [PortLights; N],
}

impl<const N: usize> HiveSnapshot<N> {
    pub fn new() -> Self {
        Self {
            grid_generation: u64::MAX,
            tick: 0,
            radius: 0,
            module_state: ModuleState::Grid,
            normalize_ports: true,
            cells: vec![Cell::SILENT; CELL_COUNT].into_boxed_slice(),
            cursors: std::array::from_fn(|i| Cursor::at_default(i, N, 1)),
            active: [false; N],
            lights: [PortLights::default(); N],
        }
    }
}

impl<const N: usize> Default for HiveSnapshot<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> HiveEngine<N> {
    /// Copies the renderer-visible state. Cells are copied only when the
    /// snapshot is from an older generation.
    pub fn write_snapshot(&self, snap: &mut HiveSnapshot<N>) {
        if snap.grid_generation != self.grid_generation() {
            snap.cells.copy_from_slice(self.grid.cells());
            snap.grid_generation = self.grid_generation();
        }
        snap.tick = self.tick();
        snap.radius = self.grid.radius();
        snap.module_state = self.module_state;
        snap.normalize_ports = self.normalizer.enabled;
        snap.cursors = self.grid.cursors;
        snap.active = self.active;
        snap.lights = self.lights().ports;
    }
}

/// Audio-side end of the snapshot exchange.
pub struct SnapshotPublisher<const N: usize> {
    free_rx: Receiver<Box<HiveSnapshot<N>>>,
    full_tx: Sender<Box<HiveSnapshot<N>>>,
}

/// Renderer-side end of the snapshot exchange.
pub struct SnapshotReader<const N: usize> {
    full_rx: Receiver<Box<HiveSnapshot<N>>>,
    free_tx: Sender<Box<HiveSnapshot<N>>>,
    latest: Option<Box<HiveSnapshot<N>>>,
}

/// Builds an exchange with `depth` in-flight snapshots plus one held by the
/// reader.
pub fn snapshot_channel<const N: usize>(depth: usize) -> (SnapshotPublisher<N>, SnapshotReader<N>) {
    let depth = depth.max(1);
    let (free_tx, free_rx) = bounded(depth + 1);
    let (full_tx, full_rx) = bounded(depth + 1);
    for _ in 0..depth + 1 {
        let _ = free_tx.try_send(Box::new(HiveSnapshot::new()));
    }
    (
        SnapshotPublisher { free_rx, full_tx },
        SnapshotReader {
            full_rx,
            free_tx,
            latest: None,
        },
    )
}

impl<const N: usize> SnapshotPublisher<N> {
    /// Publishes the engine state if a free buffer is available.
    pub fn publish(&self, engine: &HiveEngine<N>) -> bool {
        let Ok(mut snap) = self.free_rx.try_recv() else {
            return false;
        };
        engine.write_snapshot(&mut snap);
        self.full_tx.try_send(snap).is_ok()
    }
}

impl<const N: usize> SnapshotReader<N> {
    /// Drains to the newest published snapshot.
    pub fn latest(&mut self) -> Option<&HiveSnapshot<N>> {
        while let Ok(snap) = self.full_rx.try_recv() {
            if let Some(stale) = self.latest.replace(snap) {
                let _ = self.free_tx.try_send(stale);
            }
        }
        self.latest.as_deref()
    }
}
