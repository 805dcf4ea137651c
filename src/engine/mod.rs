//! Per-sample engine and the surfaces the UI collaborator drives.

pub mod edit;
pub mod hive;
pub mod lights;
pub mod normalize;
pub mod ratchet;
pub mod snapshot;
pub mod trigger;
