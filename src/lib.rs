pub mod app;
pub mod audio;
pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod state;
