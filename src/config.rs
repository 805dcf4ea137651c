use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

use crate::error::HiveError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "AudioConfig::default_sample_rate")]
    pub sample_rate: u32,
}

impl AudioConfig {
    fn default_sample_rate() -> u32 {
        48_000
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            sample_rate: Self::default_sample_rate(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "EngineConfig::default_pulse_ms")]
    pub pulse_ms: f32,
    #[serde(default = "EngineConfig::default_reset_guard_ms")]
    pub reset_guard_ms: f32,
    #[serde(default = "EngineConfig::default_trigger_low")]
    pub trigger_low: f32,
    #[serde(default = "EngineConfig::default_trigger_high")]
    pub trigger_high: f32,
    #[serde(default = "EngineConfig::default_gate_voltage")]
    pub gate_voltage: f32,
    #[serde(default = "EngineConfig::default_light_division")]
    pub light_division: u32,
}

impl EngineConfig {
    fn default_pulse_ms() -> f32 {
        1.0
    }
    fn default_reset_guard_ms() -> f32 {
        1.0
    }
    fn default_trigger_low() -> f32 {
        0.1
    }
    fn default_trigger_high() -> f32 {
        1.0
    }
    fn default_gate_voltage() -> f32 {
        10.0
    }
    fn default_light_division() -> u32 {
        128
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pulse_ms: Self::default_pulse_ms(),
            reset_guard_ms: Self::default_reset_guard_ms(),
            trigger_low: Self::default_trigger_low(),
            trigger_high: Self::default_trigger_high(),
            gate_voltage: Self::default_gate_voltage(),
            light_division: Self::default_light_division(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "GridConfig::default_radius")]
    pub radius: i32,
    #[serde(default = "GridConfig::default_normalize_ports")]
    pub normalize_ports: bool,
    #[serde(default = "GridConfig::default_ratcheting_prob")]
    pub ratcheting_prob: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl GridConfig {
    fn default_radius() -> i32 {
        4
    }
    fn default_normalize_ports() -> bool {
        true
    }
    fn default_ratcheting_prob() -> f32 {
        0.35
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            radius: Self::default_radius(),
            normalize_ports: Self::default_normalize_ports(),
            ratcheting_prob: Self::default_ratcheting_prob(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "RenderConfig::default_clock_hz")]
    pub clock_hz: f32,
    #[serde(default = "RenderConfig::default_seconds")]
    pub seconds: f32,
    #[serde(default)]
    pub turn_every: u32,
    #[serde(default = "RenderConfig::default_clock_high_ms")]
    pub clock_high_ms: f32,
}

impl RenderConfig {
    fn default_clock_hz() -> f32 {
        4.0
    }
    fn default_seconds() -> f32 {
        8.0
    }
    fn default_clock_high_ms() -> f32 {
        10.0
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            clock_hz: Self::default_clock_hz(),
            seconds: Self::default_seconds(),
            turn_every: 0,
            clock_high_ms: Self::default_clock_high_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub grid: GridConfig,
    #[serde(default)]
    pub render: RenderConfig,
}

impl AppConfig {
    /// Config floats are `f32`; narrowing first keeps `0.35` from printing
    /// as its widened `f64` expansion.
    fn format_value(value: &toml::Value) -> String {
        match value {
            toml::Value::Float(f) => {
                let text = (*f as f32).to_string();
                if text.contains('.') { text } else { format!("{text}.0") }
            }
            other => other.to_string(),
        }
    }

    /// Renders `self` as TOML with section headers live and every key
    /// commented out, so the file documents the defaults without pinning them.
    fn commented_toml(&self) -> Option<String> {
        let toml::Value::Table(root) = toml::Value::try_from(self).ok()? else {
            return None;
        };
        let mut out = String::new();
        for (section, body) in &root {
            let toml::Value::Table(fields) = body else {
                out.push_str(&format!("# {section} = {}\n", Self::format_value(body)));
                continue;
            };
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&format!("[{section}]\n"));
            for (key, value) in fields {
                out.push_str(&format!("# {key} = {}\n", Self::format_value(value)));
            }
        }
        Some(out)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, HiveError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_or_default(path: &str) -> Self {
        let path_obj = Path::new(path);
        if path_obj.exists() {
            match fs::read_to_string(path_obj) {
                Ok(contents) => match Self::from_toml_str(&contents) {
                    Ok(cfg) => return cfg,
                    Err(err) => {
                        warn!("Failed to parse config {path}: {err}. Using defaults.");
                    }
                },
                Err(err) => {
                    warn!("Failed to read config {path}: {err}. Using defaults.");
                }
            }
            return Self::default();
        }

        // File does not exist: write defaults and return them.
        let default_cfg = Self::default();
        match default_cfg.commented_toml() {
            Some(text) => {
                if let Err(err) = fs::write(path_obj, text) {
                    warn!("Failed to write default config to {path}: {err}");
                }
            }
            None => warn!("Failed to serialize default config; continuing with defaults"),
        }
        default_cfg
    }
}
