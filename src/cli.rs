use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about)]
pub struct Args {
    /// Path to config TOML
    #[arg(long, default_value = "config.toml")]
    pub config: String,

    /// Restore the patch from a JSON state file
    #[arg(long)]
    pub state: Option<String>,

    /// Save the patch to a JSON state file after rendering
    #[arg(long)]
    pub save_state: Option<String>,

    /// Write gate/level outputs to a wav file
    #[arg(long)]
    pub wav: Option<String>,

    /// Render length in seconds (overrides config)
    #[arg(long)]
    pub seconds: Option<f32>,

    /// Clock rate in Hz (overrides config)
    #[arg(long)]
    pub clock_hz: Option<f32>,

    /// Active grid radius (overrides config and state)
    #[arg(long)]
    pub radius: Option<i32>,

    /// Fill the grid with random cells before rendering
    #[arg(long, default_value_t = false)]
    pub randomize: bool,

    /// Randomize without stochastic cells
    #[arg(long, default_value_t = false)]
    pub certainty: bool,

    /// Seed for the engine RNG (overrides config)
    #[arg(long)]
    pub seed: Option<u64>,
}
