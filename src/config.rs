use crate::grid::Position;
use clap::Parser;
use std::path::PathBuf;

/// Find a shortest path across a grid of barriers with A*.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    #[arg(long, default_value_t = 20)]
    pub grid_size: usize,

    /// Barriers placed at random when no map is given.
    #[arg(long, default_value_t = 80)]
    pub num_barriers: usize,

    /// Seed for the random layout; a fresh one is drawn when omitted.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Start cell as "row,col". Overrides the map's `S`.
    #[arg(long)]
    pub start: Option<Position>,

    /// End cell as "row,col". Overrides the map's `E`.
    #[arg(long)]
    pub end: Option<Position>,

    /// Text layout to load instead of a random grid (`.`, `#`, `S`, `E`).
    #[arg(long)]
    pub map: Option<PathBuf>,

    #[arg(long, default_value_t = 30)]
    pub delay_ms: u64,

    #[arg(long, default_value_t = false)]
    pub no_visualization: bool,

    #[arg(long, default_value_t = false)]
    pub quiet: bool,

    /// Cancel the search after this many expansions.
    #[arg(long)]
    pub max_expansions: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grid_size: 20,
            num_barriers: 80,
            seed: None,
            start: None,
            end: None,
            map: None,
            delay_ms: 30,
            no_visualization: false,
            quiet: false,
            max_expansions: None,
        }
    }
}
