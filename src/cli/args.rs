use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;

use crate::config::{Config, ConfigBuilder};

use super::commands;

/// Entry point for the `nomad` command-line interface.
#[derive(Debug, Parser)]
#[command(
    name = "nomad",
    about = "Plan a multi-city trip that fits your budget",
    version,
    long_about = None
)]
pub struct Cli {
    /// Log collaborator requests and stage details to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    /// Maximum planning cycles before giving up on the budget
    #[arg(long = "max-cycles", value_name = "N")]
    pub max_cycles: Option<u32>,

    /// Seat class used in the flight search (e.g. economy, business)
    #[arg(long = "seat-class", value_name = "CLASS")]
    pub seat_class: Option<String>,

    /// Print the final itinerary record as JSON instead of a report
    #[arg(long)]
    pub json: bool,

    /// Print the effective configuration with API keys masked and exit
    #[arg(long = "show-config")]
    pub show_config: bool,

    /// Trip description: words typed after `nomad`
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub trip: Vec<String>,
}

impl Cli {
    /// Command-line flags are the last configuration layer.
    pub fn apply_overrides(&self, builder: ConfigBuilder) -> ConfigBuilder {
        let max_cycles = self.max_cycles;
        let seat_class = self.seat_class.clone();
        builder.with_pipeline(|pipeline| {
            if let Some(max_cycles) = max_cycles {
                pipeline.max_cycles = max_cycles;
            }
            if let Some(seat_class) = seat_class.filter(|class| !class.trim().is_empty()) {
                pipeline.seat_class = seat_class.trim().to_string();
            }
        })
    }

    pub fn request(&self) -> String {
        self.trip.join(" ").trim().to_owned()
    }

    pub async fn run(self, config: Config) -> Result<ExitCode> {
        commands::run(self, config).await
    }
}
