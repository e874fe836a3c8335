use std::process::ExitCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::collab::Collaborators;
use crate::config::Config;
use crate::trip::{TripController, TripStatus};

use super::args::Cli;
use super::report;

pub(crate) async fn run(cli: Cli, config: Config) -> Result<ExitCode> {
    if cli.show_config {
        println!("{}", config.redacted_json()?);
        return Ok(ExitCode::SUCCESS);
    }

    let request = cli.request();
    if request.is_empty() {
        show_usage();
        return Ok(ExitCode::FAILURE);
    }

    config.validate()?;

    let collaborators =
        Collaborators::from_config(&config).context("Failed to initialise collaborators")?;
    let cancel = Arc::new(AtomicBool::new(false));
    let controller = TripController::builder()
        .with_standard_stages(&config, &collaborators)
        .max_cycles(config.pipeline.max_cycles)
        .cancel_on(Arc::clone(&cancel))
        .build();

    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after the current stage");
            cancel.store(true, Ordering::SeqCst);
        }
    });

    eprintln!("🚀 Planning your trip. Please wait...");
    let record = controller.run(request).await;
    ctrl_c.abort();
    info!(status = %record.status, cycles = record.cycle, "run finished");

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&record).context("Failed to serialize itinerary")?
        );
    } else if record.status == TripStatus::WithinBudget {
        print!("{}", report::render_itinerary(&record));
    } else {
        println!("{}", report::render_failure(&record));
    }

    Ok(if record.status == TripStatus::WithinBudget {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn show_usage() {
    println!("🌍 nomad plans a multi-city trip and checks it against your budget.");
    println!();
    println!("💡 How to use nomad:");
    println!("   nomad 'London to Tokyo and Osaka for 2 weeks in June on $4000'");
    println!("   nomad --max-cycles 5 'Lisbon and Porto, 3 nights each, $1500'");
    println!("   nomad --json 'Weekend in Rome from Berlin'    # Print the raw itinerary record");
    println!("   nomad --show-config                           # Show effective configuration");
    println!();
    println!("🔑 Requires OPENAI_API_KEY and TAVILY_API_KEY (or ~/.nomad/config).");
}
