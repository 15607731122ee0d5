use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use log::info;
use shop_logistics::utils::logging::{log_warning, print_batch_summary, print_ranking};
use shop_logistics::{Pipeline, PipelineConfig, TrackingOutcome, load_inputs, write_tracking_log};

#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

const DEFAULT_CONFIG: &str = "pipeline.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config_path = std::env::args()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_CONFIG), PathBuf::from);
    let config = if config_path.exists() {
        PipelineConfig::from_file(&config_path)
            .with_context(|| format!("Failed to load configuration {}", config_path.display()))?
    } else {
        log_warning("Configuration not found, using defaults", Some(&config_path));
        let config = PipelineConfig::default();
        config.validate()?;
        config
    };
    info!("{config}");

    let start = Instant::now();
    let inputs = load_inputs(&config)
        .await
        .context("Failed to load pipeline inputs")?;
    for (label, table) in [("Sales", &inputs.sales), ("Reviews", &inputs.reviews)] {
        match table {
            Ok(batches) => print_batch_summary(label, batches),
            Err(error) => println!("{label}: unavailable ({error})"),
        }
    }
    println!("Orders: {} rows", inputs.orders.len());

    let output = config.paths.output.clone();
    let pipeline = Pipeline::new(config);
    let report = tokio::task::spawn_blocking(move || pipeline.run(&inputs))
        .await
        .context("Pipeline task panicked")??;

    print_ranking(&report.ranking.ranking);
    if let Some(error) = &report.ranking.error {
        println!("  ({error})");
    }

    match &report.tracking {
        TrackingOutcome::NoValidOrders { product } => {
            println!("No valid orders found for product '{product}'");
        }
        TrackingOutcome::Tracked(tracking) => {
            print!("{tracking}");
            write_tracking_log(&output, &tracking.log())
                .with_context(|| format!("Failed to write tracking log {}", output.display()))?;
            println!("Tracking data saved to {}", output.display());
        }
    }

    info!("Run finished in {:?}", start.elapsed());
    Ok(())
}
