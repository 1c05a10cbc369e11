// Simulation headless de la colonie minière
// Exécute N cycles, journalise la progression et affiche le bilan de fin de run

use asteroid_colony::{ColonyConfig, World};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "simulation", about = "Asteroid mining colony simulation (headless)")]
struct Args {
    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    steps: u64,

    /// TOML file overriding the default colony parameters
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed (overrides the one in the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Print a progress line every N ticks (0 disables it)
    #[arg(long, default_value_t = 10)]
    report_every: u64,

    /// Print the final snapshot as JSON instead of the text summary
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    // === PHASE 1: CONFIGURATION ===
    let mut config = match &args.config {
        Some(path) => ColonyConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => ColonyConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    // === PHASE 2: CONSTRUCTION DE LA COLONIE ===
    let mut world = World::new(config).context("invalid colony configuration")?;
    info!(steps = args.steps, "starting headless run");

    // === PHASE 3: BOUCLE DE SIMULATION ===
    for i in 0..args.steps {
        world.step();
        if args.report_every > 0 && i % args.report_every == 0 {
            info!(
                step = i,
                collected = world.total_resources_collected,
                "progress"
            );
        }
    }

    // === PHASE 4: BILAN ===
    if args.json {
        println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
        return Ok(());
    }

    println!("\n--- Simulation Results ---");
    println!("Total Resources Collected: {}", world.total_resources_collected);
    println!("Resource Breakdown:");
    for (resource, amount) in &world.station.processed {
        if *amount > 0 {
            let value = amount * resource.credit_value();
            println!("  {resource}: {amount} units (Value: {value})");
        }
    }
    println!("Total Value: {}", world.total_value());
    println!("Asteroids Depleted: {}", world.total_asteroids_depleted);
    println!("Operational Cost: {:.1}", world.operational_cost);
    println!(
        "Efficiency: {:.2} resources/energy",
        world.total_resources_collected as f64 / world.operational_cost.max(1.0)
    );
    println!("Station: {}", world.station.get_status());

    Ok(())
}
