use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use foliar::{
    engine::{EngineBuilder, EngineSettings},
    outputs::TickMetrics,
    scenario::ScenarioLoader,
    systems::{
        AllocationSystem, BookkeepingSystem, ClimateSystem, DevelopmentSystem, EmissionSystem,
        InfectionSystem,
    },
};

#[derive(Debug, Parser)]
#[command(author, version, about = "Within-leaf fungal epidemic runner")]
struct Cli {
    /// Path to the scenario YAML file
    #[arg(long, default_value = "scenarios/septoria_patch.yaml")]
    scenario: PathBuf,

    /// Override tick count (uses scenario default when omitted)
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the scenario RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Override snapshot interval in ticks
    #[arg(long)]
    snapshot_interval: Option<u64>,

    /// Directory for snapshots
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).compact().init();

    let cli = Cli::parse();
    let loader = ScenarioLoader::new(".");
    let mut scenario = loader.load(&cli.scenario)?;
    if let Some(seed) = cli.seed {
        scenario.seed = seed;
    }
    let mut canopy = scenario.build_canopy();
    let ticks = scenario.ticks(cli.ticks);
    let snapshot_interval = cli
        .snapshot_interval
        .unwrap_or(scenario.snapshot_interval_ticks);
    let snapshot_dir = cli
        .snapshot_dir
        .unwrap_or_else(|| scenario.snapshot_dir.clone());

    let settings = EngineSettings {
        scenario_name: scenario.name.clone(),
        seed: scenario.seed,
        snapshot_interval_ticks: snapshot_interval,
        snapshot_dir,
    };

    let mut engine = EngineBuilder::new(settings)
        .with_system(ClimateSystem::new(
            scenario.weather.clone(),
            scenario.senescence.clone(),
        ))
        .with_system(InfectionSystem::new(scenario.surface_model))
        .with_system(DevelopmentSystem::new())
        .with_system(AllocationSystem::new(scenario.growth_policy.build()))
        .with_system(EmissionSystem::new())
        .with_system(BookkeepingSystem::new())
        .build();

    engine.run(&mut canopy, ticks)?;

    let metrics = TickMetrics::measure(&canopy);
    println!(
        "Scenario '{}' completed for {} ticks. Severity {:.2}%, necrosis {:.2}%, {} active lesions, {} viable units.",
        scenario.name,
        ticks,
        metrics.severity_pct,
        metrics.necrosis_pct,
        metrics.active_lesions,
        metrics.viable_units
    );
    Ok(())
}
