use std::path::PathBuf;

use anyhow::Result;
use tracing::{debug, info};

use crate::canopy::Canopy;
use crate::outputs::TickMetrics;
use crate::rng::{RngManager, SystemRng};
use crate::snapshot::SnapshotWriter;

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
    pub snapshot_interval_ticks: u64,
    pub snapshot_dir: PathBuf,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn push_system(&mut self, system: impl System + 'static) {
        self.systems.push(Box::new(system));
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            snapshot_writer: SnapshotWriter::new(
                &self.settings.snapshot_dir,
                self.settings.snapshot_interval_ticks,
            ),
            settings: self.settings,
        }
    }
}

pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    snapshot_writer: SnapshotWriter,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, canopy: &mut Canopy, ticks: u64) -> Result<()> {
        self.run_with_hook(canopy, ticks, |_| {})
    }

    /// Run the tick loop, handing the per-tick summary to `hook` after
    /// each tick completes.
    pub fn run_with_hook<F>(&mut self, canopy: &mut Canopy, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(TickSummary),
    {
        info!(
            scenario = %self.settings.scenario_name,
            ticks,
            sectors = canopy.sectors.len(),
            "run started"
        );
        for _ in 0..ticks {
            let current_tick = canopy.tick();
            for system in &mut self.systems {
                let mut rng_stream = self.rng.stream(system.name());
                let ctx = SystemContext {
                    tick: current_tick,
                    tick_hours: canopy.tick_hours(),
                    scenario_name: &self.settings.scenario_name,
                };
                system.run(&ctx, canopy, &mut rng_stream)?;
            }
            canopy.advance_time();
            self.snapshot_writer
                .maybe_write(canopy, &self.settings.scenario_name)?;
            let summary = TickSummary {
                tick: canopy.tick(),
                metrics: TickMetrics::measure(canopy),
            };
            debug!(
                tick = summary.tick,
                severity_pct = summary.metrics.severity_pct,
                viable_units = summary.metrics.viable_units,
                active_lesions = summary.metrics.active_lesions,
                "tick complete"
            );
            hook(summary);
        }
        info!(scenario = %self.settings.scenario_name, "run finished");
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct TickSummary {
    pub tick: u64,
    pub metrics: TickMetrics,
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub tick_hours: f64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        canopy: &mut Canopy,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
