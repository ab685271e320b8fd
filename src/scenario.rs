use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use rand::Rng;
use serde::Deserialize;
use thiserror::Error;

use crate::canopy::Canopy;
use crate::dispersal::DispersalUnit;
use crate::fungus::FungusKind;
use crate::growth::GrowthPolicyKind;
use crate::leaf::{LeafSector, SenescenceProgram};
use crate::lesion::SurfaceModelKind;
use crate::rng::RngManager;
use crate::weather::WeatherProgram;

fn default_tick_hours() -> f64 {
    1.0
}

fn default_snapshot_interval_ticks() -> u64 {
    0
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from("snapshots")
}

fn default_spores_per_unit() -> u32 {
    1
}

fn default_members_per_unit() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default = "default_tick_hours")]
    pub tick_hours: f64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default = "default_snapshot_interval_ticks")]
    pub snapshot_interval_ticks: u64,
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    pub fungus: FungusKind,
    #[serde(default)]
    pub surface_model: SurfaceModelKind,
    #[serde(default)]
    pub growth_policy: GrowthPolicyKind,
    #[serde(default)]
    pub weather: WeatherProgram,
    #[serde(default)]
    pub senescence: Option<SenescenceProgram>,
    pub sectors: Vec<ScenarioSector>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioSector {
    pub area: f64,
    pub length: f64,
    #[serde(default)]
    pub inoculum: Option<Inoculum>,
}

/// Initial infestation of one sector: `units` dispersal units, each a
/// cohort of `members_per_unit` packets of `spores_per_unit` spores.
#[derive(Debug, Clone, Deserialize)]
pub struct Inoculum {
    pub units: u32,
    #[serde(default = "default_spores_per_unit")]
    pub spores_per_unit: u32,
    #[serde(default = "default_members_per_unit")]
    pub members_per_unit: u32,
}

#[derive(Debug, Error, PartialEq)]
pub enum ScenarioError {
    #[error("scenario declares no sectors")]
    NoSectors,
    #[error("sector {index}: area must be positive, got {value}")]
    NonPositiveArea { index: usize, value: f64 },
    #[error("sector {index}: length must be positive, got {value}")]
    NonPositiveLength { index: usize, value: f64 },
    #[error("ticks must be positive when set")]
    ZeroTicks,
    #[error("tick_hours must be positive, got {0}")]
    NonPositiveTickHours(f64),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        scenario
            .validate()
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.sectors.is_empty() {
            return Err(ScenarioError::NoSectors);
        }
        for (index, sector) in self.sectors.iter().enumerate() {
            if sector.area <= 0.0 {
                return Err(ScenarioError::NonPositiveArea {
                    index,
                    value: sector.area,
                });
            }
            if sector.length <= 0.0 {
                return Err(ScenarioError::NonPositiveLength {
                    index,
                    value: sector.length,
                });
            }
        }
        if self.ticks == Some(0) {
            return Err(ScenarioError::ZeroTicks);
        }
        if self.tick_hours <= 0.0 {
            return Err(ScenarioError::NonPositiveTickHours(self.tick_hours));
        }
        Ok(())
    }

    /// Build the canopy with its initial inoculum. Placement draws from a
    /// dedicated stream of the scenario seed, so it never shifts with
    /// engine system order.
    pub fn build_canopy(&self) -> Canopy {
        let params = Arc::new(self.fungus.params());
        let mut streams = RngManager::new(self.seed);
        let mut rng = streams.stream("inoculum");
        let mut canopy = Canopy::new(self.tick_hours);
        for decl in &self.sectors {
            let mut sector = LeafSector::new(decl.area, decl.length);
            if let Some(inoculum) = &decl.inoculum {
                for _ in 0..inoculum.units {
                    let positions: Vec<f64> = (0..inoculum.members_per_unit.max(1))
                        .map(|_| rng.gen_range(0.0..decl.length))
                        .collect();
                    sector.dispersal_units.push(DispersalUnit::deposited(
                        Arc::clone(&params),
                        inoculum.spores_per_unit,
                        positions,
                    ));
                }
            }
            canopy.push_sector(sector);
        }
        canopy
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(720)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_yaml() -> &'static str {
        "name: patch\nseed: 9\nfungus: septoria\nsectors:\n  - area: 10.0\n    length: 12.0\n    inoculum:\n      units: 4\n      spores_per_unit: 3\n"
    }

    #[test]
    fn parses_minimal_scenario_with_defaults() {
        let scenario: Scenario = serde_yaml::from_str(minimal_yaml()).expect("parse");
        assert_eq!(scenario.name, "patch");
        assert_eq!(scenario.fungus, FungusKind::Septoria);
        assert_eq!(scenario.surface_model, SurfaceModelKind::Histogram);
        assert_eq!(scenario.tick_hours, 1.0);
        assert!(scenario.senescence.is_none());
        assert!(scenario.validate().is_ok());
    }

    #[test]
    fn build_canopy_places_the_inoculum() {
        let scenario: Scenario = serde_yaml::from_str(minimal_yaml()).expect("parse");
        let canopy = scenario.build_canopy();
        assert_eq!(canopy.sectors.len(), 1);
        let sector = &canopy.sectors[0];
        assert_eq!(sector.dispersal_units.len(), 4);
        for unit in &sector.dispersal_units {
            assert_eq!(unit.spores(), 3);
            assert_eq!(unit.members(), 1);
        }
    }

    #[test]
    fn inoculum_builds_cohorts_of_the_declared_size() {
        let yaml = "name: patch\nseed: 9\nfungus: brown_rust\nsectors:\n  - area: 12.0\n    length: 14.0\n    inoculum:\n      units: 2\n      spores_per_unit: 10\n      members_per_unit: 4\n";
        let scenario: Scenario = serde_yaml::from_str(yaml).expect("parse");
        let canopy = scenario.build_canopy();
        let sector = &canopy.sectors[0];
        assert_eq!(sector.dispersal_units.len(), 2);
        for unit in &sector.dispersal_units {
            assert_eq!(unit.members(), 4);
            assert_eq!(unit.spores(), 10);
        }
    }

    #[test]
    fn rejects_empty_and_degenerate_scenarios() {
        let no_sectors = "name: x\nseed: 1\nfungus: septoria\nsectors: []\n";
        let scenario: Scenario = serde_yaml::from_str(no_sectors).expect("parse");
        assert_eq!(scenario.validate(), Err(ScenarioError::NoSectors));

        let bad_area = "name: x\nseed: 1\nfungus: septoria\nsectors:\n  - area: 0.0\n    length: 5.0\n";
        let scenario: Scenario = serde_yaml::from_str(bad_area).expect("parse");
        assert!(matches!(
            scenario.validate(),
            Err(ScenarioError::NonPositiveArea { index: 0, .. })
        ));

        let zero_ticks =
            "name: x\nseed: 1\nticks: 0\nfungus: brown_rust\nsectors:\n  - area: 1.0\n    length: 2.0\n";
        let scenario: Scenario = serde_yaml::from_str(zero_ticks).expect("parse");
        assert_eq!(scenario.validate(), Err(ScenarioError::ZeroTicks));
    }

    #[test]
    fn tick_override_wins_over_file_value() {
        let scenario: Scenario = serde_yaml::from_str(minimal_yaml()).expect("parse");
        assert_eq!(scenario.ticks(None), 720);
        assert_eq!(scenario.ticks(Some(12)), 12);
    }
}
