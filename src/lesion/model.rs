use std::fmt;

use serde::{Deserialize, Serialize};

use crate::fungus::FungusParams;

use super::continuous::ContinuousSurfaces;
use super::histogram::HistogramSurfaces;
use super::rings::RingSurfaces;

/// Physiological stages of lesion tissue, oldest last. `Dead` is the
/// terminal status of a fully senesced lesion and never holds surface.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Incubating,
    Chlorotic,
    Necrotic,
    Sporulating,
    Empty,
    Dead,
}

impl Stage {
    pub const LIVE: [Stage; 5] = [
        Stage::Incubating,
        Stage::Chlorotic,
        Stage::Necrotic,
        Stage::Sporulating,
        Stage::Empty,
    ];

    pub fn next(self) -> Stage {
        match self {
            Stage::Incubating => Stage::Chlorotic,
            Stage::Chlorotic => Stage::Necrotic,
            Stage::Necrotic => Stage::Sporulating,
            Stage::Sporulating => Stage::Empty,
            Stage::Empty => Stage::Empty,
            Stage::Dead => Stage::Dead,
        }
    }

    /// Degree-days tissue spends in this stage before moving on.
    /// Unbounded stages return None.
    pub fn duration(self, params: &FungusParams) -> Option<f64> {
        match self {
            Stage::Incubating => Some(params.incubation_dd),
            Stage::Chlorotic => Some(params.chlorosis_dd),
            Stage::Necrotic => Some(params.necrosis_dd),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Stage::Incubating => "incubating",
            Stage::Chlorotic => "chlorotic",
            Stage::Necrotic => "necrotic",
            Stage::Sporulating => "sporulating",
            Stage::Empty => "empty",
            Stage::Dead => "dead",
        };
        f.write_str(label)
    }
}

/// Areas that crossed into later stages during one advance.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct StageFlows {
    pub to_chlorotic: f64,
    pub to_necrotic: f64,
    pub to_sporulating: f64,
}

/// Distribution of a lesion's live surface over tissue ages. Variants
/// discretize age differently but share the same contract: thermal time
/// moves tissue through the stage succession with fractional carryover,
/// growth lands on the youngest edge, senescence kills below a stage
/// cutoff, emission retires sporulating surface.
pub trait SurfaceModel: fmt::Debug {
    /// Advance all tissue by `dday` degree-days and report stage inflows.
    fn advance(&mut self, dday: f64, params: &FungusParams) -> StageFlows;
    /// Add newly granted growth at the youngest live edge.
    fn deposit(&mut self, area: f64, params: &FungusParams);
    fn area(&self, stage: Stage) -> f64;
    fn area_alive(&self) -> f64;
    /// Stage of the oldest tissue; drives the lesion status.
    fn center_stage(&self) -> Stage;
    /// Demand computed by the model itself when it tracks formation
    /// windows internally; None defers to the lesion-level growth law.
    fn pending_demand(&self) -> Option<f64>;
    /// Kill live tissue younger than `cutoff` for `ratio` of the cohort.
    /// Returns the area moved to dead.
    fn kill_younger(&mut self, cutoff: Stage, ratio: f64, params: &FungusParams) -> f64;
    /// Move spent sporulating surface to empty; returns the area moved.
    fn retire_sporulating(&mut self, area: f64, params: &FungusParams) -> f64;
}

/// Surface model selector for scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceModelKind {
    Continuous,
    Rings,
    #[default]
    Histogram,
}

impl SurfaceModelKind {
    pub fn build(self, params: &FungusParams) -> Box<dyn SurfaceModel> {
        match self {
            SurfaceModelKind::Continuous => Box::new(ContinuousSurfaces::new()),
            SurfaceModelKind::Rings => Box::new(RingSurfaces::new(params)),
            SurfaceModelKind::Histogram => Box::new(HistogramSurfaces::new(params)),
        }
    }
}
