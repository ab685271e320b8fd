use crate::fungus::FungusParams;

use super::model::{Stage, StageFlows, SurfaceModel};

const EPS: f64 = 1e-9;

/// Shift bin contents up the age axis by `shift` bin widths, splitting
/// each bin's mass across the two straddled destination bins. Mass pushed
/// past the last bin is returned as the flow into the next stage.
fn shift_bins(bins: &mut [f64], shift: f64) -> f64 {
    if shift <= 0.0 {
        return 0.0;
    }
    let n = bins.len();
    let whole = shift.floor() as usize;
    let frac = shift - shift.floor();
    let mut next = vec![0.0; n];
    let mut out = 0.0;
    for (i, &mass) in bins.iter().enumerate() {
        if mass == 0.0 {
            continue;
        }
        let lo = i + whole;
        let stay = mass * (1.0 - frac);
        if lo < n {
            next[lo] += stay;
        } else {
            out += stay;
        }
        let carry = mass * frac;
        if lo + 1 < n {
            next[lo + 1] += carry;
        } else {
            out += carry;
        }
    }
    bins.copy_from_slice(&next);
    out
}

/// Place mass entering a stage mid-step at its carried-over age, split
/// across the straddled bin pair. Returns the part already past age 1.
fn inject(bins: &mut [f64], mass: f64, shift: f64) -> f64 {
    if mass <= 0.0 {
        return 0.0;
    }
    let n = bins.len();
    let whole = shift.max(0.0).floor() as usize;
    let frac = shift.max(0.0) - shift.max(0.0).floor();
    let mut out = 0.0;
    if whole < n {
        bins[whole] += mass * (1.0 - frac);
    } else {
        out += mass * (1.0 - frac);
    }
    if whole + 1 < n {
        bins[whole + 1] += mass * frac;
    } else {
        out += mass * frac;
    }
    out
}

/// Fixed-width histogram strategy: chlorotic and necrotic tissue is held
/// in physiological-age bins spanning [0, 1) of the stage duration. Each
/// advance shifts contents by the stage-normalized progress; whatever
/// crosses age 1 flows into the next stage. The incubating tissue ages as
/// one bucket since the whole lesion incubates together.
#[derive(Debug)]
pub struct HistogramSurfaces {
    incubating: f64,
    incubation_age: f64,
    incubation_done: bool,
    chlorotic: Vec<f64>,
    necrotic: Vec<f64>,
    sporulating: f64,
    empty: f64,
}

impl HistogramSurfaces {
    pub fn new(params: &FungusParams) -> Self {
        Self {
            incubating: 0.0,
            incubation_age: 0.0,
            incubation_done: false,
            chlorotic: vec![0.0; params.age_bins],
            necrotic: vec![0.0; params.age_bins],
            sporulating: 0.0,
            empty: 0.0,
        }
    }

    fn bins(&self) -> f64 {
        self.chlorotic.len() as f64
    }
}

impl SurfaceModel for HistogramSurfaces {
    fn advance(&mut self, dday: f64, params: &FungusParams) -> StageFlows {
        let mut flows = StageFlows::default();
        if dday <= 0.0 {
            return flows;
        }
        let bins = self.bins();

        // Oldest stage first so newly arrived mass is not shifted twice.
        let matured = shift_bins(&mut self.necrotic, dday / params.necrosis_dd * bins);
        flows.to_sporulating += matured;
        self.sporulating += matured;

        let browned = shift_bins(&mut self.chlorotic, dday / params.chlorosis_dd * bins);
        flows.to_necrotic += browned;
        self.necrotic[0] += browned;

        if !self.incubation_done {
            let progress = dday / params.incubation_dd;
            if self.incubation_age + progress < 1.0 {
                self.incubation_age += progress;
            } else {
                let carry_dd = (self.incubation_age + progress - 1.0) * params.incubation_dd;
                self.incubation_done = true;
                let mass = self.incubating;
                self.incubating = 0.0;
                flows.to_chlorotic += mass;
                let spill = inject(&mut self.chlorotic, mass, carry_dd / params.chlorosis_dd * bins);
                if spill > 0.0 {
                    flows.to_necrotic += spill;
                    self.necrotic[0] += spill;
                }
            }
        }
        flows
    }

    fn deposit(&mut self, area: f64, _params: &FungusParams) {
        if area <= 0.0 {
            return;
        }
        if self.incubation_done {
            self.chlorotic[0] += area;
        } else {
            self.incubating += area;
        }
    }

    fn area(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Incubating => self.incubating,
            Stage::Chlorotic => self.chlorotic.iter().sum(),
            Stage::Necrotic => self.necrotic.iter().sum(),
            Stage::Sporulating => self.sporulating,
            Stage::Empty => self.empty,
            Stage::Dead => 0.0,
        }
    }

    fn area_alive(&self) -> f64 {
        self.incubating
            + self.chlorotic.iter().sum::<f64>()
            + self.necrotic.iter().sum::<f64>()
            + self.sporulating
            + self.empty
    }

    fn center_stage(&self) -> Stage {
        if self.sporulating > EPS {
            Stage::Sporulating
        } else if self.area(Stage::Necrotic) > EPS {
            Stage::Necrotic
        } else if self.area(Stage::Chlorotic) > EPS {
            Stage::Chlorotic
        } else if !self.incubation_done {
            Stage::Incubating
        } else if self.empty > EPS {
            Stage::Empty
        } else {
            Stage::Dead
        }
    }

    fn pending_demand(&self) -> Option<f64> {
        None
    }

    fn kill_younger(&mut self, cutoff: Stage, ratio: f64, _params: &FungusParams) -> f64 {
        if ratio <= 0.0 {
            return 0.0;
        }
        let ratio = ratio.min(1.0);
        let mut killed = 0.0;
        if Stage::Incubating < cutoff {
            killed += ratio * self.incubating;
            self.incubating *= 1.0 - ratio;
        }
        if Stage::Chlorotic < cutoff {
            for mass in &mut self.chlorotic {
                killed += ratio * *mass;
                *mass *= 1.0 - ratio;
            }
        }
        if Stage::Necrotic < cutoff {
            for mass in &mut self.necrotic {
                killed += ratio * *mass;
                *mass *= 1.0 - ratio;
            }
        }
        killed
    }

    fn retire_sporulating(&mut self, area: f64, _params: &FungusParams) -> f64 {
        if area <= 0.0 {
            return 0.0;
        }
        let moved = area.min(self.sporulating);
        self.sporulating -= moved;
        self.empty += moved;
        moved
    }
}
