use crate::fungus::FungusParams;

use super::model::{Stage, StageFlows, SurfaceModel};

const EPS: f64 = 1e-9;

/// Single-bucket strategy: one live-area scalar plus the lesion's thermal
/// age. The per-stage split is derived from the growth law, with the
/// oldest tissue deepest into the stage succession. Tissue grown after
/// incubation is chlorotic at birth.
#[derive(Debug)]
pub struct ContinuousSurfaces {
    alive: f64,
    empty: f64,
    age_dd: f64,
    areas: [f64; 5],
    center: Stage,
    chlorosis_seen: f64,
    necrosis_seen: f64,
    sporulation_seen: f64,
}

impl ContinuousSurfaces {
    pub fn new() -> Self {
        Self {
            alive: 0.0,
            empty: 0.0,
            age_dd: 0.0,
            areas: [0.0; 5],
            center: Stage::Incubating,
            chlorosis_seen: 0.0,
            necrosis_seen: 0.0,
            sporulation_seen: 0.0,
        }
    }

    /// Cumulative areas that have crossed into chlorosis, necrosis and
    /// sporulation. Bands older than chlorosis follow the surface the
    /// lesion could have grown by the time the band opened; the min with
    /// the actual live area absorbs competition shortfalls.
    fn crossings(&self, params: &FungusParams) -> (f64, f64, f64) {
        let t_chlorosis = params.incubation_dd;
        let t_necrosis = t_chlorosis + params.chlorosis_dd;
        let t_sporulation = t_necrosis + params.necrosis_dd;
        let crossed_chlorosis = if self.age_dd < t_chlorosis {
            0.0
        } else {
            self.alive
        };
        let potential = |boundary: f64| {
            if self.age_dd < boundary {
                0.0
            } else {
                params.smin + params.growth_rate * (self.age_dd - boundary)
            }
        };
        let crossed_necrosis = self.alive.min(potential(t_necrosis));
        let crossed_sporulation = self.alive.min(potential(t_sporulation));
        (crossed_chlorosis, crossed_necrosis, crossed_sporulation)
    }

    fn refresh(&mut self, params: &FungusParams) {
        let (chlorosis, necrosis, sporulation) = self.crossings(params);
        self.empty = self.empty.min(sporulation);
        self.areas = [
            self.alive - chlorosis,
            chlorosis - necrosis,
            necrosis - sporulation,
            sporulation - self.empty,
            self.empty,
        ];
        let t_chlorosis = params.incubation_dd;
        let t_necrosis = t_chlorosis + params.chlorosis_dd;
        let t_sporulation = t_necrosis + params.necrosis_dd;
        self.center = if self.age_dd < t_chlorosis {
            Stage::Incubating
        } else if self.age_dd < t_necrosis {
            Stage::Chlorotic
        } else if self.age_dd < t_sporulation {
            Stage::Necrotic
        } else if self.areas[3] <= EPS && self.empty > EPS {
            Stage::Empty
        } else {
            Stage::Sporulating
        };
    }
}

impl Default for ContinuousSurfaces {
    fn default() -> Self {
        Self::new()
    }
}

impl SurfaceModel for ContinuousSurfaces {
    fn advance(&mut self, dday: f64, params: &FungusParams) -> StageFlows {
        if dday > 0.0 {
            self.age_dd += dday;
        }
        self.refresh(params);
        let (chlorosis, necrosis, sporulation) = self.crossings(params);
        let flows = StageFlows {
            to_chlorotic: (chlorosis - self.chlorosis_seen).max(0.0),
            to_necrotic: (necrosis - self.necrosis_seen).max(0.0),
            to_sporulating: (sporulation - self.sporulation_seen).max(0.0),
        };
        self.chlorosis_seen = self.chlorosis_seen.max(chlorosis);
        self.necrosis_seen = self.necrosis_seen.max(necrosis);
        self.sporulation_seen = self.sporulation_seen.max(sporulation);
        flows
    }

    fn deposit(&mut self, area: f64, params: &FungusParams) {
        if area <= 0.0 {
            return;
        }
        self.alive += area;
        self.refresh(params);
    }

    fn area(&self, stage: Stage) -> f64 {
        match stage {
            Stage::Incubating => self.areas[0],
            Stage::Chlorotic => self.areas[1],
            Stage::Necrotic => self.areas[2],
            Stage::Sporulating => self.areas[3],
            Stage::Empty => self.areas[4],
            Stage::Dead => 0.0,
        }
    }

    fn area_alive(&self) -> f64 {
        self.alive
    }

    fn center_stage(&self) -> Stage {
        self.center
    }

    fn pending_demand(&self) -> Option<f64> {
        None
    }

    fn kill_younger(&mut self, cutoff: Stage, ratio: f64, params: &FungusParams) -> f64 {
        if ratio <= 0.0 {
            return 0.0;
        }
        let ratio = ratio.min(1.0);
        self.refresh(params);
        let young: f64 = Stage::LIVE
            .iter()
            .filter(|stage| **stage < cutoff)
            .map(|stage| self.area(*stage))
            .sum();
        let killed = ratio * young;
        self.alive = (self.alive - killed).max(0.0);
        self.refresh(params);
        killed
    }

    fn retire_sporulating(&mut self, area: f64, params: &FungusParams) -> f64 {
        if area <= 0.0 {
            return 0.0;
        }
        self.refresh(params);
        let moved = area.min(self.areas[3]).max(0.0);
        self.empty += moved;
        self.refresh(params);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FungusParams {
        FungusParams::septoria()
    }

    fn partition_sum(model: &ContinuousSurfaces) -> f64 {
        Stage::LIVE.iter().map(|s| model.area(*s)).sum()
    }

    #[test]
    fn young_lesion_is_entirely_incubating() {
        let params = params();
        let mut model = ContinuousSurfaces::new();
        model.advance(100.0, &params);
        model.deposit(0.01, &params);
        assert_eq!(model.center_stage(), Stage::Incubating);
        assert!((model.area(Stage::Incubating) - 0.01).abs() < 1e-12);
        assert!((partition_sum(&model) - model.area_alive()).abs() < 1e-9);
    }

    #[test]
    fn stage_bands_follow_the_growth_law() {
        let params = params();
        let mut model = ContinuousSurfaces::new();
        model.advance(340.0, &params);
        model.deposit(0.1, &params);
        let expected_necrotic = params.smin + params.growth_rate * 10.0;
        assert_eq!(model.center_stage(), Stage::Necrotic);
        assert!((model.area(Stage::Necrotic) - expected_necrotic).abs() < 1e-9);
        assert!((model.area(Stage::Chlorotic) - (0.1 - expected_necrotic)).abs() < 1e-9);
        assert_eq!(model.area(Stage::Incubating), 0.0);
        assert!((partition_sum(&model) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn sporulation_flow_reports_only_new_arrivals() {
        let params = params();
        let mut model = ContinuousSurfaces::new();
        model.advance(349.0, &params);
        model.deposit(0.2, &params);
        let first = model.advance(1.0, &params);
        assert!((first.to_sporulating - params.smin).abs() < 1e-9);
        let second = model.advance(10.0, &params);
        assert!((second.to_sporulating - params.growth_rate * 10.0).abs() < 1e-9);
    }

    #[test]
    fn senescence_kill_spares_old_tissue() {
        let params = params();
        let mut model = ContinuousSurfaces::new();
        model.advance(340.0, &params);
        model.deposit(0.1, &params);
        let necrotic_before = model.area(Stage::Necrotic);
        let chlorotic_before = model.area(Stage::Chlorotic);
        let killed = model.kill_younger(Stage::Necrotic, 1.0, &params);
        assert!((killed - chlorotic_before).abs() < 1e-9);
        assert!((model.area(Stage::Necrotic) - necrotic_before).abs() < 1e-9);
        assert_eq!(model.area(Stage::Chlorotic), 0.0);
    }

    #[test]
    fn retired_surface_moves_to_empty() {
        let params = params();
        let mut model = ContinuousSurfaces::new();
        model.advance(360.0, &params);
        model.deposit(0.1, &params);
        let sporulating = model.area(Stage::Sporulating);
        assert!(sporulating > 0.0);
        let moved = model.retire_sporulating(sporulating * 0.5, &params);
        assert!((moved - sporulating * 0.5).abs() < 1e-9);
        assert!((model.area(Stage::Empty) - moved).abs() < 1e-12);
        assert!((partition_sum(&model) - model.area_alive()).abs() < 1e-9);
    }
}
