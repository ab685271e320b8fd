use crate::fungus::FungusParams;

use super::model::{Stage, StageFlows, SurfaceModel};

const EPS: f64 = 1e-9;

/// One growth ring. The first ring walks the full ladder from incubation;
/// followers are born chlorotic at the formation boundary with the
/// overshoot age carried over, so no thermal time is truncated.
#[derive(Debug)]
struct Ring {
    stage: Stage,
    surface: f64,
    age_dd: f64,
    /// Degree-days left in the formation window, `None` once complete.
    forming_left: Option<f64>,
    /// Degree-days of growth credited to this ring in the current step.
    growth_dd: f64,
    demand: f64,
    growth_active: bool,
    born_incubating: bool,
    alive: bool,
}

impl Ring {
    fn leader(params: &FungusParams) -> Self {
        Self {
            stage: Stage::Incubating,
            surface: 0.0,
            age_dd: 0.0,
            forming_left: Some(params.incubation_dd + params.ring_width_dd),
            growth_dd: 0.0,
            demand: 0.0,
            growth_active: true,
            born_incubating: true,
            alive: true,
        }
    }

    /// Threshold the ring must reach to leave its current stage. Follower
    /// rings skip incubation, so their ladder is offset by it.
    fn next_boundary(&self, params: &FungusParams) -> Option<f64> {
        let offset = if self.born_incubating {
            params.incubation_dd
        } else {
            0.0
        };
        match self.stage {
            Stage::Incubating => Some(params.incubation_dd),
            Stage::Chlorotic => Some(offset + params.chlorosis_dd),
            Stage::Necrotic => Some(offset + params.chlorosis_dd + params.necrosis_dd),
            _ => None,
        }
    }

    fn walk_stages(&mut self, params: &FungusParams, flows: &mut StageFlows) {
        while let Some(boundary) = self.next_boundary(params) {
            if self.age_dd < boundary {
                return;
            }
            self.stage = self.stage.next();
            match self.stage {
                Stage::Chlorotic => flows.to_chlorotic += self.surface,
                Stage::Necrotic => flows.to_necrotic += self.surface,
                Stage::Sporulating => flows.to_sporulating += self.surface,
                _ => return,
            }
        }
    }
}

/// Age-ring strategy: an ordered list of rings, oldest first, each created
/// during a fixed-width formation window of degree-days and aging through
/// the stages independently. Demand is recorded per forming ring and the
/// granted offer is paid back oldest-first in area units.
#[derive(Debug)]
pub struct RingSurfaces {
    rings: Vec<Ring>,
    empty: f64,
}

impl RingSurfaces {
    pub fn new(params: &FungusParams) -> Self {
        Self {
            rings: vec![Ring::leader(params)],
            empty: 0.0,
        }
    }

    /// Chain new rings over the part of the step that ran past the last
    /// formation window. Every full window in the overshoot yields one
    /// completed ring; the tail opens the next forming ring.
    fn spawn_followers(&mut self, mut overshoot: f64, params: &FungusParams, flows: &mut StageFlows) {
        loop {
            let mut ring = Ring {
                stage: Stage::Chlorotic,
                surface: 0.0,
                age_dd: overshoot,
                forming_left: None,
                growth_dd: 0.0,
                demand: 0.0,
                growth_active: true,
                born_incubating: false,
                alive: true,
            };
            if overshoot > params.ring_width_dd {
                ring.growth_dd = params.ring_width_dd;
                overshoot -= params.ring_width_dd;
                ring.walk_stages(params, flows);
                self.rings.push(ring);
            } else {
                ring.growth_dd = overshoot;
                ring.forming_left = Some(params.ring_width_dd - overshoot);
                ring.walk_stages(params, flows);
                self.rings.push(ring);
                return;
            }
        }
    }
}

impl SurfaceModel for RingSurfaces {
    fn advance(&mut self, dday: f64, params: &FungusParams) -> StageFlows {
        let mut flows = StageFlows::default();
        if dday <= 0.0 {
            for ring in &mut self.rings {
                ring.growth_dd = 0.0;
                ring.demand = 0.0;
            }
            return flows;
        }
        let mut overshoot = None;
        let count = self.rings.len();
        for (i, ring) in self.rings.iter_mut().enumerate() {
            ring.age_dd += dday;
            if let Some(left) = ring.forming_left {
                if dday > left {
                    ring.growth_dd = left;
                    ring.forming_left = None;
                    if i == count - 1 {
                        overshoot = Some(dday - left);
                    }
                } else {
                    ring.growth_dd = dday;
                    ring.forming_left = Some(left - dday);
                }
            } else {
                ring.growth_dd = 0.0;
            }
            ring.walk_stages(params, &mut flows);
        }
        if let Some(overshoot) = overshoot {
            self.spawn_followers(overshoot, params, &mut flows);
        }
        for ring in &mut self.rings {
            ring.demand = if !ring.growth_active {
                0.0
            } else if ring.stage == Stage::Incubating {
                params.incubation_rate() * ring.growth_dd
            } else {
                params.growth_rate * ring.growth_dd
            };
        }
        flows
    }

    fn deposit(&mut self, area: f64, _params: &FungusParams) {
        let mut left = area.max(0.0);
        for ring in &mut self.rings {
            if !ring.growth_active {
                continue;
            }
            let granted = ring.demand.min(left).max(0.0);
            left -= granted;
            ring.surface += granted;
            if granted <= 0.0 && ring.surface <= 0.0 {
                ring.alive = false;
            }
            if ring.forming_left.is_none() {
                ring.growth_active = false;
            }
            ring.demand = 0.0;
        }
        if left > EPS {
            if let Some(youngest) = self.rings.iter_mut().rev().find(|r| r.alive) {
                youngest.surface += left;
            }
        }
        self.rings.retain(|ring| ring.alive);
    }

    fn area(&self, stage: Stage) -> f64 {
        if stage == Stage::Empty {
            return self.empty;
        }
        self.rings
            .iter()
            .filter(|ring| ring.stage == stage)
            .map(|ring| ring.surface)
            .sum()
    }

    fn area_alive(&self) -> f64 {
        self.empty + self.rings.iter().map(|ring| ring.surface).sum::<f64>()
    }

    fn center_stage(&self) -> Stage {
        match self.rings.first() {
            Some(ring) => ring.stage,
            None if self.empty > EPS => Stage::Empty,
            None => Stage::Dead,
        }
    }

    fn pending_demand(&self) -> Option<f64> {
        Some(
            self.rings
                .iter()
                .filter(|ring| ring.growth_active)
                .map(|ring| ring.demand)
                .sum(),
        )
    }

    fn kill_younger(&mut self, cutoff: Stage, ratio: f64, _params: &FungusParams) -> f64 {
        if ratio <= 0.0 {
            return 0.0;
        }
        let ratio = ratio.min(1.0);
        let mut killed = 0.0;
        for ring in &mut self.rings {
            if ring.stage < cutoff {
                let share = ratio * ring.surface;
                ring.surface -= share;
                killed += share;
                if ratio >= 1.0 {
                    ring.alive = false;
                }
            }
        }
        self.rings.retain(|ring| ring.alive);
        killed
    }

    fn retire_sporulating(&mut self, area: f64, _params: &FungusParams) -> f64 {
        let mut left = area.max(0.0);
        let mut moved = 0.0;
        for ring in &mut self.rings {
            if left <= 0.0 {
                break;
            }
            if ring.stage != Stage::Sporulating {
                continue;
            }
            let take = ring.surface.min(left);
            ring.surface -= take;
            left -= take;
            moved += take;
            self.empty += take;
            if ring.surface <= EPS {
                self.empty += ring.surface;
                ring.surface = 0.0;
                ring.stage = Stage::Empty;
            }
        }
        self.rings.retain(|ring| ring.stage != Stage::Empty);
        moved
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> FungusParams {
        FungusParams::septoria()
    }

    fn feed(model: &mut RingSurfaces, params: &FungusParams) -> f64 {
        let demand = model.pending_demand().unwrap_or(0.0);
        model.deposit(demand, params);
        demand
    }

    #[test]
    fn leader_ring_demands_at_the_incubation_rate() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        let demand = model.pending_demand().unwrap();
        assert!((demand - params.incubation_rate() * 219.0).abs() < 1e-12);
        model.deposit(demand, &params);
        assert_eq!(model.center_stage(), Stage::Incubating);
        assert!((model.area(Stage::Incubating) - demand).abs() < 1e-12);
    }

    #[test]
    fn crossing_into_chlorosis_reports_the_ring_surface() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        let grown = feed(&mut model, &params);
        let flows = model.advance(1.0, &params);
        assert!((flows.to_chlorotic - grown).abs() < 1e-12);
        assert_eq!(model.center_stage(), Stage::Chlorotic);
    }

    #[test]
    fn overshooting_the_window_chains_new_rings() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        feed(&mut model, &params);
        model.advance(1.0, &params);
        feed(&mut model, &params);
        // 20 dd left in the leader window; 130 dd spawns six followers.
        model.advance(130.0, &params);
        let demand = model.pending_demand().unwrap();
        assert!(demand > 0.0);
        assert!((demand - params.growth_rate * 130.0).abs() < 1e-9);
        model.deposit(demand, &params);
        assert!(model.area(Stage::Chlorotic) > 0.0);
        assert_eq!(model.center_stage(), Stage::Sporulating);
    }

    #[test]
    fn double_boundary_step_reaches_sporulation() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        feed(&mut model, &params);
        model.advance(1.0, &params);
        let grown = feed(&mut model, &params);
        let total_leader = model.area(Stage::Chlorotic);
        assert!(total_leader > 0.0);
        // Jump from age 220 to age 350: the leader crosses necrosis and
        // sporulation in one step.
        let flows = model.advance(130.0, &params);
        assert!((flows.to_necrotic - total_leader).abs() < 1e-12);
        assert!((flows.to_sporulating - total_leader).abs() < 1e-12);
        assert!(grown <= total_leader);
    }

    #[test]
    fn retired_surface_empties_rings_oldest_first() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        feed(&mut model, &params);
        model.advance(131.0, &params);
        feed(&mut model, &params);
        let sporulating = model.area(Stage::Sporulating);
        assert!(sporulating > 0.0);
        let moved = model.retire_sporulating(sporulating, &params);
        assert!((moved - sporulating).abs() < 1e-12);
        assert_eq!(model.area(Stage::Sporulating), 0.0);
        assert!((model.area(Stage::Empty) - moved).abs() < 1e-12);
    }

    #[test]
    fn senescence_kill_drops_young_rings() {
        let params = params();
        let mut model = RingSurfaces::new(&params);
        model.advance(219.0, &params);
        feed(&mut model, &params);
        model.advance(1.0, &params);
        feed(&mut model, &params);
        let alive = model.area_alive();
        let killed = model.kill_younger(Stage::Necrotic, 1.0, &params);
        assert!((killed - alive).abs() < 1e-12);
        assert_eq!(model.center_stage(), Stage::Dead);
        assert_eq!(model.area_alive(), 0.0);
    }
}
