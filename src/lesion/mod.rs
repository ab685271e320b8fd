mod continuous;
mod histogram;
mod model;
mod rings;

pub use model::{Stage, StageFlows, SurfaceModel, SurfaceModelKind};

use std::sync::Arc;

use rand::Rng;

use crate::dispersal::DispersalUnit;
use crate::fungus::FungusParams;
use crate::weather::SectorClimate;

const EPS: f64 = 1e-9;

/// One lesion cohort on a leaf sector. Members share thermal age, stage
/// surfaces and spore stock; the member positions along the blade are kept
/// so the senescence front can kill them individually.
pub struct Lesion {
    params: Arc<FungusParams>,
    surfaces: Box<dyn SurfaceModel>,
    status: Stage,
    positions: Vec<f64>,
    members_at_creation: usize,
    age_dd: f64,
    sporulation_age_dd: f64,
    surface_dead: f64,
    stock: f64,
    spores_emitted: f64,
    capacity: f64,
    growth_active: bool,
    active: bool,
    demand: f64,
    rain_before: bool,
    rain_event: bool,
}

impl Lesion {
    pub fn new(params: Arc<FungusParams>, kind: SurfaceModelKind, positions: Vec<f64>) -> Self {
        let members = positions.len().max(1);
        let capacity = params.smax * members as f64;
        let surfaces = kind.build(&params);
        Self {
            params,
            surfaces,
            status: Stage::Incubating,
            positions,
            members_at_creation: members,
            age_dd: 0.0,
            sporulation_age_dd: 0.0,
            surface_dead: 0.0,
            stock: 0.0,
            spores_emitted: 0.0,
            capacity,
            growth_active: true,
            active: true,
            demand: 0.0,
            rain_before: false,
            rain_event: false,
        }
    }

    /// Rising-edge rain detector: set only on the first tick of a
    /// qualifying wet period, reset by any non-qualifying tick.
    pub fn observe_rain(&mut self, climate: &SectorClimate) {
        let qualifying =
            climate.rain_mm > 0.0 && climate.relative_humidity >= self.params.rh_min;
        self.rain_event = qualifying && !self.rain_before;
        self.rain_before = qualifying;
    }

    /// Kill the cohort fraction the senescence front has passed. Tissue
    /// younger than the necrotic cutoff dies with it; older tissue keeps
    /// producing. Idempotent for a fixed front position.
    pub fn apply_senescence(&mut self, front: f64) {
        if self.status == Stage::Dead || self.positions.is_empty() {
            return;
        }
        let members = self.positions.len();
        let hit = self.positions.iter().filter(|pos| **pos >= front).count();
        if hit == 0 {
            return;
        }
        let ratio = hit as f64 / members as f64;
        let killed = self
            .surfaces
            .kill_younger(Stage::Necrotic, ratio, &self.params);
        self.surface_dead += killed;
        self.positions.retain(|pos| *pos < front);
        self.growth_active = false;
        if self.surfaces.area_alive() <= EPS {
            self.status = Stage::Dead;
            self.active = false;
        }
    }

    /// One tick of aging: accumulate thermal time, run the surface model,
    /// bank newly sporulating surface into the spore stock, refresh the
    /// status and leave the growth demand ready for arbitration.
    pub fn develop(&mut self, climate: &SectorClimate) {
        self.demand = 0.0;
        if !self.active {
            return;
        }
        let dday = self.params.thermal.degree_days(&[climate.temp_c]);
        let age_before = self.age_dd;
        self.age_dd += dday;
        let flows = self.surfaces.advance(dday, &self.params);
        if flows.to_sporulating > 0.0 {
            self.stock += flows.to_sporulating * self.params.production_rate;
        }
        self.refresh_status();
        if self.status == Stage::Sporulating {
            self.sporulation_age_dd += dday;
        }
        self.demand = self.compute_demand(age_before, dday);
    }

    fn refresh_status(&mut self) {
        let center = self.surfaces.center_stage();
        if center > self.status && center <= Stage::Sporulating {
            self.status = center;
        }
        if self.status != Stage::Sporulating {
            return;
        }
        if let Some(window) = self.params.sporulation_window_dd {
            if self.sporulation_age_dd > window {
                self.become_empty();
                return;
            }
        }
        let convertible = self.surfaces.area(Stage::Incubating)
            + self.surfaces.area(Stage::Chlorotic)
            + self.surfaces.area(Stage::Necrotic);
        if self.stock <= 0.0 && convertible <= EPS {
            self.become_empty();
        }
    }

    fn become_empty(&mut self) {
        self.status = Stage::Empty;
        self.growth_active = false;
        self.active = false;
    }

    fn compute_demand(&self, age_before: f64, dday: f64) -> f64 {
        if !self.growth_active || dday <= 0.0 {
            return 0.0;
        }
        let members = self.positions.len() as f64;
        if members == 0.0 {
            return 0.0;
        }
        let raw = if let Some(pending) = self.surfaces.pending_demand() {
            // The ring variant keeps its own per-ring books; the cohort
            // grows as one merged disc there.
            pending
        } else {
            let boundary = self.params.incubation_dd;
            let slow = self.params.incubation_rate();
            let fast = self.params.growth_rate;
            let per_member = if self.age_dd <= boundary {
                slow * dday
            } else if age_before >= boundary {
                fast * dday
            } else {
                slow * (boundary - age_before) + fast * (self.age_dd - boundary)
            };
            per_member * members
        };
        let headroom = (self.capacity - self.surface_total()).max(0.0);
        raw.min(headroom).max(0.0)
    }

    /// Reconcile the arbitrated offer. Receiving less than demanded, or
    /// reaching capacity, permanently disables growth.
    pub fn control_growth(&mut self, offer: f64) {
        let demand = self.demand;
        self.demand = 0.0;
        if !self.active || !self.growth_active || demand <= 0.0 {
            return;
        }
        let granted = offer.max(0.0).min(demand);
        self.surfaces.deposit(granted, &self.params);
        if granted + 1e-12 < demand {
            self.growth_active = false;
        }
        if self.surface_total() >= self.capacity - 1e-12 {
            self.growth_active = false;
        }
    }

    fn can_emit(&self, climate: &SectorClimate) -> bool {
        self.active
            && self.stock > 0.0
            && self.status == Stage::Sporulating
            && climate.relative_humidity >= self.params.rh_min
            && self.rain_event
    }

    /// Package dispersal units for one rain event. The emitted fraction of
    /// the stock is available; each unit draws its spore load, and the
    /// sporulating surface empties in proportion to what left.
    pub fn emit<R: Rng + ?Sized>(
        &mut self,
        climate: &SectorClimate,
        rng: &mut R,
    ) -> Vec<DispersalUnit> {
        if !self.can_emit(climate) {
            return Vec::new();
        }
        let initial_stock = self.stock;
        let mut available = (self.stock * self.params.emission_fraction).floor();
        let sporulating = self.surfaces.area(Stage::Sporulating);
        let target = (climate.rain_mm * sporulating * self.params.du_density).floor();
        if target < 1.0 || available < 1.0 {
            return Vec::new();
        }
        let mut units = Vec::new();
        let mut emitted = 0.0;
        for _ in 0..target as u64 {
            if available < 1.0 {
                break;
            }
            let draw = rng
                .gen_range(self.params.spores_per_du_min..=self.params.spores_per_du_max)
                as f64;
            let spores = draw.min(available);
            available -= spores;
            self.stock -= spores;
            emitted += spores;
            units.push(DispersalUnit::emitted(
                Arc::clone(&self.params),
                spores as u32,
            ));
        }
        if emitted > 0.0 {
            let retired = sporulating * (emitted / initial_stock);
            self.surfaces.retire_sporulating(retired, &self.params);
            self.spores_emitted += emitted;
        }
        if self.stock < self.params.stock_flush {
            self.stock = 0.0;
        }
        units
    }

    pub fn status(&self) -> Stage {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn growth_is_active(&self) -> bool {
        self.growth_active
    }

    pub fn demand(&self) -> f64 {
        self.demand
    }

    pub fn stock(&self) -> f64 {
        self.stock
    }

    pub fn spores_emitted(&self) -> f64 {
        self.spores_emitted
    }

    pub fn members(&self) -> usize {
        self.positions.len()
    }

    pub fn members_at_creation(&self) -> usize {
        self.members_at_creation
    }

    pub fn area(&self, stage: Stage) -> f64 {
        self.surfaces.area(stage)
    }

    pub fn surface_alive(&self) -> f64 {
        self.surfaces.area_alive()
    }

    pub fn surface_dead(&self) -> f64 {
        self.surface_dead
    }

    pub fn surface_total(&self) -> f64 {
        self.surfaces.area_alive() + self.surface_dead
    }
}
