use std::sync::Arc;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::fungus::FungusParams;
use crate::weather::SectorClimate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuStatus {
    Emitted,
    Deposited,
}

/// What an infection attempt did to the unit this tick.
#[derive(Debug, PartialEq)]
pub enum InfectionOutcome {
    Unchanged,
    /// All members that infected this tick found one cohort lesion.
    BecomesLesion { positions: Vec<f64> },
    Disabled,
}

/// A cohort of identical spore packets deposited on (or emitted toward) a
/// leaf sector. Exposure accumulates as scalars: temperature sum, wet and
/// dry hours.
pub struct DispersalUnit {
    params: Arc<FungusParams>,
    spores: u32,
    status: DuStatus,
    positions: Vec<f64>,
    temp_sum: f64,
    wet_hours: f64,
    dry_hours: f64,
    observed_hours: u32,
    active: bool,
}

impl DispersalUnit {
    /// A unit freshly packaged by a sporulating lesion, not yet landed.
    pub fn emitted(params: Arc<FungusParams>, spores: u32) -> Self {
        Self {
            params,
            spores,
            status: DuStatus::Emitted,
            positions: Vec::new(),
            temp_sum: 0.0,
            wet_hours: 0.0,
            dry_hours: 0.0,
            observed_hours: 0,
            active: true,
        }
    }

    /// A cohort already sitting on the blade, one position per member.
    pub fn deposited(params: Arc<FungusParams>, spores: u32, positions: Vec<f64>) -> Self {
        let mut unit = Self::emitted(params, spores);
        unit.status = DuStatus::Deposited;
        unit.positions = positions;
        unit
    }

    /// Land an emitted unit at a position; it re-enters the infection
    /// cycle on the next tick.
    pub fn land(&mut self, position: f64) {
        self.status = DuStatus::Deposited;
        self.positions.push(position);
    }

    pub fn status(&self) -> DuStatus {
        self.status
    }

    pub fn spores(&self) -> u32 {
        self.spores
    }

    pub fn members(&self) -> usize {
        self.positions.len()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn params(&self) -> &Arc<FungusParams> {
        &self.params
    }

    /// One infection attempt. Senescence is checked first, then the
    /// tick's exposure is recorded; draws only start once the observation
    /// window is full. Each member rolls to infect, and failing that rolls
    /// against viability loss.
    pub fn attempt_infection<R: Rng + ?Sized>(
        &mut self,
        climate: &SectorClimate,
        senescence_front: Option<f64>,
        healthy_area: f64,
        rng: &mut R,
    ) -> InfectionOutcome {
        if !self.active || self.spores == 0 || self.positions.is_empty() {
            self.active = false;
            return InfectionOutcome::Disabled;
        }
        if let Some(front) = senescence_front {
            self.positions.retain(|pos| *pos < front);
            if self.positions.is_empty() {
                self.active = false;
                return InfectionOutcome::Disabled;
            }
        }

        self.temp_sum += climate.temp_c;
        self.observed_hours += 1;
        if climate.wet {
            self.wet_hours += 1.0;
        } else {
            self.dry_hours += 1.0;
        }
        if self.observed_hours < self.params.infection.infection_delay {
            return InfectionOutcome::Unchanged;
        }
        if healthy_area <= 0.0 {
            return InfectionOutcome::Unchanged;
        }

        let mean_temp = self.temp_sum / self.observed_hours as f64;
        let p_infect = self
            .params
            .infection
            .infection_probability(mean_temp, self.wet_hours);
        let p_loss = self.params.infection.loss_probability(self.dry_hours);

        let mut infected = Vec::new();
        let mut survivors = Vec::new();
        for position in self.positions.drain(..) {
            let roll: f64 = rng.gen();
            if roll < p_infect {
                infected.push(position);
                continue;
            }
            let loss_roll: f64 = rng.gen();
            if loss_roll >= p_loss {
                survivors.push(position);
            }
        }
        self.positions = survivors;

        if !infected.is_empty() {
            if self.positions.is_empty() {
                self.active = false;
            }
            return InfectionOutcome::BecomesLesion {
                positions: infected,
            };
        }
        if self.positions.is_empty() {
            self.active = false;
            return InfectionOutcome::Disabled;
        }
        InfectionOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::RngCore;

    /// Every draw is 0.0, so any positive probability fires.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            dest.fill(0);
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
            dest.fill(0);
            Ok(())
        }
    }

    fn wet_optimum() -> SectorClimate {
        SectorClimate {
            temp_c: 20.0,
            rain_mm: 0.0,
            relative_humidity: 90.0,
            wet: true,
        }
    }

    fn septoria_unit(positions: Vec<f64>) -> DispersalUnit {
        DispersalUnit::deposited(Arc::new(FungusParams::septoria()), 20, positions)
    }

    #[test]
    fn waits_out_the_observation_window_then_infects() {
        let climate = wet_optimum();
        let mut unit = septoria_unit(vec![4.0]);
        let mut rng = ZeroRng;
        // Ten ticks of exposure: window filled, but wetness still at the
        // minimum, so the wetness factor is zero.
        for _ in 0..10 {
            let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
            assert_eq!(outcome, InfectionOutcome::Unchanged);
        }
        let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
        assert_eq!(
            outcome,
            InfectionOutcome::BecomesLesion {
                positions: vec![4.0]
            }
        );
        assert!(!unit.is_active());
    }

    #[test]
    fn dry_spell_loses_every_member() {
        let climate = SectorClimate {
            wet: false,
            ..wet_optimum()
        };
        let mut unit = septoria_unit(vec![4.0, 6.0]);
        let mut rng = ZeroRng;
        for _ in 0..9 {
            let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
            assert_eq!(outcome, InfectionOutcome::Unchanged);
        }
        // Window full, infection probability zero, loss probability
        // positive: zero rolls lose both members.
        let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
        assert_eq!(outcome, InfectionOutcome::Disabled);
        assert_eq!(unit.members(), 0);
    }

    #[test]
    fn senescence_front_removes_members_first() {
        let climate = wet_optimum();
        let mut unit = septoria_unit(vec![2.0, 8.0]);
        let mut rng = ZeroRng;
        let outcome = unit.attempt_infection(&climate, Some(5.0), 5.0, &mut rng);
        assert_eq!(outcome, InfectionOutcome::Unchanged);
        assert_eq!(unit.members(), 1);
        let outcome = unit.attempt_infection(&climate, Some(1.0), 5.0, &mut rng);
        assert_eq!(outcome, InfectionOutcome::Disabled);
        assert!(!unit.is_active());
    }

    #[test]
    fn bare_leaf_still_accumulates_exposure() {
        let climate = wet_optimum();
        let mut unit = septoria_unit(vec![4.0]);
        let mut rng = ZeroRng;
        for _ in 0..11 {
            let outcome = unit.attempt_infection(&climate, None, 0.0, &mut rng);
            assert_eq!(outcome, InfectionOutcome::Unchanged);
        }
        let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
        assert!(matches!(outcome, InfectionOutcome::BecomesLesion { .. }));
    }

    #[test]
    fn whole_cohort_founds_one_lesion() {
        let climate = wet_optimum();
        let mut unit = septoria_unit(vec![1.0, 2.0, 3.0]);
        let mut rng = ZeroRng;
        for _ in 0..10 {
            let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
            assert_eq!(outcome, InfectionOutcome::Unchanged);
        }
        let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
        match outcome {
            InfectionOutcome::BecomesLesion { positions } => {
                assert_eq!(positions, vec![1.0, 2.0, 3.0]);
            }
            other => panic!("expected infection, got {other:?}"),
        }
    }

    #[test]
    fn spore_free_unit_is_disabled() {
        let climate = wet_optimum();
        let mut unit = DispersalUnit::deposited(Arc::new(FungusParams::septoria()), 0, vec![1.0]);
        let mut rng = ZeroRng;
        let outcome = unit.attempt_infection(&climate, None, 5.0, &mut rng);
        assert_eq!(outcome, InfectionOutcome::Disabled);
    }
}
