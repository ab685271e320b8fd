use std::sync::Arc;

use anyhow::Result;

use crate::{
    canopy::Canopy,
    dispersal::InfectionOutcome,
    engine::{System, SystemContext},
    lesion::{Lesion, SurfaceModelKind},
    rng::SystemRng,
};

/// Gives every deposited dispersal unit its infection attempt. Units that
/// succeed found a lesion on their sector; the healthy area they competed
/// for is the one measured at the start of the tick.
pub struct InfectionSystem {
    surface_model: SurfaceModelKind,
}

impl InfectionSystem {
    pub fn new(surface_model: SurfaceModelKind) -> Self {
        Self { surface_model }
    }
}

impl System for InfectionSystem {
    fn name(&self) -> &str {
        "infection"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        canopy: &mut Canopy,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for sector in &mut canopy.sectors {
            let climate = *sector.climate();
            let healthy_area = sector.healthy_area();
            let front = sector.senescence_front();
            let mut founded = Vec::new();
            for unit in &mut sector.dispersal_units {
                match unit.attempt_infection(&climate, front, healthy_area, rng) {
                    InfectionOutcome::BecomesLesion { positions } => {
                        founded.push(Lesion::new(
                            Arc::clone(unit.params()),
                            self.surface_model,
                            positions,
                        ));
                    }
                    InfectionOutcome::Unchanged | InfectionOutcome::Disabled => {}
                }
            }
            sector.lesions.append(&mut founded);
        }
        Ok(())
    }
}
