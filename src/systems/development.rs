use anyhow::Result;

use crate::{
    canopy::Canopy,
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Ages every lesion by the tick's thermal time. Rain edges and the
/// senescence front are applied before aging so the stage surfaces see
/// them this tick, and each lesion leaves its growth demand behind for
/// the allocation pass.
pub struct DevelopmentSystem;

impl DevelopmentSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DevelopmentSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DevelopmentSystem {
    fn name(&self) -> &str {
        "development"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        canopy: &mut Canopy,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for sector in &mut canopy.sectors {
            let climate = *sector.climate();
            let front = sector.senescence_front();
            for lesion in &mut sector.lesions {
                lesion.observe_rain(&climate);
                if let Some(front) = front {
                    lesion.apply_senescence(front);
                }
                lesion.develop(&climate);
            }
        }
        Ok(())
    }
}
