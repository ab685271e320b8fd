use anyhow::Result;
use rand::Rng;

use crate::{
    canopy::Canopy,
    engine::{System, SystemContext},
    rng::SystemRng,
};

/// Collects the dispersal units every sporulating lesion packages during
/// a rain event and redeposits them on the same sector at a random
/// position along the blade.
pub struct EmissionSystem;

impl EmissionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for EmissionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for EmissionSystem {
    fn name(&self) -> &str {
        "emission"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        canopy: &mut Canopy,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for sector in &mut canopy.sectors {
            let climate = *sector.climate();
            let length = sector.length();
            let mut emitted = Vec::new();
            for lesion in &mut sector.lesions {
                emitted.append(&mut lesion.emit(&climate, rng));
            }
            for mut unit in emitted {
                let position = if length > 0.0 {
                    rng.gen_range(0.0..length)
                } else {
                    0.0
                };
                unit.land(position);
                sector.dispersal_units.push(unit);
            }
        }
        Ok(())
    }
}
