use anyhow::Result;
use tracing::warn;

use crate::{
    canopy::Canopy,
    engine::{System, SystemContext},
    lesion::Stage,
    rng::SystemRng,
};

const AUDIT_TOLERANCE: f64 = 1e-6;

/// End-of-tick housekeeping: dead dispersal units leave the books, spent
/// lesions with no surface left are dropped, and the surface accounting
/// is audited.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        canopy: &mut Canopy,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for (index, sector) in canopy.sectors.iter_mut().enumerate() {
            sector.dispersal_units.retain(|unit| unit.is_active());
            sector
                .lesions
                .retain(|l| l.status() != Stage::Dead || l.surface_total() > AUDIT_TOLERANCE);

            for lesion in &sector.lesions {
                let by_stage: f64 = Stage::LIVE.iter().map(|s| lesion.area(*s)).sum();
                let drift = (by_stage - lesion.surface_alive()).abs();
                debug_assert!(drift <= AUDIT_TOLERANCE, "stage partition drifted");
                if drift > AUDIT_TOLERANCE {
                    warn!(
                        tick = ctx.tick,
                        sector = index,
                        drift,
                        "lesion stage partition drifted"
                    );
                }
            }

            let covered = sector.lesion_surface();
            debug_assert!(
                covered <= sector.area() + AUDIT_TOLERANCE,
                "lesions exceed sector area"
            );
            if covered > sector.area() + AUDIT_TOLERANCE {
                warn!(
                    tick = ctx.tick,
                    sector = index,
                    covered,
                    area = sector.area(),
                    "lesion surface exceeds sector area"
                );
            }
        }
        Ok(())
    }
}
