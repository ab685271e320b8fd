use anyhow::Result;

use crate::{
    canopy::Canopy,
    engine::{System, SystemContext},
    growth::GrowthPolicy,
    rng::SystemRng,
};

/// Arbitrates lesion growth against each sector's healthy area. The
/// policy splits the free area over the demands; every lesion then
/// reconciles its grant.
pub struct AllocationSystem {
    policy: Box<dyn GrowthPolicy>,
}

impl AllocationSystem {
    pub fn new(policy: Box<dyn GrowthPolicy>) -> Self {
        Self { policy }
    }
}

impl System for AllocationSystem {
    fn name(&self) -> &str {
        "allocation"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        canopy: &mut Canopy,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for sector in &mut canopy.sectors {
            if sector.lesions.is_empty() {
                continue;
            }
            let free_area = sector.healthy_area();
            let demands: Vec<f64> = sector.lesions.iter().map(|l| l.demand()).collect();
            let offers = self.policy.allocate(free_area, &demands);
            for (lesion, offer) in sector.lesions.iter_mut().zip(offers) {
                lesion.control_growth(offer);
            }
        }
        Ok(())
    }
}
