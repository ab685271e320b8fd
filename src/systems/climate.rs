use anyhow::Result;

use crate::{
    canopy::Canopy,
    engine::{System, SystemContext},
    leaf::SenescenceProgram,
    rng::SystemRng,
    weather::WeatherProgram,
};

/// Drives the weather program and the senescence fronts. Runs first so
/// every other system sees this tick's conditions.
pub struct ClimateSystem {
    weather: WeatherProgram,
    senescence: Option<SenescenceProgram>,
}

impl ClimateSystem {
    pub fn new(weather: WeatherProgram, senescence: Option<SenescenceProgram>) -> Self {
        Self {
            weather,
            senescence,
        }
    }
}

impl System for ClimateSystem {
    fn name(&self) -> &str {
        "climate"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        canopy: &mut Canopy,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let conditions = self.weather.climate_at(ctx.tick);
        for sector in &mut canopy.sectors {
            sector.set_climate(conditions);
            if let Some(program) = &self.senescence {
                if let Some(front) = program.front_at(ctx.tick, sector.length()) {
                    sector.advance_senescence_front(front);
                }
            }
        }
        Ok(())
    }
}
