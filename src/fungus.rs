use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Folds hourly temperatures into thermal time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ThermalResponse {
    /// Degrees accumulate linearly above a base temperature.
    LinearAboveBase { base: f64 },
    /// Triangular response: climbs from `temp_min` to a plateau of
    /// `temp_opt` effective degrees at the optimum, falls to zero at
    /// `temp_max`.
    EffectiveOptimum {
        temp_min: f64,
        temp_opt: f64,
        temp_max: f64,
    },
}

impl ThermalResponse {
    pub fn effective_degrees(&self, temperature: f64) -> f64 {
        match *self {
            ThermalResponse::LinearAboveBase { base } => (temperature - base).max(0.0),
            ThermalResponse::EffectiveOptimum {
                temp_min,
                temp_opt,
                temp_max,
            } => {
                if temperature <= temp_min || temperature >= temp_max {
                    0.0
                } else if temperature <= temp_opt {
                    temp_opt * (temperature - temp_min) / (temp_opt - temp_min)
                } else {
                    temp_opt * (temp_max - temperature) / (temp_max - temp_opt)
                }
            }
        }
    }

    /// Degree-days contributed by one tick's hourly readings.
    pub fn degree_days(&self, hourly_temperatures: &[f64]) -> f64 {
        hourly_temperatures
            .iter()
            .map(|&t| self.effective_degrees(t))
            .sum::<f64>()
            / 24.0
    }
}

/// Infection response of a dispersal unit to its accumulated exposure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InfectionParams {
    pub temp_min: f64,
    pub temp_opt: f64,
    pub temp_max: f64,
    /// Wet hours below which infection is impossible.
    pub wetness_min: f64,
    pub wet_a: f64,
    pub wet_b: f64,
    /// Ceiling probability when temperature and wetness are ideal.
    pub proba_inf: f64,
    /// Hours of observed exposure before the first infection draw.
    pub infection_delay: u32,
    /// Dry hours after which viability loss is certain.
    pub loss_delay: f64,
}

impl InfectionParams {
    /// Unimodal temperature response, 1.0 at the optimum, 0 outside
    /// (temp_min, temp_max).
    pub fn temperature_factor(&self, mean_temperature: f64) -> f64 {
        if mean_temperature <= self.temp_min || mean_temperature >= self.temp_max {
            return 0.0;
        }
        let beta = (self.temp_max - self.temp_opt) / (self.temp_opt - self.temp_min);
        let alpha =
            1.0 / ((self.temp_opt - self.temp_min) * (self.temp_max - self.temp_opt).powf(beta));
        (alpha * (mean_temperature - self.temp_min) * (self.temp_max - mean_temperature).powf(beta))
            .max(0.0)
    }

    /// Saturating Weibull response to accumulated wet hours.
    pub fn wetness_factor(&self, wet_hours: f64) -> f64 {
        if wet_hours <= self.wetness_min {
            return 0.0;
        }
        let x = self.wet_a * (wet_hours - self.wetness_min);
        (1.0 - (-x.powf(self.wet_b)).exp()).clamp(0.0, 1.0)
    }

    pub fn infection_probability(&self, mean_temperature: f64, wet_hours: f64) -> f64 {
        self.proba_inf * self.temperature_factor(mean_temperature) * self.wetness_factor(wet_hours)
    }

    pub fn loss_probability(&self, dry_hours: f64) -> f64 {
        if self.loss_delay <= 0.0 {
            return 0.0;
        }
        (dry_hours / self.loss_delay).min(1.0)
    }
}

/// Immutable parameter set for one disease. Built once, shared by
/// reference across every dispersal unit and lesion of that disease.
#[derive(Debug, Clone, PartialEq)]
pub struct FungusParams {
    pub name: String,
    pub thermal: ThermalResponse,
    pub infection: InfectionParams,
    /// Degree-days spent incubating before chlorosis.
    pub incubation_dd: f64,
    /// Degree-days spent chlorotic before necrosis.
    pub chlorosis_dd: f64,
    /// Degree-days spent necrotic before sporulation.
    pub necrosis_dd: f64,
    /// Degree-days of sporulation before the lesion empties, if bounded.
    pub sporulation_window_dd: Option<f64>,
    /// Surface reached at the end of incubation under no competition (cm2).
    pub smin: f64,
    /// Maximum surface per cohort member (cm2).
    pub smax: f64,
    /// Post-incubation growth rate (cm2 per degree-day).
    pub growth_rate: f64,
    /// Spores produced per cm2 of surface entering sporulation.
    pub production_rate: f64,
    /// Relative humidity floor for emission (%).
    pub rh_min: f64,
    /// Dispersal units packaged per mm/h of rain per cm2 sporulating.
    pub du_density: f64,
    pub spores_per_du_min: u32,
    pub spores_per_du_max: u32,
    /// Fraction of the stock available to a single emission event.
    pub emission_fraction: f64,
    /// Residual stock flushed to zero after an emission event.
    pub stock_flush: f64,
    /// Formation window of one age ring (degree-days).
    pub ring_width_dd: f64,
    /// Age bins per stage in the histogram surface model.
    pub age_bins: usize,
}

#[derive(Debug, Error, PartialEq)]
pub enum FungusParamError {
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must lie in [{lo}, {hi}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        lo: f64,
        hi: f64,
    },
    #[error("surface bounds must satisfy 0 < smin < smax, got smin={smin} smax={smax}")]
    SurfaceBounds { smin: f64, smax: f64 },
    #[error("infection temperature cardinals must be ordered min < opt < max, got {min}/{opt}/{max}")]
    TemperatureOrder { min: f64, opt: f64, max: f64 },
    #[error("spore range per dispersal unit must satisfy 1 <= min <= max, got {min}..={max}")]
    SporeRange { min: u32, max: u32 },
    #[error("infection_delay must be at least one observed hour")]
    ZeroInfectionDelay,
    #[error("age_bins must be at least 1")]
    ZeroAgeBins,
}

impl FungusParams {
    pub fn septoria() -> Self {
        Self {
            name: "septoria".into(),
            thermal: ThermalResponse::LinearAboveBase { base: -2.0 },
            infection: InfectionParams {
                temp_min: 10.0,
                temp_opt: 20.0,
                temp_max: 30.0,
                wetness_min: 10.0,
                wet_a: 0.30,
                wet_b: 2.0,
                proba_inf: 1.0,
                infection_delay: 10,
                loss_delay: 120.0,
            },
            incubation_dd: 220.0,
            chlorosis_dd: 110.0,
            necrosis_dd: 20.0,
            sporulation_window_dd: None,
            smin: 0.03,
            smax: 0.30,
            growth_rate: 0.0006,
            production_rate: 1.0e5,
            rh_min: 85.0,
            du_density: 1000.0,
            spores_per_du_min: 5,
            spores_per_du_max: 100,
            emission_fraction: 2.0 / 3.0,
            stock_flush: 1000.0,
            ring_width_dd: 20.0,
            age_bins: 10,
        }
    }

    pub fn brown_rust() -> Self {
        Self {
            name: "brown_rust".into(),
            thermal: ThermalResponse::EffectiveOptimum {
                temp_min: 0.0,
                temp_opt: 27.0,
                temp_max: 40.0,
            },
            infection: InfectionParams {
                temp_min: 2.0,
                temp_opt: 15.0,
                temp_max: 30.0,
                wetness_min: 0.0,
                wet_a: 0.11,
                wet_b: 3.152,
                proba_inf: 0.10,
                infection_delay: 8,
                loss_delay: 48.0,
            },
            incubation_dd: 144.0,
            chlorosis_dd: 50.0,
            necrosis_dd: 10.0,
            sporulation_window_dd: Some(810.0),
            smin: 0.02,
            smax: 0.22,
            growth_rate: 0.0018,
            production_rate: 2.0e4,
            rh_min: 85.0,
            du_density: 1000.0,
            spores_per_du_min: 5,
            spores_per_du_max: 100,
            emission_fraction: 2.0 / 3.0,
            stock_flush: 100.0,
            ring_width_dd: 20.0,
            age_bins: 10,
        }
    }

    /// Growth rate during incubation: the lesion reaches `smin` exactly
    /// when incubation ends, absent competition.
    pub fn incubation_rate(&self) -> f64 {
        self.smin / self.incubation_dd
    }

    pub fn validate(&self) -> Result<(), FungusParamError> {
        let durations = [
            ("incubation_dd", self.incubation_dd),
            ("chlorosis_dd", self.chlorosis_dd),
            ("necrosis_dd", self.necrosis_dd),
            ("ring_width_dd", self.ring_width_dd),
            ("growth_rate", self.growth_rate),
            ("loss_delay", self.infection.loss_delay),
            ("wet_a", self.infection.wet_a),
            ("wet_b", self.infection.wet_b),
        ];
        for (field, value) in durations {
            if value <= 0.0 {
                return Err(FungusParamError::NonPositive { field, value });
            }
        }
        if let Some(window) = self.sporulation_window_dd {
            if window <= 0.0 {
                return Err(FungusParamError::NonPositive {
                    field: "sporulation_window_dd",
                    value: window,
                });
            }
        }
        if !(self.smin > 0.0 && self.smax > self.smin) {
            return Err(FungusParamError::SurfaceBounds {
                smin: self.smin,
                smax: self.smax,
            });
        }
        for (field, value) in [
            ("production_rate", self.production_rate),
            ("du_density", self.du_density),
            ("stock_flush", self.stock_flush),
            ("wetness_min", self.infection.wetness_min),
        ] {
            if value < 0.0 {
                return Err(FungusParamError::Negative { field, value });
            }
        }
        if !(0.0..=1.0).contains(&self.infection.proba_inf) {
            return Err(FungusParamError::OutOfRange {
                field: "proba_inf",
                value: self.infection.proba_inf,
                lo: 0.0,
                hi: 1.0,
            });
        }
        if !(self.emission_fraction > 0.0 && self.emission_fraction <= 1.0) {
            return Err(FungusParamError::OutOfRange {
                field: "emission_fraction",
                value: self.emission_fraction,
                lo: 0.0,
                hi: 1.0,
            });
        }
        if !(0.0..=100.0).contains(&self.rh_min) {
            return Err(FungusParamError::OutOfRange {
                field: "rh_min",
                value: self.rh_min,
                lo: 0.0,
                hi: 100.0,
            });
        }
        if !(self.infection.temp_min < self.infection.temp_opt
            && self.infection.temp_opt < self.infection.temp_max)
        {
            return Err(FungusParamError::TemperatureOrder {
                min: self.infection.temp_min,
                opt: self.infection.temp_opt,
                max: self.infection.temp_max,
            });
        }
        if self.infection.infection_delay == 0 {
            return Err(FungusParamError::ZeroInfectionDelay);
        }
        if self.spores_per_du_min == 0 || self.spores_per_du_max < self.spores_per_du_min {
            return Err(FungusParamError::SporeRange {
                min: self.spores_per_du_min,
                max: self.spores_per_du_max,
            });
        }
        if self.age_bins == 0 {
            return Err(FungusParamError::ZeroAgeBins);
        }
        Ok(())
    }
}

/// Disease selector for scenario files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FungusKind {
    Septoria,
    BrownRust,
}

impl FungusKind {
    pub fn params(self) -> FungusParams {
        match self {
            FungusKind::Septoria => FungusParams::septoria(),
            FungusKind::BrownRust => FungusParams::brown_rust(),
        }
    }
}
