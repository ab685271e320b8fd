use serde::{Deserialize, Serialize};

/// Per-tick climate aggregates seen by one leaf sector.
#[derive(Debug, Clone, Copy)]
pub struct SectorClimate {
    pub temp_c: f64,
    pub rain_mm: f64,
    pub relative_humidity: f64,
    pub wet: bool,
}

/// Synthetic hourly weather for a run: a base temperature with an optional
/// diurnal swing, a fixed humidity and wetness regime, and periodic rain
/// pulses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherProgram {
    #[serde(default = "default_base_temp")]
    pub base_temp_c: f64,
    #[serde(default)]
    pub diurnal_amplitude_c: f64,
    #[serde(default = "default_relative_humidity")]
    pub relative_humidity: f64,
    #[serde(default = "default_wet")]
    pub wet: bool,
    #[serde(default)]
    pub rain: Option<RainProgram>,
}

impl Default for WeatherProgram {
    fn default() -> Self {
        Self {
            base_temp_c: default_base_temp(),
            diurnal_amplitude_c: 0.0,
            relative_humidity: default_relative_humidity(),
            wet: default_wet(),
            rain: None,
        }
    }
}

/// Rain pulses: from `start_tick`, a pulse of `duration_ticks` opens every
/// `period_ticks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainProgram {
    pub start_tick: u64,
    #[serde(default = "default_rain_period")]
    pub period_ticks: u64,
    #[serde(default = "default_rain_duration")]
    pub duration_ticks: u64,
    #[serde(default = "default_rain_intensity")]
    pub intensity_mm: f64,
}

fn default_base_temp() -> f64 {
    18.0
}

fn default_relative_humidity() -> f64 {
    85.0
}

fn default_wet() -> bool {
    true
}

fn default_rain_period() -> u64 {
    120
}

fn default_rain_duration() -> u64 {
    1
}

fn default_rain_intensity() -> f64 {
    2.0
}

impl WeatherProgram {
    pub fn climate_at(&self, tick: u64) -> SectorClimate {
        let hour = (tick % 24) as f64;
        let swing = self.diurnal_amplitude_c
            * (2.0 * std::f64::consts::PI * hour / 24.0).sin();
        SectorClimate {
            temp_c: self.base_temp_c + swing,
            rain_mm: self.rain_at(tick),
            relative_humidity: self.relative_humidity,
            wet: self.wet,
        }
    }

    fn rain_at(&self, tick: u64) -> f64 {
        let Some(rain) = &self.rain else {
            return 0.0;
        };
        if tick < rain.start_tick || rain.period_ticks == 0 {
            return 0.0;
        }
        if (tick - rain.start_tick) % rain.period_ticks < rain.duration_ticks {
            rain.intensity_mm
        } else {
            0.0
        }
    }
}
