use serde::{Deserialize, Serialize};

use crate::dispersal::DispersalUnit;
use crate::lesion::{Lesion, Stage};
use crate::weather::SectorClimate;

/// Natural leaf aging: from `start_tick` a senescence front enters at the
/// blade tip and moves toward the base. Tissue at positions at or beyond
/// the front is senescent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SenescenceProgram {
    pub start_tick: u64,
    #[serde(default = "default_speed")]
    pub speed_cm_per_tick: f64,
}

fn default_speed() -> f64 {
    0.01
}

impl SenescenceProgram {
    pub fn front_at(&self, tick: u64, blade_length: f64) -> Option<f64> {
        if tick < self.start_tick {
            return None;
        }
        let travelled = self.speed_cm_per_tick * (tick - self.start_tick) as f64;
        Some((blade_length - travelled).max(0.0))
    }
}

/// One leaf sector: the shared arena dispersal units and lesions compete
/// on. Positions run from the blade base (0) to `length`.
pub struct LeafSector {
    area: f64,
    length: f64,
    climate: SectorClimate,
    senescence_front: Option<f64>,
    pub dispersal_units: Vec<DispersalUnit>,
    pub lesions: Vec<Lesion>,
}

impl LeafSector {
    pub fn new(area: f64, length: f64) -> Self {
        Self {
            area,
            length,
            climate: SectorClimate {
                temp_c: 0.0,
                rain_mm: 0.0,
                relative_humidity: 0.0,
                wet: false,
            },
            senescence_front: None,
            dispersal_units: Vec::new(),
            lesions: Vec::new(),
        }
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn climate(&self) -> &SectorClimate {
        &self.climate
    }

    pub fn set_climate(&mut self, climate: SectorClimate) {
        self.climate = climate;
    }

    pub fn senescence_front(&self) -> Option<f64> {
        self.senescence_front
    }

    /// The front only ever advances toward the blade base.
    pub fn advance_senescence_front(&mut self, front: f64) {
        let front = front.max(0.0);
        self.senescence_front = Some(match self.senescence_front {
            Some(current) => current.min(front),
            None => front,
        });
    }

    /// Area carrying no lesion surface, floored at zero.
    pub fn healthy_area(&self) -> f64 {
        (self.area - self.lesion_surface()).max(0.0)
    }

    /// Unsenesced area.
    pub fn green_area(&self) -> f64 {
        match self.senescence_front {
            Some(front) if self.length > 0.0 => {
                self.area * (front / self.length).clamp(0.0, 1.0)
            }
            Some(_) => 0.0,
            None => self.area,
        }
    }

    pub fn lesion_surface(&self) -> f64 {
        self.lesions.iter().map(|l| l.surface_total()).sum()
    }

    pub fn stage_area(&self, stage: Stage) -> f64 {
        self.lesions.iter().map(|l| l.area(stage)).sum()
    }

    pub fn viable_units(&self) -> usize {
        self.dispersal_units
            .iter()
            .filter(|du| du.is_active())
            .count()
    }

    pub fn active_lesions(&self) -> usize {
        self.lesions.iter().filter(|l| l.is_active()).count()
    }
}
