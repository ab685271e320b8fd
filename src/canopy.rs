use serde::{Deserialize, Serialize};

use crate::leaf::LeafSector;
use crate::lesion::Stage;
use crate::outputs::TickMetrics;

/// State of one leaf sector at snapshot time.
#[derive(Debug, Serialize, Deserialize)]
pub struct SectorSnapshot {
    pub index: usize,
    pub area: f64,
    pub green_area: f64,
    pub healthy_area: f64,
    pub lesion_area: f64,
    pub necrotic_area: f64,
    pub severity_pct: f64,
    pub senescence_front: Option<f64>,
    pub dispersal_units: usize,
    pub viable_units: usize,
    pub lesions: usize,
    pub active_lesions: usize,
    pub spore_stock: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanopySnapshot {
    pub scenario: String,
    pub tick: u64,
    pub hours_elapsed: f64,
    pub metrics: TickMetrics,
    pub sectors: Vec<SectorSnapshot>,
}

/// All leaf sectors under simulation plus the shared clock.
pub struct Canopy {
    pub sectors: Vec<LeafSector>,
    tick: u64,
    hours_elapsed: f64,
    tick_hours: f64,
}

impl Canopy {
    pub fn new(tick_hours: f64) -> Self {
        Self {
            sectors: Vec::new(),
            tick: 0,
            hours_elapsed: 0.0,
            tick_hours,
        }
    }

    pub fn push_sector(&mut self, sector: LeafSector) {
        self.sectors.push(sector);
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn tick_hours(&self) -> f64 {
        self.tick_hours
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
        self.hours_elapsed += self.tick_hours;
    }

    pub fn hours_elapsed(&self) -> f64 {
        self.hours_elapsed
    }

    pub fn total_area(&self) -> f64 {
        self.sectors.iter().map(|s| s.area()).sum()
    }

    pub fn total_lesion_area(&self) -> f64 {
        self.sectors.iter().map(|s| s.lesion_surface()).sum()
    }

    pub fn viable_units(&self) -> usize {
        self.sectors.iter().map(|s| s.viable_units()).sum()
    }

    pub fn active_lesions(&self) -> usize {
        self.sectors.iter().map(|s| s.active_lesions()).sum()
    }

    pub fn total_spore_stock(&self) -> f64 {
        self.sectors
            .iter()
            .flat_map(|s| s.lesions.iter())
            .map(|l| l.stock())
            .sum()
    }

    pub fn snapshot(&self, scenario: &str) -> CanopySnapshot {
        let mut sectors = Vec::with_capacity(self.sectors.len());
        for (index, sector) in self.sectors.iter().enumerate() {
            let area = sector.area();
            let lesion_area = sector.lesion_surface();
            let necrotic_area = sector.stage_area(Stage::Necrotic)
                + sector.stage_area(Stage::Sporulating)
                + sector.stage_area(Stage::Empty);
            let severity_pct = if area > 0.0 {
                100.0 * lesion_area / area
            } else {
                0.0
            };
            let spore_stock = sector.lesions.iter().map(|l| l.stock()).sum();
            sectors.push(SectorSnapshot {
                index,
                area,
                green_area: sector.green_area(),
                healthy_area: sector.healthy_area(),
                lesion_area,
                necrotic_area,
                severity_pct,
                senescence_front: sector.senescence_front(),
                dispersal_units: sector.dispersal_units.len(),
                viable_units: sector.viable_units(),
                lesions: sector.lesions.len(),
                active_lesions: sector.active_lesions(),
                spore_stock,
            });
        }
        CanopySnapshot {
            scenario: scenario.to_string(),
            tick: self.tick,
            hours_elapsed: self.hours_elapsed,
            metrics: TickMetrics::measure(self),
            sectors,
        }
    }
}
