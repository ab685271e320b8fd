use serde::{Deserialize, Serialize};

use crate::canopy::Canopy;
use crate::leaf::LeafSector;
use crate::lesion::Stage;

/// Canopy-level disease metrics for one tick. Percentages are unweighted
/// means over sectors; areas are sums.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickMetrics {
    pub severity_pct: f64,
    pub necrosis_pct: f64,
    pub green_lesion_area: f64,
    pub viable_units: usize,
    pub active_lesions: usize,
    pub spore_stock: f64,
}

impl TickMetrics {
    pub fn measure(canopy: &Canopy) -> Self {
        let sectors = &canopy.sectors;
        if sectors.is_empty() {
            return Self::default();
        }
        let count = sectors.len() as f64;
        let severity_pct = sectors.iter().map(sector_severity).sum::<f64>() / count;
        let necrosis_pct = sectors.iter().map(sector_necrosis).sum::<f64>() / count;
        let green_lesion_area = sectors.iter().map(green_lesion_area).sum();
        Self {
            severity_pct,
            necrosis_pct,
            green_lesion_area,
            viable_units: canopy.viable_units(),
            active_lesions: canopy.active_lesions(),
            spore_stock: canopy.total_spore_stock(),
        }
    }
}

/// Percentage of the sector covered by lesion tissue, dead included.
pub fn sector_severity(sector: &LeafSector) -> f64 {
    let area = sector.area();
    if area > 0.0 {
        100.0 * sector.lesion_surface() / area
    } else {
        0.0
    }
}

/// Percentage of the sector under necrotic, sporulating or spent tissue.
pub fn sector_necrosis(sector: &LeafSector) -> f64 {
    let area = sector.area();
    if area <= 0.0 {
        return 0.0;
    }
    let necrotic = sector.stage_area(Stage::Necrotic)
        + sector.stage_area(Stage::Sporulating)
        + sector.stage_area(Stage::Empty);
    100.0 * necrotic / area
}

/// Surface of lesions the senescence front has not touched.
pub fn green_lesion_area(sector: &LeafSector) -> f64 {
    sector
        .lesions
        .iter()
        .filter(|l| l.members() == l.members_at_creation())
        .map(|l| l.surface_total())
        .sum()
}

/// Area under the disease progress curve, trapezoid rule with one tick
/// between observations.
pub fn audpc(history: &[f64]) -> f64 {
    history
        .windows(2)
        .map(|pair| (pair[0] + pair[1]) / 2.0)
        .sum()
}
