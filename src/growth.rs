use serde::{Deserialize, Serialize};

/// Admission policy deciding how much of a sector's free healthy area each
/// competing lesion may claim this tick. Offers are paired with demands by
/// index, so callers must keep lesion order stable.
pub trait GrowthPolicy: Send {
    fn name(&self) -> &str;

    /// Returns one offer per demand, each in [0, demand], together never
    /// exceeding the free area.
    fn allocate(&self, free_area: f64, demands: &[f64]) -> Vec<f64>;
}

/// Reference policy: everyone is served in full when the free area covers
/// the total demand, otherwise every demand scales down by the same
/// factor.
pub struct NoPriority;

impl GrowthPolicy for NoPriority {
    fn name(&self) -> &str {
        "no_priority"
    }

    fn allocate(&self, free_area: f64, demands: &[f64]) -> Vec<f64> {
        let total: f64 = demands.iter().map(|d| d.max(0.0)).sum();
        if free_area <= 0.0 || total <= 0.0 {
            return vec![0.0; demands.len()];
        }
        if total <= free_area {
            return demands.iter().map(|d| d.max(0.0)).collect();
        }
        let scale = free_area / total;
        demands.iter().map(|d| d.max(0.0) * scale).collect()
    }
}

/// Configuration-facing selector for the arbitration policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPolicyKind {
    #[default]
    NoPriority,
}

impl GrowthPolicyKind {
    pub fn build(self) -> Box<dyn GrowthPolicy> {
        match self {
            GrowthPolicyKind::NoPriority => Box::new(NoPriority),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_grants_when_capacity_suffices() {
        let offers = NoPriority.allocate(1.0, &[0.2, 0.3]);
        assert_eq!(offers, vec![0.2, 0.3]);
    }

    #[test]
    fn overdemand_scales_proportionally() {
        let demands = [0.4, 0.4];
        let offers = NoPriority.allocate(0.4, &demands);
        assert!((offers[0] - 0.2).abs() < 1e-9);
        assert!((offers[1] - 0.2).abs() < 1e-9);
        let granted: f64 = offers.iter().sum();
        assert!((granted - 0.4).abs() < 1e-9);
        for (offer, demand) in offers.iter().zip(demands.iter()) {
            assert!(*offer >= 0.0 && offer <= demand);
        }
    }

    #[test]
    fn exhausted_sector_offers_nothing() {
        assert_eq!(NoPriority.allocate(0.0, &[0.1, 0.2]), vec![0.0, 0.0]);
        assert_eq!(NoPriority.allocate(-0.5, &[0.1]), vec![0.0]);
        assert_eq!(NoPriority.allocate(1.0, &[0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn unequal_demands_keep_their_ratio_under_pressure() {
        let offers = NoPriority.allocate(0.3, &[0.1, 0.5]);
        assert!((offers[1] / offers[0] - 5.0).abs() < 1e-9);
        assert!((offers.iter().sum::<f64>() - 0.3).abs() < 1e-9);
    }
}
