//! Included allowances and per-unit overage prices (§4.H "Overage cost =
//! max(0, used - included) x unit-price"). Flat defaults; production
//! values would come from a billing plan, out of scope here (§1).

#[derive(Debug, Clone, Copy)]
pub struct UsagePricing {
    pub included_compute_gb_hours: f64,
    pub compute_gb_hour_price: f64,

    pub included_build_minutes: f64,
    pub build_minute_price: f64,

    pub included_storage_gb: f64,
    pub storage_gb_price: f64,

    pub included_bandwidth_gb: f64,
    pub bandwidth_gb_price: f64,

    /// Estimated build time per release when no real build-duration
    /// telemetry is available (§4.H "build minutes ... x estimate").
    pub estimated_minutes_per_build: f64,
    /// Flat per-service storage estimate (§4.H "storage (estimate per
    /// service)").
    pub estimated_storage_gb_per_service: f64,
    /// Flat per-service bandwidth estimate (§4.H "bandwidth (estimate)").
    pub estimated_bandwidth_gb_per_service: f64,
    /// Memory heuristic used when `metrics()` reports unavailable
    /// (§4.H "fall back to service-count heuristics").
    pub heuristic_memory_gb_per_service: f64,
}

impl Default for UsagePricing {
    fn default() -> Self {
        Self {
            included_compute_gb_hours: 100.0,
            compute_gb_hour_price: 0.02,
            included_build_minutes: 500.0,
            build_minute_price: 0.01,
            included_storage_gb: 10.0,
            storage_gb_price: 0.10,
            included_bandwidth_gb: 100.0,
            bandwidth_gb_price: 0.08,
            estimated_minutes_per_build: 5.0,
            estimated_storage_gb_per_service: 1.0,
            estimated_bandwidth_gb_per_service: 5.0,
            heuristic_memory_gb_per_service: 0.5,
        }
    }
}

/// `round2(max(0, used - included) * unit_price)`.
#[must_use]
pub fn overage_cost(used: f64, included: f64, unit_price: f64) -> f64 {
    round2((used - included).max(0.0) * unit_price)
}

#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_within_allowance_has_no_overage_cost() {
        assert_eq!(overage_cost(50.0, 100.0, 0.02), 0.0);
    }

    #[test]
    fn usage_above_allowance_is_billed_on_the_excess_only() {
        assert_eq!(overage_cost(150.0, 100.0, 0.02), 1.00);
    }

    #[test]
    fn round2_rounds_to_two_decimal_places() {
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(1.2349), 1.23);
        assert_eq!(round2(1.235), 1.24);
    }
}
