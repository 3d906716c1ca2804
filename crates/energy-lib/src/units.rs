//! Fixed conversion factors and the helpers built on them

/// Square feet per square meter
pub const M2_TO_SQFT: f64 = 10.7639;

/// Kilowatt-hours per thousand BTU
pub const KBTU_TO_KWH: f64 = 0.293071;

/// Kilowatt-hours per megawatt-hour
pub const KWH_PER_MWH: f64 = 1000.0;

/// Tonnes of CO2 per kBtu consumed (Seattle grid average)
pub const CO2_TONNES_PER_KBTU: f64 = 0.053;

/// Trees needed to absorb one tonne of CO2 per year
pub const TREES_PER_TONNE_CO2: f64 = 45.0;

pub fn m2_to_sqft(m2: f64) -> f64 {
    m2 * M2_TO_SQFT
}

pub fn sqft_to_m2(sqft: f64) -> f64 {
    sqft / M2_TO_SQFT
}

pub fn kbtu_to_kwh(kbtu: f64) -> f64 {
    kbtu * KBTU_TO_KWH
}

pub fn kwh_to_mwh(kwh: f64) -> f64 {
    kwh / KWH_PER_MWH
}

pub fn kbtu_to_co2_tonnes(kbtu: f64) -> f64 {
    kbtu * CO2_TONNES_PER_KBTU
}

/// Whole trees offsetting `co2_tonnes`, rounded down
pub fn tree_equivalent(co2_tonnes: f64) -> u64 {
    // `as` saturates: negatives and NaN become 0
    (co2_tonnes * TREES_PER_TONNE_CO2).floor() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_area_round_trip() {
        for x in [0.0, 1.0, 100.0, 5000.0, 123_456.789] {
            assert!((m2_to_sqft(sqft_to_m2(x)) - x).abs() < 1e-9 * x.max(1.0));
            assert!((sqft_to_m2(m2_to_sqft(x)) - x).abs() < 1e-9 * x.max(1.0));
        }
    }

    #[test]
    fn test_energy_units() {
        let kwh = kbtu_to_kwh(1000.0);
        assert!((kwh - 293.071).abs() < 1e-9);
        assert!((kwh_to_mwh(kwh) * KWH_PER_MWH - kwh).abs() < 1e-9);
        assert!((kbtu_to_co2_tonnes(1000.0) - 53.0).abs() < 1e-9);
    }

    #[test]
    fn test_tree_equivalent_floors() {
        assert_eq!(tree_equivalent(1.0), 45);
        assert_eq!(tree_equivalent(0.03), 1);
        assert_eq!(tree_equivalent(0.02), 0);
        assert_eq!(tree_equivalent(-3.0), 0);
    }
}
