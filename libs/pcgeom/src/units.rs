//! Conversions between micrometre parameters and nanometre database units.

/// Number of database units per micrometre.
pub const NM_PER_UM: f64 = 1000.0;

/// Converts a length in micrometres to the nearest integer number of nanometres.
#[inline]
pub fn um_to_nm(um: f64) -> i64 {
    (um * NM_PER_UM).round() as i64
}

/// Converts a length in nanometres to micrometres.
#[inline]
pub fn nm_to_um(nm: i64) -> f64 {
    nm as f64 / NM_PER_UM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_um_to_nm_rounds() {
        assert_eq!(um_to_nm(0.36), 360);
        assert_eq!(um_to_nm(0.1 + 0.2), 300);
        assert_eq!(um_to_nm(-0.48), -480);
        assert_eq!(um_to_nm(100.0), 100_000);
    }

    #[test]
    fn test_nm_to_um() {
        assert_eq!(nm_to_um(230), 0.23);
        assert_eq!(nm_to_um(-1_400), -1.4);
    }
}
