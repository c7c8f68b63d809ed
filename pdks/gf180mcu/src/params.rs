//! Parameter checks shared by the generators.

use pcell::component::error::Error;
use pcell::error::{ErrorSource, Result};
use pcgeom::units::um_to_nm;

/// Converts a length in micrometres to nanometres,
/// rejecting values that are not finite and strictly positive.
pub(crate) fn positive_length(name: &str, um: f64) -> Result<i64> {
    if !um.is_finite() {
        return Err(invalid(name, um, "must be finite"));
    }
    let nm = um_to_nm(um);
    if nm <= 0 {
        return Err(invalid(name, um, "must be at least 1 nm"));
    }
    Ok(nm)
}

/// Rejects finger counts below one.
pub(crate) fn finger_count(name: &str, m: u32) -> Result<i64> {
    if m < 1 {
        return Err(invalid(name, m, "must be at least 1"));
    }
    Ok(m as i64)
}

fn invalid(name: &str, value: impl std::fmt::Display, reason: &str) -> pcell::error::PcellError {
    ErrorSource::Component(Error::invalid_param(name, value, reason)).into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_length() {
        assert_eq!(positive_length("la", 0.1).unwrap(), 100);
        assert_eq!(positive_length("la", 2.345).unwrap(), 2_345);
        assert!(positive_length("la", 0.0).is_err());
        assert!(positive_length("wa", -1.0).is_err());
        assert!(positive_length("cw", f64::NAN).is_err());
        assert!(positive_length("cw", f64::INFINITY).is_err());
        assert!(positive_length("cw", 0.0004).is_err());
    }

    #[test]
    fn test_finger_count() {
        assert_eq!(finger_count("m", 3).unwrap(), 3);
        let err = finger_count("m", 0).unwrap_err();
        assert!(err.to_string().contains("`m` = 0"));
    }
}
