//! General maths utility functions

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Round a value to the given number of decimal places.
pub fn round_dp(value: f64, decimal_places: u32) -> f64 {
    let factor = 10f64.powi(decimal_places as i32);
    (value * factor).round() / factor
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_round_dp() {
        assert_eq!(round_dp(3.86251, 3), 3.863);
        assert_eq!(round_dp(0.24, 1), 0.2);
        assert_eq!(round_dp(-1.25001, 1), -1.3);
        assert_eq!(round_dp(7.0, 2), 7.0);
    }
}
