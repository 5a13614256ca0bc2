use std::fmt::Display;

/// Float text as `Display` writes it: shortest round trip, no exponent.
/// Negative zero is written as `0`.
pub(crate) fn format_float<F: Display + Default + PartialEq>(value: F) -> String {
    if value == F::default() {
        return "0".to_string();
    }
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    #[case(1050.0, "1050")]
    #[case(10.25, "10.25")]
    #[case(-0.0, "0")]
    #[case(1e21, "1000000000000000000000")]
    #[case(1.5e-7, "0.00000015")]
    #[case(-2.5, "-2.5")]
    #[case(123456789.125, "123456789.125")]
    fn test_format_float(#[case] value: f64, #[case] expected: &str) {
        assert_eq!(format_float(value), expected);
    }

    #[rstest::rstest]
    fn test_format_f32_keeps_its_own_precision() {
        assert_eq!(format_float(0.1f32), "0.1");
    }

    #[rstest::rstest]
    fn test_format_float_round_trips_extremes() {
        for value in [5e-324, f64::MAX, f64::MIN_POSITIVE] {
            assert_eq!(format_float(value).parse::<f64>().unwrap(), value);
        }
    }
}
