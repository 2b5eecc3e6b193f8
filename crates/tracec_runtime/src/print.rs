//! Output formatting for `print_f64` and friends.
//!
//! Per spec §9's design note, the printed form is fixed and kept stable for
//! test determinism: integral doubles print with a trailing `.0`; everything
//! else falls back to [`crate::string::format_number`]'s six-significant-digit
//! form.

use crate::string::format_number;

/// Formats `n` the way the reference implementation's `show` prints a
/// double: `42` becomes `"42.0"`, `3.14159` keeps its digits.
pub fn format_display(n: f64) -> String {
    if n.is_nan() {
        return "nan".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{n:.1}")
    } else {
        format_number(n)
    }
}

/// Prints `n` followed by a newline, in the fixed display format.
#[no_mangle]
pub extern "C" fn print_f64(n: f64) {
    println!("{}", format_display(n));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integral_values_get_trailing_dot_zero() {
        assert_eq!(format_display(42.0), "42.0");
        assert_eq!(format_display(120.0), "120.0");
        assert_eq!(format_display(3.0), "3.0");
        assert_eq!(format_display(-5.0), "-5.0");
        assert_eq!(format_display(0.0), "0.0");
    }

    #[test]
    fn fractional_values_keep_their_digits() {
        assert_eq!(format_display(0.5), format_number(0.5));
    }
}
