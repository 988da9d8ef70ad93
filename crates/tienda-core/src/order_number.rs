//! # Order Numbers
//!
//! Human-readable order identifiers.
//!
//! ```text
//! Sequential:  ORD-000042            (persistence-owned sequence)
//! Fallback:    ORD-17345678-042      (epoch millis, last 8 digits + random)
//! ```
//!
//! The fallback only appears when the sequence cannot be read. It is unique
//! enough for one storefront, not globally.

/// Prefix shared by every order number.
pub const PREFIX: &str = "ORD-";

/// Formats a sequence value: `ORD-` + at least 6 zero-padded digits.
///
/// ## Example
/// ```rust
/// use tienda_core::order_number::format_sequential;
///
/// assert_eq!(format_sequential(42), "ORD-000042");
/// assert_eq!(format_sequential(1_234_567), "ORD-1234567");
/// ```
pub fn format_sequential(sequence: u64) -> String {
    format!("{PREFIX}{sequence:06}")
}

/// Formats a fallback number from a timestamp and a random value.
///
/// Only the last 8 digits of `epoch_millis` and the last 3 of `random` are used.
pub fn format_fallback(epoch_millis: u64, random: u16) -> String {
    format!(
        "{PREFIX}{:08}-{:03}",
        epoch_millis % 100_000_000,
        random % 1000
    )
}

/// Checks that `value` has one of the two order number shapes.
pub fn is_order_number(value: &str) -> bool {
    let Some(rest) = value.strip_prefix(PREFIX) else {
        return false;
    };
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());

    match rest.split_once('-') {
        None => rest.len() >= 6 && all_digits(rest),
        Some((stamp, random)) => {
            stamp.len() == 8 && random.len() == 3 && all_digits(stamp) && all_digits(random)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_format() {
        assert_eq!(format_sequential(1), "ORD-000001");
        assert_eq!(format_sequential(999_999), "ORD-999999");
        assert_eq!(format_sequential(1_000_000), "ORD-1000000");
    }

    #[test]
    fn test_fallback_format() {
        assert_eq!(format_fallback(1_734_567_890_123, 7), "ORD-67890123-007");
        assert_eq!(format_fallback(42, 999), "ORD-00000042-999");
        assert!(is_order_number(&format_fallback(1_734_567_890_123, 1234)));
    }

    #[test]
    fn test_is_order_number() {
        assert!(is_order_number("ORD-000042"));
        assert!(is_order_number("ORD-67890123-007"));
        assert!(!is_order_number("ORD-42"));
        assert!(!is_order_number("ord-000042"));
        assert!(!is_order_number("ORD-6789012-007"));
        assert!(!is_order_number("ORD-67890123-07a"));
    }

    #[test]
    fn test_sequential_numbers_are_unique() {
        let numbers: std::collections::HashSet<_> = (1..=1000).map(format_sequential).collect();
        assert_eq!(numbers.len(), 1000);
    }
}
