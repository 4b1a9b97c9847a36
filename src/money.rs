//! Whole-currency-unit amounts.
//!
//! Every amount in a strategy is an integer number of currency units so the
//! budget identity `sum(channels) + contingency == total` holds exactly.

use serde::{Deserialize, Deserializer};

/// Deserialize any non-negative finite JSON number into whole units,
/// rounding to the nearest unit.
pub fn deserialize_units<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = f64::deserialize(deserializer)?;
    to_units(raw).ok_or_else(|| {
        serde::de::Error::custom(format!("expected a non-negative amount, got {raw}"))
    })
}

/// Convert a raw amount into whole units. `None` for negative or non-finite input.
pub fn to_units(raw: f64) -> Option<u64> {
    if !raw.is_finite() || raw < 0.0 {
        return None;
    }
    Some(raw.round() as u64)
}

/// Format an amount as US dollars with thousands separators, e.g. `$50,000`.
pub fn format_currency(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0), "$0");
        assert_eq!(format_currency(999), "$999");
        assert_eq!(format_currency(50_000), "$50,000");
        assert_eq!(format_currency(1_234_567), "$1,234,567");
    }

    #[test]
    fn test_to_units_rounds_and_rejects() {
        assert_eq!(to_units(5000.0), Some(5000));
        assert_eq!(to_units(4999.6), Some(5000));
        assert_eq!(to_units(-1.0), None);
        assert_eq!(to_units(f64::NAN), None);
    }

    #[test]
    fn test_deserialize_accepts_float_json() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            #[serde(deserialize_with = "deserialize_units")]
            amount: u64,
        }
        let w: Wrapper = serde_json::from_str(r#"{"amount": 1250.0}"#).unwrap();
        assert_eq!(w.amount, 1250);
        let w: Wrapper = serde_json::from_str(r#"{"amount": 7}"#).unwrap();
        assert_eq!(w.amount, 7);
        assert!(serde_json::from_str::<Wrapper>(r#"{"amount": -3}"#).is_err());
    }
}
