//! Hashing System - SHA-256 fingerprints and stable variant selection
//!
//! Anything that looks like variety between strategies comes from here, never
//! from a random source, so identical input always yields identical output.

use sha2::{Sha256, Digest};
use serde::Serialize;
use serde_json::{Value, to_string};

use crate::model::StrategyInput;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => {
            Value::Array(arr.iter().map(sort_value).collect())
        }
        _ => v.clone()
    }
}

/// Cache key for a strategy request: sha256 of its canonical JSON.
pub fn input_fingerprint(input: &StrategyInput) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(input)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

/// Stable seed over the fields that shape a strategy.
///
/// Fields are length-prefixed so `("ab", "c")` and `("a", "bc")` differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantSeed([u8; 32]);

impl VariantSeed {
    pub fn from_input(input: &StrategyInput) -> Self {
        let mut hasher = Sha256::new();
        let mut field = |bytes: &[u8]| {
            hasher.update((bytes.len() as u64).to_le_bytes());
            hasher.update(bytes);
        };
        field(input.business_name.as_bytes());
        field(input.industry.as_bytes());
        field(input.target_audience.as_bytes());
        field(&input.budget.to_le_bytes());
        field(&input.timeframe.months().to_le_bytes());
        for objective in &input.objectives {
            field(objective.as_bytes());
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(&hasher.finalize());
        Self(seed)
    }

    /// Pick an index in `0..n` for the named choice. `n == 0` yields 0.
    pub fn pick(&self, salt: &str, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update(salt.as_bytes());
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        (u64::from_le_bytes(head) % n as u64) as usize
    }
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Timeframe;
    use serde_json::json;

    fn input(name: &str) -> StrategyInput {
        StrategyInput {
            business_name: name.to_string(),
            industry: "retail".to_string(),
            target_audience: "Urban shoppers".to_string(),
            budget: 20_000,
            objectives: vec!["Increase sales".to_string()],
            timeframe: Timeframe::SixMonths,
            current_challenges: String::new(),
            competitor_info: None,
            existing_marketing: None,
        }
    }

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_hash_deterministic() {
        let data = b"test data";
        assert_eq!(sha256_hex(data), sha256_hex(data));
        assert_eq!(sha256_hex(data).len(), 64);
    }

    #[test]
    fn test_fingerprint_stable_and_input_sensitive() {
        let a = input_fingerprint(&input("Acme")).unwrap();
        assert_eq!(a, input_fingerprint(&input("Acme")).unwrap());
        assert_ne!(a, input_fingerprint(&input("Acme Two")).unwrap());
    }

    #[test]
    fn test_variant_pick_in_range_and_stable() {
        let seed = VariantSeed::from_input(&input("Acme"));
        for n in 1..10 {
            let first = seed.pick("themes", n);
            assert!(first < n);
            assert_eq!(first, seed.pick("themes", n));
        }
        assert_eq!(seed.pick("anything", 0), 0);
    }
}
