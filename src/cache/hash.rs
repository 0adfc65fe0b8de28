//! Content hashing for memo keys.

use serde::Serialize;
use sha2::{Digest, Sha256};

/// SHA-256 of the JSON encoding of `value`, as 64 lowercase hex characters.
pub fn compute_hash<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(value)?;
    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParamValue;

    #[test]
    fn test_compute_hash_deterministic() {
        let key = ("SELECT 1 WHERE x = $1", vec![ParamValue::Int(42)]);
        let hash = compute_hash(&key).unwrap();
        assert_eq!(hash, compute_hash(&key).unwrap());
        assert_eq!(hash.len(), 64);
    }

    #[test]
    fn test_param_type_changes_hash() {
        let int = ("SELECT $1", vec![ParamValue::Int(1)]);
        let text = ("SELECT $1", vec![ParamValue::Text("1".into())]);
        assert_ne!(compute_hash(&int).unwrap(), compute_hash(&text).unwrap());
    }
}
