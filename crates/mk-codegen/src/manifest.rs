//! The effect manifest: the compile-time record of which capabilities each
//! emitted entry point requires.
//!
//! The runtime contract is built on this record: the host constructs an
//! object whose keys are exactly the listed effects and injects it as the
//! `__effects` parameter. The manifest also feeds the `__meta` header's
//! `effectsHash`, which the runtime uses to reject incompatible bytecode.

use std::collections::BTreeSet;

use serde::Serialize;

/// One effectful entry point and the capabilities it requires.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestEntry {
    /// The exported function or route handler name.
    pub name: String,
    /// `"function"` or `"route"`.
    pub kind: String,
    /// Required capabilities, sorted.
    pub effects: Vec<String>,
}

/// The manifest emitted alongside each module.
#[derive(Debug, Clone, Serialize)]
pub struct EffectManifest {
    #[serde(rename = "languageVersion")]
    pub language_version: String,
    #[serde(rename = "stdlibVersion")]
    pub stdlib_version: String,
    /// FNV-1a 64 over the sorted union of all entry effects, in hex.
    #[serde(rename = "effectsHash")]
    pub effects_hash: String,
    /// The sorted union of all entry effects.
    #[serde(rename = "effectsList")]
    pub effects_list: Vec<String>,
    /// Entry points in source order.
    pub entries: Vec<ManifestEntry>,
}

impl EffectManifest {
    /// Assemble a manifest from entries in source order.
    pub fn new(
        language_version: impl Into<String>,
        stdlib_version: impl Into<String>,
        entries: Vec<ManifestEntry>,
    ) -> Self {
        let union: BTreeSet<String> = entries
            .iter()
            .flat_map(|e| e.effects.iter().cloned())
            .collect();
        let effects_list: Vec<String> = union.into_iter().collect();
        let effects_hash = effects_hash(&effects_list);
        EffectManifest {
            language_version: language_version.into(),
            stdlib_version: stdlib_version.into(),
            effects_hash,
            effects_list,
            entries,
        }
    }
}

/// Deterministic hash over a sorted effect list: FNV-1a 64 of the
/// comma-joined names, rendered as 16 lowercase hex digits.
pub fn effects_hash(sorted_effects: &[String]) -> String {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let joined = sorted_effects.join(",");
    let mut hash = FNV_OFFSET;
    for byte in joined.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    format!("{hash:016x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic_and_input_sensitive() {
        let a = effects_hash(&["log".into(), "time".into()]);
        let b = effects_hash(&["log".into(), "time".into()]);
        let c = effects_hash(&["log".into()]);
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }

    #[test]
    fn empty_effect_list_hashes() {
        let h = effects_hash(&[]);
        assert_eq!(h.len(), 16);
    }

    #[test]
    fn manifest_unions_and_sorts_effects() {
        let manifest = EffectManifest::new(
            "1.0",
            "1.0",
            vec![
                ManifestEntry {
                    name: "b".into(),
                    kind: "function".into(),
                    effects: vec!["time".into()],
                },
                ManifestEntry {
                    name: "a".into(),
                    kind: "route".into(),
                    effects: vec!["log".into(), "time".into()],
                },
            ],
        );
        assert_eq!(manifest.effects_list, vec!["log", "time"]);
        // Entries keep source order, not name order.
        assert_eq!(manifest.entries[0].name, "b");
    }

    #[test]
    fn manifest_serializes_with_camel_case_keys() {
        let manifest = EffectManifest::new("1.0", "1.0", vec![]);
        let json = serde_json::to_value(&manifest).unwrap();
        assert!(json.get("languageVersion").is_some());
        assert!(json.get("effectsHash").is_some());
        assert!(json.get("effectsList").is_some());
    }
}
