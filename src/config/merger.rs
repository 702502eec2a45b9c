//! Layering of project and local configuration values.
//!
//! `.medic/config.local.yml` is merged over `.medic/config.yml`:
//!
//! - Mappings merge key by key, recursively
//! - Sequences (such as `module_roots`) are replaced whole
//! - A `null` in the overlay removes the key, restoring its default
//! - Any other overlay value replaces the base value

use serde_yaml::Value;

/// Merge `overlay` over `base`, returning a new value.
pub fn deep_merge(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut merged = base_map.clone();
            for (key, value) in overlay_map {
                if value.is_null() {
                    merged.remove(key);
                    continue;
                }
                let next = match base_map.get(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value.clone(),
                };
                merged.insert(key.clone(), next);
            }
            Value::Mapping(merged)
        }
        // An empty file parses to null and leaves the base untouched.
        (base, Value::Null) => base.clone(),
        (_, overlay) => overlay.clone(),
    }
}

/// Merge layers in order; later layers win.
pub fn merge_configs(layers: &[Value]) -> Value {
    layers
        .iter()
        .fold(Value::Mapping(Default::default()), |acc, layer| {
            deep_merge(&acc, layer)
        })
}
