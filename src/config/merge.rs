//! Field-by-field merging of configuration tiers.
//!
//! Tiers are converted to `serde_json::Value` first so YAML files and
//! in-memory overrides merge the same way. Arrays are replaced, not
//! concatenated.

use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Anything else in overlay replaces base entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use things_to_google_tasks::config::deep_merge;
///
/// let base = json!({
///     "google": { "credentials_path": "creds.json", "token_path": "token.json" }
/// });
/// let overlay = json!({
///     "google": { "token_path": "/secure/token.json" }
/// });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["google"]["credentials_path"], "creds.json");
/// assert_eq!(merged["google"]["token_path"], "/secure/token.json");
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge tiers in order, later ones winning.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
