//! Ordered field lookups over loosely-typed node data.
//! Node data arrives with the same field under `data`, `data.inputs` or `data.properties`;
//! each consumer names its candidate paths once as a constant and resolves them here.

use serde_json::Value;

pub type FieldPath = &'static [&'static str];

/// Follows `path` through nested objects. `null` counts as absent.
pub fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = root;
    for key in path {
        current = current.as_object()?.get(*key)?;
    }
    (!current.is_null()).then_some(current)
}

/// First candidate path that resolves to a non-null value, in the given order.
pub fn first_defined<'a>(root: &'a Value, paths: &[FieldPath]) -> Option<&'a Value> {
    paths.iter().find_map(|path| lookup(root, path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SPEED: &[FieldPath] = &[&["speed"], &["inputs", "speed"], &["properties", "speed"]];

    #[test]
    fn earlier_paths_win() {
        let data = json!({ "speed": 3, "inputs": { "speed": 7 } });
        assert_eq!(first_defined(&data, SPEED), Some(&json!(3)));
    }

    #[test]
    fn null_falls_through_to_next_path() {
        let data = json!({ "speed": null, "properties": { "speed": 9 } });
        assert_eq!(first_defined(&data, SPEED), Some(&json!(9)));
    }

    #[test]
    fn non_object_roots_resolve_nothing() {
        assert_eq!(first_defined(&json!("speed"), SPEED), None);
        assert_eq!(lookup(&json!({ "inputs": 4 }), &["inputs", "speed"]), None);
    }
}
