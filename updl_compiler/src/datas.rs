use log::debug;
use serde_json::{Value, json};
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::FieldPath;

use crate::CompileError;
use crate::script::{ScriptWriter, js_json, js_str};

const KEY_PATHS: &[FieldPath] = param_paths!("key");
const VALUE_PATHS: &[FieldPath] = param_paths!("value");
const SCOPE_PATHS: &[FieldPath] = param_paths!("scope");
const DATA_TYPE_PATHS: &[FieldPath] = param_paths!("dataType");

#[derive(Clone, Debug, PartialEq)]
pub struct DataEntry {
    pub key: String,
    pub value: Value,
    pub scope: &'static str,
    pub data_type: String,
}

impl DataEntry {
    /// `scope` is `global` unless the node asks for `local`.
    pub fn from_node(node: &Node, fallback_key: &str) -> Self {
        let scope = match node.text(SCOPE_PATHS).map(|s| s.to_ascii_lowercase()) {
            Some(s) if s == "local" => "local",
            _ => "global",
        };
        Self {
            key: node
                .text(KEY_PATHS)
                .unwrap_or_else(|| fallback_key.to_string()),
            value: node.resolve(VALUE_PATHS).cloned().unwrap_or(Value::Null),
            scope,
            data_type: node
                .text(DATA_TYPE_PATHS)
                .unwrap_or_else(|| "variable".to_string()),
        }
    }
}

/// Stores every data node in `app.updlData.<scope>` under its key.
#[derive(Clone)]
pub struct DataCompiler {
    ids: SharedIdGenerator,
}

impl DataCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    pub fn process(&self, datas: &[Node], options: &CompileOptions) -> Result<String, CompileError> {
        if datas.is_empty() {
            return Ok(String::new());
        }
        let mut w = ScriptWriter::new(options);
        w.comment("Data");
        w.open("(function () {");
        w.line("app.updlData = app.updlData || { global: {}, local: {} };");
        for node in datas {
            let id = node
                .id()
                .map(str::to_string)
                .unwrap_or_else(|| self.ids.next_id("data"));
            let entry = DataEntry::from_node(node, &id);
            debug!("data {id}: {} ({})", entry.key, entry.scope);
            let record = json!({ "id": id, "type": entry.data_type, "value": entry.value });
            w.line(format!(
                "app.updlData.{}[{}] = {};",
                entry.scope,
                js_str(&entry.key),
                js_json(&record)?
            ));
        }
        w.close("})();");
        Ok(w.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use updl_ids::{SequentialIdGenerator, shared};

    #[test]
    fn entries_default_scope_and_type() {
        let entry = DataEntry::from_node(&Node::new("d", json!({ "inputs": { "value": 3 } })), "d");
        assert_eq!(entry.key, "d");
        assert_eq!(entry.scope, "global");
        assert_eq!(entry.data_type, "variable");
        assert_eq!(entry.value, json!(3));
    }

    #[test]
    fn values_are_embedded_as_json() {
        let nodes = vec![Node::new(
            "d1",
            json!({ "key": "score", "scope": "LOCAL", "value": { "points": 10 } }),
        )];
        let out = DataCompiler::new(shared(SequentialIdGenerator::new()))
            .process(&nodes, &CompileOptions::default())
            .unwrap();
        assert!(out.contains("app.updlData.local[\"score\"] = {"));
        assert!(out.contains("\"points\": 10"));
        assert!(out.contains("\"type\": \"variable\","));
    }
}
