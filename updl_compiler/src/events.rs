//! Event bindings. The whole category compiles into one block; each event hooks the runtime and
//! runs its actions, by id, through the table the action block fills in.

use log::debug;
use serde_json::Value;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::{FieldPath, to_text};

use crate::CompileError;
use crate::script::{ScriptWriter, js_ident, js_num, js_str};

const EVENT_TYPE_PATHS: &[FieldPath] = param_paths!("eventType");
const ACTION_LIST_PATHS: &[FieldPath] = &[&["actions"], &["inputs", "actions"]];
const TARGET_PATHS: &[FieldPath] = param_paths!("target");
const INTERVAL_PATHS: &[FieldPath] = param_paths!("interval");
const KEY_PATHS: &[FieldPath] = param_paths!("key");
const EVENT_NAME_PATHS: &[FieldPath] = param_paths!("eventName");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventType {
    Start,
    Click,
    Timer,
    KeyDown,
    Collision,
    Custom,
}

impl EventType {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "click" => Self::Click,
            "timer" | "interval" => Self::Timer,
            "keydown" | "key" => Self::KeyDown,
            "collision" => Self::Collision,
            "custom" => Self::Custom,
            _ => Self::Start,
        }
    }

    pub fn of(node: &Node) -> Self {
        node.text(EVENT_TYPE_PATHS)
            .map(|t| Self::parse(&t))
            .unwrap_or(Self::Start)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Click => "click",
            Self::Timer => "timer",
            Self::KeyDown => "keydown",
            Self::Collision => "collision",
            Self::Custom => "custom",
        }
    }
}

/// Action ids referenced by an event, as strings, ids, or `{ id }` objects.
pub fn action_ids(node: &Node) -> Vec<String> {
    let Some(Value::Array(items)) = node.resolve(ACTION_LIST_PATHS) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::Object(map) => map.get("id").and_then(to_text),
            other => to_text(other),
        })
        .collect()
}

#[derive(Clone)]
pub struct EventCompiler {
    ids: SharedIdGenerator,
}

impl EventCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    pub fn process(&self, events: &[Node], options: &CompileOptions) -> Result<String, CompileError> {
        if events.is_empty() {
            return Ok(String::new());
        }
        let mut w = ScriptWriter::new(options);
        w.comment("Events");
        w.open("(function () {");
        w.line(
            r#"app.updlActions = app.updlActions || {};
const runActions = function (ids, source) {
    ids.forEach(function (id) {
        const action = app.updlActions[id];
        if (action) {
            action(source);
        }
    });
};"#,
        );
        for node in events {
            self.write_event(node, &mut w);
        }
        w.close("})();");
        Ok(w.finish())
    }

    fn write_event(&self, node: &Node, w: &mut ScriptWriter) {
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("event"));
        let ty = EventType::of(node);
        let actions = action_ids(node)
            .iter()
            .map(|a| js_str(a))
            .collect::<Vec<_>>()
            .join(", ");
        let target = node.text(TARGET_PATHS);
        let matches_target = match &target {
            Some(t) => format!("entity && entity.updlId === {}", js_str(t)),
            None => "true".to_string(),
        };
        debug!("event {id}: {}", ty.as_str());

        w.comment(format!("Event: {id} ({})", ty.as_str()));
        w.open("(function () {");
        w.line(format!("const actions = [{actions}];"));
        match ty {
            EventType::Start => {
                w.line("app.once(\"start\", function () {\n    runActions(actions);\n});");
            }
            EventType::Click => {
                w.line(format!(
                    r#"app.on("entity:click", function (entity) {{
    if ({matches_target}) {{
        runActions(actions, entity);
    }}
}});"#
                ));
            }
            EventType::Timer => {
                let interval = node
                    .number(INTERVAL_PATHS)
                    .filter(|i| *i > 0.0)
                    .unwrap_or(1.0);
                w.line(format!(
                    r#"const handle = setInterval(function () {{
    runActions(actions);
}}, {millis});
app.once("destroy", function () {{
    clearInterval(handle);
}});"#,
                    millis = js_num(interval * 1000.0),
                ));
            }
            EventType::KeyDown => {
                let key = node
                    .text(KEY_PATHS)
                    .unwrap_or_else(|| "space".to_string());
                w.line(format!(
                    r#"if (app.keyboard) {{
    app.keyboard.on(pc.EVENT_KEYDOWN, function (event) {{
        if (event.key === pc.KEY_{key}) {{
            runActions(actions);
        }}
    }});
}}"#,
                    key = js_ident(&key.to_ascii_uppercase()),
                ));
            }
            EventType::Collision => {
                w.line(format!(
                    r#"app.on("collision:start", function (entity, other) {{
    if ({matches_target}) {{
        runActions(actions, entity, other);
    }}
}});"#
                ));
            }
            EventType::Custom => {
                let name = node.text(EVENT_NAME_PATHS).unwrap_or_else(|| id.clone());
                w.line(format!(
                    r#"app.on({name}, function (entity) {{
    runActions(actions, entity);
}});"#,
                    name = js_str(&name),
                ));
            }
        }
        w.close("})();");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use updl_ids::{SequentialIdGenerator, shared};

    fn process(nodes: Vec<Node>) -> String {
        EventCompiler::new(shared(SequentialIdGenerator::new()))
            .process(&nodes, &CompileOptions::default())
            .unwrap()
    }

    #[test]
    fn action_ids_accept_several_shapes() {
        let node = Node::new("e", json!({ "inputs": { "actions": ["a1", 2, { "id": "a3" }, null] } }));
        assert_eq!(action_ids(&node), vec!["a1", "2", "a3"]);
    }

    #[test]
    fn events_run_their_actions_in_order() {
        let out = process(vec![
            Node::new("e1", json!({ "actions": ["jump", "log"] })),
            Node::new("e2", json!({ "eventType": "timer", "interval": 2.5 })),
        ]);
        assert!(out.contains("const actions = [\"jump\", \"log\"];"));
        assert!(out.contains("app.once(\"start\""));
        assert!(out.contains("}, 2500);"));
        assert!(out.find("Event: e1").unwrap() < out.find("Event: e2").unwrap());
    }

    #[test]
    fn keydown_and_click_details() {
        let out = process(vec![
            Node::new("k", json!({ "eventType": "keydown" })),
            Node::new("c", json!({ "eventType": "Click", "target": "ship-1" })),
        ]);
        assert!(out.contains("event.key === pc.KEY_SPACE"));
        assert!(out.contains("if (entity && entity.updlId === \"ship-1\") {"));
    }

    #[test]
    fn no_events_no_script() {
        assert_eq!(process(Vec::new()), "");
    }
}
