//! Action table. Every action node becomes one function in `app.updlActions`, keyed by id.

use log::debug;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::{FieldPath, Vector3, normalize_triple};

use crate::CompileError;
use crate::script::{ScriptWriter, js_ident, js_str};

const ACTION_TYPE_PATHS: &[FieldPath] = param_paths!("actionType");
const TARGET_PATHS: &[FieldPath] = param_paths!("target");
const VALUE_PATHS: &[FieldPath] = param_paths!("value");
const MESSAGE_PATHS: &[FieldPath] = &[
    &["message"],
    &["inputs", "message"],
    &["value"],
    &["inputs", "value"],
];
const EVENT_NAME_PATHS: &[FieldPath] = param_paths!("eventName");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionType {
    Move,
    Rotate,
    Scale,
    Show,
    Hide,
    Destroy,
    PlaySound,
    Log,
    Emit,
}

impl ActionType {
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "move" | "translate" => Self::Move,
            "rotate" => Self::Rotate,
            "scale" => Self::Scale,
            "show" => Self::Show,
            "hide" => Self::Hide,
            "destroy" => Self::Destroy,
            "playsound" | "sound" => Self::PlaySound,
            "emit" => Self::Emit,
            _ => Self::Log,
        }
    }

    pub fn of(node: &Node) -> Self {
        node.text(ACTION_TYPE_PATHS)
            .map(|t| Self::parse(&t))
            .unwrap_or(Self::Log)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
            Self::Show => "show",
            Self::Hide => "hide",
            Self::Destroy => "destroy",
            Self::PlaySound => "playSound",
            Self::Log => "log",
            Self::Emit => "emit",
        }
    }

    const fn needs_entity(self) -> bool {
        !matches!(self, Self::Log | Self::Emit)
    }
}

#[derive(Clone)]
pub struct ActionCompiler {
    ids: SharedIdGenerator,
}

impl ActionCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    pub fn process(&self, actions: &[Node], options: &CompileOptions) -> Result<String, CompileError> {
        if actions.is_empty() {
            return Ok(String::new());
        }
        let registry = js_ident(&options.entity_registry);
        let mut w = ScriptWriter::new(options);
        w.comment("Actions");
        w.open("(function () {");
        w.line(format!(
            r#"app.updlActions = app.updlActions || {{}};
const lookup = function (id) {{
    const registry = globalThis.{registry};
    return registry ? registry.get(id) : undefined;
}};"#
        ));
        for node in actions {
            self.write_action(node, &mut w);
        }
        w.close("})();");
        Ok(w.finish())
    }

    fn write_action(&self, node: &Node, w: &mut ScriptWriter) {
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("action"));
        let ty = ActionType::of(node);
        debug!("action {id}: {}", ty.as_str());

        w.comment(format!("Action: {id} ({})", ty.as_str()));
        w.open(format!("app.updlActions[{}] = function (source) {{", js_str(&id)));
        if ty.needs_entity() {
            let target = match node.text(TARGET_PATHS) {
                Some(t) => format!("lookup({})", js_str(&t)),
                None => "source".to_string(),
            };
            w.line(format!("const entity = {target};\nif (!entity) {{\n    return;\n}}"));
        }
        let triple = |default| normalize_triple(node.resolve(VALUE_PATHS), default);
        let body = match ty {
            ActionType::Move => format!("entity.translate({});", triple(Vector3::ZERO)),
            ActionType::Rotate => format!("entity.rotate({});", triple(Vector3::ZERO)),
            ActionType::Scale => format!("entity.setLocalScale({});", triple(Vector3::ONE)),
            ActionType::Show => "entity.enabled = true;".to_string(),
            ActionType::Hide => "entity.enabled = false;".to_string(),
            ActionType::Destroy => "entity.destroy();".to_string(),
            ActionType::PlaySound => {
                "if (entity.sound) {\n    entity.sound.play(\"main\");\n}".to_string()
            }
            ActionType::Log => {
                let message = node.text(MESSAGE_PATHS).unwrap_or_default();
                format!("console.log({});", js_str(&message))
            }
            ActionType::Emit => {
                let name = node.text(EVENT_NAME_PATHS).unwrap_or_else(|| id.clone());
                format!("app.fire({}, source);", js_str(&name))
            }
        };
        w.line(body);
        w.close("};");
    }
}
