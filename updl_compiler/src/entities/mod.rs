pub mod behaviors;

use log::debug;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::{FieldPath, normalize_transform, to_bool};

use crate::components::ComponentCompiler;
use crate::script::{ScriptWriter, js_ident, js_json, js_str};
use crate::{CompileError, EntityType, entity_type_name};

pub use behaviors::{BehaviorGenerator, behavior_generator};

const NAME_PATHS: &[FieldPath] = &[&["name"], &["inputs", "name"], &["label"]];
const PROPERTY_PATHS: &[FieldPath] = &[&["properties"], &["inputs", "properties"]];

/// Compiles one entity node into a self-invoking block.
///
/// Statement order inside the block is fixed: transform, network wiring (only for networked
/// nodes), attached components in list order, entity-type behavior, registry bookkeeping.
/// Attachments run before the behavior so values from attached components win over the
/// behavior's defaults.
#[derive(Clone)]
pub struct EntityCompiler {
    components: ComponentCompiler,
    ids: SharedIdGenerator,
}

impl EntityCompiler {
    pub fn new(components: ComponentCompiler, ids: SharedIdGenerator) -> Self {
        Self { components, ids }
    }

    pub fn compile(&self, node: &Node, options: &CompileOptions) -> Result<String, CompileError> {
        let type_name = entity_type_name(node);
        let ty = EntityType::parse(&type_name);
        let transform = normalize_transform(node.field("transform"));
        let networked = node
            .field("networked")
            .and_then(to_bool)
            .unwrap_or(false);
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("entity"));
        let name = node.text(NAME_PATHS).unwrap_or_else(|| id.clone());
        let properties = node
            .resolve(PROPERTY_PATHS)
            .filter(|p| p.is_object())
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        let registry = js_ident(&options.entity_registry);
        debug!("entity {id}: type {type_name} -> {ty}, networked {networked}");

        let mut w = ScriptWriter::new(options);
        w.comment(format!("Entity: {id} ({type_name})"));
        w.open("(function () {");
        w.line(format!("const entity = new pc.Entity({});", js_str(&name)));
        w.line(format!("entity.updlId = {};", js_str(&id)));
        w.line(format!("entity.updlType = {};", js_str(ty.as_str())));
        w.line(format!("entity.updlProperties = {};", js_json(&properties)?));
        w.line(format!("entity.setLocalPosition({});", transform.position));
        w.line(format!("entity.setLocalEulerAngles({});", transform.rotation));
        w.line(format!("entity.setLocalScale({});", transform.scale));

        if networked {
            w.comment("Network");
            w.line(format!(
                r#"entity.networked = true;
entity.networkId = {id};
app.fire("network:register", entity);"#,
                id = js_str(&id),
            ));
        }

        let attached = node.attached_components();
        if !attached.is_empty() {
            w.comment("Components");
            for component in &attached {
                self.components.attach_into(component, "entity", &mut w);
            }
        }

        w.comment(format!("Behavior: {ty}"));
        behavior_generator(ty)(node, &mut w);

        w.comment("Registry");
        w.line(format!(
            r#"app.root.addChild(entity);
globalThis.{registry} = globalThis.{registry} || new Map();
globalThis.{registry}.set({id}, entity);
entity.once("destroy", function () {{
    globalThis.{registry}.delete({id});
}});"#,
            id = js_str(&id),
        ));
        w.close("})();");
        Ok(w.finish())
    }
}
