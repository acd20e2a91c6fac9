pub mod attach;
pub mod creation;

use log::debug;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::{AttachedComponent, COMPONENT_PROPERTY_PATHS, Node, component_type_of};

use crate::script::{ScriptWriter, js_json, js_str};
use crate::{CompileError, ComponentType};

pub use attach::{AttachGenerator, attach_generator};
pub use creation::{CreationGenerator, creation_generator};

/// Compiles component nodes two ways: standalone creation blocks for the component category,
/// and inline attachment fragments for components wired into an entity. The two dispatch
/// tables are not symmetric; see [`attach_generator`] and [`creation_generator`].
#[derive(Clone)]
pub struct ComponentCompiler {
    ids: SharedIdGenerator,
}

impl ComponentCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    /// One self-invoking block per component, in input order.
    pub fn process(
        &self,
        components: &[Node],
        options: &CompileOptions,
    ) -> Result<String, CompileError> {
        let mut w = ScriptWriter::new(options);
        for node in components {
            self.write_creation_block(node, &mut w)?;
        }
        Ok(w.finish())
    }

    fn write_creation_block(&self, node: &Node, w: &mut ScriptWriter) -> Result<(), CompileError> {
        let type_name = component_type_of(node);
        let ty = ComponentType::parse(&type_name);
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("component"));
        let properties = node
            .resolve(COMPONENT_PROPERTY_PATHS)
            .filter(|p| p.is_object())
            .cloned()
            .unwrap_or_else(|| serde_json::json!({}));
        debug!("component {id}: {type_name} -> {ty} generator");

        w.comment(format!("Component: {id} ({type_name})"));
        w.open("(function () {");
        w.open("const component = {");
        w.line(format!("id: {},", js_str(&id)));
        w.line(format!("type: {},", js_str(&type_name)));
        w.line(format!("properties: {}", js_json(&properties)?));
        w.close("};");
        creation_generator(ty)(node, w);
        w.line("app.updlComponents = app.updlComponents || new Map();");
        w.line("app.updlComponents.set(component.id, component);");
        w.close("})();");
        Ok(())
    }

    /// Inline fragment mutating `entity_var`; empty for component types without an attachment.
    pub fn attach(&self, component: &AttachedComponent, entity_var: &str) -> String {
        let mut w = ScriptWriter::plain();
        self.attach_into(component, entity_var, &mut w);
        w.finish()
    }

    /// Returns whether anything was written.
    pub fn attach_into(
        &self,
        component: &AttachedComponent,
        entity_var: &str,
        w: &mut ScriptWriter,
    ) -> bool {
        let ty = ComponentType::parse(&component.component_type);
        match attach_generator(ty) {
            Some(generator) => {
                generator(&component.node, entity_var, w);
                true
            }
            None => {
                debug!(
                    "component {} ({}) has no attachment, skipped",
                    component.id.as_deref().unwrap_or("unnamed"),
                    component.component_type
                );
                false
            }
        }
    }
}
