//! Standalone creation blocks. Each generator receives the block's `component` descriptor
//! already in scope and defines `component.applyTo(entity)`.

use updl_scene::Node;
use updl_structs::FieldPath;

use super::attach::{
    InventoryParams, MineableParams, PortalParams, RenderParams, TradingParams, WeaponParams,
    emit_inventory, emit_mineable, emit_portal, emit_render, emit_trading, emit_weapon,
};
use crate::ComponentType;
use crate::script::{ScriptWriter, js_num, js_str};

pub type CreationGenerator = fn(&Node, &mut ScriptWriter);

const BODY_TYPE_PATHS: &[FieldPath] = param_paths!("bodyType");
const MASS_PATHS: &[FieldPath] = param_paths!("mass");
const SHAPE_PATHS: &[FieldPath] = param_paths!("shape");
const SYNC_TRANSFORM_PATHS: &[FieldPath] = param_paths!("syncTransform");
const UPDATE_RATE_PATHS: &[FieldPath] = param_paths!("updateRate");
const SRC_PATHS: &[FieldPath] = param_paths!("src");
const VOLUME_PATHS: &[FieldPath] = param_paths!("volume");
const LOOP_PATHS: &[FieldPath] = param_paths!("loop");
const AUTOPLAY_PATHS: &[FieldPath] = param_paths!("autoplay");

fn physics(node: &Node, w: &mut ScriptWriter) {
    let body_type = node
        .text(BODY_TYPE_PATHS)
        .map(|t| t.to_lowercase())
        .filter(|t| matches!(t.as_str(), "static" | "dynamic" | "kinematic"))
        .unwrap_or_else(|| "dynamic".to_string());
    let mass = node
        .number(MASS_PATHS)
        .filter(|m| *m > 0.0)
        .unwrap_or(1.0);
    let shape = node.text(SHAPE_PATHS).unwrap_or_else(|| "box".to_string());
    w.line(format!(
        r#"component.applyTo = function (entity) {{
    if (!entity.collision) {{
        entity.addComponent("collision", {{ type: {shape} }});
    }}
    if (!entity.rigidbody) {{
        entity.addComponent("rigidbody", {{ type: {body_type}, mass: {mass} }});
    }}
}};"#,
        shape = js_str(&shape),
        body_type = js_str(&body_type),
        mass = js_num(mass),
    ));
}

fn networking(node: &Node, w: &mut ScriptWriter) {
    let sync = node.flag(SYNC_TRANSFORM_PATHS).unwrap_or(true);
    let rate = node
        .number(UPDATE_RATE_PATHS)
        .filter(|r| *r > 0.0)
        .unwrap_or(20.0);
    w.line(format!(
        r#"component.applyTo = function (entity) {{
    entity.networked = true;
    entity.syncTransform = {sync};
    entity.updateRate = {rate};
}};"#,
        rate = js_num(rate),
    ));
}

fn audio(node: &Node, w: &mut ScriptWriter) {
    let src = node.text(SRC_PATHS).unwrap_or_default();
    let volume = node
        .number(VOLUME_PATHS)
        .unwrap_or(1.0)
        .clamp(0.0, 1.0);
    let looped = node.flag(LOOP_PATHS).unwrap_or(false);
    let autoplay = node.flag(AUTOPLAY_PATHS).unwrap_or(false);
    w.line(format!(
        r#"component.applyTo = function (entity) {{
    if (!entity.sound) {{
        entity.addComponent("sound");
    }}
    entity.sound.addSlot("main", {{ url: {src}, volume: {volume}, loop: {looped}, autoPlay: {autoplay} }});
}};"#,
        src = js_str(&src),
        volume = js_num(volume),
    ));
}

fn render(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| emit_render(&RenderParams::from_node(node), "entity", w));
}

fn custom(_node: &Node, w: &mut ScriptWriter) {
    w.line(
        r#"component.applyTo = function (entity) {
    entity.customComponents = entity.customComponents || {};
    entity.customComponents[component.id] = component.properties;
};"#,
    );
}

fn inventory(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| {
        emit_inventory(&InventoryParams::from_node(node), "entity", w)
    });
}

fn trading(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| emit_trading(&TradingParams::from_node(node), "entity", w));
}

fn mineable(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| emit_mineable(&MineableParams::from_node(node), "entity", w));
}

fn portal(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| emit_portal(&PortalParams::from_node(node), "entity", w));
}

fn weapon(node: &Node, w: &mut ScriptWriter) {
    wrap_fragment(w, |w| emit_weapon(&WeaponParams::from_node(node), "entity", w));
}

fn wrap_fragment(w: &mut ScriptWriter, body: impl FnOnce(&mut ScriptWriter)) {
    w.open("component.applyTo = function (entity) {");
    body(w);
    w.close("};");
}

/// Every component type has a creation generator; unknown types were already mapped to `custom`.
pub fn creation_generator(ty: ComponentType) -> CreationGenerator {
    match ty {
        ComponentType::Physics => physics,
        ComponentType::Networking => networking,
        ComponentType::Audio => audio,
        ComponentType::Render => render,
        ComponentType::Custom => custom,
        ComponentType::Inventory => inventory,
        ComponentType::Trading => trading,
        ComponentType::Mineable => mineable,
        ComponentType::Portal => portal,
        ComponentType::Weapon => weapon,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(ty: ComponentType, data: serde_json::Value) -> String {
        let mut w = ScriptWriter::plain();
        creation_generator(ty)(&Node::new("c", data), &mut w);
        w.finish()
    }

    #[test]
    fn every_type_defines_apply_to() {
        for ty in ComponentType::ALL {
            let out = body(ty, json!({}));
            assert!(out.starts_with("component.applyTo = function (entity) {"), "{ty}");
            assert!(out.trim_end().ends_with("};"), "{ty}");
        }
    }

    #[test]
    fn physics_defaults_and_validation() {
        let out = body(ComponentType::Physics, json!({ "bodyType": "Wobbly", "mass": -2 }));
        assert!(out.contains("type: \"dynamic\", mass: 1"));
        let out = body(ComponentType::Physics, json!({ "inputs": { "bodyType": "STATIC", "mass": 40 } }));
        assert!(out.contains("type: \"static\", mass: 40"));
    }

    #[test]
    fn audio_volume_is_clamped() {
        let out = body(ComponentType::Audio, json!({ "src": "engine.ogg", "volume": 4, "loop": true }));
        assert!(out.contains("url: \"engine.ogg\", volume: 1, loop: true, autoPlay: false"));
    }

    #[test]
    fn attachable_types_reuse_their_fragment() {
        let out = body(ComponentType::Mineable, json!({ "maxYield": 6 }));
        assert!(out.contains("    entity.mineable = {"));
        assert!(out.contains("maxYield: 6,"));
    }
}
