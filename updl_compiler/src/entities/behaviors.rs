//! Entity-type behaviors. They run after every attachment fragment, so each one only fills in
//! what an attached component has not already provided (`if (!entity.inventory)` and so on).

use updl_scene::Node;
use updl_structs::FieldPath;

use crate::EntityType;
use crate::components::attach::{
    InventoryParams, MineableParams, PortalParams, TradingParams, emit_inventory, emit_mineable,
    emit_portal, emit_trading,
};
use crate::script::{ScriptWriter, js_num, js_str};

pub type BehaviorGenerator = fn(&Node, &mut ScriptWriter);

const SPEED_PATHS: &[FieldPath] = param_paths!("speed");
const TURN_SPEED_PATHS: &[FieldPath] = param_paths!("turnSpeed");
const INTERACTION_RANGE_PATHS: &[FieldPath] = param_paths!("interactionRange");
const DOCKING_RANGE_PATHS: &[FieldPath] = param_paths!("dockingRange");
const SPIN_SPEED_PATHS: &[FieldPath] = param_paths!("rotationSpeed");
const TARGET_WORLD_PATHS: &[FieldPath] = param_paths!("targetWorld");

fn positive(node: &Node, paths: &[FieldPath], default: f64) -> f64 {
    node.number(paths).filter(|v| *v > 0.0).unwrap_or(default)
}

/// Subscribes `handler` to the app update loop and drops it again when the entity goes away.
fn update_hook(w: &mut ScriptWriter, handler: &str) {
    w.line(format!(
        r#"app.on("update", {handler});
entity.once("destroy", function () {{
    app.off("update", {handler});
}});"#
    ));
}

fn player(node: &Node, w: &mut ScriptWriter) {
    let speed = positive(node, SPEED_PATHS, 5.0);
    w.line(format!(
        r#"entity.playerController = {{ speed: {speed} }};
const onPlayerUpdate = function (dt) {{
    const keyboard = app.keyboard;
    if (!keyboard) {{
        return;
    }}
    let x = 0;
    let z = 0;
    if (keyboard.isPressed(pc.KEY_W)) z -= 1;
    if (keyboard.isPressed(pc.KEY_S)) z += 1;
    if (keyboard.isPressed(pc.KEY_A)) x -= 1;
    if (keyboard.isPressed(pc.KEY_D)) x += 1;
    if (x !== 0 || z !== 0) {{
        const step = entity.playerController.speed * dt;
        entity.translate(x * step, 0, z * step);
    }}
}};"#,
        speed = js_num(speed),
    ));
    update_hook(w, "onPlayerUpdate");
}

fn interactive(node: &Node, w: &mut ScriptWriter) {
    let range = node
        .number(INTERACTION_RANGE_PATHS)
        .filter(|r| *r >= 0.0)
        .unwrap_or(5.0);
    w.line(format!(
        r#"entity.interactive = {{
    interactionRange: {range},
    hovered: false,
    onClick() {{
        app.fire("entity:click", entity);
    }},
    onHover(state) {{
        this.hovered = !!state;
        app.fire("entity:hover", entity, this.hovered);
    }}
}};"#,
        range = js_num(range),
    ));
}

fn vehicle(node: &Node, w: &mut ScriptWriter) {
    let speed = positive(node, SPEED_PATHS, 10.0);
    let turn = positive(node, TURN_SPEED_PATHS, 90.0);
    w.line(format!(
        r#"entity.vehicleController = {{ speed: {speed}, turnSpeed: {turn} }};
const onVehicleUpdate = function (dt) {{
    const keyboard = app.keyboard;
    if (!keyboard) {{
        return;
    }}
    const controller = entity.vehicleController;
    if (keyboard.isPressed(pc.KEY_A)) entity.rotateLocal(0, controller.turnSpeed * dt, 0);
    if (keyboard.isPressed(pc.KEY_D)) entity.rotateLocal(0, -controller.turnSpeed * dt, 0);
    if (keyboard.isPressed(pc.KEY_W)) entity.translateLocal(0, 0, -controller.speed * dt);
    if (keyboard.isPressed(pc.KEY_S)) entity.translateLocal(0, 0, controller.speed * dt);
}};"#,
        speed = js_num(speed),
        turn = js_num(turn),
    ));
    update_hook(w, "onVehicleUpdate");
}

fn ship(node: &Node, w: &mut ScriptWriter) {
    let speed = positive(node, SPEED_PATHS, 10.0);
    let turn = positive(node, TURN_SPEED_PATHS, 90.0);
    w.line(format!(
        r#"entity.shipController = {{
    maxSpeed: {speed},
    turnSpeed: {turn},
    thrust: 0,
    turn: 0,
    velocity: new pc.Vec3(),
    update(dt) {{
        if (this.turn !== 0) {{
            entity.rotateLocal(0, this.turn * this.turnSpeed * dt, 0);
        }}
        if (this.thrust !== 0) {{
            this.velocity.add(entity.forward.clone().mulScalar(this.thrust * this.maxSpeed * dt));
            if (this.velocity.length() > this.maxSpeed) {{
                this.velocity.normalize().mulScalar(this.maxSpeed);
            }}
        }}
        entity.translate(this.velocity.x * dt, this.velocity.y * dt, this.velocity.z * dt);
    }}
}};
const onShipUpdate = function (dt) {{
    entity.shipController.update(dt);
}};"#,
        speed = js_num(speed),
        turn = js_num(turn),
    ));
    update_hook(w, "onShipUpdate");
    w.open("if (!entity.inventory) {");
    emit_inventory(&InventoryParams::DEFAULT, "entity", w);
    w.close("}");
}

fn station(node: &Node, w: &mut ScriptWriter) {
    let docking = node
        .number(DOCKING_RANGE_PATHS)
        .filter(|r| *r >= 0.0)
        .unwrap_or(20.0);
    w.line(format!(
        r#"entity.station = {{
    dockingRange: {docking},
    canDock(ship) {{
        return !!ship && ship.getPosition().distance(entity.getPosition()) <= this.dockingRange;
    }}
}};"#,
        docking = js_num(docking),
    ));
    w.open("if (!entity.tradingPost) {");
    emit_trading(&TradingParams::default(), "entity", w);
    w.close("}");
}

fn asteroid(node: &Node, w: &mut ScriptWriter) {
    let spin = node.number(SPIN_SPEED_PATHS).unwrap_or(5.0);
    w.line(format!(
        r#"entity.spinSpeed = {spin};
const onAsteroidUpdate = function (dt) {{
    entity.rotateLocal(0, entity.spinSpeed * dt, 0);
}};"#,
        spin = js_num(spin),
    ));
    update_hook(w, "onAsteroidUpdate");
    w.open("if (!entity.mineable) {");
    emit_mineable(&MineableParams::default(), "entity", w);
    w.close("}");
}

fn gate(node: &Node, w: &mut ScriptWriter) {
    let target = node.text(TARGET_WORLD_PATHS).unwrap_or_default();
    w.line(format!("entity.gateTarget = {};", js_str(&target)));
    w.open("if (!entity.portal) {");
    let portal = PortalParams {
        target_world: target,
        ..PortalParams::default()
    };
    emit_portal(&portal, "entity", w);
    w.close("}");
}

fn static_marker(_node: &Node, w: &mut ScriptWriter) {
    w.line("entity.isStatic = true;");
}

pub fn behavior_generator(ty: EntityType) -> BehaviorGenerator {
    match ty {
        EntityType::Player => player,
        EntityType::Interactive => interactive,
        EntityType::Vehicle => vehicle,
        EntityType::Ship => ship,
        EntityType::Station => station,
        EntityType::Asteroid => asteroid,
        EntityType::Gate => gate,
        EntityType::Static => static_marker,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn behavior(ty: EntityType, data: serde_json::Value) -> String {
        let mut w = ScriptWriter::plain();
        behavior_generator(ty)(&Node::new("e", data), &mut w);
        w.finish()
    }

    #[test]
    fn every_type_emits_something() {
        for ty in EntityType::ALL {
            assert!(!behavior(ty, json!({})).is_empty(), "{ty}");
        }
    }

    #[test]
    fn update_hooks_are_released_on_destroy() {
        for ty in [EntityType::Player, EntityType::Vehicle, EntityType::Ship, EntityType::Asteroid] {
            let out = behavior(ty, json!({}));
            let on = out.find("app.on(\"update\"").unwrap();
            let off = out.find("app.off(\"update\"").unwrap();
            assert!(on < off, "{ty}");
        }
        assert!(!behavior(EntityType::Static, json!({})).contains("app.on("));
    }

    #[test]
    fn defaults_only_fill_missing_capabilities() {
        let ship = behavior(EntityType::Ship, json!({}));
        let guard = ship.find("if (!entity.inventory) {").unwrap();
        assert!(ship[guard..].contains("capacity: 20,"));

        let station = behavior(EntityType::Station, json!({}));
        assert!(station.contains("dockingRange: 20,"));
        assert!(station.contains("if (!entity.tradingPost) {"));

        let asteroid = behavior(EntityType::Asteroid, json!({}));
        assert!(asteroid.contains("if (!entity.mineable) {"));
        assert!(asteroid.contains("resourceType: \"asteroidMass\","));
    }

    #[test]
    fn parameters_come_from_node_data() {
        let out = behavior(EntityType::Player, json!({ "inputs": { "speed": 8 } }));
        assert!(out.contains("entity.playerController = { speed: 8 };"));
        let out = behavior(EntityType::Vehicle, json!({ "speed": -1, "turnSpeed": "45" }));
        assert!(out.contains("speed: 10, turnSpeed: 45"));
        let out = behavior(EntityType::Gate, json!({ "properties": { "targetWorld": "sol" } }));
        assert!(out.contains("entity.gateTarget = \"sol\";"));
        assert!(out.contains("targetWorld: \"sol\","));
    }
}
