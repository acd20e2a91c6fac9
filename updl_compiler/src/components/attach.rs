//! Attachment fragments: inline statements that mutate an already constructed entity.
//! Each generator reads its own parameters from the component node and defaults anything
//! missing or malformed; none of them can fail.

use updl_scene::Node;
use updl_structs::{FieldPath, Rgb, resolve_color, to_text};

use crate::script::{ScriptWriter, js_color, js_num, js_str};

pub const DEFAULT_RESOURCE_TYPE: &str = "asteroidMass";

// ---- render ----

const PRIMITIVE_PATHS: &[FieldPath] = param_paths!("primitive");
const MODEL_TYPE_PATHS: &[FieldPath] = param_paths!("modelType");
const VISIBLE_PATHS: &[FieldPath] = param_paths!("visible");
const CAST_SHADOWS_PATHS: &[FieldPath] = param_paths!("castShadows");

#[derive(Clone, Debug, PartialEq)]
pub struct RenderParams {
    pub primitive: String,
    pub color: Rgb,
    pub visible: bool,
    pub cast_shadows: bool,
}

impl RenderParams {
    pub fn from_node(node: &Node) -> Self {
        Self {
            primitive: node
                .text(PRIMITIVE_PATHS)
                .or_else(|| node.text(MODEL_TYPE_PATHS))
                .unwrap_or_else(|| "box".to_string()),
            color: resolve_color(&node.data),
            visible: node.flag(VISIBLE_PATHS).unwrap_or(true),
            cast_shadows: node.flag(CAST_SHADOWS_PATHS).unwrap_or(false),
        }
    }
}

pub fn emit_render(p: &RenderParams, var: &str, w: &mut ScriptWriter) {
    w.line(format!(
        r#"if (!{var}.model) {{
    {var}.addComponent("model", {{ type: {primitive}, castShadows: {shadows} }});
}}
{{
    const material = new pc.StandardMaterial();
    material.diffuse = {color};
    material.update();
    {var}.model.material = material;
}}"#,
        primitive = js_str(&p.primitive),
        shadows = p.cast_shadows,
        color = js_color(p.color),
    ));
    if !p.visible {
        w.line(format!("{var}.model.enabled = false;"));
    }
}

fn attach_render(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_render(&RenderParams::from_node(node), var, w);
}

// ---- inventory ----

const CAPACITY_PATHS: &[FieldPath] = param_paths!("capacity");
const CURRENT_LOAD_PATHS: &[FieldPath] = param_paths!("currentLoad");

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InventoryParams {
    pub capacity: f64,
    pub current_load: f64,
}

impl InventoryParams {
    pub const DEFAULT: Self = Self {
        capacity: 20.0,
        current_load: 0.0,
    };

    pub fn from_node(node: &Node) -> Self {
        let capacity = node
            .number(CAPACITY_PATHS)
            .filter(|c| *c >= 0.0)
            .unwrap_or(Self::DEFAULT.capacity);
        let current_load = node
            .number(CURRENT_LOAD_PATHS)
            .unwrap_or(0.0)
            .clamp(0.0, capacity);
        Self {
            capacity,
            current_load,
        }
    }
}

pub fn emit_inventory(p: &InventoryParams, var: &str, w: &mut ScriptWriter) {
    w.line(format!(
        r#"{var}.inventory = {{
    capacity: {capacity},
    currentLoad: {load},
    items: {{}},
    addItem(itemType, amount) {{
        if (!(amount > 0) || this.currentLoad + amount > this.capacity) {{
            return false;
        }}
        this.items[itemType] = (this.items[itemType] || 0) + amount;
        this.currentLoad += amount;
        return true;
    }},
    removeItem(itemType, amount) {{
        const held = this.items[itemType] || 0;
        if (!(amount > 0) || held < amount) {{
            return false;
        }}
        if (held === amount) {{
            delete this.items[itemType];
        }} else {{
            this.items[itemType] = held - amount;
        }}
        this.currentLoad -= amount;
        return true;
    }},
    getCargoInfo() {{
        return {{
            current: this.currentLoad,
            max: this.capacity,
            free: this.capacity - this.currentLoad,
            items: Object.assign({{}}, this.items)
        }};
    }}
}};"#,
        capacity = js_num(p.capacity),
        load = js_num(p.current_load),
    ));
}

fn attach_inventory(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_inventory(&InventoryParams::from_node(node), var, w);
}

// ---- trading ----

/// Tried in order; the first numeric value wins.
pub const PRICE_PER_TON_PATHS: &[FieldPath] = &[
    &["pricePerTon"],
    &["inputs", "pricePerTon"],
    &["properties", "pricePerTon"],
    &["inputs", "properties", "pricePerTon"],
    &["properties", "trading", "pricePerTon"],
];
pub const INTERACTION_RANGE_PATHS: &[FieldPath] = &[
    &["interactionRange"],
    &["inputs", "interactionRange"],
    &["properties", "interactionRange"],
    &["inputs", "properties", "interactionRange"],
    &["properties", "trading", "interactionRange"],
];
const ACCEPTED_RESOURCES_PATHS: &[FieldPath] = param_paths!("acceptedResources");

#[derive(Clone, Debug, PartialEq)]
pub struct TradingParams {
    pub price_per_ton: f64,
    pub interaction_range: f64,
    pub accepted_resources: Vec<String>,
}

impl Default for TradingParams {
    fn default() -> Self {
        Self {
            price_per_ton: 10.0,
            interaction_range: 15.0,
            accepted_resources: vec![DEFAULT_RESOURCE_TYPE.to_string()],
        }
    }
}

impl TradingParams {
    pub fn from_node(node: &Node) -> Self {
        let defaults = Self::default();
        let accepted: Vec<String> = match node.resolve(ACCEPTED_RESOURCES_PATHS) {
            Some(serde_json::Value::Array(items)) => items.iter().filter_map(to_text).collect(),
            Some(single) => to_text(single).into_iter().collect(),
            None => Vec::new(),
        };
        Self {
            price_per_ton: node
                .number(PRICE_PER_TON_PATHS)
                .filter(|p| *p >= 0.0)
                .unwrap_or(defaults.price_per_ton),
            interaction_range: node
                .number(INTERACTION_RANGE_PATHS)
                .filter(|r| *r >= 0.0)
                .unwrap_or(defaults.interaction_range),
            accepted_resources: if accepted.is_empty() {
                defaults.accepted_resources
            } else {
                accepted
            },
        }
    }
}

pub fn emit_trading(p: &TradingParams, var: &str, w: &mut ScriptWriter) {
    let accepted = p
        .accepted_resources
        .iter()
        .map(|r| js_str(r))
        .collect::<Vec<_>>()
        .join(", ");
    w.line(format!(
        r#"{var}.tradingPost = {{
    pricePerTon: {price},
    interactionRange: {range},
    acceptedResources: [{accepted}],
    isInRange(other) {{
        return !!other && other.getPosition().distance({var}.getPosition()) <= this.interactionRange;
    }},
    sell(ship, resourceType, amount) {{
        if (!ship || !ship.inventory || this.acceptedResources.indexOf(resourceType) === -1) {{
            return 0;
        }}
        if (!this.isInRange(ship) || !ship.inventory.removeItem(resourceType, amount)) {{
            return 0;
        }}
        const credits = amount * this.pricePerTon;
        ship.credits = (ship.credits || 0) + credits;
        return credits;
    }}
}};"#,
        price = js_num(p.price_per_ton),
        range = js_num(p.interaction_range),
    ));
}

fn attach_trading(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_trading(&TradingParams::from_node(node), var, w);
}

// ---- mineable ----

const RESOURCE_TYPE_PATHS: &[FieldPath] = param_paths!("resourceType");
const MAX_YIELD_PATHS: &[FieldPath] = param_paths!("maxYield");

#[derive(Clone, Debug, PartialEq)]
pub struct MineableParams {
    pub resource_type: String,
    pub max_yield: f64,
}

impl Default for MineableParams {
    fn default() -> Self {
        Self {
            resource_type: DEFAULT_RESOURCE_TYPE.to_string(),
            max_yield: 2.0,
        }
    }
}

impl MineableParams {
    pub fn from_node(node: &Node) -> Self {
        let defaults = Self::default();
        Self {
            resource_type: node
                .text(RESOURCE_TYPE_PATHS)
                .unwrap_or(defaults.resource_type),
            max_yield: node
                .number(MAX_YIELD_PATHS)
                .filter(|y| *y > 0.0)
                .unwrap_or(defaults.max_yield),
        }
    }
}

/// `intact -> destroyed`, one way. The transition fires on the hit that brings accumulated
/// damage to the remaining yield; later hits return `null` without side effects.
pub fn emit_mineable(p: &MineableParams, var: &str, w: &mut ScriptWriter) {
    w.line(format!(
        r#"{var}.mineable = {{
    resourceType: {resource},
    maxYield: {max_yield},
    remainingYield: {max_yield},
    accumulatedDamage: 0,
    state: "intact",
    hit(damage) {{
        if (this.state === "destroyed") {{
            return null;
        }}
        this.accumulatedDamage += damage > 0 ? damage : 0;
        if (this.accumulatedDamage < this.remainingYield) {{
            return null;
        }}
        this.state = "destroyed";
        const harvested = {{ resourceType: this.resourceType, amount: this.remainingYield }};
        this.remainingYield = 0;
        this.onDestroyed(harvested);
        return harvested;
    }},
    onDestroyed(harvested) {{
        app.fire("mineable:destroyed", {var}, harvested);
        {var}.destroy();
    }}
}};"#,
        resource = js_str(&p.resource_type),
        max_yield = js_num(p.max_yield),
    ));
}

fn attach_mineable(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_mineable(&MineableParams::from_node(node), var, w);
}

// ---- portal ----

const TARGET_WORLD_PATHS: &[FieldPath] = param_paths!("targetWorld");
const COOLDOWN_PATHS: &[FieldPath] = &[
    &["cooldownTime"],
    &["inputs", "cooldownTime"],
    &["properties", "cooldownTime"],
    &["inputs", "properties", "cooldownTime"],
    &["cooldown"],
    &["properties", "cooldown"],
];

#[derive(Clone, Debug, PartialEq)]
pub struct PortalParams {
    pub target_world: String,
    pub cooldown_time: f64,
}

impl Default for PortalParams {
    fn default() -> Self {
        Self {
            target_world: String::new(),
            cooldown_time: 2.0,
        }
    }
}

impl PortalParams {
    pub fn from_node(node: &Node) -> Self {
        let defaults = Self::default();
        Self {
            target_world: node
                .text(TARGET_WORLD_PATHS)
                .unwrap_or(defaults.target_world),
            cooldown_time: node
                .number(COOLDOWN_PATHS)
                .filter(|c| *c >= 0.0)
                .unwrap_or(defaults.cooldown_time),
        }
    }
}

/// Cooldown gate: a request succeeds only when more than `cooldownTime` seconds have passed
/// since the last successful one; rejected requests leave the gate untouched.
pub fn emit_portal(p: &PortalParams, var: &str, w: &mut ScriptWriter) {
    w.line(format!(
        r#"{var}.portal = {{
    targetWorld: {target},
    cooldownTime: {cooldown},
    lastUsedAt: -Infinity,
    transport(traveler, now) {{
        const time = typeof now === "number" ? now : Date.now() / 1000;
        if (!(time - this.lastUsedAt > this.cooldownTime)) {{
            return false;
        }}
        this.lastUsedAt = time;
        app.fire("portal:transport", {var}, traveler, this.targetWorld);
        return true;
    }}
}};"#,
        target = js_str(&p.target_world),
        cooldown = js_num(p.cooldown_time),
    ));
}

fn attach_portal(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_portal(&PortalParams::from_node(node), var, w);
}

// ---- weapon ----

const DAMAGE_PATHS: &[FieldPath] = param_paths!("damage");
const FIRE_RATE_PATHS: &[FieldPath] = param_paths!("fireRate");
const RANGE_PATHS: &[FieldPath] = param_paths!("range");

const MIN_FIRE_RATE: f64 = 0.01;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeaponParams {
    pub damage: f64,
    pub fire_rate: f64,
    pub range: f64,
}

impl Default for WeaponParams {
    fn default() -> Self {
        Self {
            damage: 1.0,
            fire_rate: 2.0,
            range: 100.0,
        }
    }
}

impl WeaponParams {
    pub fn from_node(node: &Node) -> Self {
        let defaults = Self::default();
        Self {
            damage: node
                .number(DAMAGE_PATHS)
                .filter(|d| *d >= 0.0)
                .unwrap_or(defaults.damage),
            fire_rate: node
                .number(FIRE_RATE_PATHS)
                .filter(|r| *r > 0.0)
                .unwrap_or(defaults.fire_rate)
                .max(MIN_FIRE_RATE),
            range: node
                .number(RANGE_PATHS)
                .filter(|r| *r >= 0.0)
                .unwrap_or(defaults.range),
        }
    }
}

pub fn emit_weapon(p: &WeaponParams, var: &str, w: &mut ScriptWriter) {
    w.line(format!(
        r#"{var}.weapon = {{
    damage: {damage},
    fireRate: {rate},
    range: {range},
    lastFiredAt: -Infinity,
    fire(target, now) {{
        const time = typeof now === "number" ? now : Date.now() / 1000;
        if (time - this.lastFiredAt < 1 / this.fireRate) {{
            return false;
        }}
        if (!target || !target.mineable) {{
            return false;
        }}
        if (target.getPosition().distance({var}.getPosition()) > this.range) {{
            return false;
        }}
        this.lastFiredAt = time;
        target.mineable.hit(this.damage);
        return true;
    }}
}};"#,
        damage = js_num(p.damage),
        rate = js_num(p.fire_rate),
        range = js_num(p.range),
    ));
}

fn attach_weapon(node: &Node, var: &str, w: &mut ScriptWriter) {
    emit_weapon(&WeaponParams::from_node(node), var, w);
}

pub type AttachGenerator = fn(&Node, &str, &mut ScriptWriter);

/// Only six component types know how to attach themselves to an entity.
pub fn attach_generator(ty: crate::ComponentType) -> Option<AttachGenerator> {
    use crate::ComponentType as C;
    match ty {
        C::Render => Some(attach_render),
        C::Inventory => Some(attach_inventory),
        C::Trading => Some(attach_trading),
        C::Mineable => Some(attach_mineable),
        C::Portal => Some(attach_portal),
        C::Weapon => Some(attach_weapon),
        C::Physics | C::Networking | C::Audio | C::Custom => None,
    }
}
