//! Scene-level setup for space nodes.

use log::debug;
use serde_json::json;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::{FieldPath, Rgb, Vector3, normalize_color, normalize_triple};

use crate::CompileError;
use crate::script::{ScriptWriter, js_color, js_json, js_str};

const NAME_PATHS: &[FieldPath] = &[&["name"], &["inputs", "name"]];
const BACKGROUND_PATHS: &[FieldPath] = &[
    &["backgroundColor"],
    &["inputs", "backgroundColor"],
    &["properties", "backgroundColor"],
    &["clearColor"],
];
const AMBIENT_PATHS: &[FieldPath] = param_paths!("ambientColor");
const GRAVITY_PATHS: &[FieldPath] = param_paths!("gravity");
const CREATE_CAMERA_PATHS: &[FieldPath] = param_paths!("createCamera");
const CAMERA_POSITION_PATHS: &[FieldPath] = param_paths!("cameraPosition");

pub const DEFAULT_BACKGROUND: Rgb = Rgb::new(5.0 / 255.0, 7.0 / 255.0, 15.0 / 255.0);
pub const DEFAULT_AMBIENT: Rgb = Rgb::new(0.2, 0.2, 0.2);
pub const DEFAULT_GRAVITY: Vector3 = Vector3::new(0.0, -9.81, 0.0);
pub const DEFAULT_CAMERA_POSITION: Vector3 = Vector3::new(0.0, 5.0, 10.0);

#[derive(Clone, Debug, PartialEq)]
pub struct SpaceSettings {
    pub name: String,
    pub background: Rgb,
    pub ambient: Rgb,
    pub gravity: Vector3,
    pub create_camera: bool,
    pub camera_position: Vector3,
}

impl SpaceSettings {
    pub fn from_node(node: &Node, fallback_name: &str) -> Self {
        let color_or = |paths: &[FieldPath], default: Rgb| match node.resolve(paths) {
            Some(raw) => normalize_color(Some(raw)),
            None => default,
        };
        Self {
            name: node
                .text(NAME_PATHS)
                .unwrap_or_else(|| fallback_name.to_string()),
            background: color_or(BACKGROUND_PATHS, DEFAULT_BACKGROUND),
            ambient: color_or(AMBIENT_PATHS, DEFAULT_AMBIENT),
            gravity: normalize_triple(node.resolve(GRAVITY_PATHS), DEFAULT_GRAVITY),
            create_camera: node.flag(CREATE_CAMERA_PATHS).unwrap_or(true),
            camera_position: normalize_triple(
                node.resolve(CAMERA_POSITION_PATHS),
                DEFAULT_CAMERA_POSITION,
            ),
        }
    }
}

#[derive(Clone)]
pub struct SpaceCompiler {
    ids: SharedIdGenerator,
}

impl SpaceCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    pub fn compile(&self, node: &Node, options: &CompileOptions) -> Result<String, CompileError> {
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("space"));
        let s = SpaceSettings::from_node(node, &id);
        debug!("space {id}: {:?}", s.name);

        let settings = json!({
            "id": id,
            "name": s.name,
            "gravity": s.gravity,
            "createCamera": s.create_camera,
        });

        let mut w = ScriptWriter::new(options);
        w.comment(format!("Space: {id} ({})", s.name));
        w.open("(function () {");
        w.line(format!("const space = {};", js_json(&settings)?));
        w.line(format!(
            r#"app.updlSpace = space;
app.scene.ambientLight = {ambient};
if (app.systems.rigidbody) {{
    app.systems.rigidbody.gravity.set({gravity});
}}"#,
            ambient = js_color(s.ambient),
            gravity = s.gravity,
        ));
        if s.create_camera {
            w.comment("Camera");
            w.line(format!(
                r#"const camera = new pc.Entity({name});
camera.addComponent("camera", {{ clearColor: {background} }});
camera.setLocalPosition({position});
camera.lookAt(0, 0, 0);
app.root.addChild(camera);
space.camera = camera;"#,
                name = js_str(&format!("{} Camera", s.name)),
                background = js_color(s.background),
                position = s.camera_position,
            ));
        } else {
            w.line(format!(
                r#"app.fire("space:background", {});"#,
                js_color(s.background)
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

    fn compile(node: Node) -> String {
        SpaceCompiler::new(shared(SequentialIdGenerator::new()))
            .compile(&node, &CompileOptions::default())
            .unwrap()
    }

    #[test]
    fn defaults_describe_a_dark_space_with_camera() {
        let out = compile(Node::new("s1", json!({ "name": "Belt" })));
        assert!(out.contains("\"name\": \"Belt\""));
        assert!(out.contains("app.systems.rigidbody.gravity.set(0, -9.81, 0);"));
        assert!(out.contains("camera.setLocalPosition(0, 5, 10);"));
        assert!(out.contains("app.scene.ambientLight = new pc.Color(0.2, 0.2, 0.2);"));
    }

    #[test]
    fn settings_come_from_inputs() {
        let node = Node::new(
            "s2",
            json!({ "inputs": {
                "backgroundColor": "#000000",
                "gravity": [0, 0, 0],
                "cameraPosition": { "x": 1, "y": 2, "z": 3 }
            } }),
        );
        let s = SpaceSettings::from_node(&node, "s2");
        assert_eq!(s.name, "s2");
        assert_eq!(s.background, Rgb::BLACK);
        assert_eq!(s.gravity, Vector3::ZERO);
        assert_eq!(s.camera_position, Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn camera_can_be_disabled() {
        let out = compile(Node::new("s3", json!({ "createCamera": false })));
        assert!(!out.contains("new pc.Entity("));
        assert!(out.contains("app.fire(\"space:background\""));
    }
}
