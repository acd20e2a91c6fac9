use log::debug;
use updl_ids::SharedIdGenerator;
use updl_project::CompileOptions;
use updl_scene::Node;
use updl_structs::{FieldPath, normalize_transform, resolve_color};

use crate::CompileError;
use crate::script::{ScriptWriter, js_color, js_num, js_str};

const LIGHT_TYPE_PATHS: &[FieldPath] = param_paths!("lightType");
const INTENSITY_PATHS: &[FieldPath] = param_paths!("intensity");
const RANGE_PATHS: &[FieldPath] = param_paths!("range");
const CAST_SHADOWS_PATHS: &[FieldPath] = param_paths!("castShadows");

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightType {
    Directional,
    Point,
    Spot,
    Ambient,
}

impl LightType {
    /// Unknown names are `Directional`.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "point" | "omni" => Self::Point,
            "spot" => Self::Spot,
            "ambient" => Self::Ambient,
            _ => Self::Directional,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Directional => "directional",
            Self::Point => "omni",
            Self::Spot => "spot",
            Self::Ambient => "ambient",
        }
    }
}

/// Built once by the handler manager and shared for every light of a build.
#[derive(Clone)]
pub struct LightCompiler {
    ids: SharedIdGenerator,
}

impl LightCompiler {
    pub fn new(ids: SharedIdGenerator) -> Self {
        Self { ids }
    }

    pub fn compile(&self, node: &Node, options: &CompileOptions) -> Result<String, CompileError> {
        let id = node
            .id()
            .map(str::to_string)
            .unwrap_or_else(|| self.ids.next_id("light"));
        let ty = node
            .text(LIGHT_TYPE_PATHS)
            .map(|t| LightType::parse(&t))
            .unwrap_or(LightType::Directional);
        let color = resolve_color(&node.data);
        let intensity = node
            .number(INTENSITY_PATHS)
            .filter(|i| *i >= 0.0)
            .unwrap_or(1.0);
        debug!("light {id}: {}", ty.as_str());

        let mut w = ScriptWriter::new(options);
        w.comment(format!("Light: {id} ({})", ty.as_str()));
        w.open("(function () {");
        if ty == LightType::Ambient {
            w.line(format!(
                "app.scene.ambientLight = {};",
                js_color(color.scaled(intensity))
            ));
            w.close("})();");
            return Ok(w.finish());
        }

        let range = node.number(RANGE_PATHS).filter(|r| *r > 0.0).unwrap_or(10.0);
        let shadows = node.flag(CAST_SHADOWS_PATHS).unwrap_or(false);
        let transform = normalize_transform(node.field("transform"));
        w.line(format!(
            r#"const light = new pc.Entity({id});
light.addComponent("light", {{
    type: {ty},
    color: {color},
    intensity: {intensity},
    range: {range},
    castShadows: {shadows}
}});
light.setLocalPosition({position});
light.setLocalEulerAngles({rotation});
app.root.addChild(light);"#,
            id = js_str(&id),
            ty = js_str(ty.as_str()),
            color = js_color(color),
            intensity = js_num(intensity),
            range = js_num(range),
            position = transform.position,
            rotation = transform.rotation,
        ));
        w.close("})();");
        Ok(w.finish())
    }
}
