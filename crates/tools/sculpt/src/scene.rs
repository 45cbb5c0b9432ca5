//! Scene vocabulary: primitives, materials, and export formats

use glam::Vec3;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use silhouette::SilhouetteClass;

/// Mesh primitive created for an asset
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    /// Cone standing on its base; `radius_top` 0 gives a sharp apex
    Cone {
        radius_bottom: f32,
        radius_top: f32,
        depth: f32,
    },
    Sphere {
        radius: f32,
    },
    Cube {
        size: f32,
    },
    Cylinder {
        radius: f32,
        depth: f32,
    },
}

impl Primitive {
    /// Geometry chosen for each silhouette class
    pub fn for_silhouette(class: SilhouetteClass) -> Self {
        match class {
            SilhouetteClass::Triangle => Primitive::Cone {
                radius_bottom: 1.0,
                radius_top: 0.0,
                depth: 2.0,
            },
            SilhouetteClass::Circle => Primitive::Sphere { radius: 1.0 },
            SilhouetteClass::Rectangle => Primitive::Cube { size: 1.0 },
            SilhouetteClass::Complex => Primitive::Cylinder {
                radius: 0.5,
                depth: 1.5,
            },
        }
    }

    /// Engine-side primitive name
    pub fn name(&self) -> &'static str {
        match self {
            Primitive::Cone { .. } => "CONE",
            Primitive::Sphere { .. } => "SPHERE",
            Primitive::Cube { .. } => "CUBE",
            Primitive::Cylinder { .. } => "CYLINDER",
        }
    }

    /// Placement so that upright shapes rest on the ground plane
    pub fn location(&self) -> Vec3 {
        match *self {
            Primitive::Cone { depth, .. } | Primitive::Cylinder { depth, .. } => {
                Vec3::new(0.0, 0.0, depth / 2.0)
            }
            Primitive::Sphere { .. } | Primitive::Cube { .. } => Vec3::ZERO,
        }
    }

    /// Size parameters of the `create_object` command
    pub(crate) fn dimensions(&self) -> Map<String, Value> {
        let value = match *self {
            Primitive::Cone {
                radius_bottom,
                radius_top,
                depth,
            } => json!({
                "radius": radius_bottom,
                "radius1": radius_bottom,
                "radius2": radius_top,
                "height": depth,
            }),
            Primitive::Sphere { radius } => json!({ "radius": radius }),
            Primitive::Cube { size } => json!({ "size": size }),
            Primitive::Cylinder { radius, depth } => json!({
                "radius": radius,
                "height": depth,
            }),
        };

        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Flat surface material
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    /// Linear RGB in [0, 1]
    pub color: [f32; 3],
    pub metallic: f32,
    pub roughness: f32,
}

impl Material {
    /// Neutral gray used when texturing fails
    pub fn neutral_gray() -> Self {
        Self {
            name: "ImageMaterial".to_string(),
            color: [0.8, 0.8, 0.8],
            metallic: 0.0,
            roughness: 0.5,
        }
    }
}

/// Exported artifact format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Usdz,
    Glb,
}

impl ExportFormat {
    /// File extension of the artifact
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Usdz => "usdz",
            ExportFormat::Glb => "glb",
        }
    }

    /// Format name on the wire
    pub fn wire_name(self) -> &'static str {
        match self {
            ExportFormat::Usdz => "USDZ",
            ExportFormat::Glb => "GLB",
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "usdz" => Ok(ExportFormat::Usdz),
            "glb" => Ok(ExportFormat::Glb),
            other => Err(format!("unknown export format `{other}`")),
        }
    }
}
