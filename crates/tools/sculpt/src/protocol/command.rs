//! Command and response messages exchanged with the scene engine

use crate::animation::AnimationClip;
use crate::error::ProtocolError;
use crate::scene::{ExportFormat, Material, Primitive};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

/// Kind of request, serialized as the message `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    CreateObject,
    ApplyMaterial,
    ApplyTexture,
    AddAnimation,
    Export,
    DeleteObject,
    #[serde(rename = "execute_code")]
    ExecuteScript,
}

impl CommandKind {
    /// Wire name of the kind
    pub fn as_str(self) -> &'static str {
        match self {
            CommandKind::CreateObject => "create_object",
            CommandKind::ApplyMaterial => "apply_material",
            CommandKind::ApplyTexture => "apply_texture",
            CommandKind::AddAnimation => "add_animation",
            CommandKind::Export => "export",
            CommandKind::DeleteObject => "delete_object",
            CommandKind::ExecuteScript => "execute_code",
        }
    }
}

impl std::fmt::Display for CommandKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single request to the engine
///
/// Encoded as `{"type": <kind>, "params": {...}}`. Commands are moved into the
/// client and consumed by one round trip.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
pub struct Command {
    #[serde(rename = "type")]
    kind: CommandKind,
    #[serde(default)]
    params: Map<String, Value>,
}

impl Command {
    pub fn new(kind: CommandKind, params: Map<String, Value>) -> Self {
        Self { kind, params }
    }

    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Name of the object the command targets, when it has one
    pub fn object_name(&self) -> Option<&str> {
        self.params
            .get("object_name")
            .or_else(|| self.params.get("name"))
            .and_then(Value::as_str)
    }

    /// Create a named mesh primitive
    pub fn create_object(name: &str, primitive: &Primitive) -> Self {
        let mut params = object_params(json!({
            "name": name,
            "object_type": "MESH",
            "primitive_type": primitive.name(),
            "location": primitive.location().to_array(),
        }));
        params.extend(primitive.dimensions());
        Self::new(CommandKind::CreateObject, params)
    }

    /// Assign a flat material to an object
    pub fn apply_material(object_name: &str, material: &Material) -> Self {
        Self::new(
            CommandKind::ApplyMaterial,
            object_params(json!({
                "object_name": object_name,
                "material_name": material.name,
                "color": material.color,
                "metallic": material.metallic,
                "roughness": material.roughness,
            })),
        )
    }

    /// UV-map an image texture onto an object
    pub fn apply_texture(object_name: &str, texture_path: &Path) -> Self {
        Self::new(
            CommandKind::ApplyTexture,
            object_params(json!({
                "object_name": object_name,
                "texture_path": texture_path.to_string_lossy(),
                "mapping": "UV",
                "wrap": "REPEAT",
            })),
        )
    }

    /// Attach a looping keyframe animation to an object
    pub fn add_animation(object_name: &str, clip: &AnimationClip) -> Self {
        Self::new(
            CommandKind::AddAnimation,
            object_params(json!({
                "object_name": object_name,
                "animation_type": clip.kind.as_str(),
                "channels": clip.channels.iter().map(|c| c.as_str()).collect::<Vec<_>>(),
                "keyframes": clip.keyframes,
                "frame_start": 0,
                "frame_end": clip.frame_end(),
                "fps": clip.fps(),
                "interpolation": "LINEAR",
                "loop": true,
            })),
        )
    }

    /// Export an object to a file
    pub fn export(object_name: &str, request: &ExportRequest) -> Self {
        Self::new(
            CommandKind::Export,
            object_params(json!({
                "object_name": object_name,
                "format": request.format.wire_name(),
                "filepath": request.path.to_string_lossy(),
                "embed_textures": request.embed_textures,
                "optimize_mesh": request.optimize_mesh,
                "include_animations": request.include_animations,
            })),
        )
    }

    /// Remove an object from the scene
    pub fn delete_object(object_name: &str) -> Self {
        Self::new(
            CommandKind::DeleteObject,
            object_params(json!({ "object_name": object_name })),
        )
    }

    /// Run a raw script inside the engine
    pub fn execute_script(code: impl Into<String>) -> Self {
        Self::new(
            CommandKind::ExecuteScript,
            object_params(json!({ "code": code.into() })),
        )
    }
}

fn object_params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// Export target and settings
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    pub format: ExportFormat,
    pub path: PathBuf,
    pub embed_textures: bool,
    pub optimize_mesh: bool,
    pub include_animations: bool,
}

impl ExportRequest {
    /// Request with textures embedded, mesh optimization, and animations
    pub fn new(format: ExportFormat, path: impl Into<PathBuf>) -> Self {
        Self {
            format,
            path: path.into(),
            embed_textures: true,
            optimize_mesh: true,
            include_animations: true,
        }
    }
}

/// Outcome reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Success,
    Failure,
}

/// Decoded engine reply
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status: ResponseStatus,
    /// The `result` field, if any
    pub payload: Option<Value>,
    /// The `message` or `error` field, if any
    pub error: Option<String>,
}

impl Response {
    pub fn success(payload: Option<Value>) -> Self {
        Self {
            status: ResponseStatus::Success,
            payload,
            error: None,
        }
    }

    pub fn failure(detail: impl Into<String>) -> Self {
        Self {
            status: ResponseStatus::Failure,
            payload: None,
            error: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Decode a reply object; only `status` is required
    pub fn from_value(value: Value) -> Result<Self, String> {
        let Value::Object(mut fields) = value else {
            return Err("response is not a JSON object".to_string());
        };

        let status = match fields.get("status") {
            Some(Value::String(s)) if s == "success" => ResponseStatus::Success,
            Some(Value::String(_)) => ResponseStatus::Failure,
            Some(other) => return Err(format!("`status` is not a string: {other}")),
            None => return Err("response has no `status` field".to_string()),
        };

        let error = ["message", "error"]
            .iter()
            .find_map(|key| fields.get(*key))
            .map(|detail| match detail {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            });

        Ok(Self {
            status,
            payload: fields.remove("result"),
            error,
        })
    }

    /// Encode as a wire reply
    pub fn to_value(&self) -> Value {
        let mut fields = Map::new();
        let status = match self.status {
            ResponseStatus::Success => "success",
            ResponseStatus::Failure => "error",
        };
        fields.insert("status".into(), status.into());
        if let Some(payload) = &self.payload {
            fields.insert("result".into(), payload.clone());
        }
        if let Some(error) = &self.error {
            fields.insert("message".into(), error.clone().into());
        }
        Value::Object(fields)
    }

    /// Human-readable explanation of a failure
    pub fn detail(&self) -> String {
        match (&self.error, &self.payload) {
            (Some(error), _) => error.clone(),
            (None, Some(payload)) => payload.to_string(),
            (None, None) => "engine reported failure".to_string(),
        }
    }

    /// Turn a failure status into a command error
    pub fn into_success(self, kind: CommandKind) -> Result<Self, ProtocolError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProtocolError::Command {
                kind,
                detail: self.detail(),
            })
        }
    }
}
