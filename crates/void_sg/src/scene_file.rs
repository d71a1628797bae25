//! TOML scene descriptions
//!
//! ```toml
//! [node]
//! name = "world"
//! type = "Node"
//!
//! [[node.children]]
//! name = "sphere"
//! type = "Renderable"
//! register = true
//!
//! [[node.children.children]]
//! name = "radius"
//! type = "float"
//! value = 1.5
//! required = true
//! flags = ["valid_min_max"]
//! min = 0.0
//! max = 10.0
//! ```
//!
//! A child written as `{ ref = "sphere" }` attaches the node registered
//! under that name instead of creating a new one. An `object` parameter
//! with a `ref` takes the referenced node as its value.

use std::path::Path;

use serde::Deserialize;

use crate::directory::NodeDirectory;
use crate::error::{Result, SceneGraphError};
use crate::flags::NodeFlags;
use crate::kind::IngestSource;
use crate::node::{Node, NodeHandle};
use crate::registry::NodeRegistry;
use crate::value::{Value, ValueKind};
use void_math::{Vec2f, Vec2i, Vec3f, Vec3i, Vec4f, Vec4i};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDef {
    node: NodeDef,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NodeDef {
    name: Option<String>,
    #[serde(rename = "type")]
    type_name: Option<String>,
    value: Option<toml::Value>,
    required: bool,
    flags: Vec<String>,
    min: Option<toml::Value>,
    max: Option<toml::Value>,
    whitelist: Vec<toml::Value>,
    blacklist: Vec<toml::Value>,
    register: bool,
    #[serde(rename = "ref")]
    reference: Option<String>,
    children: Vec<NodeDef>,
}

impl NodeDef {
    /// Target of a bare `{ ref = "..." }` entry; typed entries build a node instead
    fn attached_reference(&self) -> Option<&str> {
        match (&self.reference, &self.name, &self.type_name) {
            (Some(target), None, None) => Some(target.as_str()),
            _ => None,
        }
    }
}

/// Builds node trees from TOML through a [`NodeRegistry`]
pub struct SceneLoader<'a> {
    registry: &'a NodeRegistry,
    directory: Option<&'a NodeDirectory>,
}

impl<'a> SceneLoader<'a> {
    pub fn new(registry: &'a NodeRegistry) -> Self {
        Self { registry, directory: None }
    }

    /// Directory used for `register = true` and `ref` entries
    pub fn with_directory(mut self, directory: &'a NodeDirectory) -> Self {
        self.directory = Some(directory);
        self
    }

    pub fn load_file(&self, path: impl AsRef<Path>) -> Result<NodeHandle> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let root = self.load_str(&content)?;
        log::info!("Loaded scene '{}' from {}", root.name(), path.display());
        Ok(root)
    }

    pub fn load_str(&self, source: &str) -> Result<NodeHandle> {
        let scene: SceneDef =
            toml::from_str(source).map_err(|e| SceneGraphError::SceneFile(e.to_string()))?;
        if scene.node.attached_reference().is_some() {
            return Err(SceneGraphError::SceneFile("the root node cannot be a reference".into()));
        }
        self.build(&scene.node)
    }

    fn build(&self, def: &NodeDef) -> Result<NodeHandle> {
        let name = def
            .name
            .as_deref()
            .ok_or_else(|| SceneGraphError::SceneFile("node without a name".into()))?;
        let type_name = def
            .type_name
            .as_deref()
            .ok_or_else(|| SceneGraphError::SceneFile(format!("node '{}' has no type", name)))?;

        let mut flags = if def.required { NodeFlags::REQUIRED } else { NodeFlags::NONE };
        for flag in &def.flags {
            flags |= NodeFlags::from_name(flag).ok_or_else(|| {
                SceneGraphError::SceneFile(format!("node '{}': unknown flag '{}'", name, flag))
            })?;
        }

        let handle = self.registry.create_node(name, type_name, Value::Empty, flags)?;
        {
            let mut node = handle.write();
            self.apply_value(&mut node, def)?;
            self.apply_constraints(&mut node, def)?;
        }

        for child_def in &def.children {
            let child = match child_def.attached_reference() {
                Some(target) => self.lookup(target)?,
                None => self.build(child_def)?,
            };
            handle.add_child(child)?;
        }

        if def.register {
            self.directory()?.register(name, &handle);
        }
        Ok(handle)
    }

    fn apply_value(&self, node: &mut Node, def: &NodeDef) -> Result<()> {
        match (&def.value, &def.reference) {
            (Some(_), Some(_)) => Err(SceneGraphError::SceneFile(format!(
                "node '{}' sets both value and ref",
                node.name()
            ))),
            (Some(value), None) => {
                let value = convert(node, value)?;
                node.set_value(value)
            }
            (None, Some(target)) => {
                let target = self.lookup(target)?;
                node.set_value(Value::Object(target))
            }
            (None, None) => Ok(()),
        }
    }

    fn apply_constraints(&self, node: &mut Node, def: &NodeDef) -> Result<()> {
        match (&def.min, &def.max) {
            (Some(min), Some(max)) => {
                let min = convert(node, min)?;
                let max = convert(node, max)?;
                node.set_min_max(min, max);
            }
            (None, None) => {}
            _ => {
                return Err(SceneGraphError::SceneFile(format!(
                    "node '{}' needs both min and max",
                    node.name()
                )))
            }
        }

        if !def.whitelist.is_empty() {
            let values = def.whitelist.iter().map(|v| convert(node, v)).collect::<Result<_>>()?;
            node.set_whitelist(values);
        }
        if !def.blacklist.is_empty() {
            let values = def.blacklist.iter().map(|v| convert(node, v)).collect::<Result<_>>()?;
            node.set_blacklist(values);
        }
        Ok(())
    }

    fn directory(&self) -> Result<&'a NodeDirectory> {
        self.directory
            .ok_or_else(|| SceneGraphError::SceneFile("scene uses the node directory but none was given".into()))
    }

    fn lookup(&self, name: &str) -> Result<NodeHandle> {
        self.directory()?
            .find(name)
            .ok_or_else(|| SceneGraphError::SceneFile(format!("unresolved reference '{}'", name)))
    }
}

/// Convert a TOML value for `node`: through its kind when the kind ingests
/// TOML, otherwise by inferring the tag from the TOML shape
fn convert(node: &Node, value: &toml::Value) -> Result<Value> {
    match node.kind().ingest(node.state(), &IngestSource::Toml(value)) {
        Err(SceneGraphError::UnsupportedFormat { .. }) if node.kind().value_kind().is_none() => {
            infer_value(value).ok_or_else(|| {
                SceneGraphError::invalid_value(node.name(), format!("cannot infer a value from {}", value))
            })
        }
        other => other,
    }
}

fn infer_value(value: &toml::Value) -> Option<Value> {
    match value {
        toml::Value::Float(f) => Some(Value::Float(*f as f32)),
        toml::Value::Integer(i) => i32::try_from(*i).ok().map(Value::Int),
        toml::Value::Boolean(b) => Some(Value::Bool(*b)),
        toml::Value::String(s) => Some(Value::from(s.as_str())),
        toml::Value::Array(items) => {
            let all_ints = items.iter().all(toml::Value::is_integer);
            let kind = match (items.len(), all_ints) {
                (2, true) => ValueKind::Vec2i,
                (3, true) => ValueKind::Vec3i,
                (4, true) => ValueKind::Vec4i,
                (2, false) => ValueKind::Vec2f,
                (3, false) => ValueKind::Vec3f,
                (4, false) => ValueKind::Vec4f,
                _ => return None,
            };
            if all_ints {
                let ints: Vec<i32> = items
                    .iter()
                    .map(|v| v.as_integer().and_then(|i| i32::try_from(i).ok()))
                    .collect::<Option<_>>()?;
                match kind {
                    ValueKind::Vec2i => Vec2i::from_slice(&ints).map(Value::Vec2i),
                    ValueKind::Vec3i => Vec3i::from_slice(&ints).map(Value::Vec3i),
                    _ => Vec4i::from_slice(&ints).map(Value::Vec4i),
                }
            } else {
                let floats: Vec<f32> = items
                    .iter()
                    .map(|v| match v {
                        toml::Value::Float(f) => Some(*f as f32),
                        toml::Value::Integer(i) => Some(*i as f32),
                        _ => None,
                    })
                    .collect::<Option<_>>()?;
                match kind {
                    ValueKind::Vec2f => Vec2f::from_slice(&floats).map(Value::Vec2f),
                    ValueKind::Vec3f => Vec3f::from_slice(&floats).map(Value::Vec3f),
                    _ => Vec4f::from_slice(&floats).map(Value::Vec4f),
                }
            }
        }
        _ => None,
    }
}
