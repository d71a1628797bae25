//! Typed parameter nodes
//!
//! A parameter node holds exactly one value tag and pushes its value to the
//! parent's backend object on commit.

use core::marker::PhantomData;

use void_math::{Box3f, Vec2f, Vec2i, Vec3f, Vec3i, Vec4f, Vec4i};

use crate::error::{Result, SceneGraphError};
use crate::kind::{IngestSource, NodeKind};
use crate::node::{NodeHandle, NodeState};
use crate::traverse::RenderContext;
use crate::value::{Value, ValueKind};

/// Payload type a [`ParamNode`] can be specialized for
pub trait ParamType: 'static {
    /// Tag the node accepts
    const KIND: ValueKind;

    /// Whether values of this type can come from an external description
    const INGESTIBLE: bool = true;

    fn from_toml(value: &toml::Value) -> Option<Value>;

    fn from_text(text: &str) -> Option<Value>;
}

fn toml_f32(value: &toml::Value) -> Option<f32> {
    match value {
        toml::Value::Float(f) => Some(*f as f32),
        toml::Value::Integer(i) => Some(*i as f32),
        _ => None,
    }
}

fn toml_i32(value: &toml::Value) -> Option<i32> {
    value.as_integer().and_then(|i| i32::try_from(i).ok())
}

fn toml_floats(value: &toml::Value) -> Option<Vec<f32>> {
    value.as_array()?.iter().map(toml_f32).collect()
}

fn toml_ints(value: &toml::Value) -> Option<Vec<i32>> {
    value.as_array()?.iter().map(toml_i32).collect()
}

fn text_floats(text: &str) -> Option<Vec<f32>> {
    text.split_whitespace().map(|t| t.parse().ok()).collect()
}

fn text_ints(text: &str) -> Option<Vec<i32>> {
    text.split_whitespace().map(|t| t.parse().ok()).collect()
}

impl ParamType for f32 {
    const KIND: ValueKind = ValueKind::Float;

    fn from_toml(value: &toml::Value) -> Option<Value> {
        toml_f32(value).map(Value::Float)
    }

    fn from_text(text: &str) -> Option<Value> {
        text.trim().parse().ok().map(Value::Float)
    }
}

impl ParamType for i32 {
    const KIND: ValueKind = ValueKind::Int;

    fn from_toml(value: &toml::Value) -> Option<Value> {
        toml_i32(value).map(Value::Int)
    }

    fn from_text(text: &str) -> Option<Value> {
        text.trim().parse().ok().map(Value::Int)
    }
}

impl ParamType for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn from_toml(value: &toml::Value) -> Option<Value> {
        value.as_bool().map(Value::Bool)
    }

    fn from_text(text: &str) -> Option<Value> {
        match text.trim() {
            "true" | "1" | "on" => Some(Value::Bool(true)),
            "false" | "0" | "off" => Some(Value::Bool(false)),
            _ => None,
        }
    }
}

impl ParamType for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_toml(value: &toml::Value) -> Option<Value> {
        value.as_str().map(Value::from)
    }

    fn from_text(text: &str) -> Option<Value> {
        Some(Value::from(text.trim()))
    }
}

impl ParamType for Box3f {
    const KIND: ValueKind = ValueKind::Box3f;

    fn from_toml(value: &toml::Value) -> Option<Value> {
        let bounds = match value {
            toml::Value::Table(table) => Box3f::new(
                Vec3f::from_slice(&toml_floats(table.get("lower")?)?)?,
                Vec3f::from_slice(&toml_floats(table.get("upper")?)?)?,
            ),
            other => Box3f::from_slice(&toml_floats(other)?)?,
        };
        Some(Value::Box3f(bounds))
    }

    fn from_text(text: &str) -> Option<Value> {
        Box3f::from_slice(&text_floats(text)?).map(Value::Box3f)
    }
}

impl ParamType for NodeHandle {
    const KIND: ValueKind = ValueKind::Object;
    const INGESTIBLE: bool = false;

    fn from_toml(_value: &toml::Value) -> Option<Value> {
        None
    }

    fn from_text(_text: &str) -> Option<Value> {
        None
    }
}

macro_rules! vector_param {
    ($($ty:ident => $from_toml:ident, $from_text:ident);+ $(;)?) => {
        $(
            impl ParamType for $ty {
                const KIND: ValueKind = ValueKind::$ty;

                fn from_toml(value: &toml::Value) -> Option<Value> {
                    $ty::from_slice(&$from_toml(value)?).map(Value::$ty)
                }

                fn from_text(text: &str) -> Option<Value> {
                    $ty::from_slice(&$from_text(text)?).map(Value::$ty)
                }
            }
        )+
    };
}

vector_param!(
    Vec2f => toml_floats, text_floats;
    Vec3f => toml_floats, text_floats;
    Vec4f => toml_floats, text_floats;
    Vec2i => toml_ints, text_ints;
    Vec3i => toml_ints, text_ints;
    Vec4i => toml_ints, text_ints;
);

/// Node holding a single value of type `T`
pub struct ParamNode<T: ParamType> {
    _marker: PhantomData<fn() -> T>,
}

impl<T: ParamType> ParamNode<T> {
    pub fn new() -> Self {
        Self { _marker: PhantomData }
    }

    /// Zero-argument constructor suitable for registration
    pub fn construct() -> Option<Box<dyn NodeKind>> {
        Some(Box::new(Self::new()))
    }
}

impl<T: ParamType> Default for ParamNode<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ParamType> NodeKind for ParamNode<T> {
    fn value_kind(&self) -> Option<ValueKind> {
        Some(T::KIND)
    }

    fn compute_valid(&self, node: &NodeState) -> bool {
        node.value().kind() == T::KIND && node.satisfies_constraints()
    }

    fn post_commit(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        if !node.value().is_valid() {
            return Ok(());
        }
        if let Some(parent) = ctx.parent_name().map(str::to_string) {
            ctx.backend().set_param(&parent, node.name(), node.value());
        }
        Ok(())
    }

    fn ingest(&self, node: &NodeState, source: &IngestSource<'_>) -> Result<Value> {
        if !T::INGESTIBLE {
            return Err(SceneGraphError::unsupported_format(
                node.name(),
                node.type_name(),
                source.format(),
            ));
        }
        let parsed = match source {
            IngestSource::Toml(value) => T::from_toml(value),
            IngestSource::Text(text) => T::from_text(text),
        };
        parsed.ok_or_else(|| {
            SceneGraphError::invalid_value(
                node.name(),
                format!("expected {} in {} input", T::KIND, source.format()),
            )
        })
    }
}
