//! Value - typed parameter payloads
//!
//! Values are the data that flows through the scene graph. The set of
//! payload types is closed: every tag maps onto exactly one backend type
//! code, and adding a tag is a compile-time checked change.

use core::fmt;
use std::sync::Arc;

use void_math::{Box3f, Vec2f, Vec2i, Vec3f, Vec3i, Vec4f, Vec4i};

use crate::node::NodeHandle;

/// Tag of a [`Value`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// No value; never valid
    Empty,
    Float,
    Vec2f,
    Vec3f,
    Vec4f,
    Int,
    Vec2i,
    Vec3i,
    Vec4i,
    Bool,
    Box3f,
    String,
    /// Opaque data buffer reference
    Data,
    /// Reference to another scene-graph node
    Object,
    /// Opaque texture reference
    Texture,
}

impl ValueKind {
    /// Every tag, in declaration order
    pub const ALL: [ValueKind; 15] = [
        ValueKind::Empty,
        ValueKind::Float,
        ValueKind::Vec2f,
        ValueKind::Vec3f,
        ValueKind::Vec4f,
        ValueKind::Int,
        ValueKind::Vec2i,
        ValueKind::Vec3i,
        ValueKind::Vec4i,
        ValueKind::Bool,
        ValueKind::Box3f,
        ValueKind::String,
        ValueKind::Data,
        ValueKind::Object,
        ValueKind::Texture,
    ];

    /// Stable lowercase name, also used as the parameter node type name
    pub const fn name(self) -> &'static str {
        match self {
            ValueKind::Empty => "empty",
            ValueKind::Float => "float",
            ValueKind::Vec2f => "vec2f",
            ValueKind::Vec3f => "vec3f",
            ValueKind::Vec4f => "vec4f",
            ValueKind::Int => "int",
            ValueKind::Vec2i => "vec2i",
            ValueKind::Vec3i => "vec3i",
            ValueKind::Vec4i => "vec4i",
            ValueKind::Bool => "bool",
            ValueKind::Box3f => "box3f",
            ValueKind::String => "string",
            ValueKind::Data => "data",
            ValueKind::Object => "object",
            ValueKind::Texture => "texture",
        }
    }

    /// Backend-facing type code for this tag
    pub const fn backend_type(self) -> BackendType {
        match self {
            ValueKind::Empty => BackendType::Unknown,
            ValueKind::Float => BackendType::Float,
            ValueKind::Vec2f => BackendType::Float2,
            ValueKind::Vec3f => BackendType::Float3,
            ValueKind::Vec4f => BackendType::Float4,
            ValueKind::Int => BackendType::Int,
            ValueKind::Vec2i => BackendType::Int2,
            ValueKind::Vec3i => BackendType::Int3,
            ValueKind::Vec4i => BackendType::Int4,
            ValueKind::Bool => BackendType::Bool,
            ValueKind::Box3f => BackendType::Box3f,
            ValueKind::String => BackendType::String,
            ValueKind::Data => BackendType::Data,
            ValueKind::Object => BackendType::Object,
            ValueKind::Texture => BackendType::Texture,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Type codes understood by the rendering backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum BackendType {
    Unknown = 0,
    Data = 100,
    Object = 1000,
    Texture = 1005,
    String = 1500,
    Bool = 2500,
    Int = 4000,
    Int2 = 4001,
    Int3 = 4002,
    Int4 = 4003,
    Float = 6000,
    Float2 = 6001,
    Float3 = 6002,
    Float4 = 6003,
    Box3f = 11000,
}

impl BackendType {
    #[inline]
    pub const fn code(self) -> u32 {
        self as u32
    }
}

/// Opaque block of typed elements handed to the backend as-is
#[derive(Clone, PartialEq)]
pub struct DataBuffer {
    element: BackendType,
    count: usize,
    bytes: Vec<u8>,
}

impl DataBuffer {
    /// Wrap a slice of plain-old-data elements
    pub fn from_slice<T: bytemuck::Pod>(element: BackendType, items: &[T]) -> Self {
        Self {
            element,
            count: items.len(),
            bytes: bytemuck::cast_slice(items).to_vec(),
        }
    }

    pub fn element(&self) -> BackendType {
        self.element
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for DataBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataBuffer")
            .field("element", &self.element)
            .field("count", &self.count)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// Opaque, already decoded texture
#[derive(Clone, PartialEq)]
pub struct Texture2D {
    size: Vec2i,
    channels: u8,
    texels: Vec<u8>,
}

impl Texture2D {
    /// `None` when `texels` does not hold exactly `size.x * size.y * channels` bytes
    pub fn new(size: Vec2i, channels: u8, texels: Vec<u8>) -> Option<Self> {
        let expected = size.area()?.checked_mul(channels as usize)?;
        if texels.len() != expected {
            return None;
        }
        Some(Self { size, channels, texels })
    }

    pub fn size(&self) -> Vec2i {
        self.size
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn texels(&self) -> &[u8] {
        &self.texels
    }
}

impl fmt::Debug for Texture2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Texture2D({}x{}x{})", self.size.x, self.size.y, self.channels)
    }
}

/// Parameter value held by a node
#[derive(Clone, Debug, Default)]
pub enum Value {
    #[default]
    Empty,
    Float(f32),
    Vec2f(Vec2f),
    Vec3f(Vec3f),
    Vec4f(Vec4f),
    Int(i32),
    Vec2i(Vec2i),
    Vec3i(Vec3i),
    Vec4i(Vec4i),
    Bool(bool),
    Box3f(Box3f),
    String(String),
    Data(Arc<DataBuffer>),
    Object(NodeHandle),
    Texture(Arc<Texture2D>),
}

impl Value {
    /// Tag of the active payload
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Empty => ValueKind::Empty,
            Value::Float(_) => ValueKind::Float,
            Value::Vec2f(_) => ValueKind::Vec2f,
            Value::Vec3f(_) => ValueKind::Vec3f,
            Value::Vec4f(_) => ValueKind::Vec4f,
            Value::Int(_) => ValueKind::Int,
            Value::Vec2i(_) => ValueKind::Vec2i,
            Value::Vec3i(_) => ValueKind::Vec3i,
            Value::Vec4i(_) => ValueKind::Vec4i,
            Value::Bool(_) => ValueKind::Bool,
            Value::Box3f(_) => ValueKind::Box3f,
            Value::String(_) => ValueKind::String,
            Value::Data(_) => ValueKind::Data,
            Value::Object(_) => ValueKind::Object,
            Value::Texture(_) => ValueKind::Texture,
        }
    }

    /// False only for [`Value::Empty`]
    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self, Value::Empty)
    }

    #[inline]
    pub fn backend_type(&self) -> BackendType {
        self.kind().backend_type()
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_vec3f(&self) -> Option<Vec3f> {
        match self {
            Value::Vec3f(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&NodeHandle> {
        match self {
            Value::Object(node) => Some(node),
            _ => None,
        }
    }

    /// Whether `min <= self <= max` component-wise.
    ///
    /// `None` when the three values do not share a numeric tag.
    pub fn within(&self, min: &Value, max: &Value) -> Option<bool> {
        fn check<T: PartialOrd>(v: T, lo: T, hi: T) -> bool {
            lo <= v && v <= hi
        }
        let result = match (self, min, max) {
            (Value::Float(v), Value::Float(lo), Value::Float(hi)) => check(*v, *lo, *hi),
            (Value::Int(v), Value::Int(lo), Value::Int(hi)) => check(*v, *lo, *hi),
            (Value::Vec2f(v), Value::Vec2f(lo), Value::Vec2f(hi)) => lo.all_le(*v) && v.all_le(*hi),
            (Value::Vec3f(v), Value::Vec3f(lo), Value::Vec3f(hi)) => lo.all_le(*v) && v.all_le(*hi),
            (Value::Vec4f(v), Value::Vec4f(lo), Value::Vec4f(hi)) => lo.all_le(*v) && v.all_le(*hi),
            (Value::Vec2i(v), Value::Vec2i(lo), Value::Vec2i(hi)) => lo.all_le(*v) && v.all_le(*hi),
            (Value::Vec3i(v), Value::Vec3i(lo), Value::Vec3i(hi)) => lo.all_le(*v) && v.all_le(*hi),
            (Value::Vec4i(v), Value::Vec4i(lo), Value::Vec4i(hi)) => lo.all_le(*v) && v.all_le(*hi),
            _ => return None,
        };
        Some(result)
    }
}

impl PartialEq for Value {
    /// Payload equality; reference tags compare by identity
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Vec2f(a), Value::Vec2f(b)) => a == b,
            (Value::Vec3f(a), Value::Vec3f(b)) => a == b,
            (Value::Vec4f(a), Value::Vec4f(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Vec2i(a), Value::Vec2i(b)) => a == b,
            (Value::Vec3i(a), Value::Vec3i(b)) => a == b,
            (Value::Vec4i(a), Value::Vec4i(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Box3f(a), Value::Box3f(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Data(a), Value::Data(b)) => Arc::ptr_eq(a, b),
            (Value::Object(a), Value::Object(b)) => a.ptr_eq(b),
            (Value::Texture(a), Value::Texture(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => f.write_str("<empty>"),
            Value::Float(v) => write!(f, "{}", v),
            Value::Vec2f(v) => write!(f, "{}", v),
            Value::Vec3f(v) => write!(f, "{}", v),
            Value::Vec4f(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Vec2i(v) => write!(f, "{}", v),
            Value::Vec3i(v) => write!(f, "{}", v),
            Value::Vec4i(v) => write!(f, "{}", v),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Box3f(b) => write!(f, "[{} .. {}]", b.lower, b.upper),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Data(d) => write!(f, "<data {:?} x{}>", d.element(), d.len()),
            Value::Object(node) => write!(f, "<object {}>", node.name()),
            Value::Texture(t) => write!(f, "<{:?}>", t),
        }
    }
}

macro_rules! impl_value_from {
    ($($ty:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$ty> for Value {
                #[inline]
                fn from(v: $ty) -> Self {
                    Value::$variant(v)
                }
            }
        )+
    };
}

impl_value_from!(
    f32 => Float,
    Vec2f => Vec2f,
    Vec3f => Vec3f,
    Vec4f => Vec4f,
    i32 => Int,
    Vec2i => Vec2i,
    Vec3i => Vec3i,
    Vec4i => Vec4i,
    bool => Bool,
    Box3f => Box3f,
    String => String,
    Arc<DataBuffer> => Data,
    NodeHandle => Object,
    Arc<Texture2D> => Texture,
);

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_first_and_invalid() {
        assert_eq!(ValueKind::ALL[0], ValueKind::Empty);
        assert!(!Value::Empty.is_valid());
        assert!(!Value::default().is_valid());
        assert!(Value::Float(0.0).is_valid());
        assert!(Value::from("").is_valid());
    }

    #[test]
    fn test_kind_follows_payload() {
        assert_eq!(Value::from(1.5f32).kind(), ValueKind::Float);
        assert_eq!(Value::from(7).kind(), ValueKind::Int);
        assert_eq!(Value::from(Vec3i::new(1, 2, 3)).kind(), ValueKind::Vec3i);
        assert_eq!(Value::from(Box3f::EMPTY).kind(), ValueKind::Box3f);
        assert_eq!(Value::from("x").kind(), ValueKind::String);
    }

    #[test]
    fn test_no_implicit_conversions() {
        let v = Value::Int(3);
        assert_eq!(v.as_int(), Some(3));
        assert_eq!(v.as_float(), None);
        assert_eq!(Value::Float(3.0).as_int(), None);
        assert_ne!(Value::Int(1), Value::Float(1.0));
    }

    #[test]
    fn test_backend_codes_are_distinct() {
        let mut codes: Vec<u32> = ValueKind::ALL.iter().map(|k| k.backend_type().code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), ValueKind::ALL.len());
        assert_eq!(Value::Vec3f(Vec3f::ZERO).backend_type(), BackendType::Float3);
        assert_eq!(Value::Empty.backend_type(), BackendType::Unknown);
    }

    #[test]
    fn test_within_range() {
        let lo = Value::Float(0.0);
        let hi = Value::Float(1.0);
        assert_eq!(Value::Float(0.5).within(&lo, &hi), Some(true));
        assert_eq!(Value::Float(1.5).within(&lo, &hi), Some(false));
        assert_eq!(Value::Int(0).within(&lo, &hi), None);

        let lo = Value::Vec2i(Vec2i::splat(0));
        let hi = Value::Vec2i(Vec2i::splat(4));
        assert_eq!(Value::Vec2i(Vec2i::new(4, 0)).within(&lo, &hi), Some(true));
        assert_eq!(Value::Vec2i(Vec2i::new(5, 0)).within(&lo, &hi), Some(false));
        assert_eq!(Value::from("a").within(&lo, &hi), None);
    }

    #[test]
    fn test_data_buffer_and_texture() {
        let data = DataBuffer::from_slice(BackendType::Float3, &[0.0f32, 1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(data.len(), 6);
        assert_eq!(data.as_bytes().len(), 24);

        let shared = Arc::new(data);
        assert_eq!(Value::Data(shared.clone()), Value::Data(shared.clone()));
        assert_ne!(Value::Data(shared.clone()), Value::Data(Arc::new((*shared).clone())));

        assert!(Texture2D::new(Vec2i::new(2, 2), 4, vec![0; 16]).is_some());
        assert!(Texture2D::new(Vec2i::new(2, 2), 4, vec![0; 15]).is_none());
    }

    #[test]
    fn test_huge_texture_is_rejected() {
        assert!(Texture2D::new(Vec2i::new(i32::MAX, i32::MAX), 255, vec![]).is_none());
    }
}
