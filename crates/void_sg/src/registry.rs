//! Node registry - late-bound node creation by type name
//!
//! The registry maps a type name onto a constructor. Names it has not seen
//! are resolved through an injected [`TypeResolver`] under the symbol
//! `<prefix><type>`; a successful resolution is cached for the lifetime of
//! the registry, a failed one leaves the cache untouched.

use core::fmt;
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use void_math::{Box3f, Vec2f, Vec2i, Vec3f, Vec3i, Vec4f, Vec4i};

use crate::config::SceneGraphConfig;
use crate::error::{Result, SceneGraphError};
use crate::flags::NodeFlags;
use crate::kind::{BaseNode, NodeKind, RenderableNode};
use crate::node::{Node, NodeHandle};
use crate::param::ParamNode;
use crate::value::Value;

/// Symbol prefix used when no other prefix is configured
pub const DEFAULT_SYMBOL_PREFIX: &str = "void_create_sg_node__";

/// Zero-argument node constructor.
///
/// Returns `None` only when the constructor is broken; the registry reports
/// that as an invariant violation.
#[derive(Clone)]
pub struct NodeConstructor(Arc<dyn Fn() -> Option<Box<dyn NodeKind>> + Send + Sync>);

impl NodeConstructor {
    pub fn new(f: impl Fn() -> Option<Box<dyn NodeKind>> + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn construct(&self) -> Option<Box<dyn NodeKind>> {
        (self.0)()
    }
}

impl fmt::Debug for NodeConstructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NodeConstructor")
    }
}

/// Resolves a symbol name to a node constructor
pub trait TypeResolver: Send + Sync {
    fn resolve(&self, symbol: &str) -> Option<NodeConstructor>;
}

/// In-memory resolver backed by a symbol table
#[derive(Debug, Default, Clone)]
pub struct StaticResolver {
    symbols: HashMap<String, NodeConstructor>,
}

impl StaticResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver knowing every built-in node type under `prefix`
    pub fn with_builtins(prefix: &str) -> Self {
        let mut resolver = Self::new();
        for (type_name, constructor) in builtin_types() {
            resolver.insert(format!("{}{}", prefix, type_name), constructor);
        }
        resolver
    }

    pub fn insert(&mut self, symbol: impl Into<String>, constructor: NodeConstructor) -> &mut Self {
        self.symbols.insert(symbol.into(), constructor);
        self
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

impl TypeResolver for StaticResolver {
    fn resolve(&self, symbol: &str) -> Option<NodeConstructor> {
        self.symbols.get(symbol).cloned()
    }
}

/// Tries several resolvers in order, first hit wins
#[derive(Default)]
pub struct ChainResolver {
    resolvers: Vec<Box<dyn TypeResolver>>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolvers.push(Box::new(resolver));
        self
    }

    pub fn push(&mut self, resolver: Box<dyn TypeResolver>) {
        self.resolvers.push(resolver);
    }
}

impl TypeResolver for ChainResolver {
    fn resolve(&self, symbol: &str) -> Option<NodeConstructor> {
        self.resolvers.iter().find_map(|r| r.resolve(symbol))
    }
}

/// Built-in node types as `(type name, constructor)` pairs
pub fn builtin_types() -> Vec<(&'static str, NodeConstructor)> {
    fn ctor(f: fn() -> Option<Box<dyn NodeKind>>) -> NodeConstructor {
        NodeConstructor::new(f)
    }

    vec![
        ("Node", ctor(|| Some(Box::new(BaseNode)))),
        ("Renderable", ctor(|| Some(Box::new(RenderableNode)))),
        ("float", ctor(ParamNode::<f32>::construct)),
        ("vec2f", ctor(ParamNode::<Vec2f>::construct)),
        ("vec3f", ctor(ParamNode::<Vec3f>::construct)),
        ("vec4f", ctor(ParamNode::<Vec4f>::construct)),
        ("int", ctor(ParamNode::<i32>::construct)),
        ("vec2i", ctor(ParamNode::<Vec2i>::construct)),
        ("vec3i", ctor(ParamNode::<Vec3i>::construct)),
        ("vec4i", ctor(ParamNode::<Vec4i>::construct)),
        ("bool", ctor(ParamNode::<bool>::construct)),
        ("box3f", ctor(ParamNode::<Box3f>::construct)),
        ("string", ctor(ParamNode::<String>::construct)),
        ("object", ctor(ParamNode::<NodeHandle>::construct)),
    ]
}

/// Factory creating nodes by type name.
///
/// Shared across threads; lookup and insertion happen under one lock so a
/// type is resolved at most once.
pub struct NodeRegistry {
    constructors: Mutex<HashMap<String, NodeConstructor>>,
    resolver: Box<dyn TypeResolver>,
    symbol_prefix: String,
}

impl NodeRegistry {
    /// Registry resolving unknown types through `resolver` with the default prefix
    pub fn new(resolver: impl TypeResolver + 'static) -> Self {
        Self::with_prefix(resolver, DEFAULT_SYMBOL_PREFIX)
    }

    pub fn with_prefix(resolver: impl TypeResolver + 'static, prefix: impl Into<String>) -> Self {
        Self {
            constructors: Mutex::new(HashMap::new()),
            resolver: Box::new(resolver),
            symbol_prefix: prefix.into(),
        }
    }

    /// Registry resolving built-in types only
    pub fn with_builtins() -> Self {
        Self::new(StaticResolver::with_builtins(DEFAULT_SYMBOL_PREFIX))
    }

    /// Registry for a configuration: built-ins first, then the configured libraries
    pub fn from_config(config: &SceneGraphConfig) -> Result<Self> {
        let prefix = config.symbol_prefix.as_str();
        #[allow(unused_mut)]
        let mut chain = ChainResolver::new().with(StaticResolver::with_builtins(prefix));

        #[cfg(feature = "dylib")]
        if !config.plugin_libraries.is_empty() {
            let mut libraries = crate::library::LibraryResolver::new();
            for path in &config.plugin_libraries {
                libraries.load(path)?;
            }
            chain.push(Box::new(libraries));
        }

        #[cfg(not(feature = "dylib"))]
        if !config.plugin_libraries.is_empty() {
            log::warn!(
                "ignoring {} plugin libraries: built without the `dylib` feature",
                config.plugin_libraries.len()
            );
        }

        Ok(Self::with_prefix(chain, prefix))
    }

    pub fn symbol_prefix(&self) -> &str {
        &self.symbol_prefix
    }

    /// Symbol the resolver is asked for when `type_name` is not cached
    pub fn symbol_name(&self, type_name: &str) -> String {
        format!("{}{}", self.symbol_prefix, type_name)
    }

    /// Bind `type_name` directly, bypassing the resolver
    pub fn register(&self, type_name: impl Into<String>, constructor: NodeConstructor) {
        let type_name = type_name.into();
        if self.constructors.lock().insert(type_name.clone(), constructor).is_some() {
            log::warn!("node type '{}' re-registered", type_name);
        }
    }

    /// Whether `type_name` is already bound (explicitly or by an earlier resolution)
    pub fn is_registered(&self, type_name: &str) -> bool {
        self.constructors.lock().contains_key(type_name)
    }

    pub fn registered_types(&self) -> Vec<String> {
        let mut names: Vec<String> = self.constructors.lock().keys().cloned().collect();
        names.sort();
        names
    }

    fn constructor_for(&self, type_name: &str) -> Result<NodeConstructor> {
        let mut constructors = self.constructors.lock();
        if let Some(constructor) = constructors.get(type_name) {
            return Ok(constructor.clone());
        }

        let symbol = self.symbol_name(type_name);
        let constructor = self
            .resolver
            .resolve(&symbol)
            .ok_or_else(|| SceneGraphError::unknown_node_type(type_name, symbol.as_str()))?;
        log::info!("creating at least one instance of node type '{}'", type_name);
        constructors.insert(type_name.to_string(), constructor.clone());
        Ok(constructor)
    }

    /// Create a node of type `type_name`.
    ///
    /// `value` is only assigned when it is valid (non-empty).
    pub fn create_node(
        &self,
        name: &str,
        type_name: &str,
        value: Value,
        flags: NodeFlags,
    ) -> Result<NodeHandle> {
        if name.is_empty() {
            return Err(SceneGraphError::InvalidName(name.to_string()));
        }

        let constructor = self.constructor_for(type_name)?;
        let kind = constructor.construct().ok_or_else(|| {
            let message = format!("constructor for node type '{}' returned no instance", type_name);
            log::error!("{}", message);
            SceneGraphError::InvariantViolation(message)
        })?;

        let mut node = Node::named(name, type_name, kind);
        node.set_flags(flags);
        if value.is_valid() {
            node.set_value(value)?;
        }
        Ok(NodeHandle::new(node))
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl fmt::Debug for NodeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRegistry")
            .field("symbol_prefix", &self.symbol_prefix)
            .field("types", &self.constructors.lock().len())
            .finish()
    }
}
