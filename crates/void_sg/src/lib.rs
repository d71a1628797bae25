//! # void_sg - Scene Graph
//!
//! A tree of named, typed nodes whose values feed a rendering backend. The
//! graph decides *what* has to be pushed to the backend and *in which order*:
//! only nodes modified since their last commit are committed, children
//! before parents, and invalid subtrees are skipped.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐
//! │  scene.toml     │────▶│  SceneLoader    │
//! └─────────────────┘     └────────┬────────┘
//!                                  │ create_node("radius", "float", ..)
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  TypeResolver   │◀────│  NodeRegistry   │  resolve once, then cached
//! │ (static / dylib)│     └────────┬────────┘
//! └─────────────────┘              │
//!                                  ▼
//! ┌─────────────────┐     ┌─────────────────┐
//! │  NodeDirectory  │◀ ─ ─│   NodeHandle    │  weak name index
//! └─────────────────┘     └────────┬────────┘
//!                                  │ traverse(ctx, Verify | Commit | Render | Print)
//!                                  ▼
//!                         ┌─────────────────┐
//!                         │  RenderBackend  │
//!                         └─────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use void_sg::prelude::*;
//!
//! let registry = NodeRegistry::with_builtins();
//! let sphere = registry.create_node("sphere", "Renderable", Value::Empty, NodeFlags::NONE)?;
//! let radius = registry.create_node("radius", "float", Value::Float(1.0), NodeFlags::REQUIRED)?;
//! sphere.add_child(radius)?;
//!
//! let mut backend = LogBackend::new();
//! let mut ctx = RenderContext::new(&mut backend);
//! sphere.traverse(&mut ctx, Operation::Verify)?;
//! sphere.traverse(&mut ctx, Operation::Commit)?;
//! # Ok::<(), void_sg::SceneGraphError>(())
//! ```

pub mod config;
pub mod directory;
pub mod error;
pub mod flags;
pub mod kind;
#[cfg(feature = "dylib")]
pub mod library;
pub mod node;
pub mod param;
pub mod registry;
pub mod scene_file;
pub mod timestamp;
pub mod traverse;
pub mod value;

pub use config::SceneGraphConfig;
pub use directory::NodeDirectory;
pub use error::{Result, SceneGraphError};
pub use flags::NodeFlags;
pub use kind::{BaseNode, IngestSource, NodeKind, RenderableNode};
#[cfg(feature = "dylib")]
pub use library::LibraryResolver;
pub use node::{Node, NodeHandle, NodeState, WeakNodeHandle};
pub use param::{ParamNode, ParamType};
pub use registry::{ChainResolver, NodeConstructor, NodeRegistry, StaticResolver, TypeResolver};
pub use scene_file::SceneLoader;
pub use timestamp::TimeStamp;
pub use traverse::{LogBackend, NullBackend, Operation, RenderBackend, RenderContext};
pub use value::{BackendType, DataBuffer, Texture2D, Value, ValueKind};

pub mod prelude {
    pub use crate::directory::NodeDirectory;
    pub use crate::error::{Result, SceneGraphError};
    pub use crate::flags::NodeFlags;
    pub use crate::kind::{IngestSource, NodeKind};
    pub use crate::node::{Node, NodeHandle, NodeState};
    pub use crate::registry::NodeRegistry;
    pub use crate::scene_file::SceneLoader;
    pub use crate::traverse::{LogBackend, NullBackend, Operation, RenderBackend, RenderContext};
    pub use crate::value::{Value, ValueKind};
}
