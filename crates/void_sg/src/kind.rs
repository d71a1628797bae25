//! Node kinds - per-type behaviour plugged into the traversal engine
//!
//! The engine owns the traversal order and the timestamp bookkeeping. A
//! [`NodeKind`] only decides what happens at each hook: what a commit pushes
//! to the backend, what makes the node valid, which values it accepts and
//! how it ingests external scene descriptions.

use crate::error::{Result, SceneGraphError};
use crate::node::NodeState;
use crate::traverse::RenderContext;
use crate::value::{Value, ValueKind};

/// External input a node can be asked to ingest
#[derive(Clone, Copy, Debug)]
pub enum IngestSource<'a> {
    /// A value parsed from a TOML scene file
    Toml(&'a toml::Value),
    /// Whitespace separated text, e.g. `"1 0.5 2"`
    Text(&'a str),
}

impl IngestSource<'_> {
    pub fn format(&self) -> &'static str {
        match self {
            IngestSource::Toml(_) => "toml",
            IngestSource::Text(_) => "text",
        }
    }
}

/// Behaviour of one node type.
///
/// Every hook has a default so that kinds only implement what they need.
pub trait NodeKind: Send + Sync + 'static {
    /// Value tag this kind is restricted to; `None` accepts any value
    fn value_kind(&self) -> Option<ValueKind> {
        None
    }

    /// Reject values the node cannot hold
    fn check_value(&self, node: &NodeState, value: &Value) -> Result<()> {
        match self.value_kind() {
            Some(expected) if value.kind() != expected => Err(SceneGraphError::type_mismatch(
                node.name(),
                expected.name(),
                value.kind().name(),
            )),
            _ => Ok(()),
        }
    }

    /// Structural self-check run by the verify traversal
    fn compute_valid(&self, node: &NodeState) -> bool {
        node.satisfies_constraints()
    }

    /// Commit hook run before the node's children are visited
    fn pre_commit(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        let _ = (node, ctx);
        Ok(())
    }

    /// Commit hook run after the node's children are visited
    fn post_commit(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        let _ = (node, ctx);
        Ok(())
    }

    fn pre_render(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        let _ = (node, ctx);
        Ok(())
    }

    fn post_render(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        let _ = (node, ctx);
        Ok(())
    }

    /// Turn an external description into a value for this node.
    ///
    /// The node is only updated once this returns `Ok`.
    fn ingest(&self, node: &NodeState, source: &IngestSource<'_>) -> Result<Value> {
        Err(SceneGraphError::unsupported_format(
            node.name(),
            node.type_name(),
            source.format(),
        ))
    }
}

/// Plain grouping node, registered as `Node`
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseNode;

impl NodeKind for BaseNode {}

/// Backend object that can be drawn, registered as `Renderable`.
///
/// Commits its object once all parameter children have been pushed and
/// renders it after its children were rendered.
#[derive(Debug, Default, Clone, Copy)]
pub struct RenderableNode;

impl NodeKind for RenderableNode {
    fn post_commit(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        ctx.backend().commit_object(node.name());
        Ok(())
    }

    fn post_render(&mut self, node: &NodeState, ctx: &mut RenderContext<'_>) -> Result<()> {
        ctx.backend().render(node.name());
        Ok(())
    }
}
