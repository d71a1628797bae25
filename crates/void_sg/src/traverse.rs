//! Traversal operations and the per-walk render context

use core::fmt;
use core::str::FromStr;
use std::fmt::Write as _;

use crate::error::SceneGraphError;
use crate::node::NodeState;
use crate::timestamp::TimeStamp;
use crate::value::Value;

/// The closed set of operations a traversal can perform
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Write every node's name and type, indented by depth
    Print,
    /// Push dirty state to the backend
    Commit,
    /// Recompute validity bottom-up
    Verify,
    /// Run render hooks
    Render,
}

impl Operation {
    pub const ALL: [Operation; 4] = [
        Operation::Print,
        Operation::Commit,
        Operation::Verify,
        Operation::Render,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Operation::Print => "print",
            Operation::Commit => "commit",
            Operation::Verify => "verify",
            Operation::Render => "render",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = SceneGraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Operation::ALL
            .iter()
            .copied()
            .find(|op| op.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| SceneGraphError::UnknownOperation(s.to_string()))
    }
}

/// The rendering backend that commit and render hooks talk to
pub trait RenderBackend {
    /// Set parameter `param` of backend object `object`
    fn set_param(&mut self, object: &str, param: &str, value: &Value);

    /// Finalize pending parameter changes of `object`
    fn commit_object(&mut self, object: &str);

    /// Draw `object`
    fn render(&mut self, object: &str);
}

/// Backend that ignores every call
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl RenderBackend for NullBackend {
    fn set_param(&mut self, _object: &str, _param: &str, _value: &Value) {}
    fn commit_object(&mut self, _object: &str) {}
    fn render(&mut self, _object: &str) {}
}

/// Backend that logs every call at debug level and counts them
#[derive(Debug, Default)]
pub struct LogBackend {
    calls: usize,
}

impl LogBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of backend calls received so far
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl RenderBackend for LogBackend {
    fn set_param(&mut self, object: &str, param: &str, value: &Value) {
        self.calls += 1;
        log::debug!("backend: {}.{} = {} ({:?})", object, param, value, value.backend_type());
    }

    fn commit_object(&mut self, object: &str) {
        self.calls += 1;
        log::debug!("backend: commit {}", object);
    }

    fn render(&mut self, object: &str) {
        self.calls += 1;
        log::debug!("backend: render {}", object);
    }
}

/// State shared by every node visited during one traversal.
///
/// Created per top-level traversal and passed by mutable reference through
/// the whole recursive walk.
pub struct RenderContext<'a> {
    level: usize,
    operation: Operation,
    child_mtime: TimeStamp,
    path: Vec<String>,
    indent: usize,
    output: String,
    backend: &'a mut dyn RenderBackend,
}

impl<'a> RenderContext<'a> {
    pub fn new(backend: &'a mut dyn RenderBackend) -> Self {
        Self {
            level: 0,
            operation: Operation::Print,
            child_mtime: TimeStamp::ZERO,
            path: Vec::new(),
            indent: 2,
            output: String::new(),
            backend,
        }
    }

    /// Spaces per nesting level in print output
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Current nesting depth; zero at the traversal root
    pub fn level(&self) -> usize {
        self.level
    }

    /// Operation of the traversal in progress
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Latest aggregated children timestamp of the node being visited
    pub fn child_mtime(&self) -> TimeStamp {
        self.child_mtime
    }

    /// Name of the node being visited
    pub fn current_name(&self) -> Option<&str> {
        self.path.last().map(String::as_str)
    }

    /// Name of the parent of the node being visited
    pub fn parent_name(&self) -> Option<&str> {
        let len = self.path.len();
        if len < 2 {
            return None;
        }
        Some(self.path[len - 2].as_str())
    }

    pub fn backend(&mut self) -> &mut dyn RenderBackend {
        &mut *self.backend
    }

    /// Text written by print traversals so far
    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn take_output(&mut self) -> String {
        core::mem::take(&mut self.output)
    }

    pub(crate) fn enter(&mut self, name: &str, operation: Operation) {
        self.operation = operation;
        self.path.push(name.to_string());
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }

    pub(crate) fn descend(&mut self) {
        self.level += 1;
    }

    pub(crate) fn ascend(&mut self) {
        self.level = self.level.saturating_sub(1);
    }

    pub(crate) fn set_child_mtime(&mut self, stamp: TimeStamp) {
        self.child_mtime = stamp;
    }

    pub(crate) fn print_node(&mut self, node: &NodeState) {
        let pad = self.level * self.indent;
        // Writing into a String cannot fail
        let _ = writeln!(self.output, "{:pad$}{} : {}", "", node.name(), node.type_name(), pad = pad);
    }
}

impl fmt::Debug for RenderContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("level", &self.level)
            .field("operation", &self.operation)
            .field("child_mtime", &self.child_mtime)
            .field("path", &self.path)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_parse() {
        assert_eq!("commit".parse::<Operation>().unwrap(), Operation::Commit);
        assert_eq!("VERIFY".parse::<Operation>().unwrap(), Operation::Verify);
        assert!(matches!(
            "explode".parse::<Operation>(),
            Err(SceneGraphError::UnknownOperation(name)) if name == "explode"
        ));
    }

    #[test]
    fn test_context_path() {
        let mut backend = NullBackend;
        let mut ctx = RenderContext::new(&mut backend);
        assert_eq!(ctx.parent_name(), None);
        ctx.enter("root", Operation::Commit);
        ctx.enter("child", Operation::Commit);
        assert_eq!(ctx.current_name(), Some("child"));
        assert_eq!(ctx.parent_name(), Some("root"));
        ctx.leave();
        assert_eq!(ctx.parent_name(), None);
        assert_eq!(ctx.operation(), Operation::Commit);
    }

    #[test]
    fn test_log_backend_counts_calls() {
        let mut backend = LogBackend::new();
        backend.set_param("obj", "radius", &Value::Float(1.0));
        backend.commit_object("obj");
        backend.render("obj");
        assert_eq!(backend.calls(), 3);
    }
}
