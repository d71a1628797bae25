//! Node - the scene-graph tree entity and its traversal engine
//!
//! A node carries a typed value, named children, commit/validity state and a
//! [`NodeKind`] supplying per-type hooks. Every operation walks the tree the
//! same way:
//!
//! ```text
//! traverse(ctx, op)
//!   refresh the cached children stamps of the whole tree (once, at the root)
//!   ctx.child_mtime = cached latest stamp below this node
//!   pre_traverse(ctx, op)
//!   for child (only while this node is valid): child.traverse(ctx, op)
//!   ctx.child_mtime = latest stamp folded from the children's caches
//!   post_traverse(ctx, op)
//! ```
//!
//! A node is dirty when `last_modified >= last_committed` or when anything
//! below it was modified at or after `last_committed`.
//!
//! # Locking
//!
//! Nodes live behind [`NodeHandle`] (`Arc<RwLock<Node>>`). A traversal holds
//! the write lock of a node for the full visit of its subtree and takes
//! locks strictly top-down, so two traversals never interleave inside one
//! subtree. Cycles are rejected by [`NodeHandle::add_child`], which runs its
//! check and insert under one process-wide topology lock; this keeps the
//! lock order acyclic even when edits race.
//!
//! Children are keyed by the name they had when attached. Rename an
//! attached child through [`NodeHandle::rename_child`] so the key follows.

use core::fmt;
use std::collections::BTreeMap;
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{Result, SceneGraphError};
use crate::flags::NodeFlags;
use crate::kind::{IngestSource, NodeKind};
use crate::timestamp::TimeStamp;
use crate::traverse::{Operation, RenderContext};
use crate::value::Value;

/// Data part of a node, visible to [`NodeKind`] hooks
pub struct NodeState {
    name: String,
    type_name: String,
    value: Value,
    flags: NodeFlags,
    children: BTreeMap<String, NodeHandle>,
    last_modified: TimeStamp,
    last_committed: TimeStamp,
    children_last_modified: TimeStamp,
    valid: bool,
    min_max: Option<(Value, Value)>,
    whitelist: Vec<Value>,
    blacklist: Vec<Value>,
}

impl NodeState {
    fn new() -> Self {
        Self {
            name: String::new(),
            type_name: String::from("Node"),
            value: Value::Empty,
            flags: NodeFlags::NONE,
            children: BTreeMap::new(),
            last_modified: TimeStamp::now(),
            last_committed: TimeStamp::ZERO,
            children_last_modified: TimeStamp::ZERO,
            valid: true,
            min_max: None,
            whitelist: Vec::new(),
            blacklist: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registered factory key of this node
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn flags(&self) -> NodeFlags {
        self.flags
    }

    pub fn last_modified(&self) -> TimeStamp {
        self.last_modified
    }

    pub fn last_committed(&self) -> TimeStamp {
        self.last_committed
    }

    /// Children aggregate computed by the most recent traversal
    pub fn children_last_modified(&self) -> TimeStamp {
        self.children_last_modified
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn min_max(&self) -> Option<&(Value, Value)> {
        self.min_max.as_ref()
    }

    pub fn whitelist(&self) -> &[Value] {
        &self.whitelist
    }

    pub fn blacklist(&self) -> &[Value] {
        &self.blacklist
    }

    /// Children in name order
    pub fn children(&self) -> impl Iterator<Item = (&str, &NodeHandle)> {
        self.children.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn child(&self, name: &str) -> Option<&NodeHandle> {
        self.children.get(name)
    }

    pub fn child_names(&self) -> Vec<String> {
        self.children.keys().cloned().collect()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// Dirty test against an aggregated children stamp; equal stamps count as dirty
    pub fn is_dirty(&self, child_mtime: TimeStamp) -> bool {
        self.last_modified >= self.last_committed || child_mtime >= self.last_committed
    }

    /// Check the value against the validation flags.
    ///
    /// A range check on a value without a comparable range fails.
    pub fn satisfies_constraints(&self) -> bool {
        if self.flags.contains(NodeFlags::VALID_MIN_MAX) {
            if let Some((min, max)) = &self.min_max {
                if self.value.within(min, max) != Some(true) {
                    return false;
                }
            }
        }
        if self.flags.contains(NodeFlags::VALID_BLACKLIST) && self.blacklist.contains(&self.value) {
            return false;
        }
        if self.flags.contains(NodeFlags::VALID_WHITELIST)
            && !self.whitelist.is_empty()
            && !self.whitelist.contains(&self.value)
        {
            return false;
        }
        true
    }

    /// Latest stamp of this node and everything below it, from the cached aggregate
    pub fn latest_modified(&self) -> TimeStamp {
        self.last_modified.max(self.children_last_modified)
    }

    /// Fold the children's cached stamps; valid once every child cache is current
    fn fold_children(&self) -> TimeStamp {
        self.children
            .values()
            .map(|child| child.read().state.latest_modified())
            .max()
            .unwrap_or(TimeStamp::ZERO)
    }
}

/// A scene-graph node: state plus type-specific behaviour
pub struct Node {
    state: NodeState,
    kind: Box<dyn NodeKind>,
}

impl Node {
    /// Create an unnamed node of type `Node` around `kind`
    pub fn new(kind: Box<dyn NodeKind>) -> Self {
        Self {
            state: NodeState::new(),
            kind,
        }
    }

    /// Create a node with a name and type
    pub fn named(name: impl Into<String>, type_name: impl Into<String>, kind: Box<dyn NodeKind>) -> Self {
        let mut node = Self::new(kind);
        node.set_name(name);
        node.set_type(type_name);
        node
    }

    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn kind(&self) -> &dyn NodeKind {
        self.kind.as_ref()
    }

    pub fn name(&self) -> &str {
        self.state.name()
    }

    pub fn type_name(&self) -> &str {
        self.state.type_name()
    }

    pub fn value(&self) -> &Value {
        self.state.value()
    }

    pub fn flags(&self) -> NodeFlags {
        self.state.flags()
    }

    pub fn last_modified(&self) -> TimeStamp {
        self.state.last_modified()
    }

    pub fn last_committed(&self) -> TimeStamp {
        self.state.last_committed()
    }

    pub fn children_last_modified(&self) -> TimeStamp {
        self.state.children_last_modified()
    }

    pub fn is_valid(&self) -> bool {
        self.state.is_valid()
    }

    pub fn child(&self, name: &str) -> Option<&NodeHandle> {
        self.state.child(name)
    }

    pub fn num_children(&self) -> usize {
        self.state.num_children()
    }

    pub fn child_names(&self) -> Vec<String> {
        self.state.child_names()
    }

    /// Rename the node. An attached node stays keyed under its old name in
    /// its parent; use [`NodeHandle::rename_child`] for attached nodes.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.state.name = name.into();
    }

    pub fn set_type(&mut self, type_name: impl Into<String>) {
        self.state.type_name = type_name.into();
    }

    pub fn set_flags(&mut self, flags: NodeFlags) {
        self.state.flags = flags;
    }

    /// Replace the value and stamp the node as modified.
    ///
    /// Fails with `TypeMismatch` (leaving the node untouched) when the kind
    /// does not accept the value's tag.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let value = value.into();
        self.kind.check_value(&self.state, &value)?;
        self.state.value = value;
        self.touch();
        Ok(())
    }

    /// Ingest an external description through the kind's ingestion hook
    pub fn ingest(&mut self, source: &IngestSource<'_>) -> Result<()> {
        let value = self.kind.ingest(&self.state, source)?;
        self.set_value(value)
    }

    pub fn set_min_max(&mut self, min: Value, max: Value) {
        self.state.min_max = Some((min, max));
    }

    pub fn set_whitelist(&mut self, values: Vec<Value>) {
        self.state.whitelist = values;
    }

    pub fn set_blacklist(&mut self, values: Vec<Value>) {
        self.state.blacklist = values;
    }

    /// Stamp the node as modified without changing its value
    pub fn touch(&mut self) {
        self.state.last_modified = TimeStamp::now();
    }

    fn insert_child(&mut self, child: NodeHandle, name: String) -> Option<NodeHandle> {
        let previous = self.state.children.insert(name, child);
        self.touch();
        previous
    }

    fn take_child(&mut self, name: &str) -> Option<NodeHandle> {
        let removed = self.state.children.remove(name);
        if removed.is_some() {
            self.touch();
        }
        removed
    }

    /// Run `operation` over this node and its subtree
    pub fn traverse(&mut self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        self.refresh_children_stamps();
        self.walk(ctx, operation)
    }

    /// Recompute `children_last_modified` bottom-up for the whole subtree.
    ///
    /// One pass per traversal keeps every cache exact, including the caches
    /// of subtrees an invalid node will not descend into.
    fn refresh_children_stamps(&mut self) -> TimeStamp {
        let mut latest = TimeStamp::ZERO;
        for child in self.state.children.values() {
            latest = latest.max(child.write().refresh_children_stamps());
        }
        self.state.children_last_modified = latest;
        self.state.latest_modified()
    }

    fn walk(&mut self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        ctx.enter(&self.state.name, operation);
        let result = self.visit(ctx, operation);
        ctx.leave();
        result
    }

    fn visit(&mut self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        ctx.set_child_mtime(self.state.children_last_modified);
        self.pre_traverse(ctx, operation)?;

        ctx.descend();
        let mut result = Ok(());
        if self.state.valid {
            for child in self.state.children.values() {
                result = child.write().walk(ctx, operation);
                if result.is_err() {
                    break;
                }
            }
        }
        ctx.ascend();
        result?;

        let aggregate = self.state.fold_children();
        self.state.children_last_modified = aggregate;
        ctx.set_child_mtime(aggregate);
        self.post_traverse(ctx, operation)
    }

    fn pre_traverse(&mut self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        match operation {
            Operation::Print => ctx.print_node(&self.state),
            Operation::Commit => {
                if self.state.is_dirty(ctx.child_mtime()) {
                    self.kind.pre_commit(&self.state, ctx)?;
                }
            }
            Operation::Verify => self.state.valid = self.kind.compute_valid(&self.state),
            Operation::Render => self.kind.pre_render(&self.state, ctx)?,
        }
        Ok(())
    }

    fn post_traverse(&mut self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        match operation {
            Operation::Print => {}
            Operation::Commit => {
                if self.state.is_dirty(ctx.child_mtime()) {
                    self.kind.post_commit(&self.state, ctx)?;
                    self.state.last_committed = TimeStamp::now();
                    log::debug!(
                        "committed {} : {} at level {}",
                        self.state.name,
                        self.state.type_name,
                        ctx.level()
                    );
                }
            }
            Operation::Verify => {
                let mut valid = self.state.valid;
                for child in self.state.children.values() {
                    let child = child.read();
                    if child.flags().contains(NodeFlags::REQUIRED) {
                        valid &= child.is_valid();
                    }
                }
                self.state.valid = valid;
            }
            Operation::Render => self.kind.post_render(&self.state, ctx)?,
        }
        Ok(())
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.state.name)
            .field("type", &self.state.type_name)
            .field("value", &self.state.value)
            .field("flags", &self.state.flags)
            .field("children", &self.state.child_names())
            .field("last_modified", &self.state.last_modified)
            .field("last_committed", &self.state.last_committed)
            .field("valid", &self.state.valid)
            .finish()
    }
}

/// Serializes structural edits so a cycle check and its insert are atomic
static TOPOLOGY: Mutex<()> = parking_lot::const_mutex(());

/// Shared reference to a node
#[derive(Clone)]
pub struct NodeHandle(Arc<RwLock<Node>>);

impl NodeHandle {
    pub fn new(node: Node) -> Self {
        Self(Arc::new(RwLock::new(node)))
    }

    pub fn read(&self) -> RwLockReadGuard<'_, Node> {
        self.0.read()
    }

    pub fn write(&self) -> RwLockWriteGuard<'_, Node> {
        self.0.write()
    }

    /// Node name, or `<busy>` while a traversal holds the node
    pub fn name(&self) -> String {
        match self.0.try_read() {
            Some(node) => node.name().to_string(),
            None => String::from("<busy>"),
        }
    }

    /// Same underlying node
    pub fn ptr_eq(&self, other: &NodeHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn downgrade(&self) -> WeakNodeHandle {
        WeakNodeHandle(Arc::downgrade(&self.0))
    }

    /// True if `other` is this node or lies anywhere below it
    pub fn contains(&self, other: &NodeHandle) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let node = self.read();
        node.state.children.values().any(|child| child.contains(other))
    }

    /// Attach `child` under its own name, returning the child it replaced.
    ///
    /// Marks this node as modified.
    pub fn add_child(&self, child: NodeHandle) -> Result<Option<NodeHandle>> {
        let _topology = TOPOLOGY.lock();
        let child_name = child.read().name().to_string();
        if child.contains(self) {
            return Err(SceneGraphError::Cycle {
                parent: self.name(),
                child: child_name,
            });
        }
        Ok(self.write().insert_child(child, child_name))
    }

    /// Rename the child keyed `old` to `new`, re-keying it in this node.
    ///
    /// Fails with `InvalidName` if `new` is empty or already taken by another
    /// child. Returns `false` when there is no child called `old`.
    pub fn rename_child(&self, old: &str, new: &str) -> Result<bool> {
        if new.is_empty() {
            return Err(SceneGraphError::InvalidName(new.to_string()));
        }
        let _topology = TOPOLOGY.lock();
        let mut node = self.write();
        if old != new && node.state.children.contains_key(new) {
            return Err(SceneGraphError::InvalidName(new.to_string()));
        }
        let Some(child) = node.state.children.remove(old) else {
            return Ok(false);
        };
        child.write().set_name(new);
        node.insert_child(child, new.to_string());
        Ok(true)
    }

    /// Detach the child called `name`. Marks this node as modified.
    pub fn remove_child(&self, name: &str) -> Option<NodeHandle> {
        let _topology = TOPOLOGY.lock();
        self.write().take_child(name)
    }

    pub fn child(&self, name: &str) -> Option<NodeHandle> {
        self.read().child(name).cloned()
    }

    /// Run `operation` over the tree rooted here
    pub fn traverse(&self, ctx: &mut RenderContext<'_>, operation: Operation) -> Result<()> {
        log::debug!("{} traversal from '{}'", operation, self.name());
        self.write().traverse(ctx, operation)
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_read() {
            Some(node) => write!(f, "NodeHandle({} : {})", node.name(), node.type_name()),
            None => f.write_str("NodeHandle(<busy>)"),
        }
    }
}

/// Non-owning reference to a node
#[derive(Clone, Debug, Default)]
pub struct WeakNodeHandle(Weak<RwLock<Node>>);

impl WeakNodeHandle {
    /// `None` once every owner has released the node
    pub fn upgrade(&self) -> Option<NodeHandle> {
        self.0.upgrade().map(NodeHandle)
    }
}
