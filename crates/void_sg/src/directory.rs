//! Global node directory - lookup of nodes by name
//!
//! The directory never owns nodes. Entries are weak, so a node released by
//! every owner disappears from lookups without being unregistered.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::node::{NodeHandle, WeakNodeHandle};

/// Name to node index shared by a scene
#[derive(Debug, Default)]
pub struct NodeDirectory {
    entries: RwLock<HashMap<String, WeakNodeHandle>>,
}

impl NodeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` under `name`, replacing any previous entry
    pub fn register(&self, name: impl Into<String>, node: &NodeHandle) {
        let name = name.into();
        let previous = self.entries.write().insert(name.clone(), node.downgrade());
        if let Some(previous) = previous.and_then(|weak| weak.upgrade()) {
            if !previous.ptr_eq(node) {
                log::warn!("node directory entry '{}' replaced", name);
            }
        }
    }

    /// Live node registered under `name`
    pub fn find(&self, name: &str) -> Option<NodeHandle> {
        self.entries.read().get(name).and_then(WeakNodeHandle::upgrade)
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.entries.write().remove(name).is_some()
    }

    /// Drop entries whose node has been released
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, weak| weak.upgrade().is_some());
        before - entries.len()
    }

    /// Number of entries, including ones whose node was released
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.entries.read().keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kind::BaseNode;
    use crate::node::Node;

    fn node(name: &str) -> NodeHandle {
        NodeHandle::new(Node::named(name, "Node", Box::new(BaseNode)))
    }

    #[test]
    fn test_register_and_find() {
        let directory = NodeDirectory::new();
        let material = node("gold");
        directory.register("gold", &material);
        assert!(directory.find("gold").unwrap().ptr_eq(&material));
        assert!(directory.find("silver").is_none());
    }

    #[test]
    fn test_released_node_is_not_found() {
        let directory = NodeDirectory::new();
        let material = node("gold");
        directory.register("gold", &material);
        drop(material);
        assert!(directory.find("gold").is_none());
        assert_eq!(directory.len(), 1);
        assert_eq!(directory.prune(), 1);
        assert!(directory.is_empty());
    }

    #[test]
    fn test_reregister_replaces() {
        let directory = NodeDirectory::new();
        let first = node("a");
        let second = node("b");
        directory.register("x", &first);
        directory.register("x", &second);
        assert!(directory.find("x").unwrap().ptr_eq(&second));
        assert_eq!(directory.names(), vec!["x".to_string()]);
        assert!(directory.unregister("x"));
        assert!(!directory.unregister("x"));
    }
}
