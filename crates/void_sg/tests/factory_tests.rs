//! Factory tests for void_sg
//!
//! Type resolution through the injected resolver, caching and failure modes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use void_sg::prelude::*;
use void_sg::{BaseNode, ChainResolver, NodeConstructor, StaticResolver, TypeResolver};

/// Resolver knowing a fixed set of symbols and counting lookups
#[derive(Clone, Default)]
struct CountingResolver {
    lookups: Arc<AtomicUsize>,
    symbols: Vec<String>,
    broken: bool,
}

impl CountingResolver {
    fn knowing(symbols: &[&str]) -> Self {
        Self {
            symbols: symbols.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl TypeResolver for CountingResolver {
    fn resolve(&self, symbol: &str) -> Option<NodeConstructor> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if !self.symbols.iter().any(|s| s == symbol) {
            return None;
        }
        if self.broken {
            return Some(NodeConstructor::new(|| None));
        }
        Some(NodeConstructor::new(|| Some(Box::new(BaseNode))))
    }
}

#[test]
fn resolves_each_type_once() {
    let resolver = CountingResolver::knowing(&["void_create_sg_node__Sphere"]);
    let registry = NodeRegistry::new(resolver.clone());

    let a = registry.create_node("a", "Sphere", Value::Empty, NodeFlags::NONE).unwrap();
    let b = registry.create_node("b", "Sphere", Value::Empty, NodeFlags::NONE).unwrap();
    assert_eq!(resolver.lookups(), 1);

    // Same constructor, distinct instances
    assert!(!a.ptr_eq(&b));
    assert_eq!(a.read().type_name(), "Sphere");
    assert_eq!(b.read().name(), "b");
}

#[test]
fn unknown_type_is_retried() {
    let resolver = CountingResolver::knowing(&[]);
    let registry = NodeRegistry::new(resolver.clone());

    for _ in 0..2 {
        let err = registry.create_node("x", "Teapot", Value::Empty, NodeFlags::NONE).unwrap_err();
        match err {
            SceneGraphError::UnknownNodeType { type_name, symbol } => {
                assert_eq!(type_name, "Teapot");
                assert_eq!(symbol, "void_create_sg_node__Teapot");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
    assert_eq!(resolver.lookups(), 2);
    assert!(!registry.is_registered("Teapot"));
}

#[test]
fn custom_prefix_forms_the_symbol() {
    let resolver = CountingResolver::knowing(&["my_nodes_Light"]);
    let registry = NodeRegistry::with_prefix(resolver, "my_nodes_");
    assert_eq!(registry.symbol_name("Light"), "my_nodes_Light");
    assert!(registry.create_node("sun", "Light", Value::Empty, NodeFlags::NONE).is_ok());
}

#[test]
fn broken_constructor_is_an_invariant_violation() {
    let resolver = CountingResolver {
        broken: true,
        ..CountingResolver::knowing(&["void_create_sg_node__Broken"])
    };
    let registry = NodeRegistry::new(resolver);
    let err = registry.create_node("b", "Broken", Value::Empty, NodeFlags::NONE).unwrap_err();
    assert!(matches!(err, SceneGraphError::InvariantViolation(_)));
}

#[test]
fn chain_falls_through_to_later_resolvers() {
    let plugins = CountingResolver::knowing(&["void_create_sg_node__Sphere"]);
    let chain = ChainResolver::new()
        .with(StaticResolver::with_builtins("void_create_sg_node__"))
        .with(plugins.clone());
    let registry = NodeRegistry::new(chain);

    registry.create_node("r", "float", Value::Float(1.0), NodeFlags::NONE).unwrap();
    assert_eq!(plugins.lookups(), 0);
    registry.create_node("s", "Sphere", Value::Empty, NodeFlags::NONE).unwrap();
    assert_eq!(plugins.lookups(), 1);
    assert_eq!(registry.registered_types(), vec!["Sphere".to_string(), "float".to_string()]);
}

#[test]
fn initial_value_is_applied_and_stamped() {
    let registry = NodeRegistry::with_builtins();
    let node = registry
        .create_node("pos", "vec3f", Value::from(void_math::Vec3f::new(1.0, 2.0, 3.0)), NodeFlags::NONE)
        .unwrap();
    let node = node.read();
    assert_eq!(node.value().kind(), ValueKind::Vec3f);
    assert!(node.last_modified() > node.last_committed());
}

#[test]
fn concurrent_first_creation_resolves_once() {
    let resolver = CountingResolver::knowing(&["void_create_sg_node__Sphere"]);
    let registry = Arc::new(NodeRegistry::new(resolver.clone()));

    let threads: Vec<_> = (0..8)
        .map(|i| {
            let registry = registry.clone();
            std::thread::spawn(move || {
                registry
                    .create_node(&format!("s{}", i), "Sphere", Value::Empty, NodeFlags::NONE)
                    .is_ok()
            })
        })
        .collect();
    for thread in threads {
        assert!(thread.join().unwrap());
    }
    assert_eq!(resolver.lookups(), 1);
}
