//! Scene file tests for void_sg

use std::io::Write;

use void_math::Vec3f;
use void_sg::prelude::*;

const SCENE: &str = r#"
[node]
name = "world"
type = "Node"

[[node.children]]
name = "gold"
type = "Node"
register = true

[[node.children]]
name = "sphere"
type = "Renderable"

[[node.children.children]]
name = "radius"
type = "float"
value = 1.5
required = true
flags = ["valid_min_max"]
min = 0.0
max = 10.0

[[node.children.children]]
name = "center"
type = "vec3f"
value = [0, 1, 2]

[[node.children.children]]
name = "material"
type = "object"
ref = "gold"
"#;

fn load(source: &str) -> Result<(NodeHandle, NodeDirectory)> {
    let registry = NodeRegistry::with_builtins();
    let directory = NodeDirectory::new();
    let root = SceneLoader::new(&registry).with_directory(&directory).load_str(source)?;
    Ok((root, directory))
}

#[test]
fn builds_the_tree() {
    let (world, directory) = load(SCENE).unwrap();
    assert_eq!(world.read().child_names(), vec!["gold", "sphere"]);

    let sphere = world.child("sphere").unwrap();
    let radius = sphere.child("radius").unwrap();
    assert_eq!(radius.read().value().as_float(), Some(1.5));
    assert!(radius.read().flags().contains(NodeFlags::REQUIRED | NodeFlags::VALID_MIN_MAX));
    assert_eq!(
        sphere.child("center").unwrap().read().value().as_vec3f(),
        Some(Vec3f::new(0.0, 1.0, 2.0))
    );

    let gold = directory.find("gold").unwrap();
    let material = sphere.child("material").unwrap();
    assert!(material.read().value().as_object().unwrap().ptr_eq(&gold));
}

#[test]
fn loaded_scene_verifies_and_commits() {
    let (world, _directory) = load(SCENE).unwrap();
    let mut backend = LogBackend::new();
    let mut ctx = RenderContext::new(&mut backend);
    world.traverse(&mut ctx, Operation::Verify).unwrap();
    assert!(world.read().is_valid());
    world.traverse(&mut ctx, Operation::Commit).unwrap();
    drop(ctx);
    // three parameters plus the sphere's own commit
    assert_eq!(backend.calls(), 4);
}

#[test]
fn out_of_range_value_fails_verification() {
    let source = SCENE.replace("value = 1.5", "value = 12.0");
    let (world, _directory) = load(&source).unwrap();
    let mut backend = NullBackend;
    let mut ctx = RenderContext::new(&mut backend);
    world.traverse(&mut ctx, Operation::Verify).unwrap();
    let sphere = world.child("sphere").unwrap();
    assert!(!sphere.read().is_valid());
    // the sphere is optional for the world
    assert!(world.read().is_valid());
}

#[test]
fn references_attach_registered_nodes() {
    let source = r#"
[node]
name = "root"
type = "Node"

[[node.children]]
name = "shared"
type = "int"
value = 7
register = true

[[node.children]]
name = "group"
type = "Node"

[[node.children.children]]
ref = "shared"
"#;
    let (root, _directory) = load(source).unwrap();
    let shared = root.child("shared").unwrap();
    let attached = root.child("group").unwrap().child("shared").unwrap();
    assert!(attached.ptr_eq(&shared));
}

#[test]
fn typed_reference_becomes_an_object_value() {
    let (world, directory) = load(SCENE).unwrap();
    let sphere = world.child("sphere").unwrap();
    assert_eq!(sphere.read().child_names(), vec!["center", "material", "radius"]);
    assert!(sphere.child("gold").is_none());

    let material = sphere.child("material").unwrap();
    assert_eq!(material.read().type_name(), "object");
    let gold = directory.find("gold").unwrap();
    assert!(material.read().value().as_object().unwrap().ptr_eq(&gold));
}

#[test]
fn wrong_value_type_is_rejected() {
    let source = SCENE.replace("value = 1.5", "value = \"big\"");
    assert!(matches!(load(&source), Err(SceneGraphError::InvalidValue { .. })));
}

#[test]
fn unknown_type_is_reported() {
    let source = "[node]\nname = \"a\"\ntype = \"Teapot\"\n";
    assert!(matches!(load(source), Err(SceneGraphError::UnknownNodeType { .. })));
}

#[test]
fn unknown_flag_is_reported() {
    let source = "[node]\nname = \"a\"\ntype = \"Node\"\nflags = [\"shiny\"]\n";
    assert!(matches!(load(source), Err(SceneGraphError::SceneFile(_))));
}

#[test]
fn unresolved_reference_is_reported() {
    let source = "[node]\nname = \"a\"\ntype = \"Node\"\n[[node.children]]\nref = \"missing\"\n";
    assert!(matches!(load(source), Err(SceneGraphError::SceneFile(_))));
}

#[test]
fn load_file_reads_from_disk() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(SCENE.as_bytes()).unwrap();

    let registry = NodeRegistry::with_builtins();
    let directory = NodeDirectory::new();
    let world = SceneLoader::new(&registry)
        .with_directory(&directory)
        .load_file(file.path())
        .unwrap();
    assert_eq!(world.read().name(), "world");
    assert_eq!(world.read().num_children(), 2);
}
