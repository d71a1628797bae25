//! Scene graph command line driver
//!
//! Loads a TOML scene and runs traversal operations over it:
//!
//! ```text
//! sgtool <scene.toml> [operation ...]
//! ```
//!
//! Operations are `verify`, `commit`, `render` and `print`; the default is
//! `verify commit print`. Run with `RUST_LOG=debug` to see backend calls.

use std::path::PathBuf;
use std::process::ExitCode;

use void_sg::{
    LogBackend, NodeDirectory, NodeRegistry, Operation, RenderContext, SceneGraphConfig,
    SceneGraphError, SceneLoader,
};

const DEFAULT_OPERATIONS: [Operation; 3] = [Operation::Verify, Operation::Commit, Operation::Print];

#[derive(Debug)]
struct Args {
    scene: PathBuf,
    operations: Vec<Operation>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let scene = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| "usage: sgtool <scene.toml> [verify|commit|render|print ...]".to_string())?;
    let operations = args
        .map(|arg| arg.parse::<Operation>().map_err(|e| e.to_string()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Args {
        scene,
        operations: if operations.is_empty() { DEFAULT_OPERATIONS.to_vec() } else { operations },
    })
}

fn run(args: &Args) -> Result<(), SceneGraphError> {
    let config = SceneGraphConfig::load()?;
    let registry = NodeRegistry::from_config(&config)?;
    let directory = NodeDirectory::new();
    let root = SceneLoader::new(&registry)
        .with_directory(&directory)
        .load_file(&args.scene)?;

    let mut backend = LogBackend::new();
    let mut ctx = RenderContext::new(&mut backend).with_indent(config.print_indent);
    for &operation in &args.operations {
        root.traverse(&mut ctx, operation)?;
        if operation == Operation::Print {
            print!("{}", ctx.take_output());
        }
        if operation == Operation::Verify && !root.read().is_valid() {
            log::warn!("scene '{}' is invalid; its children are skipped", root.name());
        }
    }
    drop(ctx);

    log::info!(
        "{} operations on '{}', {} backend calls",
        args.operations.len(),
        root.name(),
        backend.calls()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
