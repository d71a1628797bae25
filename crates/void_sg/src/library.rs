//! Node types exported from shared libraries
//!
//! A library exports one `extern "C"` creator per node type under the
//! symbol `<prefix><type>`. The creator returns a leaked
//! `Box<Box<dyn NodeKind>>` which the resolver takes back ownership of.
//! Libraries are kept loaded for as long as a resolved constructor is alive.
//!
//! Libraries and the host must be built with the same compiler, as the
//! boxed trait object crosses the boundary.

use std::ffi::c_void;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use libloading::{Library, Symbol};

use crate::error::{Result, SceneGraphError};
use crate::kind::NodeKind;
use crate::registry::{NodeConstructor, TypeResolver};

/// Signature of an exported node creator
pub type CreateNodeFn = unsafe extern "C" fn() -> *mut c_void;

/// Export a [`NodeKind`] from a shared library under the default symbol prefix.
///
/// ```ignore
/// #[derive(Default)]
/// struct Sphere;
/// impl void_sg::NodeKind for Sphere {}
///
/// void_sg::export_node_kind!(Sphere, Sphere);
/// ```
#[macro_export]
macro_rules! export_node_kind {
    ($type_name:ident, $kind:ty) => {
        const _: () = {
            #[export_name = concat!("void_create_sg_node__", stringify!($type_name))]
            pub extern "C" fn create() -> *mut ::std::ffi::c_void {
                let kind: ::std::boxed::Box<dyn $crate::NodeKind> =
                    ::std::boxed::Box::new(<$kind as ::std::default::Default>::default());
                ::std::boxed::Box::into_raw(::std::boxed::Box::new(kind)) as *mut ::std::ffi::c_void
            }
        };
    };
}

struct LoadedLibrary {
    path: PathBuf,
    library: Arc<Library>,
}

/// Resolver looking node creators up in loaded shared libraries
#[derive(Default)]
pub struct LibraryResolver {
    libraries: Vec<LoadedLibrary>,
}

impl LibraryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a library; later loads are searched after earlier ones
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let library = unsafe {
            Library::new(path).map_err(|e| SceneGraphError::library_load(path, e.to_string()))?
        };
        log::info!("Loaded node library '{}'", path.display());
        self.libraries.push(LoadedLibrary {
            path: path.to_path_buf(),
            library: Arc::new(library),
        });
        Ok(())
    }

    /// Paths of the loaded libraries in search order
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.libraries.iter().map(|l| l.path.as_path())
    }

    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

impl TypeResolver for LibraryResolver {
    fn resolve(&self, symbol: &str) -> Option<NodeConstructor> {
        self.libraries.iter().find_map(|loaded| {
            let create: CreateNodeFn = unsafe {
                let sym: Symbol<CreateNodeFn> = loaded.library.get(symbol.as_bytes()).ok()?;
                *sym
            };
            log::debug!("resolved '{}' in '{}'", symbol, loaded.path.display());

            // Keeps the library mapped while the constructor is alive
            let library = Arc::clone(&loaded.library);
            Some(NodeConstructor::new(move || {
                let _library = &library;
                let raw = unsafe { create() };
                if raw.is_null() {
                    return None;
                }
                let kind = unsafe { Box::from_raw(raw as *mut Box<dyn NodeKind>) };
                Some(*kind)
            }))
        })
    }
}
