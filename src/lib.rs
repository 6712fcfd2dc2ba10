//! Method introspection: docstring, source, aliases and visibility of a callable.

pub mod config;
pub mod display;
pub mod error;
pub mod extract;
pub mod fallback;
pub mod io;
pub mod logging;
pub mod reflect;
pub mod resolve;
pub mod types;

// Explicit exports for better API clarity
pub use config::Settings;
pub use error::{
    ImageError, ImageResult, ResolveError, ResolveResult, StoreError, StoreResult,
};
pub use extract::{Extraction, SourceExtractor, Syntax};
pub use fallback::{DocEntry, DocProvider, DocStore};
pub use reflect::{CallableHandle, MethodTable, ReflectionSurface, RuntimeImage};
pub use resolve::{Origin, Resolver};
pub use types::{ImplId, MethodDescriptor, Owner, OwnerKind, SourceLocator, Visibility};
