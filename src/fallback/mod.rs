//! Prebuilt documentation for callables that have no inspectable source.
//!
//! The provider is a soft dependency. When none is installed the resolver
//! still answers, with a docstring explaining how to get one.

mod store;

pub use store::DocStore;

use crate::types::Owner;
use serde::{Deserialize, Serialize};

/// One stored docstring/source pair, returned verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocEntry {
    #[serde(default)]
    pub docstring: String,
    #[serde(default)]
    pub source: Option<String>,
}

/// Keyed lookup of primitive documentation.
pub trait DocProvider: Send + Sync {
    fn lookup(&self, owner: &Owner, name: &str) -> Option<DocEntry>;
}

/// Docstring shown for primitives when no provider is installed.
pub fn unavailable_placeholder(tool: &str, install: &str) -> String {
    format!(
        "This method is implemented natively and has no inspectable source. \
         Install {tool} (`{install}`) to see its documentation and source.\n"
    )
}
