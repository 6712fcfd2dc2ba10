//! Runtime reflection surface.
//!
//! The resolver never talks to a live runtime directly. It sees callables
//! through [`CallableHandle`]s and owners through the [`MethodTable`] trait,
//! which any runtime binding can implement. [`RuntimeImage`] is the bundled
//! implementation, backed by a serialized snapshot of method tables.

mod image;

pub use image::{BoundMethod, OwnerTable, RuntimeImage};

use crate::types::{ImplId, Owner, SourceLocator, Visibility};
use std::fmt;
use std::sync::Arc;

/// Read-only view of the names bound on one owner.
pub trait MethodTable: Send + Sync {
    /// False for bare scopes that keep no visibility sections.
    fn classifies_visibility(&self) -> bool;

    /// Whether `name` is directly declared in the given visibility section.
    fn declared_with(&self, visibility: Visibility, name: &str) -> bool;

    /// Every name currently bound on the owner, in any section.
    fn bound_names(&self) -> Vec<&str>;

    /// Implementation currently reachable through `name`.
    fn implementation(&self, name: &str) -> Option<ImplId>;
}

/// Source of callable handles.
pub trait ReflectionSurface {
    /// Handle for the method bound to `name` on `owner`, if any.
    fn handle(&self, owner: &Owner, name: &str) -> Option<CallableHandle>;

    /// Owners known to the surface.
    fn owners(&self) -> Vec<Owner>;
}

/// One method implementation as bound to one name on one owner.
///
/// Carries the owner's method table so resolution needs nothing else.
#[derive(Clone)]
pub struct CallableHandle {
    owner: Owner,
    name: String,
    implementation: ImplId,
    locator: Option<SourceLocator>,
    table: Arc<dyn MethodTable>,
}

impl CallableHandle {
    pub fn new(
        owner: Owner,
        name: impl Into<String>,
        implementation: ImplId,
        table: Arc<dyn MethodTable>,
    ) -> Self {
        Self {
            owner,
            name: name.into(),
            implementation,
            locator: None,
            table,
        }
    }

    pub fn with_locator(mut self, locator: SourceLocator) -> Self {
        self.locator = Some(locator);
        self
    }

    pub fn owner(&self) -> &Owner {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn implementation(&self) -> &ImplId {
        &self.implementation
    }

    /// `None` is the runtime's explicit "no location" signal.
    pub fn locator(&self) -> Option<&SourceLocator> {
        self.locator.as_ref()
    }

    pub fn table(&self) -> &dyn MethodTable {
        self.table.as_ref()
    }

    /// `Owner#name` or `Owner.name`.
    pub fn qualified_name(&self) -> String {
        self.owner.qualify(&self.name)
    }
}

impl fmt::Debug for CallableHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallableHandle")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("implementation", &self.implementation)
            .field("locator", &self.locator)
            .finish_non_exhaustive()
    }
}
