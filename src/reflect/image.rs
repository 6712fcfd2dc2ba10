//! Serialized snapshot of a runtime's method tables.
//!
//! ```json
//! {
//!   "owners": [
//!     {
//!       "name": "Array",
//!       "kind": "class",
//!       "methods": [
//!         { "name": "map", "implementation": "array_map" },
//!         { "name": "collect", "implementation": "array_map" },
//!         { "name": "helper", "visibility": "private",
//!           "location": { "path": "lib/array_ext.rb", "line": 12 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! A method without `location` is a primitive. Relative paths resolve
//! against the image file's directory; pseudo-locations such as `(eval)`
//! are kept verbatim.

use super::{CallableHandle, MethodTable, ReflectionSurface};
use crate::error::{ImageError, ImageResult};
use crate::resolve::is_pseudo_location;
use crate::types::{ImplId, Owner, OwnerKind, SourceLocator, Visibility};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize, Serialize)]
struct ImageFile {
    #[serde(default)]
    owners: Vec<OwnerRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
struct OwnerRecord {
    name: String,
    kind: OwnerKind,
    #[serde(default)]
    methods: Vec<MethodRecord>,
}

#[derive(Debug, Deserialize, Serialize)]
struct MethodRecord {
    name: String,
    #[serde(default = "default_visibility")]
    visibility: Visibility,
    #[serde(default)]
    implementation: Option<ImplId>,
    #[serde(default)]
    location: Option<SourceLocator>,
}

fn default_visibility() -> Visibility {
    Visibility::Public
}

/// A name bound on an owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundMethod {
    pub name: String,
    pub visibility: Visibility,
    pub implementation: ImplId,
    pub locator: Option<SourceLocator>,
}

/// Method table of one owner, in declaration order.
#[derive(Debug, Clone)]
pub struct OwnerTable {
    kind: OwnerKind,
    methods: Vec<BoundMethod>,
}

impl OwnerTable {
    pub fn new(kind: OwnerKind) -> Self {
        Self {
            kind,
            methods: Vec::new(),
        }
    }

    /// Bind `method`, replacing any existing binding of the same name.
    pub fn bind(&mut self, method: BoundMethod) {
        self.methods.retain(|m| m.name != method.name);
        self.methods.push(method);
    }

    pub fn get(&self, name: &str) -> Option<&BoundMethod> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn methods(&self) -> &[BoundMethod] {
        &self.methods
    }
}

impl MethodTable for OwnerTable {
    fn classifies_visibility(&self) -> bool {
        self.kind != OwnerKind::Scope
    }

    fn declared_with(&self, visibility: Visibility, name: &str) -> bool {
        self.get(name).is_some_and(|m| m.visibility == visibility)
    }

    fn bound_names(&self) -> Vec<&str> {
        self.methods.iter().map(|m| m.name.as_str()).collect()
    }

    fn implementation(&self, name: &str) -> Option<ImplId> {
        self.get(name).map(|m| m.implementation.clone())
    }
}

/// Reflection surface over a loaded snapshot.
#[derive(Debug, Default)]
pub struct RuntimeImage {
    owners: HashMap<Owner, Arc<OwnerTable>>,
}

impl RuntimeImage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load an image file.
    pub fn load(path: impl AsRef<Path>) -> ImageResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ImageError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(&content, base).map_err(|e| match e {
            ImageError::Malformed { source, .. } => ImageError::Malformed {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    /// Parse image JSON, resolving relative source paths against `base`.
    pub fn from_json(content: &str, base: &Path) -> ImageResult<Self> {
        let file: ImageFile =
            serde_json::from_str(content).map_err(|source| ImageError::Malformed {
                path: base.to_path_buf(),
                source,
            })?;

        let mut image = Self::new();
        for record in file.owners {
            let owner = Owner::new(record.name, record.kind);
            if image.owners.contains_key(&owner) {
                return Err(ImageError::DuplicateOwner {
                    owner: owner.to_string(),
                });
            }

            let mut table = OwnerTable::new(owner.kind);
            for method in record.methods {
                if table.get(&method.name).is_some() {
                    return Err(ImageError::DuplicateMethod {
                        owner: owner.to_string(),
                        name: method.name,
                    });
                }
                let implementation = method
                    .implementation
                    .unwrap_or_else(|| ImplId::new(owner.qualify(&method.name)));
                let locator = method.location.map(|loc| rebase(loc, base));
                table.bind(BoundMethod {
                    name: method.name,
                    visibility: method.visibility,
                    implementation,
                    locator,
                });
            }
            image.insert_owner(owner, table);
        }

        debug!(owners = image.owners.len(), "runtime image ready");
        Ok(image)
    }

    pub fn insert_owner(&mut self, owner: Owner, table: OwnerTable) {
        self.owners.insert(owner, Arc::new(table));
    }

    pub fn table(&self, owner: &Owner) -> Option<&OwnerTable> {
        self.owners.get(owner).map(Arc::as_ref)
    }

    /// Parse `Owner#name` / `Owner.name` into an owner known to this image.
    ///
    /// `Owner.name` prefers the singleton side and falls back to a scope.
    pub fn parse_target(&self, target: &str) -> Option<(Owner, String)> {
        let (split, kinds): (usize, &[OwnerKind]) = if let Some(i) = target.rfind('#') {
            (i, &[OwnerKind::Class, OwnerKind::Module])
        } else {
            (
                target.rfind('.')?,
                &[OwnerKind::Singleton, OwnerKind::Scope],
            )
        };
        let (owner_name, name) = (&target[..split], &target[split + 1..]);
        if owner_name.is_empty() || name.is_empty() {
            return None;
        }

        kinds
            .iter()
            .map(|kind| Owner::new(owner_name, *kind))
            .find(|owner| self.owners.contains_key(owner))
            .map(|owner| (owner, name.to_string()))
    }
}

fn rebase(locator: SourceLocator, base: &Path) -> SourceLocator {
    if locator.path.is_relative() && !is_pseudo_location(&locator.path) {
        SourceLocator::new(base.join(&locator.path), locator.line)
    } else {
        locator
    }
}

impl ReflectionSurface for RuntimeImage {
    fn handle(&self, owner: &Owner, name: &str) -> Option<CallableHandle> {
        let table = self.owners.get(owner)?;
        let method = table.get(name)?;
        let handle = CallableHandle::new(
            owner.clone(),
            name,
            method.implementation.clone(),
            table.clone(),
        );
        Some(match &method.locator {
            Some(locator) => handle.with_locator(locator.clone()),
            None => handle,
        })
    }

    fn owners(&self) -> Vec<Owner> {
        let mut owners: Vec<Owner> = self.owners.keys().cloned().collect();
        owners.sort_by(|a, b| a.name.cmp(&b.name).then(a.to_string().cmp(&b.to_string())));
        owners
    }
}
