//! The resolution pipeline: classify, extract or look up, then merge
//! visibility and aliases into a [`MethodDescriptor`].

mod classify;
mod visibility;

pub use classify::{Origin, Synthesized, classify, is_pseudo_location};
pub use visibility::{aliases_of, visibility_of};

use crate::config::Settings;
use crate::error::ResolveResult;
use crate::extract::SourceExtractor;
use crate::fallback::{DocProvider, unavailable_placeholder};
use crate::reflect::CallableHandle;
use crate::types::{MethodDescriptor, Owner};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const DEFAULT_MAX_FILE_BYTES: u64 = 4 * 1024 * 1024;

/// Resolves callable handles into method descriptors.
///
/// Holds configuration only; every call is independent and read-only.
#[derive(Clone)]
pub struct Resolver {
    extractor: SourceExtractor,
    provider: Option<Arc<dyn DocProvider>>,
    tool: String,
    install: String,
    max_file_bytes: u64,
}

impl Resolver {
    pub fn new(extractor: SourceExtractor) -> Self {
        Self {
            extractor,
            provider: None,
            tool: "pry-doc".to_string(),
            install: "gem install pry-doc".to_string(),
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let mut resolver = Self::new(SourceExtractor::from_settings(settings));
        resolver.tool = settings.fallback.tool.clone();
        resolver.install = settings.fallback.install.clone();
        resolver.max_file_bytes = settings.extraction.max_file_bytes;
        resolver
    }

    pub fn with_provider(mut self, provider: Arc<dyn DocProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    /// Resolve one handle. Fails as a whole; never returns a partial descriptor.
    pub fn resolve(&self, handle: &CallableHandle) -> ResolveResult<MethodDescriptor> {
        let origin = classify(handle.locator(), self.max_file_bytes)?;
        debug!(method = %handle.qualified_name(), ?origin, "classified");

        let (docstring, source) = match origin {
            Origin::FileBacked { path, line, text } => self.from_file(&path, &text, line)?,
            Origin::Primitive => self.from_provider(handle.owner(), handle.name()),
            Origin::Synthesized(reason) => Self::synthesized(&reason),
        };

        let table = handle.table();
        Ok(MethodDescriptor {
            docstring,
            source,
            aliases: aliases_of(table, handle.name(), handle.implementation()),
            visibility: visibility_of(table, handle.name()),
        })
    }

    fn from_file(
        &self,
        path: &Path,
        text: &str,
        line: u32,
    ) -> ResolveResult<(String, Option<String>)> {
        let extraction = self.extractor.extract(path, text, line)?;
        Ok((extraction.docstring, Some(extraction.source)))
    }

    fn from_provider(&self, owner: &Owner, name: &str) -> (String, Option<String>) {
        let Some(provider) = &self.provider else {
            debug!(method = %owner.qualify(name), tool = %self.tool, "no documentation provider installed");
            return (unavailable_placeholder(&self.tool, &self.install), None);
        };

        match provider.lookup(owner, name) {
            Some(entry) => (entry.docstring, entry.source),
            None => {
                debug!(method = %owner.qualify(name), "no stored documentation");
                (String::new(), None)
            }
        }
    }

    fn synthesized(reason: &Synthesized) -> (String, Option<String>) {
        let source = match reason {
            Synthesized::PseudoLocation(tag) => format!(
                "# This method was defined outside of a source file (at {tag}).\n"
            ),
            Synthesized::Unreadable { path, reason } => format!(
                "# {} could not be read ({reason}).\n\
                 # Treating this method as defined outside of a source file.\n",
                path.display()
            ),
        };
        (String::new(), Some(source))
    }
}

impl Default for Resolver {
    fn default() -> Self {
        Self::new(SourceExtractor::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{DocEntry, DocStore};
    use crate::reflect::{BoundMethod, OwnerTable};
    use crate::types::{ImplId, OwnerKind, SourceLocator, Visibility};
    use std::fs;
    use tempfile::TempDir;

    fn handle_for(name: &str, locator: Option<SourceLocator>) -> CallableHandle {
        let mut table = OwnerTable::new(OwnerKind::Class);
        table.bind(BoundMethod {
            name: name.to_string(),
            visibility: Visibility::Public,
            implementation: ImplId::new("impl"),
            locator: locator.clone(),
        });
        let handle = CallableHandle::new(
            Owner::new("String", OwnerKind::Class),
            name,
            ImplId::new("impl"),
            Arc::new(table),
        );
        match locator {
            Some(locator) => handle.with_locator(locator),
            None => handle,
        }
    }

    #[test]
    fn test_primitive_without_provider_mentions_tool() {
        let descriptor = Resolver::default().resolve(&handle_for("gsub", None)).unwrap();
        assert!(descriptor.docstring.contains("pry-doc"));
        assert!(descriptor.source.is_none());
    }

    #[test]
    fn test_primitive_with_provider() {
        let store = DocStore::from_entries([(
            "String#gsub".to_string(),
            DocEntry {
                docstring: "Returns a copy of str.\n".to_string(),
                source: Some("static VALUE\nrb_str_gsub()\n".to_string()),
            },
        )]);
        let resolver = Resolver::default().with_provider(Arc::new(store));
        assert!(resolver.has_provider());

        let gsub = resolver.resolve(&handle_for("gsub", None)).unwrap();
        assert_eq!(gsub.docstring, "Returns a copy of str.\n");
        assert_eq!(gsub.source.as_deref(), Some("static VALUE\nrb_str_gsub()\n"));

        let sub = resolver.resolve(&handle_for("sub", None)).unwrap();
        assert_eq!(sub.docstring, "");
        assert!(sub.source.is_none());
    }

    #[test]
    fn test_eval_location_is_synthesized() {
        let handle = handle_for("foo", Some(SourceLocator::new("(eval)", 1)));
        let descriptor = Resolver::default().resolve(&handle).unwrap();
        assert!(descriptor.docstring.is_empty());
        assert!(
            descriptor
                .source
                .unwrap()
                .contains("outside of a source file")
        );
    }

    #[test]
    fn test_file_backed_resolution_is_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("string_ext.rb");
        fs::write(&path, "class String\n  # Shouts.\n  def shout; upcase; end\nend\n").unwrap();

        let handle = handle_for("shout", Some(SourceLocator::new(&path, 3)));
        let resolver = Resolver::default();
        let first = resolver.resolve(&handle).unwrap();
        let second = resolver.resolve(&handle).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.docstring, "Shouts.\n");
        assert_eq!(first.source.as_deref(), Some("def shout; upcase; end\n"));
        assert_eq!(first.visibility, Visibility::Public);
        assert!(first.aliases.is_empty());
    }

    #[test]
    fn test_stale_location_fails_whole_call() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("short.rb");
        fs::write(&path, "def a; end\n").unwrap();

        let handle = handle_for("a", Some(SourceLocator::new(&path, 9)));
        let err = Resolver::default().resolve(&handle).unwrap_err();
        assert!(err.is_stale());
    }
}
