//! Picks a resolution strategy from the shape of a callable's location.

use crate::error::{ResolveError, ResolveResult};
use crate::types::SourceLocator;
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Location tags runtimes report for code that never lived in a file:
/// `(eval)`, `(irb)`, `<internal:kernel>`, `-e`.
static PSEUDO_LOCATION: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\(.*\)|<.*>|-e|-)$").ok());

/// True when `path` is a location tag rather than a filesystem path.
pub fn is_pseudo_location(path: &Path) -> bool {
    let Some(text) = path.to_str() else {
        return false;
    };
    let text = text.trim();
    text.is_empty()
        || PSEUDO_LOCATION
            .as_ref()
            .is_some_and(|re| re.is_match(text))
}

/// Why a callable has no extractable source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Synthesized {
    /// The locator is a tag such as `(eval)`
    PseudoLocation(String),
    /// The file exists but could not be read as text
    Unreadable { path: PathBuf, reason: String },
}

/// Resolution strategy, selected once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// Readable file: extract source and comments from `text`
    FileBacked {
        path: PathBuf,
        line: u32,
        text: String,
    },
    /// No location at all: ask the fallback documentation provider
    Primitive,
    /// Location exists in form only
    Synthesized(Synthesized),
}

/// Classify a handle's locator. Reads the file once for file-backed callables.
///
/// A missing file is a stale location; any other read failure means the
/// callable is treated as synthesized.
pub fn classify(locator: Option<&SourceLocator>, max_file_bytes: u64) -> ResolveResult<Origin> {
    let Some(locator) = locator else {
        debug!("no location reported, treating as primitive");
        return Ok(Origin::Primitive);
    };

    if is_pseudo_location(&locator.path) {
        debug!(tag = %locator.path.display(), "pseudo location");
        return Ok(Origin::Synthesized(Synthesized::PseudoLocation(
            locator.path.display().to_string(),
        )));
    }

    let path = &locator.path;
    let unreadable = |reason: String| {
        warn!(path = %path.display(), %reason, "source file unreadable");
        Ok(Origin::Synthesized(Synthesized::Unreadable {
            path: path.clone(),
            reason,
        }))
    };

    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            return Err(ResolveError::MissingFile { path: path.clone() });
        }
        Err(e) => return unreadable(e.to_string()),
    };
    if metadata.is_dir() {
        return unreadable("is a directory".to_string());
    }
    if metadata.len() > max_file_bytes {
        return unreadable(format!(
            "file is {} bytes, limit is {max_file_bytes}",
            metadata.len()
        ));
    }

    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Origin::FileBacked {
            path: path.clone(),
            line: locator.line,
            text,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            Err(ResolveError::MissingFile { path: path.clone() })
        }
        Err(e) => unreadable(e.to_string()),
    }
}
