//! Source extraction for file-backed callables.
//!
//! Given file text and a 1-based starting line, finds the minimal unit that
//! starts there ([`extent`]) and the comment block immediately above it
//! ([`comments`]). Which lexical rules apply is chosen per file extension.

pub mod comments;
pub mod extent;
pub mod syntax;

pub use extent::{ExtentError, ExtentScanner};
pub use syntax::Syntax;

use crate::config::Settings;
use crate::error::{ResolveError, ResolveResult};
use std::path::Path;
use tracing::debug;

/// Docstring and source text of one extracted unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    pub docstring: String,
    pub source: String,
}

#[derive(Debug, Clone)]
struct Language {
    extensions: Vec<String>,
    syntax: Syntax,
}

#[derive(Debug, Clone)]
pub struct SourceExtractor {
    languages: Vec<Language>,
    default_syntax: Syntax,
    dedent_source: bool,
}

impl SourceExtractor {
    pub fn new(default_syntax: Syntax) -> Self {
        Self {
            languages: Vec::new(),
            default_syntax,
            dedent_source: true,
        }
    }

    /// Build from the `[extraction]` and `[languages]` settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let default_syntax = settings
            .languages
            .get(&settings.extraction.default_syntax)
            .map(|lang| lang.syntax.clone())
            .unwrap_or_default();

        let mut extractor =
            Self::new(default_syntax).with_dedent_source(settings.extraction.dedent_source);
        for lang in settings.languages.values().filter(|lang| lang.enabled) {
            extractor = extractor.with_language(lang.extensions.clone(), lang.syntax.clone());
        }
        extractor
    }

    pub fn with_language(mut self, extensions: Vec<String>, syntax: Syntax) -> Self {
        self.languages.push(Language { extensions, syntax });
        self
    }

    pub fn with_dedent_source(mut self, dedent_source: bool) -> Self {
        self.dedent_source = dedent_source;
        self
    }

    /// Syntax registered for the file's extension, or the default.
    pub fn syntax_for(&self, path: &Path) -> &Syntax {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return &self.default_syntax;
        };
        self.languages
            .iter()
            .find(|lang| lang.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .map(|lang| &lang.syntax)
            .unwrap_or(&self.default_syntax)
    }

    /// Extract the unit starting at 1-based `line` of `text`, read from `path`.
    pub fn extract(&self, path: &Path, text: &str, line: u32) -> ResolveResult<Extraction> {
        let lines: Vec<&str> = text.lines().collect();
        let start = (line as usize)
            .checked_sub(1)
            .filter(|start| *start < lines.len())
            .ok_or_else(|| ResolveError::StaleLocation {
                path: path.to_path_buf(),
                line,
                line_count: lines.len(),
            })?;

        let syntax = self.syntax_for(path);
        let end = ExtentScanner::new(syntax)
            .find_end(&lines, start)
            .map_err(|e| ResolveError::AmbiguousExtent {
                path: path.to_path_buf(),
                line,
                reason: e.to_string(),
            })?;
        debug!(path = %path.display(), start = line, end = end + 1, "extracted unit");

        let body = &lines[start..=end];
        let body = if self.dedent_source {
            dedent(body)
        } else {
            body.to_vec()
        };

        Ok(Extraction {
            docstring: comments::leading_comment(&lines, start, &syntax.comment),
            source: body.iter().map(|l| format!("{l}\n")).collect(),
        })
    }
}

impl Default for SourceExtractor {
    fn default() -> Self {
        Self::new(Syntax::ruby()).with_language(vec!["rb".to_string()], Syntax::ruby())
    }
}

/// Strip the indentation shared by all non-blank lines.
pub(crate) fn dedent<'a>(lines: &[&'a str]) -> Vec<&'a str> {
    let indent_of = |line: &str| line.len() - line.trim_start_matches([' ', '\t']).len();
    let common = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|&line| indent_of(line))
        .min()
        .unwrap_or(0);

    lines
        .iter()
        .map(|&line| {
            if line.trim().is_empty() {
                ""
            } else {
                &line[common..]
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn extract(text: &str, line: u32) -> ResolveResult<Extraction> {
        SourceExtractor::default().extract(&PathBuf::from("sample.rb"), text, line)
    }

    #[test]
    fn test_one_line_definition_with_comment() {
        let text = "\
class Foo
  # Some words.
  def quux(a, *b, &c); end
end
";
        let extraction = extract(text, 3).unwrap();
        assert_eq!(extraction.docstring, "Some words.\n");
        assert_eq!(extraction.source, "def quux(a, *b, &c); end\n");
    }

    #[test]
    fn test_multi_line_body_keeps_relative_indent() {
        let text = "\
module Util
  def twice(x)
    x * 2
  end
end
";
        let extraction = extract(text, 2).unwrap();
        assert_eq!(extraction.source, "def twice(x)\n  x * 2\nend\n");
        assert_eq!(extraction.docstring, "");
    }

    #[test]
    fn test_exact_text_without_dedent() {
        let text = "class A\n  def b; end\nend\n";
        let extraction = SourceExtractor::default()
            .with_dedent_source(false)
            .extract(&PathBuf::from("a.rb"), text, 2)
            .unwrap();
        assert_eq!(extraction.source, "  def b; end\n");
    }

    #[test]
    fn test_line_out_of_range_is_stale() {
        let err = extract("def a; end\n", 5).unwrap_err();
        assert!(matches!(
            err,
            ResolveError::StaleLocation {
                line: 5,
                line_count: 1,
                ..
            }
        ));
        assert!(extract("def a; end\n", 0).unwrap_err().is_stale());
    }

    #[test]
    fn test_truncated_file_is_ambiguous() {
        let err = extract("def a\n  if b\n", 1).unwrap_err();
        assert!(matches!(err, ResolveError::AmbiguousExtent { line: 1, .. }));
    }

    #[test]
    fn test_syntax_selected_by_extension() {
        let extractor = SourceExtractor::default()
            .with_language(vec!["rs".to_string()], Syntax::brace());
        assert_eq!(extractor.syntax_for(Path::new("x.rs")).comment, "//");
        assert_eq!(extractor.syntax_for(Path::new("x.RB")).comment, "#");
        assert_eq!(extractor.syntax_for(Path::new("Rakefile")).comment, "#");

        let text = "/// Adds.\nfn add(a: i32, b: i32) -> i32 {\n    a + b\n}\n";
        let extraction = extractor.extract(Path::new("x.rs"), text, 2).unwrap();
        assert_eq!(extraction.docstring, "Adds.\n");
        assert_eq!(extraction.source.lines().count(), 3);
    }

    #[test]
    fn test_dedent_ignores_blank_lines() {
        let lines = vec!["    a", "", "      b", "   "];
        assert_eq!(dedent(&lines), vec!["a", "", "  b", ""]);
    }
}
