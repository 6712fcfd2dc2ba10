//! Delimiter tables describing how a language opens and closes definitions.

use serde::{Deserialize, Serialize};

/// Lexical rules the extent scanner and comment scan need for one language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syntax {
    /// Line comment marker
    #[serde(default = "default_comment")]
    pub comment: String,

    /// Keywords that always open a block closed by `closer`
    #[serde(default)]
    pub openers: Vec<String>,

    /// Keywords that open a block only at the start of a statement
    /// (`x if y` is a modifier, `if y` is a block)
    #[serde(default)]
    pub statement_openers: Vec<String>,

    /// Loop keywords whose optional trailing `do` belongs to the loop itself
    #[serde(default)]
    pub loop_keywords: Vec<String>,

    /// Keyword that closes a keyword-opened block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closer: Option<String>,

    /// Keyword introducing a method definition; the token after it is a name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,

    /// Bracket pairs as two-character strings, e.g. `"()"`
    #[serde(default = "default_brackets")]
    pub brackets: Vec<String>,

    /// Characters that delimit string literals
    #[serde(default = "default_quotes")]
    pub quotes: String,

    /// `<<~TAG` heredoc literals
    #[serde(default)]
    pub heredocs: bool,

    /// `/pattern/` literals where an operand is expected
    #[serde(default)]
    pub regex_literals: bool,

    /// A unit must open at least one block before it can end
    #[serde(default)]
    pub body_required: bool,
}

fn default_comment() -> String {
    "#".to_string()
}
fn default_brackets() -> Vec<String> {
    vec!["()".to_string(), "[]".to_string(), "{}".to_string()]
}
fn default_quotes() -> String {
    "\"'".to_string()
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

impl Syntax {
    /// Keyword-pair syntax: `def ... end`, `#` comments.
    pub fn ruby() -> Self {
        Self {
            comment: "#".to_string(),
            openers: words(&["def", "class", "module", "do", "begin", "case", "for"]),
            statement_openers: words(&["if", "unless", "while", "until"]),
            loop_keywords: words(&["while", "until", "for"]),
            closer: Some("end".to_string()),
            definition: Some("def".to_string()),
            brackets: default_brackets(),
            quotes: "\"'`".to_string(),
            heredocs: true,
            regex_literals: true,
            body_required: false,
        }
    }

    /// Brace-delimited syntax: `fn name() { ... }`, `//` comments.
    pub fn brace() -> Self {
        Self {
            comment: "//".to_string(),
            openers: Vec::new(),
            statement_openers: Vec::new(),
            loop_keywords: Vec::new(),
            closer: None,
            definition: None,
            brackets: default_brackets(),
            quotes: "\"".to_string(),
            heredocs: false,
            regex_literals: false,
            body_required: true,
        }
    }

    /// Closing character for an opening bracket, if `c` opens one.
    pub fn closing_bracket(&self, c: char) -> Option<char> {
        self.brackets.iter().find_map(|pair| {
            let mut chars = pair.chars();
            match (chars.next(), chars.next()) {
                (Some(open), Some(close)) if open == c => Some(close),
                _ => None,
            }
        })
    }

    pub fn is_closing_bracket(&self, c: char) -> bool {
        self.brackets.iter().any(|pair| pair.chars().nth(1) == Some(c))
    }

    pub fn is_opener(&self, word: &str) -> bool {
        self.openers.iter().any(|w| w == word)
    }

    pub fn is_statement_opener(&self, word: &str) -> bool {
        self.statement_openers.iter().any(|w| w == word)
    }

    pub fn is_loop_keyword(&self, word: &str) -> bool {
        self.loop_keywords.iter().any(|w| w == word)
    }

    pub fn is_closer(&self, word: &str) -> bool {
        self.closer.as_deref() == Some(word)
    }

    pub fn is_definition(&self, word: &str) -> bool {
        self.definition.as_deref() == Some(word)
    }
}

impl Default for Syntax {
    fn default() -> Self {
        Self::ruby()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_lookup() {
        let syntax = Syntax::ruby();
        assert_eq!(syntax.closing_bracket('('), Some(')'));
        assert_eq!(syntax.closing_bracket('{'), Some('}'));
        assert_eq!(syntax.closing_bracket('<'), None);
        assert!(syntax.is_closing_bracket(']'));
        assert!(!syntax.is_closing_bracket('['));
    }

    #[test]
    fn test_keyword_classes() {
        let syntax = Syntax::ruby();
        assert!(syntax.is_opener("def"));
        assert!(syntax.is_statement_opener("unless"));
        assert!(!syntax.is_opener("if"));
        assert!(syntax.is_loop_keyword("while"));
        assert!(syntax.is_closer("end"));
        assert!(syntax.is_definition("def"));

        let brace = Syntax::brace();
        assert!(!brace.is_closer("end"));
        assert!(brace.body_required);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let syntax: Syntax = toml::from_str(
            r#"
comment = "--"
openers = ["function"]
closer = "end"
"#,
        )
        .unwrap();

        assert_eq!(syntax.comment, "--");
        assert!(syntax.is_opener("function"));
        assert_eq!(syntax.brackets.len(), 3);
        assert_eq!(syntax.quotes, "\"'");
        assert!(!syntax.body_required);
        assert!(!syntax.regex_literals);
    }
}
