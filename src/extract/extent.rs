//! Line-oriented scanner that finds where a definition ends.
//!
//! This is not a parser. It tracks just enough lexical state (string
//! literals, heredocs, comments, keyword blocks and bracket pairs) to match
//! the closer of the unit that begins on a given line.

use super::syntax::Syntax;
use regex::Regex;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtentError {
    /// A closer with nothing open, or one closing the wrong kind of block
    Unbalanced { line: usize, found: String },
    /// Input ran out with blocks, strings or heredocs still open
    Unterminated { open: usize },
}

impl fmt::Display for ExtentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtentError::Unbalanced { line, found } => {
                write!(f, "unexpected '{found}' on line {}", line + 1)
            }
            ExtentError::Unterminated { open } => {
                write!(f, "reached end of file with {open} unclosed block(s)")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Keyword,
    Bracket(char),
}

/// What came before the current token within the statement.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Prev {
    #[default]
    Start,
    Punct(char),
    Word(String),
    Value,
}

/// Words after which the next token starts a fresh statement.
const STATEMENT_WORDS: &[&str] = &["then", "do", "else", "begin", "ensure", "and", "or", "not"];

/// Words after which `/` opens a regex rather than dividing.
const OPERAND_WORDS: &[&str] = &["if", "elsif", "unless", "while", "until", "when", "return"];

#[derive(Debug, Default)]
struct ScanState {
    stack: Vec<Frame>,
    string: Option<char>,
    heredocs: Vec<Heredoc>,
    opened_body: bool,
    prev: Prev,
    loop_pending: bool,
    expect_name: bool,
}

#[derive(Debug)]
struct Heredoc {
    terminator: String,
    indented: bool,
}

impl ScanState {
    fn open(&self) -> usize {
        self.stack.len() + usize::from(self.string.is_some()) + self.heredocs.len()
    }

    fn at_statement_start(&self) -> bool {
        match &self.prev {
            Prev::Start | Prev::Punct(_) => true,
            Prev::Word(word) => STATEMENT_WORDS.contains(&word.as_str()),
            Prev::Value => false,
        }
    }

    fn expects_operand(&self) -> bool {
        match &self.prev {
            Prev::Word(word) if OPERAND_WORDS.contains(&word.as_str()) => true,
            _ => self.at_statement_start(),
        }
    }

    fn new_line(&mut self) {
        self.loop_pending = false;
        self.expect_name = false;
        if !matches!(self.prev, Prev::Punct(_)) {
            self.prev = Prev::Start;
        }
    }
}

/// How a scanned line ends, looking only at code (not comments).
#[derive(Debug, Default)]
struct LineEnd {
    continues: bool,
    terminated: bool,
}

pub struct ExtentScanner<'a> {
    syntax: &'a Syntax,
    endless: Option<Regex>,
    heredoc: Option<Regex>,
}

impl<'a> ExtentScanner<'a> {
    pub fn new(syntax: &'a Syntax) -> Self {
        let endless = syntax.definition.as_ref().and_then(|keyword| {
            Regex::new(&format!(
                r"^{}\s+\S+?(\([^)]*\))?\s*=(\s|$)",
                regex::escape(keyword)
            ))
            .ok()
        });
        let heredoc = syntax
            .heredocs
            .then(|| Regex::new(r#"^<<([~-]?)(["'`]?)([A-Za-z_][A-Za-z0-9_]*)"#).ok())
            .flatten();

        Self {
            syntax,
            endless,
            heredoc,
        }
    }

    /// Index of the last line of the unit starting at `start` (both 0-based).
    pub fn find_end(&self, lines: &[&str], start: usize) -> Result<usize, ExtentError> {
        let mut state = ScanState::default();
        let mut end = LineEnd::default();

        for (index, line) in lines.iter().enumerate().skip(start) {
            // A heredoc terminator can be the last line of the unit
            if !self.consume_heredoc_line(line, &mut state) {
                end = self.scan_line(line, index, &mut state)?;
            }

            let balanced = state.open() == 0;
            let has_body =
                !self.syntax.body_required || state.opened_body || end.terminated;

            if balanced && has_body && !end.continues {
                return Ok(index);
            }
            state.new_line();
        }

        Err(ExtentError::Unterminated { open: state.open() })
    }

    /// Skips a line belonging to a pending heredoc body. Returns true if consumed.
    fn consume_heredoc_line(&self, line: &str, state: &mut ScanState) -> bool {
        let Some(pending) = state.heredocs.first() else {
            return false;
        };

        let candidate = if pending.indented {
            line.trim()
        } else {
            line.trim_end()
        };
        if candidate == pending.terminator {
            state.heredocs.remove(0);
        }
        true
    }

    fn scan_line(
        &self,
        line: &str,
        index: usize,
        state: &mut ScanState,
    ) -> Result<LineEnd, ExtentError> {
        let chars: Vec<char> = line.chars().collect();
        let comment: Vec<char> = self.syntax.comment.chars().collect();
        let mut last_code: Option<char> = None;
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];

            if let Some(quote) = state.string {
                if c == '\\' {
                    i += 2;
                    continue;
                }
                if c == quote {
                    state.string = None;
                    state.prev = Prev::Value;
                }
                i += 1;
                continue;
            }

            if !comment.is_empty() && chars[i..].starts_with(&comment) {
                break;
            }
            if c.is_whitespace() {
                i += 1;
                continue;
            }
            last_code = Some(c);

            if self.syntax.quotes.contains(c) {
                state.string = Some(c);
                i += 1;
                continue;
            }

            if c == '/' && self.syntax.regex_literals && state.expects_operand() {
                // scanned like a string closed by the next unescaped '/'
                state.string = Some(c);
                i += 1;
                continue;
            }

            if c == '\'' {
                // char literal in syntaxes where ' is not a string quote
                let at = i;
                let ahead = |n: usize| chars.get(at + n).copied();
                let skip = match (ahead(1), ahead(2), ahead(3)) {
                    (Some('\\'), _, Some('\'')) => 4,
                    (Some(_), Some('\''), _) => 3,
                    _ => 1,
                };
                i += skip;
                state.prev = Prev::Value;
                continue;
            }

            if c == '<' && chars.get(i + 1) == Some(&'<') {
                if let Some(len) = self.open_heredoc(&chars[i..], state) {
                    i += len;
                    last_code = chars.get(i.saturating_sub(1)).copied();
                    continue;
                }
            }

            if c == '@' || c == '$' {
                while i < chars.len() && (chars[i] == '@' || chars[i] == '$') {
                    i += 1;
                }
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                state.prev = Prev::Value;
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                let begin = i;
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                if i < chars.len() && matches!(chars[i], '?' | '!') && chars.get(i + 1) != Some(&'=')
                {
                    i += 1;
                }
                let word: String = chars[begin..i].iter().collect();
                last_code = chars.get(i - 1).copied();
                self.on_word(&word, &chars, begin, i, index, state)?;
                continue;
            }

            if c.is_ascii_digit() {
                while i < chars.len() && is_ident_char(chars[i]) {
                    i += 1;
                }
                state.prev = Prev::Value;
                continue;
            }

            if let Some(close) = self.syntax.closing_bracket(c) {
                state.stack.push(Frame::Bracket(close));
                if c == '{' {
                    state.opened_body = true;
                }
                state.prev = Prev::Punct(c);
                i += 1;
                continue;
            }

            if self.syntax.is_closing_bracket(c) {
                match state.stack.pop() {
                    Some(Frame::Bracket(expected)) if expected == c => {}
                    _ => {
                        return Err(ExtentError::Unbalanced {
                            line: index,
                            found: c.to_string(),
                        });
                    }
                }
                state.prev = Prev::Value;
                i += 1;
                continue;
            }

            if c == ';' {
                state.loop_pending = false;
            }
            state.prev = Prev::Punct(c);
            i += 1;
        }

        Ok(LineEnd {
            continues: matches!(last_code, Some('\\') | Some(',')),
            terminated: last_code == Some(';'),
        })
    }

    /// Registers a heredoc opened at the start of `rest`, returning its token length.
    fn open_heredoc(&self, rest: &[char], state: &mut ScanState) -> Option<usize> {
        // `a << b` is an append, not a heredoc
        if matches!(state.prev, Prev::Value | Prev::Word(_)) && !state.at_statement_start() {
            let text: String = rest.iter().take(3).collect();
            if !text.ends_with(['~', '-']) {
                return None;
            }
        }

        let text: String = rest.iter().collect();
        let captures = self.heredoc.as_ref()?.captures(&text)?;
        let whole = captures.get(0)?;
        let quote = captures.get(2).map(|m| m.as_str()).unwrap_or_default();
        if !quote.is_empty() && !text[whole.end()..].starts_with(quote) {
            return None;
        }

        state.heredocs.push(Heredoc {
            terminator: captures.get(3)?.as_str().to_string(),
            indented: captures.get(1).is_some_and(|m| !m.as_str().is_empty()),
        });
        state.prev = Prev::Value;

        Some(whole.as_str().chars().count() + quote.chars().count())
    }

    fn on_word(
        &self,
        word: &str,
        chars: &[char],
        begin: usize,
        after: usize,
        index: usize,
        state: &mut ScanState,
    ) -> Result<(), ExtentError> {
        let before = begin.checked_sub(1).map(|j| chars[j]);
        let next = chars.get(after).copied();
        let next2 = chars.get(after + 1).copied();

        let method_call = before == Some('.');
        let symbol = before == Some(':');
        let label = next == Some(':') && next2 != Some(':');

        if state.expect_name || method_call || symbol || label {
            state.expect_name = false;
            state.prev = Prev::Value;
            return Ok(());
        }

        let syntax = self.syntax;

        if syntax.is_definition(word) {
            state.expect_name = true;
            state.prev = Prev::Word(word.to_string());
            let rest: String = chars[begin..].iter().collect();
            if !self.endless.as_ref().is_some_and(|re| re.is_match(&rest)) {
                state.stack.push(Frame::Keyword);
                state.opened_body = true;
            }
            return Ok(());
        }

        if syntax.is_closer(word) {
            match state.stack.pop() {
                Some(Frame::Keyword) => {}
                _ => {
                    return Err(ExtentError::Unbalanced {
                        line: index,
                        found: word.to_string(),
                    });
                }
            }
            state.prev = Prev::Value;
            return Ok(());
        }

        let opens = if state.loop_pending && syntax.is_opener(word) && !syntax.is_loop_keyword(word)
        {
            // `while cond do`: the do belongs to the loop
            state.loop_pending = false;
            false
        } else if syntax.is_statement_opener(word) {
            state.at_statement_start()
        } else {
            syntax.is_opener(word)
        };

        if opens {
            state.stack.push(Frame::Keyword);
            state.opened_body = true;
            if syntax.is_loop_keyword(word) {
                state.loop_pending = true;
            }
        }
        state.prev = Prev::Word(word.to_string());
        Ok(())
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
