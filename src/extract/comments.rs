//! Backward scan for the comment block directly above a definition.

use super::dedent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    InCommentBlock,
    Body,
}

/// Text of a comment line with the marker removed, or `None` for code and blank lines.
fn comment_text<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.trim_start().strip_prefix(marker)?;
    let repeated = marker.chars().last().unwrap_or_default();
    Some(rest.trim_start_matches(repeated).trim_end())
}

/// Directive keys Ruby reads from the first comment block of a file.
const MAGIC_KEYS: &[&str] = &[
    "frozen_string_literal",
    "encoding",
    "coding",
    "warn_indent",
    "shareable_constant_value",
];

/// A `key: value` or `-*- ... -*-` directive rather than documentation.
fn is_magic_comment(text: &str) -> bool {
    text.starts_with("-*-")
        || MAGIC_KEYS.iter().any(|key| {
            text.strip_prefix(key)
                .is_some_and(|rest| rest.trim_start().starts_with(':'))
        })
}

/// Collects the contiguous comment lines immediately above `start` (0-based).
///
/// Stops at the first line that is not a comment; that line is never
/// consumed. Returns an empty string when no comment precedes the unit,
/// otherwise newline-terminated lines in file order, dedented. A block that
/// reaches the top of the file loses its leading shebang and magic comments.
pub fn leading_comment(lines: &[&str], start: usize, marker: &str) -> String {
    let mut collected = Vec::new();
    let mut state = ScanState::InCommentBlock;
    let limit = start.min(lines.len());
    let mut above = lines[..limit].iter().rev();

    while state == ScanState::InCommentBlock {
        state = match above.next().and_then(|line| comment_text(line, marker)) {
            Some(text) => {
                collected.push(text);
                ScanState::InCommentBlock
            }
            None => ScanState::Body,
        };
    }

    collected.reverse();

    if limit > 0 && collected.len() == limit {
        let shebang = usize::from(lines[0].starts_with("#!"));
        let magic = shebang
            + collected[shebang..]
                .iter()
                .take_while(|text| is_magic_comment(text))
                .count();
        if magic > 0 {
            let blank = collected[magic..].iter().take_while(|text| text.is_empty()).count();
            collected.drain(..magic + blank);
        }
    }
    if collected.is_empty() {
        return String::new();
    }

    let mut doc = dedent(&collected).join("\n");
    doc.push('\n');
    doc
}
