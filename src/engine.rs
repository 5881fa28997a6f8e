//! Line classification engine.
//!
//! A small lexer that walks each physical line character by character and
//! carries its state from one line to the next. It understands exactly the
//! delimiters a [`LanguageProfile`] declares and nothing else.

use std::fmt;
use std::ops::{Add, AddAssign};

use crate::profiles::{LanguageProfile, Opener};

/// Category assigned to one physical line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Code,
}

/// Per-file totals. `blank + comment + code` always equals the number of
/// physical lines fed to the scanner.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LineCounts {
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

impl LineCounts {
    pub fn total(&self) -> u64 {
        self.blank + self.comment + self.code
    }

    fn record(&mut self, kind: LineKind) {
        match kind {
            LineKind::Blank => self.blank += 1,
            LineKind::Comment => self.comment += 1,
            LineKind::Code => self.code += 1,
        }
    }
}

impl AddAssign for LineCounts {
    fn add_assign(&mut self, other: Self) {
        self.blank += other.blank;
        self.comment += other.comment;
        self.code += other.code;
    }
}

impl Add for LineCounts {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

/// State carried from the end of one line to the start of the next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Code,
    InBlockComment { pair: usize, depth: usize },
    InString { quote: usize },
}

/// A region still open when the file ended. Never fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanAnomaly {
    UnterminatedBlockComment { line: usize, delimiter: &'static str },
    UnterminatedString { line: usize, delimiter: &'static str },
}

impl fmt::Display for ScanAnomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanAnomaly::UnterminatedBlockComment { line, delimiter } => write!(
                f,
                "block comment `{}` opened at line {} is never closed",
                delimiter, line
            ),
            ScanAnomaly::UnterminatedString { line, delimiter } => write!(
                f,
                "string `{}` opened at line {} is never closed",
                delimiter, line
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub counts: LineCounts,
    pub tags: Vec<LineKind>,
    pub anomaly: Option<ScanAnomaly>,
}

/// Classify every line of one file against one language profile.
pub fn classify<I>(lines: I, profile: &LanguageProfile) -> Classification
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    let mut scanner = Scanner::new(profile);
    for line in lines {
        scanner.feed_line(line.as_ref());
    }
    scanner.finish()
}

#[derive(Debug, Default, Clone, Copy)]
struct LineMarks {
    code: bool,
    comment: bool,
    // Characters of a docstring candidate whose fate is not yet known.
    doc: bool,
    // Line began inside a block comment.
    carried_comment: bool,
    whitespace_only: bool,
}

impl LineMarks {
    fn kind(&self) -> LineKind {
        if self.code {
            LineKind::Code
        } else if self.comment || self.carried_comment || self.doc {
            LineKind::Comment
        } else if self.whitespace_only {
            LineKind::Blank
        } else {
            LineKind::Code
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DocLiteral {
    None,
    Open { first_line: usize },
    // Closer seen on the current line; decided at end of line.
    Closed { first_line: usize },
}

enum Step {
    Advance(usize),
    EndOfLine,
}

/// Streaming form of [`classify`]: feed lines one at a time, then finish.
pub struct Scanner<'p> {
    profile: &'p LanguageProfile,
    state: ScanState,
    marks: Vec<LineMarks>,
    region_line: usize,
    doc: DocLiteral,
}

impl<'p> Scanner<'p> {
    pub fn new(profile: &'p LanguageProfile) -> Self {
        Self {
            profile,
            state: ScanState::Code,
            marks: Vec::new(),
            region_line: 0,
            doc: DocLiteral::None,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    pub fn feed_line(&mut self, line: &str) {
        let mut marks = LineMarks {
            whitespace_only: line.trim().is_empty(),
            ..LineMarks::default()
        };
        match self.state {
            ScanState::InBlockComment { .. } => marks.carried_comment = true,
            ScanState::InString { .. } => {
                if matches!(self.doc, DocLiteral::Open { .. }) {
                    marks.doc = true;
                } else {
                    marks.code = true;
                }
            }
            ScanState::Code => {
                if self.profile.starts_with_column_one_comment(line) {
                    marks.comment = true;
                    self.marks.push(marks);
                    return;
                }
            }
        }
        self.marks.push(marks);

        let mut pos = 0;
        while pos < line.len() {
            let rest = &line[pos..];
            let step = match self.state {
                ScanState::Code => self.scan_code(rest),
                ScanState::InBlockComment { pair, depth } => self.scan_block(rest, pair, depth),
                ScanState::InString { quote } => self.scan_string(rest, quote),
            };
            match step {
                Step::Advance(n) => pos += n,
                Step::EndOfLine => break,
            }
        }

        if let DocLiteral::Closed { first_line } = self.doc {
            self.resolve_doc(first_line, LineKind::Comment);
        }
    }

    pub fn finish(mut self) -> Classification {
        let anomaly = match self.state {
            ScanState::Code => None,
            ScanState::InBlockComment { pair, .. } => Some(ScanAnomaly::UnterminatedBlockComment {
                line: self.region_line + 1,
                delimiter: self.profile.block_comments[pair].open,
            }),
            ScanState::InString { quote } => Some(ScanAnomaly::UnterminatedString {
                line: self.region_line + 1,
                delimiter: self.profile.quotes[quote].delimiter,
            }),
        };
        match self.doc {
            DocLiteral::Open { first_line } | DocLiteral::Closed { first_line } => {
                self.resolve_doc(first_line, LineKind::Comment)
            }
            DocLiteral::None => {}
        }

        let mut counts = LineCounts::default();
        let tags: Vec<LineKind> = self.marks.iter().map(LineMarks::kind).collect();
        for kind in &tags {
            counts.record(*kind);
        }
        Classification {
            counts,
            tags,
            anomaly,
        }
    }

    fn scan_code(&mut self, rest: &str) -> Step {
        let line = self.marks.len() - 1;
        match self.profile.match_opener(rest) {
            Some(Opener::Line(_)) => {
                self.current().comment = true;
                Step::EndOfLine
            }
            Some(Opener::Block(pair)) => {
                self.current().comment = true;
                self.state = ScanState::InBlockComment { pair, depth: 1 };
                self.region_line = line;
                Step::Advance(self.profile.block_comments[pair].open.len())
            }
            Some(Opener::Quote(quote)) => {
                let q = self.profile.quotes[quote];
                let candidate =
                    q.doc && !self.current().code && self.doc == DocLiteral::None;
                if candidate {
                    self.current().doc = true;
                    self.doc = DocLiteral::Open { first_line: line };
                } else {
                    self.mark_code();
                }
                self.state = ScanState::InString { quote };
                self.region_line = line;
                Step::Advance(q.delimiter.len())
            }
            Some(Opener::CharLiteral(len)) => {
                self.mark_code();
                Step::Advance(len)
            }
            None => {
                let ch = first_char(rest);
                if !ch.is_whitespace() {
                    self.mark_code();
                }
                Step::Advance(ch.len_utf8())
            }
        }
    }

    fn scan_block(&mut self, rest: &str, pair: usize, depth: usize) -> Step {
        let delimiters = self.profile.block_comments[pair];
        if rest.starts_with(delimiters.close) {
            self.state = if depth <= 1 {
                ScanState::Code
            } else {
                ScanState::InBlockComment {
                    pair,
                    depth: depth - 1,
                }
            };
            return Step::Advance(delimiters.close.len());
        }
        if delimiters.nestable && rest.starts_with(delimiters.open) {
            self.state = ScanState::InBlockComment {
                pair,
                depth: depth + 1,
            };
            return Step::Advance(delimiters.open.len());
        }
        Step::Advance(first_char(rest).len_utf8())
    }

    fn scan_string(&mut self, rest: &str, quote: usize) -> Step {
        let q = self.profile.quotes[quote];
        if let Some(escape) = q.escape {
            if rest.starts_with(escape) {
                let skipped = rest[escape.len_utf8()..]
                    .chars()
                    .next()
                    .map_or(0, char::len_utf8);
                return Step::Advance(escape.len_utf8() + skipped);
            }
        }
        if rest.starts_with(q.delimiter) {
            self.state = ScanState::Code;
            if let DocLiteral::Open { first_line } = self.doc {
                self.doc = DocLiteral::Closed { first_line };
            }
            return Step::Advance(q.delimiter.len());
        }
        Step::Advance(first_char(rest).len_utf8())
    }

    fn current(&mut self) -> &mut LineMarks {
        let last = self.marks.len() - 1;
        &mut self.marks[last]
    }

    fn mark_code(&mut self) {
        if let DocLiteral::Closed { first_line } = self.doc {
            self.resolve_doc(first_line, LineKind::Code);
        }
        self.current().code = true;
    }

    fn resolve_doc(&mut self, first_line: usize, kind: LineKind) {
        for marks in &mut self.marks[first_line..] {
            if marks.doc {
                marks.doc = false;
                match kind {
                    LineKind::Code => marks.code = true,
                    _ => marks.comment = true,
                }
            }
        }
        self.doc = DocLiteral::None;
    }
}

fn first_char(rest: &str) -> char {
    rest.chars().next().unwrap_or(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::lookup;

    use LineKind::{Blank, Code, Comment};

    fn run(language: &str, source: &str) -> Classification {
        let profile = lookup(language).expect("profile exists");
        classify(source.lines(), profile)
    }

    fn assert_partition(result: &Classification) {
        assert_eq!(
            result.counts.total(),
            result.tags.len() as u64,
            "counts must partition the lines: {:?}",
            result
        );
    }

    #[test]
    fn test_empty_file() {
        let result = run("C", "");
        assert_eq!(result.counts, LineCounts::default());
        assert!(result.tags.is_empty());
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_pure_line_comment_file() {
        let result = run("Python", "# one\n# two\n#three\n#\n");
        assert_eq!(
            result.counts,
            LineCounts {
                blank: 0,
                comment: 4,
                code: 0
            }
        );
    }

    #[test]
    fn test_pure_block_comment_span() {
        let src = "/* start\n   middle\n\n   end */\n";
        let result = run("C", src);
        assert_eq!(result.tags, vec![Comment, Comment, Comment, Comment]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_mixed_line_counts_as_code() {
        let result = run("C++", "value = 1  // note\n");
        assert_eq!(result.tags, vec![Code]);
    }

    #[test]
    fn test_code_after_block_close_is_code() {
        let result = run("C", "/* a\n b */ int x;\n/* c */\n");
        assert_eq!(result.tags, vec![Comment, Code, Comment]);
    }

    #[test]
    fn test_comment_markers_inside_strings_are_code() {
        let src = "char *s = \"/* not a comment\";\nint y; // real\nputs(\"// nope\");\n";
        let result = run("C", src);
        assert_eq!(result.tags, vec![Code, Code, Code]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_escaped_quote_does_not_close_string() {
        let result = run("C", "s = \"say \\\"hi\\\" // x\";\n/* tail */\n");
        assert_eq!(result.tags, vec![Code, Comment]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_hash_in_python_string_is_not_comment() {
        let result = run("Python", "url = 'http://x#frag'\n# real comment\n");
        assert_eq!(result.tags, vec![Code, Comment]);
    }

    #[test]
    fn test_blank_lines() {
        let result = run("Rust", "fn main() {}\n\n   \n\t\n");
        assert_eq!(result.tags, vec![Code, Blank, Blank, Blank]);
    }

    #[test]
    fn test_whitespace_line_inside_block_comment_is_comment() {
        let result = run("Java", "/**\n\n   \n */\nclass A {}\n");
        assert_eq!(result.tags, vec![Comment, Comment, Comment, Comment, Code]);
    }

    #[test]
    fn test_nested_block_comments() {
        let src = "/* outer\n/* inner */\nstill comment\n*/\nlet x = 1;\n";
        let result = run("Rust", src);
        assert_eq!(result.tags, vec![Comment, Comment, Comment, Comment, Code]);

        // C does not nest: the first closer ends the comment.
        let result = run("C", src);
        assert_eq!(result.tags, vec![Comment, Comment, Code, Code, Code]);
    }

    #[test]
    fn test_other_pair_inside_block_is_plain_text() {
        let src = "{ braces (* not nested\nstill }\nbegin\n";
        let result = run("Pascal", src);
        assert_eq!(result.tags, vec![Comment, Comment, Code]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_maximal_munch_triple_quotes() {
        let result = run("Python", "'''text'''\n");
        assert_eq!(result.tags, vec![Comment]);
        assert!(result.anomaly.is_none());

        let result = run("Python", "'''a\nb'''\nx = 1\n");
        assert_eq!(result.tags, vec![Comment, Comment, Code]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_python_docstring_block() {
        let src = "def f():\n    \"\"\"Summary.\n\n    Details.\n    \"\"\"\n    return 1\n";
        let result = run("Python", src);
        assert_eq!(
            result.tags,
            vec![Code, Comment, Comment, Comment, Comment, Code]
        );
    }

    #[test]
    fn test_assigned_triple_quote_is_code() {
        let src = "text = \"\"\"\nbody # not comment\n\"\"\"\n";
        let result = run("Python", src);
        assert_eq!(result.tags, vec![Code, Code, Code]);
    }

    #[test]
    fn test_docstring_followed_by_code_is_code() {
        let src = "\"\"\"a\nb\"\"\".strip()\n";
        let result = run("Python", src);
        assert_eq!(result.tags, vec![Code, Code]);

        let src = "\"\"\"a\"\"\" \"\"\"b\"\"\"\n";
        let result = run("Python", src);
        assert_eq!(result.tags, vec![Code]);
    }

    #[test]
    fn test_docstring_followed_by_comment_stays_comment() {
        let result = run("Python", "\"\"\"doc\"\"\"  # trailing\n");
        assert_eq!(result.tags, vec![Comment]);
    }

    #[test]
    fn test_triple_quote_without_doc_flag_is_code() {
        let result = run("Kotlin", "\"\"\"\ntext\n\"\"\"\n");
        assert_eq!(result.tags, vec![Code, Code, Code]);
    }

    #[test]
    fn test_unterminated_block_comment_is_soft() {
        let result = run("C", "int x;\n/* never\nclosed\n\n");
        assert_eq!(result.tags, vec![Code, Comment, Comment, Comment]);
        assert_eq!(
            result.anomaly,
            Some(ScanAnomaly::UnterminatedBlockComment {
                line: 2,
                delimiter: "/*"
            })
        );
        assert_partition(&result);
    }

    #[test]
    fn test_unterminated_string_is_soft() {
        let result = run("Python", "x = 'open\ny = 2\n");
        assert_eq!(result.tags, vec![Code, Code]);
        assert_eq!(
            result.anomaly,
            Some(ScanAnomaly::UnterminatedString {
                line: 1,
                delimiter: "'"
            })
        );
    }

    #[test]
    fn test_unterminated_docstring_counts_as_comment() {
        let result = run("Python", "x = 1\n\"\"\"\ndangling\n");
        assert_eq!(result.tags, vec![Code, Comment, Comment]);
        assert!(matches!(
            result.anomaly,
            Some(ScanAnomaly::UnterminatedString { line: 2, .. })
        ));
    }

    #[test]
    fn test_line_comment_does_not_persist() {
        let result = run("SQL", "-- a /*\nSELECT 1;\n");
        assert_eq!(result.tags, vec![Comment, Code]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_rust_char_literal_quote_does_not_open_string() {
        let src = "let q = '\"';\n// comment one\n// comment two\nfn f() {}\n";
        let result = run("Rust", src);
        assert_eq!(result.tags, vec![Code, Comment, Comment, Code]);
        assert_eq!(result.counts.comment, 2);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_rust_lifetimes_and_escaped_chars() {
        let src = "fn f<'a>(s: &'a str) -> char { '\\'' }\n// done\nlet c = '/'; // slash\n";
        let result = run("Rust", src);
        assert_eq!(result.tags, vec![Code, Comment, Code]);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_yaml_apostrophe_in_plain_scalar() {
        let src = "description: Don't panic\n# comment one\nname: x\n# comment two\n";
        let result = run("YAML", src);
        assert_eq!(result.tags, vec![Code, Comment, Code, Comment]);
        assert_eq!(result.counts.comment, 2);
        assert!(result.anomaly.is_none());
    }

    #[test]
    fn test_prefixed_docstring_counts_as_code() {
        let src = "r\"\"\"Doc \\d.\n\"\"\"\nx = 1\n";
        let result = run("Python", src);
        assert_eq!(result.tags, vec![Code, Code, Code]);
    }

    #[test]
    fn test_lua_long_comment_beats_line_comment() {
        let result = run("Lua", "--[[\nprint('x')\n]]\nprint('y')\n");
        assert_eq!(result.tags, vec![Comment, Comment, Comment, Code]);
    }

    #[test]
    fn test_html_comment_and_markup() {
        let src = "<p>don't</p>\n<!-- note -->\n<!--\n<b>x</b>\n-->\n";
        let result = run("HTML", src);
        assert_eq!(result.tags, vec![Code, Comment, Comment, Comment, Comment]);
    }

    #[test]
    fn test_column_one_comment() {
        let src = "C     THIS IS A COMMENT\n      CALL FOO\n*     ANOTHER\n";
        let result = run("Fortran 77", src);
        assert_eq!(result.tags, vec![Comment, Code, Comment]);
    }

    #[test]
    fn test_profile_without_delimiters_counts_all_text_as_code() {
        let result = run("Text", "hello # world\n\n/* x */\n");
        assert_eq!(result.tags, vec![Code, Blank, Code]);
    }

    #[test]
    fn test_multibyte_characters() {
        let result = run("Python", "s = 'héllo' # ünïcode\n# 日本語\n");
        assert_eq!(result.tags, vec![Code, Comment]);
    }

    #[test]
    fn test_string_spanning_lines_keeps_state() {
        let result = run("JavaScript", "const t = `a\n// inside template\n`;\n// out\n");
        assert_eq!(result.tags, vec![Code, Code, Code, Comment]);
    }

    #[test]
    fn test_scanner_state_is_carried() {
        let profile = lookup("C").unwrap();
        let mut scanner = Scanner::new(profile);
        scanner.feed_line("/* open");
        assert_eq!(
            scanner.state(),
            ScanState::InBlockComment { pair: 0, depth: 1 }
        );
        scanner.feed_line("close */");
        assert_eq!(scanner.state(), ScanState::Code);
    }

    #[test]
    fn test_determinism_and_partition() {
        let src = "#!/usr/bin/env python3\n\"\"\"Module.\"\"\"\n\nimport os  # os\n\ndef f(x):\n    '''\n    doc\n    '''\n    return x  # done\n";
        let first = run("Python", src);
        let second = run("Python", src);
        assert_eq!(first, second);
        assert_partition(&first);
        assert_eq!(
            first.counts,
            LineCounts {
                blank: 2,
                comment: 5,
                code: 3
            }
        );
    }

    #[test]
    fn test_line_counts_add() {
        let a = LineCounts {
            blank: 1,
            comment: 2,
            code: 3,
        };
        let b = LineCounts {
            blank: 4,
            comment: 5,
            code: 6,
        };
        let sum = a + b;
        assert_eq!(sum.total(), 21);
        assert_eq!(sum.code, 9);
    }
}
