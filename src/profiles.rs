//! Language profile table.
//!
//! Each language is described only by its comment and string delimiters.
//! The table is built once per process and never written afterwards, so
//! worker threads can read it without locking.

use std::collections::HashMap;
use std::sync::OnceLock;

/// A comment delimiter pair whose scope may span several lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockComment {
    pub open: &'static str,
    pub close: &'static str,
    pub nestable: bool,
}

/// A string literal delimiter. The same text opens and closes the literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub delimiter: &'static str,
    pub escape: Option<char>,
    /// Literal counts as comment when nothing else on its lines is code
    /// (Python docstrings).
    pub doc: bool,
}

#[derive(Debug, PartialEq, Eq)]
pub struct LanguageProfile {
    pub name: &'static str,
    pub line_comments: &'static [&'static str],
    pub block_comments: &'static [BlockComment],
    pub quotes: &'static [Quote],
    /// Markers that turn the whole line into a comment only when they sit
    /// in the very first column (Fortran 77 `C`, reStructuredText `..`).
    pub column_one_comments: &'static [&'static str],
    /// Quote character of single-character literals (`'x'`, `'\n'`,
    /// `'\u{1F600}'`). A quote that does not start such a literal is plain
    /// code, so Rust lifetimes never open a string.
    pub char_literal: Option<char>,
}

/// The delimiter found at a scan position in code context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opener {
    Block(usize),
    Quote(usize),
    Line(usize),
    /// A complete single-character literal of the given byte length.
    CharLiteral(usize),
}

impl LanguageProfile {
    /// Longest delimiter registered for this language that starts `rest`.
    /// Equal lengths resolve block opener, then quote, then line marker.
    pub fn match_opener(&self, rest: &str) -> Option<Opener> {
        let blocks = self
            .block_comments
            .iter()
            .enumerate()
            .map(|(i, b)| (b.open, Opener::Block(i)));
        let quotes = self
            .quotes
            .iter()
            .enumerate()
            .map(|(i, q)| (q.delimiter, Opener::Quote(i)));
        let lines = self
            .line_comments
            .iter()
            .enumerate()
            .map(|(i, marker)| (*marker, Opener::Line(i)));

        let mut best: Option<(usize, Opener)> = None;
        for (delimiter, opener) in blocks.chain(quotes).chain(lines) {
            if delimiter.is_empty() || !rest.starts_with(delimiter) {
                continue;
            }
            if best.map_or(true, |(len, _)| delimiter.len() > len) {
                best = Some((delimiter.len(), opener));
            }
        }
        if let Some(len) = self.char_literal_len(rest) {
            if best.map_or(true, |(best_len, _)| len > best_len) {
                best = Some((len, Opener::CharLiteral(len)));
            }
        }
        best.map(|(_, opener)| opener)
    }

    /// Byte length of the single-character literal starting `rest`, if any.
    fn char_literal_len(&self, rest: &str) -> Option<usize> {
        let quote = self.char_literal?;
        let body = rest.strip_prefix(quote)?;
        let mut chars = body.char_indices();
        let (_, first) = chars.next()?;
        let end = match first {
            '\\' => {
                let (i, escaped) = chars.next()?;
                if escaped == 'u' && body[i + 1..].starts_with('{') {
                    let close = body[i + 1..].find('}')?;
                    i + 1 + close + 1
                } else {
                    i + escaped.len_utf8()
                }
            }
            c if c == quote => return None,
            c => c.len_utf8(),
        };
        body[end..].starts_with(quote).then(|| quote.len_utf8() * 2 + end)
    }

    pub fn starts_with_column_one_comment(&self, line: &str) -> bool {
        self.column_one_comments
            .iter()
            .any(|marker| line.starts_with(marker))
    }
}

const fn block(open: &'static str, close: &'static str) -> BlockComment {
    BlockComment {
        open,
        close,
        nestable: false,
    }
}

const fn nested(open: &'static str, close: &'static str) -> BlockComment {
    BlockComment {
        open,
        close,
        nestable: true,
    }
}

const fn quote(delimiter: &'static str, escape: Option<char>) -> Quote {
    Quote {
        delimiter,
        escape,
        doc: false,
    }
}

const fn docstring(delimiter: &'static str) -> Quote {
    Quote {
        delimiter,
        escape: Some('\\'),
        doc: true,
    }
}

const fn profile(
    name: &'static str,
    line_comments: &'static [&'static str],
    block_comments: &'static [BlockComment],
    quotes: &'static [Quote],
) -> LanguageProfile {
    LanguageProfile {
        name,
        line_comments,
        block_comments,
        quotes,
        column_one_comments: &[],
        char_literal: None,
    }
}

const BS: Option<char> = Some('\\');

const NO_LINE: &[&str] = &[];
const NO_BLOCK: &[BlockComment] = &[];
const NO_QUOTE: &[Quote] = &[];

const SLASH: &[&str] = &["//"];
const HASH: &[&str] = &["#"];
const DASH: &[&str] = &["--"];
const SEMI: &[&str] = &[";"];
const PERCENT: &[&str] = &["%"];

const C_BLOCK: &[BlockComment] = &[block("/*", "*/")];
const NESTED_C_BLOCK: &[BlockComment] = &[nested("/*", "*/")];
const MARKUP_BLOCK: &[BlockComment] = &[block("<!--", "-->")];
const ML_BLOCK: &[BlockComment] = &[nested("(*", "*)")];
const HASKELL_BLOCK: &[BlockComment] = &[nested("{-", "-}")];
const LISP_BLOCK: &[BlockComment] = &[nested("#|", "|#")];

const DOUBLE: &[Quote] = &[quote("\"", BS)];
const DOUBLE_RAW: &[Quote] = &[quote("\"", None)];
const C_QUOTES: &[Quote] = &[quote("\"", BS), quote("'", BS)];
const JS_QUOTES: &[Quote] = &[quote("\"", BS), quote("'", BS), quote("`", BS)];
const GO_QUOTES: &[Quote] = &[quote("\"", BS), quote("'", BS), quote("`", None)];
const JAVA_QUOTES: &[Quote] = &[quote("\"\"\"", BS), quote("\"", BS), quote("'", BS)];
const TRIPLE_DOUBLE: &[Quote] = &[quote("\"\"\"", BS), quote("\"", BS)];
const TRIPLE_ALL: &[Quote] = &[
    quote("\"\"\"", BS),
    quote("'''", BS),
    quote("\"", BS),
    quote("'", BS),
];
const PYTHON_QUOTES: &[Quote] = &[
    docstring("\"\"\""),
    docstring("'''"),
    quote("\"", BS),
    quote("'", BS),
];
const SHELL_QUOTES: &[Quote] = &[quote("\"", BS), quote("'", None)];
const SQL_QUOTES: &[Quote] = &[quote("'", None), quote("\"", None)];
const FORTRAN_QUOTES: &[Quote] = &[quote("'", None), quote("\"", None)];
const TOML_QUOTES: &[Quote] = &[
    quote("\"\"\"", BS),
    quote("'''", None),
    quote("\"", BS),
    quote("'", None),
];

static PROFILES: &[LanguageProfile] = &[
    profile("Ada", DASH, NO_BLOCK, DOUBLE_RAW),
    profile("Assembly", SEMI, NO_BLOCK, DOUBLE),
    profile("BibTeX", PERCENT, NO_BLOCK, NO_QUOTE),
    profile("Bourne Again Shell", HASH, NO_BLOCK, SHELL_QUOTES),
    profile("C", SLASH, C_BLOCK, C_QUOTES),
    profile("C Shell", HASH, NO_BLOCK, SHELL_QUOTES),
    profile("C#", SLASH, C_BLOCK, C_QUOTES),
    profile("C++", SLASH, C_BLOCK, C_QUOTES),
    profile("C/C++ Header", SLASH, C_BLOCK, C_QUOTES),
    profile("CMake", HASH, &[block("#[[", "]]")], DOUBLE),
    profile("CSS", NO_LINE, C_BLOCK, C_QUOTES),
    profile("CSV", NO_LINE, NO_BLOCK, NO_QUOTE),
    profile("Clojure", SEMI, NO_BLOCK, DOUBLE),
    profile("CoffeeScript", HASH, &[block("###", "###")], TRIPLE_ALL),
    profile("Cython", HASH, NO_BLOCK, PYTHON_QUOTES),
    profile("Dart", SLASH, NESTED_C_BLOCK, TRIPLE_ALL),
    profile("Dockerfile", HASH, NO_BLOCK, NO_QUOTE),
    profile("Elixir", HASH, NO_BLOCK, TRIPLE_DOUBLE),
    profile("Elm", DASH, HASKELL_BLOCK, TRIPLE_DOUBLE),
    profile("F#", SLASH, ML_BLOCK, TRIPLE_DOUBLE),
    profile("Fish Shell", HASH, NO_BLOCK, SHELL_QUOTES),
    LanguageProfile {
        name: "Fortran 77",
        line_comments: &["!"],
        block_comments: NO_BLOCK,
        quotes: FORTRAN_QUOTES,
        column_one_comments: &["C", "c", "*"],
        char_literal: None,
    },
    profile("Fortran 90", &["!"], NO_BLOCK, FORTRAN_QUOTES),
    profile("Fortran 95", &["!"], NO_BLOCK, FORTRAN_QUOTES),
    profile("Go", SLASH, C_BLOCK, GO_QUOTES),
    profile("Gradle", SLASH, C_BLOCK, TRIPLE_ALL),
    profile("HTML", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("Haskell", DASH, HASKELL_BLOCK, DOUBLE),
    profile("INI", &[";", "#"], NO_BLOCK, NO_QUOTE),
    profile("IcedCoffeeScript", HASH, &[block("###", "###")], TRIPLE_ALL),
    profile("JSON", SLASH, C_BLOCK, DOUBLE),
    profile(
        "JSP",
        NO_LINE,
        &[block("<%--", "--%>"), block("<!--", "-->")],
        NO_QUOTE,
    ),
    profile("JSX", SLASH, C_BLOCK, JS_QUOTES),
    profile("Java", SLASH, C_BLOCK, JAVA_QUOTES),
    profile("JavaScript", SLASH, C_BLOCK, JS_QUOTES),
    profile("Julia", HASH, &[nested("#=", "=#")], TRIPLE_DOUBLE),
    profile("Korn Shell", HASH, NO_BLOCK, SHELL_QUOTES),
    profile("Kotlin", SLASH, NESTED_C_BLOCK, JAVA_QUOTES),
    profile("Lisp", SEMI, LISP_BLOCK, DOUBLE),
    profile("LiveScript", HASH, C_BLOCK, TRIPLE_ALL),
    profile("Lua", DASH, &[block("--[[", "]]")], C_QUOTES),
    profile("Markdown", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("Maven", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("OCaml", NO_LINE, ML_BLOCK, DOUBLE),
    profile("PHP", &["//", "#"], C_BLOCK, C_QUOTES),
    profile(
        "Pascal",
        SLASH,
        &[block("{", "}"), block("(*", "*)")],
        &[quote("'", None)],
    ),
    profile("Perl", HASH, NO_BLOCK, C_QUOTES),
    profile("Python", HASH, NO_BLOCK, PYTHON_QUOTES),
    profile("R", HASH, NO_BLOCK, C_QUOTES),
    profile("Ruby", HASH, NO_BLOCK, C_QUOTES),
    LanguageProfile {
        name: "Rust",
        line_comments: SLASH,
        block_comments: NESTED_C_BLOCK,
        quotes: DOUBLE,
        column_one_comments: &[],
        char_literal: Some('\''),
    },
    profile("SQL", DASH, C_BLOCK, SQL_QUOTES),
    profile("SVG", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("Scala", SLASH, NESTED_C_BLOCK, TRIPLE_DOUBLE),
    profile("Scheme", SEMI, LISP_BLOCK, DOUBLE),
    profile("Swift", SLASH, NESTED_C_BLOCK, TRIPLE_DOUBLE),
    profile("TOML", HASH, NO_BLOCK, TOML_QUOTES),
    profile("TSV", NO_LINE, NO_BLOCK, NO_QUOTE),
    profile("TeX", PERCENT, NO_BLOCK, NO_QUOTE),
    profile("Tcl", HASH, NO_BLOCK, DOUBLE),
    profile("Text", NO_LINE, NO_BLOCK, NO_QUOTE),
    profile("TypeScript", SLASH, C_BLOCK, JS_QUOTES),
    profile("VHDL", DASH, NO_BLOCK, DOUBLE_RAW),
    profile("Verilog", SLASH, C_BLOCK, DOUBLE),
    profile("Visual Basic", &["'"], NO_BLOCK, DOUBLE_RAW),
    profile("XHTML", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("XML", NO_LINE, MARKUP_BLOCK, NO_QUOTE),
    profile("YAML", HASH, NO_BLOCK, DOUBLE),
    profile("Zsh", HASH, NO_BLOCK, SHELL_QUOTES),
    profile("make", HASH, NO_BLOCK, NO_QUOTE),
    LanguageProfile {
        name: "reStructuredText",
        line_comments: NO_LINE,
        block_comments: NO_BLOCK,
        quotes: NO_QUOTE,
        column_one_comments: &[".."],
        char_literal: None,
    },
];

fn index() -> &'static HashMap<&'static str, &'static LanguageProfile> {
    static INDEX: OnceLock<HashMap<&'static str, &'static LanguageProfile>> = OnceLock::new();
    INDEX.get_or_init(|| PROFILES.iter().map(|p| (p.name, p)).collect())
}

/// Find the profile registered under a canonical language name.
pub fn lookup(language: &str) -> Option<&'static LanguageProfile> {
    index().get(language).copied()
}

pub fn all() -> &'static [LanguageProfile] {
    PROFILES
}
