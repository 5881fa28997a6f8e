//! Language identification by file name, extension and shebang line.

use std::path::Path;

/// Bytes inspected when deciding whether a file is binary.
pub const BINARY_SNIFF_LEN: usize = 1024;

/// A NUL byte in the first kilobyte marks the file as binary.
pub fn is_binary(content: &[u8]) -> bool {
    let head = &content[..content.len().min(BINARY_SNIFF_LEN)];
    head.contains(&0)
}

/// Identify the language from the file name alone (case-insensitive).
pub fn language_for_path(path: &Path) -> Option<&'static str> {
    let file_name = path.file_name()?.to_str()?.to_lowercase();
    if let Some(language) = language_for_file_name(&file_name) {
        return Some(language);
    }
    let extension = path.extension()?.to_str()?.to_lowercase();
    language_for_extension(&extension)
}

fn language_for_file_name(lower: &str) -> Option<&'static str> {
    match lower {
        "makefile" | "gnumakefile" | "bsdmakefile" => Some("make"),
        "cmakelists.txt" => Some("CMake"),
        "pom.xml" => Some("Maven"),
        _ if lower.starts_with("dockerfile") => Some("Dockerfile"),
        _ => None,
    }
}

fn language_for_extension(ext: &str) -> Option<&'static str> {
    let language = match ext {
        "py" | "pyw" | "pyi" => "Python",
        "pyx" | "pxd" | "pxi" => "Cython",
        "c" => "C",
        "h" | "hpp" | "hxx" => "C/C++ Header",
        "cpp" | "cc" | "cxx" | "c++" | "h++" => "C++",
        "java" => "Java",
        "jsp" | "jspf" => "JSP",
        "js" | "mjs" | "cjs" => "JavaScript",
        "jsx" => "JSX",
        "ts" | "tsx" => "TypeScript",
        "html" | "htm" => "HTML",
        "xhtml" => "XHTML",
        "css" => "CSS",
        "xml" => "XML",
        "svg" => "SVG",
        "sh" | "bash" => "Bourne Again Shell",
        "zsh" => "Zsh",
        "fish" => "Fish Shell",
        "csh" => "C Shell",
        "ksh" => "Korn Shell",
        "rb" => "Ruby",
        "pl" | "pm" => "Perl",
        "php" => "PHP",
        "rs" => "Rust",
        "go" => "Go",
        "swift" => "Swift",
        "kt" => "Kotlin",
        "scala" => "Scala",
        "clj" => "Clojure",
        "hs" => "Haskell",
        "ml" => "OCaml",
        "fs" => "F#",
        "cs" => "C#",
        "vb" => "Visual Basic",
        "f" => "Fortran 77",
        "f90" => "Fortran 90",
        "f95" => "Fortran 95",
        "pas" => "Pascal",
        "ada" => "Ada",
        "asm" | "s" => "Assembly",
        "json" => "JSON",
        "yaml" | "yml" => "YAML",
        "toml" => "TOML",
        "ini" | "cfg" | "conf" => "INI",
        "md" => "Markdown",
        "rst" => "reStructuredText",
        "txt" => "Text",
        "mk" | "mak" => "make",
        "cmake" => "CMake",
        "dockerfile" => "Dockerfile",
        "gradle" => "Gradle",
        "csv" => "CSV",
        "tsv" => "TSV",
        "sql" => "SQL",
        "tex" | "sty" => "TeX",
        "bib" => "BibTeX",
        "r" => "R",
        "dart" => "Dart",
        "elm" => "Elm",
        "cl" | "lisp" => "Lisp",
        "scm" | "ss" => "Scheme",
        "lua" => "Lua",
        "tcl" => "Tcl",
        "v" => "Verilog",
        "vhdl" => "VHDL",
        "coffee" | "litcoffee" => "CoffeeScript",
        "ls" => "LiveScript",
        "iced" => "IcedCoffeeScript",
        _ => return None,
    };
    Some(language)
}

/// Identify the language named by a `#!` interpreter line.
pub fn language_from_shebang(first_line: &str) -> Option<&'static str> {
    let command = first_line.strip_prefix("#!")?.trim();
    let mut words = command.split_whitespace();
    let mut interpreter = basename(words.next()?);
    if interpreter == "env" {
        // Skip env's own options such as `-S`.
        interpreter = basename(words.find(|word| !word.starts_with('-'))?);
    }
    let interpreter = interpreter.trim_end_matches(|c: char| c.is_ascii_digit() || c == '.');
    let language = match interpreter {
        "python" | "pypy" => "Python",
        "perl" => "Perl",
        "ruby" => "Ruby",
        "sh" | "bash" | "dash" | "ash" => "Bourne Again Shell",
        "zsh" => "Zsh",
        "ksh" => "Korn Shell",
        "csh" | "tcsh" => "C Shell",
        "fish" => "Fish Shell",
        "node" | "nodejs" => "JavaScript",
        "php" => "PHP",
        "lua" => "Lua",
        "rscript" | "Rscript" => "R",
        "julia" => "Julia",
        "elixir" => "Elixir",
        "tclsh" | "wish" => "Tcl",
        _ => return None,
    };
    Some(language)
}

fn basename(command: &str) -> &str {
    command.rsplit('/').next().unwrap_or(command)
}

/// Resolve the language of a file from its path, falling back to the
/// shebang on the first line of `content`.
pub fn detect_language(path: &Path, content: &[u8]) -> Option<&'static str> {
    if let Some(language) = language_for_path(path) {
        return Some(language);
    }
    let first_line = content.split(|&b| b == b'\n').next()?;
    let first_line = String::from_utf8_lossy(first_line);
    language_from_shebang(first_line.trim_end_matches('\r'))
}
