//! Input discovery: walks the given paths and yields the files to count.

use std::fs;
use std::io::{self, BufRead};
use std::path::{Path, PathBuf};

use glob::Pattern;
use log::{debug, trace, warn};

use crate::error::{ClocError, Result};

/// Directory names never descended into.
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    "node_modules",
    "vendor",
];

#[derive(Debug, Clone)]
pub struct WalkOptions {
    pub exclude_dirs: Vec<String>,
    pub filespec: Option<Pattern>,
    pub max_depth: usize,
    pub non_recursive: bool,
}

impl Default for WalkOptions {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|d| d.to_string()).collect(),
            filespec: None,
            max_depth: 100,
            non_recursive: false,
        }
    }
}

impl WalkOptions {
    /// Adds user-supplied directory names to the default exclusions.
    pub fn exclude<I, S>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    pub fn with_filespec(mut self, spec: Option<&str>) -> Result<Self> {
        self.filespec = match spec {
            Some(spec) => Some(Pattern::new(spec).map_err(|source| ClocError::InvalidPattern {
                pattern: spec.to_string(),
                source,
            })?),
            None => None,
        };
        Ok(self)
    }

    fn is_excluded(&self, dir: &Path) -> bool {
        dir.file_name()
            .and_then(|n| n.to_str())
            .map(|name| self.exclude_dirs.iter().any(|d| d == name))
            .unwrap_or(false)
    }
}

#[derive(Debug, Default)]
pub struct Discovery {
    /// Sorted, de-duplicated file paths.
    pub files: Vec<PathBuf>,
    /// Directory entries that could not be read.
    pub errors: usize,
}

/// Collect every regular file reachable from `paths`.
///
/// Missing paths are warned about and skipped; the run only fails when none
/// of them exist. Files named explicitly bypass the filespec.
pub fn discover(paths: &[PathBuf], options: &WalkOptions) -> Result<Discovery> {
    let mut discovery = Discovery::default();
    let mut existing = 0;

    for path in paths {
        if !path.exists() {
            warn!("{}", ClocError::PathNotFound(path.clone()));
            continue;
        }
        existing += 1;
        if path.is_file() {
            discovery.files.push(path.clone());
        } else {
            walk_dir(path, path, 0, options, &mut discovery);
        }
    }

    if existing == 0 {
        return Err(ClocError::NoInputs);
    }

    discovery.files.sort();
    discovery.files.dedup();
    debug!("discovered {} files", discovery.files.len());
    Ok(discovery)
}

fn walk_dir(
    dir: &Path,
    root: &Path,
    depth: usize,
    options: &WalkOptions,
    discovery: &mut Discovery,
) {
    if depth > options.max_depth {
        warn!(
            "Maximum directory depth ({}) reached at {}",
            options.max_depth,
            dir.display()
        );
        discovery.errors += 1;
        return;
    }
    if depth > 0 && options.is_excluded(dir) {
        trace!("excluded directory {}", dir.display());
        return;
    }

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Error reading directory {}: {}", dir.display(), err);
            discovery.errors += 1;
            return;
        }
    };

    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Error reading entry in {}: {}", dir.display(), err);
                discovery.errors += 1;
                continue;
            }
        };
        let entry_path = entry.path();
        let file_type = match entry.file_type() {
            Ok(ft) => ft,
            Err(err) => {
                warn!("Error reading type for {}: {}", entry_path.display(), err);
                discovery.errors += 1;
                continue;
            }
        };

        if file_type.is_dir() {
            if !options.non_recursive {
                walk_dir(&entry_path, root, depth + 1, options, discovery);
            }
        } else if file_type.is_file() && filespec_matches(options.filespec.as_ref(), root, &entry_path)
        {
            discovery.files.push(entry_path);
        }
    }
}

/// A filespec matches either the bare file name or the root-relative path.
fn filespec_matches(pattern: Option<&Pattern>, root: &Path, file_path: &Path) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    if file_path
        .file_name()
        .and_then(|name| name.to_str())
        .map(|name| pattern.matches(name))
        .unwrap_or(false)
    {
        return true;
    }
    file_path
        .strip_prefix(root)
        .ok()
        .and_then(|rel| rel.to_str())
        .map(|rel| pattern.matches(&rel.replace('\\', "/")))
        .unwrap_or(false)
}

/// Line iterator that replaces invalid UTF-8 with U+FFFD and strips the
/// line terminator (`\n` or `\r\n`).
pub struct LossyLineReader<R> {
    reader: R,
    buffer: Vec<u8>,
}

impl<R: BufRead> LossyLineReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: Vec::with_capacity(8 * 1024),
        }
    }
}

impl<R: BufRead> Iterator for LossyLineReader<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();
        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                let text = String::from_utf8_lossy(&self.buffer);
                Some(Ok(text.trim_end_matches(['\n', '\r']).to_string()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

/// Split file content into physical lines.
pub fn read_lines_lossy(content: &[u8]) -> io::Result<Vec<String>> {
    LossyLineReader::new(content).collect()
}
