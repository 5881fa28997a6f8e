//! Per-file pipeline: read, identify, classify, aggregate.
//!
//! Files are independent, so each one is classified on a rayon worker and
//! the partial aggregates are merged at the end.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use rayon::prelude::*;

use crate::aggregate::Aggregator;
use crate::detect;
use crate::discovery::read_lines_lossy;
use crate::engine::{classify, LineCounts, ScanAnomaly};
use crate::error::{ClocError, Result};
use crate::metrics::Throughput;
use crate::profiles;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub language: &'static str,
    pub counts: LineCounts,
    pub anomaly: Option<ScanAnomaly>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    Binary,
    UnknownLanguage,
    Unreadable,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Counted(FileReport),
    Ignored { path: PathBuf, reason: IgnoreReason },
}

/// Result of counting a whole set of files.
#[derive(Debug, Default)]
pub struct CountRun {
    /// Counted files, in input order.
    pub reports: Vec<FileReport>,
    pub aggregate: Aggregator,
}

/// Count one file. I/O failures are logged and the file is ignored.
pub fn count_file(path: &Path) -> FileOutcome {
    match try_count_file(path) {
        Ok(outcome) => outcome,
        Err(err) => {
            warn!("{}", err);
            FileOutcome::Ignored {
                path: path.to_path_buf(),
                reason: IgnoreReason::Unreadable,
            }
        }
    }
}

fn try_count_file(path: &Path) -> Result<FileOutcome> {
    let io_error = |source| ClocError::Io {
        path: path.to_path_buf(),
        source,
    };
    let content = fs::read(path).map_err(io_error)?;
    let ignored = |reason| FileOutcome::Ignored {
        path: path.to_path_buf(),
        reason,
    };

    if detect::is_binary(&content) {
        debug!("skipping binary file {}", path.display());
        return Ok(ignored(IgnoreReason::Binary));
    }
    let Some((language, profile)) = detect::detect_language(path, &content)
        .and_then(|language| profiles::lookup(language).map(|p| (language, p)))
    else {
        debug!("no language for {}", path.display());
        return Ok(ignored(IgnoreReason::UnknownLanguage));
    };

    let lines = read_lines_lossy(&content).map_err(io_error)?;
    let result = classify(&lines, profile);
    if let Some(anomaly) = &result.anomaly {
        warn!("{}: {}", path.display(), anomaly);
    }
    debug!(
        "{} [{}]: blank={} comment={} code={}",
        path.display(),
        language,
        result.counts.blank,
        result.counts.comment,
        result.counts.code
    );
    Ok(FileOutcome::Counted(FileReport {
        path: path.to_path_buf(),
        language,
        counts: result.counts,
        anomaly: result.anomaly,
    }))
}

fn fold_outcome(mut acc: Aggregator, outcome: &FileOutcome) -> Aggregator {
    match outcome {
        FileOutcome::Counted(report) => {
            acc.accumulate(report.language, &report.counts);
            if report.anomaly.is_some() {
                acc.flag();
            }
        }
        FileOutcome::Ignored { .. } => acc.ignore(),
    }
    acc
}

/// Count every file in parallel on the current rayon pool.
pub fn count_all(paths: &[PathBuf], throughput: &Throughput) -> CountRun {
    let outcomes: Vec<FileOutcome> = paths
        .par_iter()
        .map(|path| {
            let outcome = count_file(path);
            if let FileOutcome::Counted(report) = &outcome {
                throughput.record(report.counts.total());
            }
            outcome
        })
        .collect();

    let aggregate = outcomes
        .par_iter()
        .fold(Aggregator::new, fold_outcome)
        .reduce(Aggregator::new, Aggregator::merge);

    let reports = outcomes
        .into_iter()
        .filter_map(|outcome| match outcome {
            FileOutcome::Counted(report) => Some(report),
            FileOutcome::Ignored { .. } => None,
        })
        .collect();

    CountRun { reports, aggregate }
}
