//! Report rendering.

use std::collections::BTreeMap;
use std::fmt::Write as FmtWrite;

use clap::ValueEnum;
use colored::*;
use serde::Serialize;

use crate::aggregate::{AggregateRecord, Aggregator};
use crate::counter::FileReport;
use crate::error::Result;
use crate::metrics::Timing;

const LANG_WIDTH: usize = 30;
const RULE_WIDTH: usize = LANG_WIDTH + 9 + 3 * 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
}

pub fn render(format: OutputFormat, aggregate: &Aggregator, timing: &Timing) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(render_text(aggregate, timing)),
        OutputFormat::Json => render_json(aggregate),
        OutputFormat::Csv => Ok(render_csv(aggregate)),
    }
}

fn format_row(language: &str, record: &AggregateRecord) -> String {
    format!(
        "{:<width$} {:>8} {:>12} {:>12} {:>12}",
        language,
        record.files,
        record.blank,
        record.comment,
        record.code,
        width = LANG_WIDTH
    )
}

pub fn render_text(aggregate: &Aggregator, timing: &Timing) -> String {
    let mut output = String::new();
    let _ = writeln!(
        output,
        "{} {}  T={:.2} s ({:.1} files/s, {:.1} lines/s)",
        env!("CARGO_PKG_NAME").bright_cyan().bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).bright_yellow(),
        timing.elapsed.as_secs_f64(),
        timing.files_per_sec(),
        timing.lines_per_sec()
    );

    if aggregate.is_empty() {
        let _ = writeln!(output, "No files found to count.");
        return output;
    }

    let total = aggregate.total();
    let _ = writeln!(
        output,
        "{} text files counted, {} files ignored.",
        total.files,
        aggregate.ignored()
    );
    if aggregate.flagged() > 0 {
        let _ = writeln!(
            output,
            "{}: {} files end inside an unterminated comment or string.",
            "Warning".red().bold(),
            aggregate.flagged()
        );
    }

    let rule = "-".repeat(RULE_WIDTH);
    let _ = writeln!(output, "{}", rule);
    let _ = writeln!(
        output,
        "{:<width$} {:>8} {:>12} {:>12} {:>12}",
        "Language",
        "files",
        "blank",
        "comment",
        "code",
        width = LANG_WIDTH
    );
    let _ = writeln!(output, "{}", rule);
    for (language, record) in aggregate.records() {
        let _ = writeln!(output, "{}", format_row(language, record));
    }
    let _ = writeln!(output, "{}", rule);
    let _ = writeln!(output, "{}", format_row("SUM", &total).bold());
    let _ = writeln!(output, "{}", rule);
    output
}

#[derive(Serialize)]
struct JsonReport<'a> {
    languages: &'a BTreeMap<&'static str, AggregateRecord>,
    total: AggregateRecord,
    ignored: u64,
    flagged: u64,
}

pub fn render_json(aggregate: &Aggregator) -> Result<String> {
    let report = JsonReport {
        languages: aggregate.records(),
        total: aggregate.total(),
        ignored: aggregate.ignored(),
        flagged: aggregate.flagged(),
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

pub fn render_csv(aggregate: &Aggregator) -> String {
    let mut output = String::from("Language,files,blank,comment,code\n");
    for (language, record) in aggregate.records() {
        let _ = writeln!(
            output,
            "{},{},{},{},{}",
            csv_field(language),
            record.files,
            record.blank,
            record.comment,
            record.code
        );
    }
    output
}

/// One CSV row per counted file, sorted by path.
pub fn render_by_file(reports: &[FileReport]) -> String {
    let mut sorted: Vec<&FileReport> = reports.iter().collect();
    sorted.sort_by(|a, b| a.path.cmp(&b.path));

    let mut output = String::from("File,Language,Blank,Comment,Code,Total\n");
    for report in sorted {
        let counts = &report.counts;
        let _ = writeln!(
            output,
            "{},{},{},{},{},{}",
            csv_field(&report.path.to_string_lossy()),
            csv_field(report.language),
            counts.blank,
            counts.comment,
            counts.code,
            counts.total()
        );
    }
    output
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::LineCounts;
    use std::path::PathBuf;
    use std::time::Duration;

    fn counts(blank: u64, comment: u64, code: u64) -> LineCounts {
        LineCounts {
            blank,
            comment,
            code,
        }
    }

    fn sample() -> Aggregator {
        let mut agg = Aggregator::new();
        agg.accumulate("Rust", &counts(1, 2, 10));
        agg.accumulate("Python", &counts(3, 4, 5));
        agg.accumulate("Rust", &counts(0, 1, 1));
        agg.ignore();
        agg
    }

    fn timing() -> Timing {
        Timing {
            elapsed: Duration::from_millis(500),
            files: 3,
            lines: 27,
        }
    }

    #[test]
    fn test_text_report_lists_languages_in_order() {
        let text = render_text(&sample(), &timing());
        assert!(text.contains("3 text files counted, 1 files ignored."));
        assert!(text.contains("T=0.50 s (6.0 files/s, 54.0 lines/s)"));
        let python = text.find("\nPython").expect("python row");
        let rust = text.find("\nRust").expect("rust row");
        assert!(python < rust, "rows sorted by language: {}", text);
        assert!(text.contains(&format_row("Rust", &AggregateRecord {
            files: 2,
            blank: 1,
            comment: 3,
            code: 11,
        })));
        assert!(text.contains("SUM"));
        assert!(!text.contains("Warning"));
    }

    #[test]
    fn test_text_report_mentions_flagged_files() {
        let mut agg = sample();
        agg.flag();
        let text = render_text(&agg, &timing());
        assert!(text.contains("1 files end inside an unterminated comment or string."));
    }

    #[test]
    fn test_text_report_when_nothing_counted() {
        let text = render_text(&Aggregator::new(), &timing());
        assert!(text.contains("No files found to count."));
        assert!(!text.contains("Language"));
    }

    #[test]
    fn test_json_report_structure() {
        let json = render_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["languages"]["Rust"]["files"], 2);
        assert_eq!(value["languages"]["Python"]["comment"], 4);
        assert_eq!(value["total"]["code"], 16);
        assert_eq!(value["total"]["files"], 3);
        assert_eq!(value["ignored"], 1);
        assert_eq!(value["flagged"], 0);
    }

    #[test]
    fn test_csv_report() {
        let csv = render_csv(&sample());
        assert_eq!(
            csv,
            "Language,files,blank,comment,code\nPython,1,3,4,5\nRust,2,1,3,11\n"
        );
    }

    #[test]
    fn test_by_file_report_sorted_and_quoted() {
        let reports = vec![
            FileReport {
                path: PathBuf::from("z.rs"),
                language: "Rust",
                counts: counts(1, 1, 1),
                anomaly: None,
            },
            FileReport {
                path: PathBuf::from("a,b.py"),
                language: "Python",
                counts: counts(0, 2, 3),
                anomaly: None,
            },
        ];
        let csv = render_by_file(&reports);
        assert_eq!(
            csv,
            "File,Language,Blank,Comment,Code,Total\n\"a,b.py\",Python,0,2,3,5\nz.rs,Rust,1,1,1,3\n"
        );
    }
}
