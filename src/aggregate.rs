//! Per-language totals.
//!
//! `merge` is associative and commutative, so partial aggregates built on
//! different worker threads can be combined in any order.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::engine::LineCounts;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AggregateRecord {
    pub files: u64,
    pub blank: u64,
    pub comment: u64,
    pub code: u64,
}

impl AggregateRecord {
    pub fn add_file(&mut self, counts: &LineCounts) {
        self.files += 1;
        self.blank += counts.blank;
        self.comment += counts.comment;
        self.code += counts.code;
    }

    pub fn absorb(&mut self, other: &AggregateRecord) {
        self.files += other.files;
        self.blank += other.blank;
        self.comment += other.comment;
        self.code += other.code;
    }

    pub fn lines(&self) -> u64 {
        self.blank + self.comment + self.code
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Aggregator {
    languages: BTreeMap<&'static str, AggregateRecord>,
    ignored: u64,
    flagged: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accumulate(&mut self, language: &'static str, counts: &LineCounts) {
        self.languages
            .entry(language)
            .or_default()
            .add_file(counts);
    }

    /// Count a file that never reached the engine (unknown language, binary,
    /// unreadable).
    pub fn ignore(&mut self) {
        self.ignored += 1;
    }

    /// Count a classified file that ended inside an unterminated region.
    pub fn flag(&mut self) {
        self.flagged += 1;
    }

    pub fn merge(mut self, other: Aggregator) -> Aggregator {
        for (language, record) in other.languages {
            self.languages.entry(language).or_default().absorb(&record);
        }
        self.ignored += other.ignored;
        self.flagged += other.flagged;
        self
    }

    pub fn get(&self, language: &str) -> Option<&AggregateRecord> {
        self.languages.get(language)
    }

    /// Language records in name order.
    pub fn records(&self) -> &BTreeMap<&'static str, AggregateRecord> {
        &self.languages
    }

    pub fn total(&self) -> AggregateRecord {
        let mut total = AggregateRecord::default();
        for record in self.languages.values() {
            total.absorb(record);
        }
        total
    }

    pub fn ignored(&self) -> u64 {
        self.ignored
    }

    pub fn flagged(&self) -> u64 {
        self.flagged
    }

    pub fn is_empty(&self) -> bool {
        self.languages.is_empty()
    }
}
