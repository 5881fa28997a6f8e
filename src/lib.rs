//! Count blank, comment and code lines per language.
//!
//! The heart of the crate is [`engine`], a delimiter-driven line classifier
//! parameterised by the data-only language [`profiles`]. Everything else
//! (discovery, detection, aggregation, reporting) is bookkeeping around it.

pub mod aggregate;
pub mod counter;
pub mod detect;
pub mod discovery;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod profiles;
pub mod report;

pub use aggregate::{AggregateRecord, Aggregator};
pub use engine::{classify, Classification, LineCounts, LineKind, ScanAnomaly, ScanState};
pub use error::{ClocError, Result};
pub use profiles::{lookup, LanguageProfile};
