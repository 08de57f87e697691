//! Check results and the result writer pipeline.
//!
//! Every check produces an ordered sequence of [`CheckResult`]s that is
//! pushed through a chain of [`ResultWriter`]s. Stages compose by wrapping
//! one writer inside another: a [`FilterWriter`] drops states the caller
//! does not want to see, a [`SummaryWriter`] counts everything that flows
//! past it, and a terminal [`HumanWriter`] or [`JsonWriter`] renders each
//! result as a line of output. A write error at any stage short-circuits
//! the chain and propagates to the caller; results already accepted by
//! earlier stages are not rolled back.

pub mod filter;
pub mod human;
pub mod json;
pub mod summary;

pub use filter::FilterWriter;
pub use human::{HumanWriter, OutputStyle};
pub use json::JsonWriter;
pub use summary::{Summary, SummaryWriter};

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum CheckState {
    /// The check passed successfully.
    Passed,
    /// A condition the platform tolerates, but with a degraded experience.
    Warning,
    /// A condition that prevents the platform from installing successfully.
    Failed,
    /// Informational or diagnostic output with no bearing on installability.
    Info,
    /// An indeterminate result due to a skipped check.
    Skipped,
}

impl CheckState {
    /// All states, in declaration order.
    pub const ALL: [CheckState; 5] = [
        CheckState::Passed,
        CheckState::Warning,
        CheckState::Failed,
        CheckState::Info,
        CheckState::Skipped,
    ];

    /// Fixed-width text tag for plain output.
    pub fn text(self) -> &'static str {
        match self {
            CheckState::Passed => "PASS",
            CheckState::Warning => "WARN",
            CheckState::Failed => "FAIL",
            CheckState::Info => "INFO",
            CheckState::Skipped => "SKIP",
        }
    }

    /// Unicode glyph for TTY output.
    pub fn glyph(self) -> &'static str {
        match self {
            CheckState::Passed => "✓",
            CheckState::Warning => "⚠",
            CheckState::Failed => "✗",
            CheckState::Info => "ℹ",
            CheckState::Skipped => "○",
        }
    }

    /// Bit position used by [`FilterWriter`] masks.
    pub(crate) fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// The result of a single check, immutable once constructed.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    /// Stable name of the check that produced this result.
    pub name: String,
    /// Outcome state.
    pub state: CheckState,
    /// One-line human-readable summary.
    pub summary: String,
    /// Supplementary key/value detail, ordered by key.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub details: BTreeMap<String, Value>,
}

impl CheckResult {
    fn new(name: &str, state: CheckState, summary: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            state,
            summary: summary.into(),
            details: BTreeMap::new(),
        }
    }

    /// A passing result.
    pub fn pass(name: &str, summary: impl Into<String>) -> Self {
        Self::new(name, CheckState::Passed, summary)
    }

    /// A warning result.
    pub fn warn(name: &str, summary: impl Into<String>) -> Self {
        Self::new(name, CheckState::Warning, summary)
    }

    /// A failing result.
    pub fn fail(name: &str, summary: impl Into<String>) -> Self {
        Self::new(name, CheckState::Failed, summary)
    }

    /// A failing result with the underlying error captured in details.
    pub fn fail_with_error(
        name: &str,
        summary: impl Into<String>,
        err: &dyn std::fmt::Display,
    ) -> Self {
        Self::new(name, CheckState::Failed, summary).with_detail("error", err.to_string())
    }

    /// An informational result.
    pub fn info(name: &str, summary: impl Into<String>) -> Self {
        Self::new(name, CheckState::Info, summary)
    }

    /// A skipped result.
    pub fn skip(name: &str, summary: impl Into<String>) -> Self {
        Self::new(name, CheckState::Skipped, summary)
    }

    /// Attach a detail entry. Intended for use by the producing check
    /// before the result is emitted.
    pub fn with_detail(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.details.insert(key.to_string(), value.into());
        self
    }
}

/// Writes check results to a configured output.
pub trait ResultWriter {
    /// Deliver a single result. Errors abort result delivery for the run.
    fn write_result(&mut self, result: &CheckResult) -> Result<()>;
}

impl<W: ResultWriter + ?Sized> ResultWriter for &mut W {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        (**self).write_result(result)
    }
}

impl<W: ResultWriter + ?Sized> ResultWriter for Box<W> {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        (**self).write_result(result)
    }
}

/// A writer that discards all results; the default no-op terminal.
#[derive(Debug, Default)]
pub struct DiscardWriter;

impl ResultWriter for DiscardWriter {
    fn write_result(&mut self, _result: &CheckResult) -> Result<()> {
        Ok(())
    }
}

/// A writer that retains every result in order, for programmatic inspection.
#[derive(Debug, Default)]
pub struct CaptureWriter {
    results: Vec<CheckResult>,
}

impl CaptureWriter {
    /// Create an empty capture writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Results written so far, in write order.
    pub fn results(&self) -> &[CheckResult] {
        &self.results
    }

    /// Consume the writer and return the captured results.
    pub fn into_results(self) -> Vec<CheckResult> {
        self.results
    }
}

impl ResultWriter for CaptureWriter {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        self.results.push(result.clone());
        Ok(())
    }
}
