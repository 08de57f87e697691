//! Running result counters.

use serde::Serialize;

use crate::error::Result;
use crate::report::{CheckResult, CheckState, ResultWriter};

/// Snapshot of result counts per state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub passed: usize,
    pub warning: usize,
    pub failed: usize,
    pub info: usize,
    pub skipped: usize,
    pub total: usize,
}

impl Summary {
    /// Whether any failing result was counted.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

/// Counts results per state and always forwards them unchanged.
#[derive(Debug)]
pub struct SummaryWriter<W> {
    summary: Summary,
    writer: W,
}

impl<W: ResultWriter> SummaryWriter<W> {
    /// Wrap `writer` with zeroed counters.
    pub fn new(writer: W) -> Self {
        Self {
            summary: Summary::default(),
            writer,
        }
    }

    /// Current counter snapshot.
    pub fn summary(&self) -> Summary {
        self.summary
    }

    /// Zero all counters.
    pub fn reset(&mut self) {
        self.summary = Summary::default();
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: ResultWriter> ResultWriter for SummaryWriter<W> {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        self.summary.total += 1;
        match result.state {
            CheckState::Passed => self.summary.passed += 1,
            CheckState::Warning => self.summary.warning += 1,
            CheckState::Failed => self.summary.failed += 1,
            CheckState::Info => self.summary.info += 1,
            CheckState::Skipped => self.summary.skipped += 1,
        }

        self.writer.write_result(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{CaptureWriter, DiscardWriter};

    #[test]
    fn counts_every_state_and_total() {
        let mut writer = SummaryWriter::new(DiscardWriter);
        for _ in 0..5 {
            writer.write_result(&CheckResult::pass("c", "p")).unwrap();
        }
        for _ in 0..3 {
            writer.write_result(&CheckResult::fail("c", "f")).unwrap();
        }
        writer.write_result(&CheckResult::warn("c", "w")).unwrap();
        for _ in 0..5 {
            writer.write_result(&CheckResult::info("c", "i")).unwrap();
        }
        for _ in 0..3 {
            writer.write_result(&CheckResult::skip("c", "s")).unwrap();
        }

        assert_eq!(
            writer.summary(),
            Summary {
                passed: 5,
                warning: 1,
                failed: 3,
                info: 5,
                skipped: 3,
                total: 17,
            }
        );
    }

    #[test]
    fn forwards_results_unchanged() {
        let mut writer = SummaryWriter::new(CaptureWriter::new());
        writer
            .write_result(&CheckResult::skip("c", "skipped check"))
            .unwrap();
        let forwarded = writer.into_inner().into_results();
        assert_eq!(forwarded.len(), 1);
        assert_eq!(forwarded[0].summary, "skipped check");
    }

    #[test]
    fn reset_zeroes_counters() {
        let mut writer = SummaryWriter::new(DiscardWriter);
        writer.write_result(&CheckResult::pass("c", "p")).unwrap();
        assert_eq!(writer.summary().total, 1);

        writer.reset();
        assert_eq!(writer.summary(), Summary::default());
    }

    #[test]
    fn has_failures_reflects_failed_count() {
        let mut writer = SummaryWriter::new(DiscardWriter);
        assert!(!writer.summary().has_failures());
        writer.write_result(&CheckResult::fail("c", "f")).unwrap();
        assert!(writer.summary().has_failures());
    }
}
