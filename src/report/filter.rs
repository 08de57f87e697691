//! State-based result filtering.
//!
//! A [`FilterWriter`] forwards results whose state is in its accept mask
//! and silently drops the rest. The default mask accepts Passed, Warning,
//! and Failed; Info and Skipped are suppressed unless opted in.

use crate::error::Result;
use crate::report::{CheckResult, CheckState, ResultWriter};

/// Forwards results matching an accept mask to the wrapped writer.
#[derive(Debug)]
pub struct FilterWriter<W> {
    writer: W,
    mask: u8,
}

impl<W: ResultWriter> FilterWriter<W> {
    /// Wrap `writer` with the default mask: Passed, Warning, Failed.
    pub fn new(writer: W) -> Self {
        let mut filter = Self { writer, mask: 0 };
        filter.accept(CheckState::Passed);
        filter.accept(CheckState::Warning);
        filter.accept(CheckState::Failed);
        filter
    }

    /// Wrap `writer` accepting exactly the given states.
    pub fn with_accepted(writer: W, states: &[CheckState]) -> Self {
        let mut filter = Self { writer, mask: 0 };
        for state in states {
            filter.accept(*state);
        }
        filter
    }

    /// Add a state to the accept mask.
    pub fn accept(&mut self, state: CheckState) {
        self.mask |= state.bit();
    }

    /// Remove a state from the accept mask.
    pub fn suppress(&mut self, state: CheckState) {
        self.mask &= !state.bit();
    }

    /// Unwrap the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: ResultWriter> ResultWriter for FilterWriter<W> {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        if self.mask & result.state.bit() != 0 {
            return self.writer.write_result(result);
        }
        Ok(())
    }
}
