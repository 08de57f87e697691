//! Terminal renderer for check results.
//!
//! One line per result: a state tag (text or glyph, optionally colorized)
//! followed by the result summary.

use std::io::Write;

use console::Style;

use crate::error::Result;
use crate::report::{CheckResult, CheckState, ResultWriter};

/// How the state tag is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Unicode glyphs (✓, ✗, ...).
    #[default]
    Glyph,
    /// Fixed-width text tags (PASS, FAIL, ...).
    Text,
}

/// Renders results as human-readable lines.
#[derive(Debug)]
pub struct HumanWriter<Out> {
    out: Out,
    style: OutputStyle,
    colors: bool,
}

impl<Out: Write> HumanWriter<Out> {
    /// Create a renderer with glyph tags and no color.
    pub fn new(out: Out) -> Self {
        Self {
            out,
            style: OutputStyle::default(),
            colors: false,
        }
    }

    /// Select text or glyph state tags.
    pub fn style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable colorized tags.
    pub fn colors(mut self, colors: bool) -> Self {
        self.colors = colors;
        self
    }

    fn color_for(state: CheckState) -> Style {
        match state {
            CheckState::Passed => Style::new().green(),
            CheckState::Warning => Style::new().yellow(),
            CheckState::Failed => Style::new().red(),
            CheckState::Info => Style::new().cyan(),
            CheckState::Skipped => Style::new().dim(),
        }
    }
}

impl<Out: Write> ResultWriter for HumanWriter<Out> {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        let tag = match self.style {
            OutputStyle::Glyph => result.state.glyph(),
            OutputStyle::Text => result.state.text(),
        };

        if self.colors {
            let styled = Self::color_for(result.state).apply_to(tag);
            writeln!(self.out, "{} {}", styled, result.summary)?;
        } else {
            writeln!(self.out, "{} {}", tag, result.summary)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(style: OutputStyle, result: &CheckResult) -> String {
        let mut buf = Vec::new();
        let mut writer = HumanWriter::new(&mut buf).style(style);
        writer.write_result(result).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn text_style_prefixes_state_tag() {
        let line = render(
            OutputStyle::Text,
            &CheckResult::pass("c", "resource pods: can create, delete"),
        );
        assert_eq!(line, "PASS resource pods: can create, delete\n");
    }

    #[test]
    fn glyph_style_prefixes_glyph() {
        let line = render(OutputStyle::Glyph, &CheckResult::fail("c", "missing pods"));
        assert_eq!(line, "✗ missing pods\n");
    }

    #[test]
    fn each_state_renders_one_line() {
        let mut buf = Vec::new();
        let mut writer = HumanWriter::new(&mut buf).style(OutputStyle::Text);
        for state in CheckState::ALL {
            let result = CheckResult {
                name: "c".into(),
                state,
                summary: "s".into(),
                details: Default::default(),
            };
            writer.write_result(&result).unwrap();
        }
        let output = String::from_utf8(buf).unwrap();
        assert_eq!(output.lines().count(), CheckState::ALL.len());
    }

    #[test]
    fn colorized_output_still_contains_summary() {
        let mut buf = Vec::new();
        let mut writer = HumanWriter::new(&mut buf)
            .style(OutputStyle::Text)
            .colors(true);
        writer
            .write_result(&CheckResult::warn("c", "degraded experience"))
            .unwrap();
        let output = String::from_utf8(buf).unwrap();
        assert!(output.contains("degraded experience"));
    }
}
