//! JSON-lines renderer for check results.
//!
//! Emits one JSON object per result for machine consumption.

use std::io::Write;

use crate::error::Result;
use crate::report::{CheckResult, ResultWriter};

/// Renders each result as a single line of JSON.
#[derive(Debug)]
pub struct JsonWriter<Out> {
    out: Out,
}

impl<Out: Write> JsonWriter<Out> {
    /// Create a JSON renderer writing to `out`.
    pub fn new(out: Out) -> Self {
        Self { out }
    }
}

impl<Out: Write> ResultWriter for JsonWriter<Out> {
    fn write_result(&mut self, result: &CheckResult) -> Result<()> {
        serde_json::to_writer(&mut self.out, result)?;
        writeln!(self.out)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_one_json_object_per_line() {
        let mut buf = Vec::new();
        let mut writer = JsonWriter::new(&mut buf);
        writer.write_result(&CheckResult::pass("a", "first")).unwrap();
        writer.write_result(&CheckResult::fail("b", "second")).unwrap();

        let output = String::from_utf8(buf).unwrap();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["name"], "a");
        assert_eq!(first["state"], "passed");
    }

    #[test]
    fn details_are_included_when_present() {
        let mut buf = Vec::new();
        let mut writer = JsonWriter::new(&mut buf);
        let result = CheckResult::fail("c", "boom").with_detail("error", "timed out");
        writer.write_result(&result).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(String::from_utf8(buf).unwrap().trim()).unwrap();
        assert_eq!(parsed["details"]["error"], "timed out");
    }
}
