use crate::analyzer::ScanReport;
use crate::resource_audit::Finding;
use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Color, ContentArrangement, Table};
use std::path::{Path, PathBuf};

pub const REPORT_TITLE: &str = "Untagged Resources Report";

pub struct Reporter;

impl Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Findings as a pretty-printed JSON array of `{"file", "type", "name"}`.
    pub fn render_json(&self, findings: &[Finding]) -> Result<String> {
        Ok(serde_json::to_string_pretty(findings)?)
    }

    pub fn render_table(&self, findings: &[Finding]) -> String {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(vec![
                Cell::new("File").fg(Color::Cyan),
                Cell::new("Resource Type").fg(Color::Magenta),
                Cell::new("Resource Name").fg(Color::Green),
            ]);

        for finding in findings {
            table.add_row(vec![
                Cell::new(finding.file.display()).fg(Color::Cyan),
                Cell::new(&finding.resource_type).fg(Color::Magenta),
                Cell::new(&finding.resource_name).fg(Color::Green),
            ]);
        }

        format!("{}\n{}", REPORT_TITLE, table)
    }

    pub fn summary_line(&self, report: &ScanReport) -> String {
        if report.has_findings() {
            format!("{} resource(s) are missing required tags.", report.findings.len())
        } else {
            "All resources have required tags.".to_string()
        }
    }

    /// Text written to stdout for the selected output mode.
    pub fn render(&self, report: &ScanReport, json: bool) -> Result<String> {
        if json {
            return self.render_json(&report.findings);
        }

        if report.has_findings() {
            Ok(format!("{}\n{}", self.render_table(&report.findings), self.summary_line(report)))
        } else {
            Ok(self.summary_line(report))
        }
    }

    /// Writes the JSON findings to `output_path`, creating parent directories.
    pub fn export_report(&self, report: &ScanReport, output_path: &Path) -> Result<PathBuf> {
        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(output_path, self.render_json(&report.findings)?)?;
        Ok(output_path.to_path_buf())
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}
