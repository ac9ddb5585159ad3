//! Generate and templates command reports.

use std::path::{Path, PathBuf};

use idlgen_codegen::GenerateReport;

use super::output::{Output, Report};

/// Files touched by one generation run.
#[derive(Debug)]
pub struct GenerateSummary {
    pub destination: PathBuf,
    pub report: GenerateReport,
}

impl GenerateSummary {
    pub fn new(destination: &Path, report: GenerateReport) -> Self {
        Self {
            destination: destination.to_path_buf(),
            report,
        }
    }

    fn relative<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.destination)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

impl Report for GenerateSummary {
    fn render(&self, out: &mut dyn Output) {
        let report = &self.report;
        if report.warnings > 0 {
            out.warning(&format!(
                "{} warning{} while rendering templates",
                report.warnings,
                if report.warnings == 1 { "" } else { "s" }
            ));
        }

        if !report.written.is_empty() {
            out.section("Written");
            for path in &report.written {
                out.added_item(&self.relative(path));
            }
        }
        if !report.preserved.is_empty() {
            out.section("Preserved (use --force to overwrite)");
            for path in &report.preserved {
                out.kept_item(&self.relative(path));
            }
        }

        out.key_value(
            "Generated",
            &format!(
                "{} ({} written, {} unchanged, {} preserved)",
                self.destination.display(),
                report.written.len(),
                report.unchanged.len(),
                report.preserved.len()
            ),
        );
    }
}

/// Templates found in the search paths.
#[derive(Debug)]
pub struct TemplateList {
    pub templates: Vec<(String, PathBuf)>,
}

impl Report for TemplateList {
    fn render(&self, out: &mut dyn Output) {
        if self.templates.is_empty() {
            out.preformatted("No templates found");
            return;
        }
        out.section("Templates");
        for (name, path) in &self.templates {
            out.list_item(&format!("{} ({})", name, path.display()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::BufferOutput;

    #[test]
    fn test_generate_summary() {
        let report = GenerateReport {
            written: vec![PathBuf::from("out/echo.h")],
            unchanged: vec![PathBuf::from("out/echo.cpp")],
            preserved: vec![PathBuf::from("out/echo_impl.cpp")],
            warnings: 1,
        };
        let mut out = BufferOutput::default();
        GenerateSummary::new(Path::new("out"), report).render(&mut out);
        assert_eq!(
            out.lines,
            vec![
                "warning: 1 warning while rendering templates",
                "Written:",
                "  + echo.h",
                "Preserved (use --force to overwrite):",
                "  = echo_impl.cpp",
                "Generated: out (1 written, 1 unchanged, 1 preserved)",
            ]
        );
    }

    #[test]
    fn test_empty_template_list() {
        let mut out = BufferOutput::default();
        TemplateList { templates: Vec::new() }.render(&mut out);
        assert_eq!(out.lines, vec!["No templates found"]);
    }
}
