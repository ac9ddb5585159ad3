use std::path::PathBuf;

use clap::Args;
use eyre::Result;
use idlgen_codegen::discover_templates;

use crate::reports::{Report, TemplateList, TerminalOutput};

#[derive(Args)]
pub struct TemplatesCommand {
    /// Directory searched for templates (repeatable)
    #[arg(short = 'T', long = "template-search-path", value_name = "DIR", required = true)]
    pub search_paths: Vec<PathBuf>,
}

impl TemplatesCommand {
    pub fn run(&self) -> Result<()> {
        let report = TemplateList {
            templates: discover_templates(&self.search_paths).into_iter().collect(),
        };
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
