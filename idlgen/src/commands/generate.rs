use std::path::PathBuf;

use clap::Args;
use eyre::{Result, bail};
use idlgen_codegen::{GenerateRequest, IdlFrontend};

use super::UnwrapOrExit;
use crate::{
    config,
    reports::{GenerateSummary, Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// Model documents or directories, followed by the destination directory
    #[arg(required = true, num_args = 2.., value_name = "SRC... DST")]
    pub paths: Vec<PathBuf>,

    /// Template name from the search paths, or path to a template directory
    #[arg(short, long)]
    pub template: String,

    /// Directory searched for templates (repeatable)
    #[arg(short = 'T', long = "template-search-path", value_name = "DIR")]
    pub search_paths: Vec<PathBuf>,

    /// Identifier of the module being built, exposed as `config.module`
    #[arg(long)]
    pub module: Option<String>,

    /// Overwrite every output file, including preserved ones
    #[arg(long)]
    pub force: bool,

    /// Annotation document merged onto the model (repeatable, later wins)
    #[arg(short = 'A', long = "annotation", value_name = "FILE")]
    pub annotations: Vec<PathBuf>,

    /// Document or directory only used to resolve imports (repeatable)
    #[arg(short = 'I', long = "import", value_name = "PATH")]
    pub imports: Vec<PathBuf>,
}

impl GenerateCommand {
    fn request(&self) -> Result<GenerateRequest> {
        let Some((destination, sources)) = self.paths.split_last() else {
            bail!("expected source documents and a destination directory");
        };
        if sources.is_empty() {
            bail!("expected at least one source document before {}", destination.display());
        }
        Ok(GenerateRequest {
            sources: sources.to_vec(),
            destination: destination.clone(),
            template: self.template.clone(),
            search_paths: self.search_paths.clone(),
            module: self.module.clone(),
            force: self.force,
            annotations: self.annotations.clone(),
            imports: self.imports.clone(),
        })
    }

    /// Run the generate command
    pub fn run(&self) -> Result<()> {
        let request = self.request()?;
        let session = config::session()?;

        let report = session.generate(&IdlFrontend, &request).unwrap_or_exit()?;

        GenerateSummary::new(&request.destination, report).render(&mut TerminalOutput::new());
        Ok(())
    }
}
