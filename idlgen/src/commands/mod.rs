mod completions;
mod generate;
mod selfcheck;
mod templates;

use clap::{Parser, Subcommand};
use completions::CompletionsCommand;
use eyre::Result;
use generate::GenerateCommand;
use selfcheck::SelfcheckCommand;
use templates::TemplatesCommand;

/// Extension trait for exiting on model document errors with pretty formatting
pub(crate) trait UnwrapOrExit<T> {
    fn unwrap_or_exit(self) -> Result<T>;
}

impl<T> UnwrapOrExit<T> for Result<T> {
    fn unwrap_or_exit(self) -> Result<T> {
        match self {
            Ok(v) => Ok(v),
            Err(err) => match err.downcast::<idlgen_idl::Error>() {
                Ok(e) => {
                    eprintln!("{:?}", miette::Report::new(e));
                    std::process::exit(1);
                }
                Err(err) => Err(err),
            },
        }
    }
}

#[derive(Parser)]
#[command(name = "idlgen")]
#[command(version)]
#[command(about = "Generate code from interface definitions with rule-driven templates")]
pub(crate) struct Cli {
    /// Log debug output (overridden by IDLGEN_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    pub fn run(&self) -> Result<()> {
        match &self.command {
            Commands::Generate(cmd) => cmd.run(),
            Commands::Selfcheck(cmd) => cmd.run(),
            Commands::Templates(cmd) => cmd.run(),
            Commands::Completions(cmd) => cmd.run(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate code for the modules of the source documents
    Generate(GenerateCommand),

    /// Run a generation against a built-in model to check the installation
    Selfcheck(SelfcheckCommand),

    /// List the templates found in the search paths
    Templates(TemplatesCommand),

    /// Generate shell completions
    Completions(CompletionsCommand),
}
