use clap::Args;
use eyre::{Result, WrapErr};
use idlgen_codegen::selfcheck;

use crate::config;

#[derive(Args)]
pub struct SelfcheckCommand {}

impl SelfcheckCommand {
    pub fn run(&self) -> Result<()> {
        let session = config::session()?;
        let dir = tempfile::tempdir().wrap_err("failed to create a scratch directory")?;

        match selfcheck(&session, dir.path()) {
            Ok(report) => {
                println!("self check finished successfully ({} files generated)", report.written.len());
                Ok(())
            }
            Err(err) => Err(err.wrap_err("self check failed")),
        }
    }
}
