//! Process level setup: logging and the builtin configuration.

use std::path::PathBuf;

use eyre::{Result, WrapErr};
use idlgen_codegen::{FilterRegistry, GenerationSession};
use idlgen_codegen_qt::QtFilters;
use idlgen_core::BuiltinConfig;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "IDLGEN_LOG";

pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Directory holding the executable, where the builtin `.config` lives.
fn exe_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().wrap_err("cannot locate the idlgen executable")?;
    Ok(exe.parent().map(PathBuf::from).unwrap_or_default())
}

/// Load the builtin configuration and set up a session with the Qt filters.
pub fn session() -> Result<GenerationSession> {
    let path = BuiltinConfig::locate(&exe_dir()?);
    let config = BuiltinConfig::load(&path).wrap_err("failed to load the builtin configuration")?;
    tracing::debug!(
        "builtin configuration {} (version {}, features: {:?})",
        path.display(),
        config.version(),
        config.features()
    );

    let filters = FilterRegistry::new().with_default(QtFilters::default());
    Ok(GenerationSession::new(config).with_filters(filters))
}
