//! Model preparation pipeline.
//!
//! Between parsing and template traversal the model goes through a fixed
//! series of phases that may mutate it:
//!
//! - [`AnnotatePhase`](crate::annotate::AnnotatePhase) merges annotation documents
//! - [`TagPhase`](crate::tagging::TagPhase) adds the generation config to every node
//! - [`ValidatePhase`](crate::validate::ValidatePhase) rejects unsupported types and runs lints
//!
//! Once the pipeline has run, the model is frozen behind an `Arc` and only
//! read from.

use eyre::{Result, WrapErr};
use idlgen_model::System;

use crate::{Diagnostic, Reporter};

/// State threaded through the preparation phases.
#[derive(Debug)]
pub struct PrepareContext {
    pub system: System,
    /// File name of the first source document, used in messages.
    pub src_file: String,
    pub reporter: Reporter,
    pub diagnostics: Vec<Diagnostic>,
}

impl PrepareContext {
    pub fn new(system: System, src_file: impl Into<String>, reporter: Reporter) -> Self {
        Self {
            system,
            src_file: src_file.into(),
            reporter,
            diagnostics: Vec::new(),
        }
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_error())
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity.is_warning())
            .count()
    }
}

/// One step of model preparation.
pub trait Phase: Send + Sync {
    /// The name of this phase, used in error context.
    fn name(&self) -> &'static str;

    /// Run this phase.
    ///
    /// Fatal problems are returned as errors, everything else is recorded
    /// as a diagnostic.
    fn run(&self, ctx: &mut PrepareContext) -> Result<()>;
}

/// Runs phases in the order they were added.
#[derive(Default)]
pub struct Pipeline {
    phases: Vec<Box<dyn Phase>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn run(&self, ctx: &mut PrepareContext) -> Result<()> {
        for phase in &self.phases {
            tracing::debug!("running phase {}", phase.name());
            phase
                .run(ctx)
                .wrap_err_with(|| format!("{} phase failed", phase.name()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use eyre::bail;

    use super::*;

    struct Counting(Arc<AtomicUsize>);

    impl Phase for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn run(&self, _ctx: &mut PrepareContext) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl Phase for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn run(&self, _ctx: &mut PrepareContext) -> Result<()> {
            bail!("boom")
        }
    }

    #[test]
    fn test_phases_run_in_order_and_stop_on_error() {
        let count = Arc::new(AtomicUsize::new(0));
        let pipeline = Pipeline::new()
            .phase(Counting(count.clone()))
            .phase(Failing)
            .phase(Counting(count.clone()));

        let mut ctx = PrepareContext::new(System::new(), "echo.yaml", Reporter::new());
        let err = pipeline.run(&mut ctx).unwrap_err();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(err.to_string(), "failing phase failed");
        assert_eq!(err.root_cause().to_string(), "boom");
    }
}
