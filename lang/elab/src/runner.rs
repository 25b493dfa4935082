//! Entry points for executing engine computations against a freshly
//! initialized state.

use crate::{syntax::*, *};
use thiserror::Error;

/// Errors surfaced at the driver boundary, rendered for humans.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("maximum recursion depth has been reached")]
    MaxRecDepth,
    #[error("{0}")]
    Elab(String),
}

impl Elaborator {
    /// Run a computation and extract just the result.
    pub fn run<T>(
        env: Environment, config: Config, f: impl FnOnce(&mut Elaborator) -> Result<T>,
    ) -> Result<T> {
        let mut elab = Elaborator::new(env, config);
        f(&mut elab)
    }

    /// Run a computation and hand back the final state alongside the result,
    /// for callers that need to inspect assignments or caches afterwards.
    pub fn run_with<T>(
        env: Environment, config: Config, f: impl FnOnce(&mut Elaborator) -> Result<T>,
    ) -> (Result<T>, Elaborator) {
        let mut elab = Elaborator::new(env, config);
        let res = f(&mut elab);
        (res, elab)
    }

    /// Run a computation at the effectful boundary: uncaught errors are
    /// rendered through the formatter into a [`RunError`].
    pub fn run_io<T>(
        env: Environment, config: Config, f: impl FnOnce(&mut Elaborator) -> Result<T>,
    ) -> std::result::Result<T, RunError> {
        let mut elab = Elaborator::new(env, config);
        match f(&mut elab) {
            | Ok(res) => Ok(res),
            | Err(entry) if entry.is_max_rec_depth() => Err(RunError::MaxRecDepth),
            | Err(entry) => Err(RunError::Elab(elab.error_entry_output(&entry))),
        }
    }
}
