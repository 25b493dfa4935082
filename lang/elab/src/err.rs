use crate::{syntax::*, *};

/* ---------------------------------- Errors --------------------------------- */

#[derive(Debug, Clone)]
pub enum ElabError {
    // lookup failures; rendered with the offending reference
    UnknownMVar(MVarId),
    UnknownLevelMVar(LMVarId),
    UnknownFVar(FVarId),
    UnknownUserName(Name),
    UnknownConst(Name),
    // structural failures; caller-side logic bugs, fixed messages
    LooseBVar(u32),
    FunctionExpected(ExprId),
    SortExpected(ExprId),
    LevelParamMismatch(Name),
    ProjUnsupported(ExprId),
    TooManyArgs { given: usize, accepted: usize },
    RevertFailure,
    // resource exhaustion; identifiable so callers can tell "stuck" from
    // "wrong"
    MaxRecDepth,
}

#[derive(Debug, Clone)]
pub struct ElabErrorEntry {
    pub error: ElabError,
    pub blame: &'static std::panic::Location<'static>,
    pub stack: im::Vector<ElabTask>,
}

impl ElabErrorEntry {
    pub fn is_max_rec_depth(&self) -> bool {
        matches!(self.error, ElabError::MaxRecDepth)
    }
}

pub type Result<T> = std::result::Result<T, ElabErrorEntry>;

/* -------------------------------- Reporting -------------------------------- */

impl Elaborator {
    pub fn error_output(&self, error: &ElabError) -> String {
        use crate::fmt::*;
        let f = self.formatter();
        match error {
            | ElabError::UnknownMVar(m) => {
                format!("unknown metavariable '{}'", m.ugly(&f))
            }
            | ElabError::UnknownLevelMVar(m) => {
                format!("unknown universe metavariable '{}'", m.ugly(&f))
            }
            | ElabError::UnknownFVar(fvar) => {
                format!("unknown free variable '{}'", fvar.ugly(&f))
            }
            | ElabError::UnknownUserName(name) => {
                format!("unknown local declaration '{}'", name)
            }
            | ElabError::UnknownConst(name) => {
                format!("unknown constant '{}'", name)
            }
            | ElabError::LooseBVar(idx) => {
                format!("loose bound variable #{}", idx)
            }
            | ElabError::FunctionExpected(e) => {
                format!("function expected at `{}`", e.ugly(&f))
            }
            | ElabError::SortExpected(e) => {
                format!("sort expected, found `{}`", e.ugly(&f))
            }
            | ElabError::LevelParamMismatch(name) => {
                format!("incorrect number of universe levels for '{}'", name)
            }
            | ElabError::ProjUnsupported(e) => {
                format!("cannot type projection `{}` without structure information", e.ugly(&f))
            }
            | ElabError::TooManyArgs { given, accepted } => {
                format!("too many arguments: {} supplied, binder chain accepts {}", given, accepted)
            }
            | ElabError::RevertFailure => format!(
                "failed to create binder due to failure when reverting variable dependencies"
            ),
            | ElabError::MaxRecDepth => {
                format!("maximum recursion depth has been reached")
            }
        }
    }

    pub fn error_entry_output(&self, entry: &ElabErrorEntry) -> String {
        use crate::fmt::*;
        let f = self.formatter();
        let mut s = String::new();
        s += &self.error_output(&entry.error);
        s += &format!("\n  blame: {}", entry.blame);
        for task in entry.stack.iter().rev() {
            match task {
                | ElabTask::InferType(e) => {
                    s += &format!("\n  - while inferring the type of `{}`", e.ugly(&f));
                }
                | ElabTask::Whnf(e) => {
                    s += &format!("\n  - while normalizing `{}`", e.ugly(&f));
                }
                | ElabTask::Telescope(e) => {
                    s += &format!("\n  - while peeling binders of `{}`", e.ugly(&f));
                }
                | ElabTask::MkBinding(e) => {
                    s += &format!("\n  - while re-abstracting `{}`", e.ugly(&f));
                }
            }
        }
        s
    }
}
