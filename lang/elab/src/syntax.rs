pub use lumen_syntax::*;

use crate::lctx::LocalCtx;
use derive_more::From;

/* ----------------------------- Metavariable kind --------------------------- */

/// Controls whether automation may assign a metavariable. `SyntheticOpaque`
/// is reserved for placeholders that only their creator may solve.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum MetaKind {
    Natural,
    Synthetic,
    SyntheticOpaque,
}

impl MetaKind {
    pub fn is_assignable(&self) -> bool {
        !matches!(self, MetaKind::SyntheticOpaque)
    }
}

/* ----------------------------- Local declaration --------------------------- */

/// One entry of a local context. Never mutated after creation; scopes extend
/// a context by value instead of editing entries in place.
#[derive(Clone, Debug)]
pub struct LocalDecl {
    pub fvar: FVarId,
    pub user_name: Name,
    pub ty: ExprId,
    /// `Some` exactly for let-bound locals.
    pub value: Option<ExprId>,
    pub kind: BinderKind,
}

impl LocalDecl {
    pub fn is_let(&self) -> bool {
        self.value.is_some()
    }
}

/// A local whose type is a registered class, visible to instance resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalInstance {
    pub class_name: Name,
    pub fvar: FVarId,
}

/* -------------------------- Metavariable declaration ------------------------ */

#[derive(Clone, Debug)]
pub struct MetaDecl {
    pub user_name: Option<Name>,
    /// Creation ordinal, used for the `?m{index}` rendering of anonymous
    /// metavariables.
    pub index: usize,
    /// The local context the metavariable was created in.
    pub lctx: LocalCtx,
    pub local_instances: im::Vector<LocalInstance>,
    pub ty: ExprId,
    pub kind: MetaKind,
    /// The metavariable-context generation depth at creation time. The
    /// unifier uses this to refuse assignments to outer-depth metavariables
    /// from inside a sandboxed attempt.
    pub depth: usize,
}

/// Universe metavariables carry no type; the declaration is a marker plus the
/// creation depth.
#[derive(Clone, Debug)]
pub struct LevelMetaDecl {
    pub depth: usize,
}

/// A pending substitution: the metavariable stands for the pending peer's
/// value abstracted over `fvars`, realizable once the peer resolves.
#[derive(Clone, Debug)]
pub struct DelayedAssignment {
    pub fvars: im::Vector<FVarId>,
    pub peer: MVarId,
}

impl DelayedAssignment {
    pub fn arity(&self) -> usize {
        self.fvars.len()
    }
}

/// What a metavariable is resolved to.
#[derive(Clone, Debug, From)]
pub enum MetaAssignment {
    Direct(ExprId),
    Delayed(DelayedAssignment),
}

/* ------------------------------- Postponement ------------------------------ */

/// A universe-level constraint deferred because it was stuck on a
/// metavariable. The engine only stores these; solving them is the unifier's
/// business.
#[derive(Clone, Debug)]
pub struct PostponedEntry {
    pub lhs: LevelId,
    pub rhs: LevelId,
}

/* ---------------------------------- Tasks ---------------------------------- */

/// Call-stack entries recorded for error blame.
#[derive(Clone, Debug)]
pub enum ElabTask {
    InferType(ExprId),
    Whnf(ExprId),
    Telescope(ExprId),
    MkBinding(ExprId),
}

/* ---------------------------------- Config --------------------------------- */

/// Which definitions reduction is permitted to unfold.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Transparency {
    All,
    Default,
    Reducible,
    Instances,
}

#[derive(Copy, Clone, Debug)]
pub struct Config {
    pub transparency: Transparency,
    pub max_rec_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self { transparency: Transparency::Default, max_rec_depth: 512 }
    }
}
