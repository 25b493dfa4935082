use crate::*;
use lumen_utils::new_key_type;

/* ------------------------------- Identifier ------------------------------- */

new_key_type! {
    /// Identifier for an expression node.
    pub struct ExprId;
    /// Identifier for a universe-level node.
    pub struct LevelId;
    /// Identifier for a free variable, minted once per elaboration run.
    pub struct FVarId;
    /// Identifier for an expression metavariable.
    pub struct MVarId;
    /// Identifier for a universe-level metavariable.
    pub struct LMVarId;
}

/* ---------------------------------- Level --------------------------------- */

/// A universe level. Levels have no binding construct, but they may contain
/// unassigned metavariables until instantiation eliminates them.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Level {
    Zero,
    Succ(LevelId),
    Max(LevelId, LevelId),
    IMax(LevelId, LevelId),
    Meta(LMVarId),
    Param(Name),
}

/* ----------------------------------- Expr ---------------------------------- */

/// `f a`
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct App(pub ExprId, pub ExprId);

/// A lambda or forall binder. The body sits under one more bound-variable
/// scope than the node itself.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Binder {
    pub name: Name,
    pub kind: BinderKind,
    pub ty: ExprId,
    pub body: ExprId,
}

/// `let x : ty := value; body`
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct LetBinder {
    pub name: Name,
    pub ty: ExprId,
    pub value: ExprId,
    pub body: ExprId,
}

/// A constant reference together with its universe-level arguments.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Const {
    pub name: Name,
    pub levels: Vec<LevelId>,
}

/// Projection of the `field`-th component out of a value of the named
/// structure.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Proj {
    pub type_name: Name,
    pub field: usize,
    pub inner: ExprId,
}

/// A metadata-wrapped subexpression; the engine looks through it everywhere.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct MData {
    pub data: Vec<(Name, Literal)>,
    pub inner: ExprId,
}

/// An expression node. Expressions are closed under de Bruijn indices
/// relative to their position: no index escapes its enclosing binder depth
/// except transiently inside the substitution routines.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Expr {
    /// de Bruijn index
    Bound(u32),
    /// free variable
    Local(FVarId),
    /// expression metavariable
    Meta(MVarId),
    Sort(LevelId),
    Const(Const),
    App(App),
    Lambda(Binder),
    Forall(Binder),
    Let(LetBinder),
    Proj(Proj),
    MData(MData),
    Lit(Literal),
}

/* ---------------------------------- Flags --------------------------------- */

/// Cached at node construction; what makes instantiation of a ground term
/// O(1) instead of O(size).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ExprFlags {
    pub has_expr_mvar: bool,
    pub has_level_mvar: bool,
    pub has_level_param: bool,
    pub has_fvar: bool,
    /// All loose de Bruijn indices in the node are strictly below this depth;
    /// zero means the node is closed.
    pub loose_bvar_depth: u32,
}

impl ExprFlags {
    pub fn closed(&self) -> bool {
        self.loose_bvar_depth == 0
    }
    pub fn has_mvar(&self) -> bool {
        self.has_expr_mvar || self.has_level_mvar
    }
    pub(crate) fn union(self, other: ExprFlags) -> ExprFlags {
        ExprFlags {
            has_expr_mvar: self.has_expr_mvar || other.has_expr_mvar,
            has_level_mvar: self.has_level_mvar || other.has_level_mvar,
            has_level_param: self.has_level_param || other.has_level_param,
            has_fvar: self.has_fvar || other.has_fvar,
            loose_bvar_depth: self.loose_bvar_depth.max(other.loose_bvar_depth),
        }
    }
    /// The node moves under one binder: loose references into that binder are
    /// no longer loose.
    pub(crate) fn under_binder(self) -> ExprFlags {
        ExprFlags { loose_bvar_depth: self.loose_bvar_depth.saturating_sub(1), ..self }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct LevelFlags {
    pub has_mvar: bool,
    pub has_param: bool,
}

impl LevelFlags {
    pub(crate) fn union(self, other: LevelFlags) -> LevelFlags {
        LevelFlags {
            has_mvar: self.has_mvar || other.has_mvar,
            has_param: self.has_param || other.has_param,
        }
    }
}
