use crate::syntax::*;

/// The metavariable context: declarations and assignments for expression- and
/// universe-level metavariables. A dumb store by design; occurs checks and
/// depth discipline are the unifier's business. All maps are persistent, so a
/// snapshot is a `clone` and a restore is an overwrite.
#[derive(Clone, Debug, Default)]
pub struct MetaCtx {
    depth: usize,
    expr_decls: im::HashMap<MVarId, MetaDecl>,
    assignments: im::HashMap<MVarId, MetaAssignment>,
    level_decls: im::HashMap<LMVarId, LevelMetaDecl>,
    level_assignments: im::HashMap<LMVarId, LevelId>,
}

impl MetaCtx {
    pub fn new() -> Self {
        Self::default()
    }

    /// The generation depth; metavariables remember the depth they were
    /// created at so nested unification attempts can be sandboxed.
    pub fn depth(&self) -> usize {
        self.depth
    }
    pub fn inc_depth(&mut self) {
        self.depth += 1;
    }

    /* ------------------------------ Declarations ------------------------------ */

    pub fn add_expr_mvar_decl(&mut self, mvar: MVarId, decl: MetaDecl) {
        debug_assert!(!self.expr_decls.contains_key(&mvar));
        self.expr_decls.insert(mvar, decl);
    }

    pub fn add_level_mvar_decl(&mut self, lmvar: LMVarId) {
        debug_assert!(!self.level_decls.contains_key(&lmvar));
        self.level_decls.insert(lmvar, LevelMetaDecl { depth: self.depth });
    }

    pub fn find_decl(&self, mvar: MVarId) -> Option<&MetaDecl> {
        self.expr_decls.get(&mvar)
    }
    pub fn find_level_decl(&self, lmvar: LMVarId) -> Option<&LevelMetaDecl> {
        self.level_decls.get(&lmvar)
    }

    pub fn set_mvar_kind(&mut self, mvar: MVarId, kind: MetaKind) {
        let Some(decl) = self.expr_decls.get_mut(&mvar) else { panic!("unknown metavariable") };
        decl.kind = kind;
    }
    pub fn set_mvar_type(&mut self, mvar: MVarId, ty: ExprId) {
        let Some(decl) = self.expr_decls.get_mut(&mvar) else { panic!("unknown metavariable") };
        decl.ty = ty;
    }
    /// Re-key a declaration, carrying any assignment along.
    pub fn rename_mvar(&mut self, old: MVarId, new: MVarId) {
        let Some(decl) = self.expr_decls.remove(&old) else { panic!("unknown metavariable") };
        debug_assert!(!self.expr_decls.contains_key(&new));
        self.expr_decls.insert(new, decl);
        if let Some(assignment) = self.assignments.remove(&old) {
            self.assignments.insert(new, assignment);
        }
    }

    /* ------------------------------- Assignments ------------------------------ */

    /// Record a value for a currently-unassigned metavariable. No occurs
    /// check happens here.
    pub fn assign_expr(&mut self, mvar: MVarId, value: ExprId) {
        debug_assert!(!self.assignments.contains_key(&mvar));
        self.assignments.insert(mvar, MetaAssignment::Direct(value));
    }

    pub fn assign_delayed(&mut self, mvar: MVarId, delayed: DelayedAssignment) {
        debug_assert!(!self.assignments.contains_key(&mvar));
        self.assignments.insert(mvar, MetaAssignment::Delayed(delayed));
    }

    pub fn assign_level(&mut self, lmvar: LMVarId, value: LevelId) {
        debug_assert!(!self.level_assignments.contains_key(&lmvar));
        self.level_assignments.insert(lmvar, value);
    }

    pub fn get_expr_assignment(&self, mvar: MVarId) -> Option<ExprId> {
        match self.assignments.get(&mvar) {
            | Some(MetaAssignment::Direct(value)) => Some(*value),
            | Some(MetaAssignment::Delayed(_)) | None => None,
        }
    }
    pub fn get_delayed_assignment(&self, mvar: MVarId) -> Option<&DelayedAssignment> {
        match self.assignments.get(&mvar) {
            | Some(MetaAssignment::Delayed(delayed)) => Some(delayed),
            | Some(MetaAssignment::Direct(_)) | None => None,
        }
    }
    pub fn get_level_assignment(&self, lmvar: LMVarId) -> Option<LevelId> {
        self.level_assignments.get(&lmvar).copied()
    }

    pub fn is_expr_assigned(&self, mvar: MVarId) -> bool {
        matches!(self.assignments.get(&mvar), Some(MetaAssignment::Direct(_)))
    }
    pub fn is_delayed_assigned(&self, mvar: MVarId) -> bool {
        matches!(self.assignments.get(&mvar), Some(MetaAssignment::Delayed(_)))
    }
    pub fn is_level_assigned(&self, lmvar: LMVarId) -> bool {
        self.level_assignments.contains_key(&lmvar)
    }

    /* --------------------------------- Queries -------------------------------- */

    /// Does the term contain a metavariable that is unassigned and of a kind
    /// automation may assign?
    pub fn has_assignable_mvar(&self, terms: &TermArena, e: ExprId) -> bool {
        if !terms.expr_flags(e).has_mvar() {
            return false;
        }
        match terms.expr(e) {
            | Expr::Meta(m) => {
                if self.is_expr_assigned(*m) || self.is_delayed_assigned(*m) {
                    return false;
                }
                self.find_decl(*m).map_or(true, |decl| decl.kind.is_assignable())
            }
            | Expr::Sort(l) => self.has_unassigned_level_mvar(terms, *l),
            | Expr::Const(c) => {
                c.levels.iter().any(|l| self.has_unassigned_level_mvar(terms, *l))
            }
            | Expr::App(App(f, a)) => {
                self.has_assignable_mvar(terms, *f) || self.has_assignable_mvar(terms, *a)
            }
            | Expr::Lambda(b) | Expr::Forall(b) => {
                self.has_assignable_mvar(terms, b.ty) || self.has_assignable_mvar(terms, b.body)
            }
            | Expr::Let(b) => {
                self.has_assignable_mvar(terms, b.ty)
                    || self.has_assignable_mvar(terms, b.value)
                    || self.has_assignable_mvar(terms, b.body)
            }
            | Expr::Proj(p) => self.has_assignable_mvar(terms, p.inner),
            | Expr::MData(m) => self.has_assignable_mvar(terms, m.inner),
            | Expr::Bound(_) | Expr::Local(_) | Expr::Lit(_) => false,
        }
    }

    /// Unassigned universe metavariables are always assignable.
    pub fn has_unassigned_level_mvar(&self, terms: &TermArena, l: LevelId) -> bool {
        if !terms.level_flags(l).has_mvar {
            return false;
        }
        match terms.level(l) {
            | Level::Meta(m) => !self.is_level_assigned(*m),
            | Level::Succ(x) => self.has_unassigned_level_mvar(terms, *x),
            | Level::Max(a, b) | Level::IMax(a, b) => {
                self.has_unassigned_level_mvar(terms, *a)
                    || self.has_unassigned_level_mvar(terms, *b)
            }
            | Level::Zero | Level::Param(_) => false,
        }
    }
}
