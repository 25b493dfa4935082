//! Substitution of assigned metavariables throughout a term.
//!
//! Each top-level call owns a transient cache keyed by original-subterm
//! identity, so shared subterms are instantiated once per call. The cache is
//! never persisted; cross-call memoization lives in [`crate::Caches`] under
//! generation-sensitive keys.

use crate::{syntax::*, *};
use std::collections::HashMap;

impl Elaborator {
    /// Replace every assigned metavariable in `e` by its (recursively
    /// instantiated) value; unassigned metavariables stay put. Pure with
    /// respect to the input term: the original node is never mutated.
    pub fn instantiate_expr_mvars(&mut self, e: ExprId) -> ExprId {
        if !self.terms.expr_flags(e).has_mvar() {
            return e;
        }
        let mut cache = HashMap::new();
        self.instantiate_expr_core(e, &mut cache)
    }

    fn instantiate_expr_core(
        &mut self, e: ExprId, cache: &mut HashMap<ExprId, ExprId>,
    ) -> ExprId {
        if !self.terms.expr_flags(e).has_mvar() {
            return e;
        }
        if let Some(res) = cache.get(&e) {
            return *res;
        }
        let res = match self.terms.expr(e).clone() {
            | Expr::Meta(m) => self.instantiate_mvar(m, &[], cache),
            | Expr::App(_) => {
                // the spine is walked as a whole so the cache is probed once
                // per spine, not once per nested app node
                let (head, args) = self.terms.unfold_apps(e);
                let args: Vec<ExprId> =
                    args.iter().map(|a| self.instantiate_expr_core(*a, cache)).collect();
                let head_mvar = match self.terms.expr(head) {
                    | Expr::Meta(m) => Some(*m),
                    | _ => None,
                };
                match head_mvar {
                    | Some(m) => self.instantiate_mvar(m, &args, cache),
                    | None => {
                        let head = self.instantiate_expr_core(head, cache);
                        self.terms.mk_apps(head, &args)
                    }
                }
            }
            | Expr::Sort(l) => {
                let l = self.instantiate_level_mvars(l);
                self.terms.mk_sort(l)
            }
            | Expr::Const(c) => {
                let levels =
                    c.levels.iter().map(|l| self.instantiate_level_mvars(*l)).collect();
                self.terms.mk_const(c.name, levels)
            }
            | Expr::Lambda(b) => {
                let ty = self.instantiate_expr_core(b.ty, cache);
                let body = self.instantiate_expr_core(b.body, cache);
                self.terms.mk_lambda(Binder { ty, body, ..b })
            }
            | Expr::Forall(b) => {
                let ty = self.instantiate_expr_core(b.ty, cache);
                let body = self.instantiate_expr_core(b.body, cache);
                self.terms.mk_forall(Binder { ty, body, ..b })
            }
            | Expr::Let(b) => {
                let ty = self.instantiate_expr_core(b.ty, cache);
                let value = self.instantiate_expr_core(b.value, cache);
                let body = self.instantiate_expr_core(b.body, cache);
                self.terms.mk_let(LetBinder { ty, value, body, ..b })
            }
            | Expr::Proj(p) => {
                let inner = self.instantiate_expr_core(p.inner, cache);
                self.terms.mk_expr(Expr::Proj(Proj { inner, ..p }))
            }
            | Expr::MData(m) => {
                let inner = self.instantiate_expr_core(m.inner, cache);
                self.terms.mk_expr(Expr::MData(MData { inner, ..m }))
            }
            | Expr::Bound(_) | Expr::Local(_) | Expr::Lit(_) => e,
        };
        cache.insert(e, res);
        res
    }

    /// Instantiate a metavariable applied to the already-instantiated `args`
    /// (empty for a bare occurrence).
    fn instantiate_mvar(
        &mut self, m: MVarId, args: &[ExprId], cache: &mut HashMap<ExprId, ExprId>,
    ) -> ExprId {
        if let Some(value) = self.mctx.get_expr_assignment(m) {
            let value = self.instantiate_expr_core(value, cache);
            return self.terms.beta_app(value, args);
        }
        if let Some(delayed) = self.mctx.get_delayed_assignment(m).cloned() {
            if let Some(lam) = self.resolve_delayed(&delayed, cache) {
                return self.terms.beta_app(lam, args);
            }
        }
        let mv = self.terms.mk_meta(m);
        self.terms.mk_apps(mv, args)
    }

    /// Realize a delayed assignment once its pending peer has resolved: the
    /// peer's instantiated value abstracted over the recorded free
    /// variables. Applying the result to fewer arguments than the arity
    /// leaves the remaining binders as residual lambdas.
    fn resolve_delayed(
        &mut self, delayed: &DelayedAssignment, cache: &mut HashMap<ExprId, ExprId>,
    ) -> Option<ExprId> {
        if !self.mctx.is_expr_assigned(delayed.peer)
            && !self.mctx.is_delayed_assigned(delayed.peer)
        {
            return None;
        }
        let peer = self.terms.mk_meta(delayed.peer);
        let value = self.instantiate_expr_core(peer, cache);
        if self.head_is_unresolved_mvar(value) {
            return None;
        }
        let lctx = match self.mctx.find_decl(delayed.peer) {
            | Some(decl) => decl.lctx.clone(),
            | None => self.lctx.clone(),
        };
        let fvars: Vec<FVarId> = delayed.fvars.iter().copied().collect();
        self.mk_binding_in(true, &lctx, &fvars, value).ok()
    }

    fn head_is_unresolved_mvar(&self, e: ExprId) -> bool {
        let (head, _) = self.terms.unfold_apps(e);
        match self.terms.expr(head) {
            | Expr::Meta(m) => {
                !self.mctx.is_expr_assigned(*m) && !self.mctx.is_delayed_assigned(*m)
            }
            | _ => false,
        }
    }

    /* --------------------------------- Levels --------------------------------- */

    pub fn instantiate_level_mvars(&mut self, l: LevelId) -> LevelId {
        if !self.terms.level_flags(l).has_mvar {
            return l;
        }
        match self.terms.level(l).clone() {
            | Level::Meta(m) => match self.mctx.get_level_assignment(m) {
                | Some(value) => self.instantiate_level_mvars(value),
                | None => l,
            },
            | Level::Succ(x) => {
                let x = self.instantiate_level_mvars(x);
                self.terms.mk_succ(x)
            }
            | Level::Max(a, b) => {
                let a = self.instantiate_level_mvars(a);
                let b = self.instantiate_level_mvars(b);
                self.terms.mk_max(a, b)
            }
            | Level::IMax(a, b) => {
                let a = self.instantiate_level_mvars(a);
                let b = self.instantiate_level_mvars(b);
                self.terms.mk_imax(a, b)
            }
            | Level::Zero | Level::Param(_) => l,
        }
    }

    /// A level is normalized once its assigned metavariables are gone and the
    /// obvious `max`/`imax` collapses have been applied.
    pub fn normalize_level(&mut self, l: LevelId) -> LevelId {
        let l = self.instantiate_level_mvars(l);
        self.simp_level(l)
    }

    fn simp_level(&mut self, l: LevelId) -> LevelId {
        match self.terms.level(l).clone() {
            | Level::Succ(x) => {
                let x = self.simp_level(x);
                self.terms.mk_succ(x)
            }
            | Level::Max(a, b) => {
                let a = self.simp_level(a);
                let b = self.simp_level(b);
                self.mk_max_simp(a, b)
            }
            | Level::IMax(a, b) => {
                let a = self.simp_level(a);
                let b = self.simp_level(b);
                if self.is_zero_level(b) {
                    b
                } else if self.is_zero_level(a) || a == b {
                    b
                } else if matches!(self.terms.level(b), Level::Succ(_)) {
                    // the right side is definitely nonzero
                    self.mk_max_simp(a, b)
                } else {
                    self.terms.mk_imax(a, b)
                }
            }
            | Level::Zero | Level::Meta(_) | Level::Param(_) => l,
        }
    }

    fn mk_max_simp(&mut self, a: LevelId, b: LevelId) -> LevelId {
        if a == b || self.is_zero_level(b) {
            a
        } else if self.is_zero_level(a) {
            b
        } else {
            self.terms.mk_max(a, b)
        }
    }

    fn is_zero_level(&self, l: LevelId) -> bool {
        matches!(self.terms.level(l), Level::Zero)
    }

    /* --------------------------- Binder application --------------------------- */

    /// Substitute explicit arguments into a forall chain, without reduction.
    pub fn instantiate_forall(&mut self, e: ExprId, args: &[ExprId]) -> Result<ExprId> {
        let mut e = e;
        for (i, arg) in args.iter().enumerate() {
            match self.terms.expr(e).clone() {
                | Expr::Forall(b) => {
                    e = self.terms.instantiate1(b.body, *arg);
                }
                | _ => {
                    return self.err(
                        ElabError::TooManyArgs { given: args.len(), accepted: i },
                        std::panic::Location::caller(),
                    );
                }
            }
        }
        Ok(e)
    }

    /// The lambda analogue of [`Elaborator::instantiate_forall`].
    pub fn instantiate_lambda(&mut self, e: ExprId, args: &[ExprId]) -> Result<ExprId> {
        let mut e = e;
        for (i, arg) in args.iter().enumerate() {
            match self.terms.expr(e).clone() {
                | Expr::Lambda(b) => {
                    e = self.terms.instantiate1(b.body, *arg);
                }
                | _ => {
                    return self.err(
                        ElabError::TooManyArgs { given: args.len(), accepted: i },
                        std::panic::Location::caller(),
                    );
                }
            }
        }
        Ok(e)
    }
}
