//! De Bruijn index substitution and abstraction.
//!
//! The substitution array convention is reversed relative to binder order:
//! peeling binders pushes replacements onto the *end* of an array, so bound
//! index `k` at depth `d` resolves to `subst[len - 1 - (k - d)]`. This is what
//! lets telescope walks build their replacement arrays by plain `push`.

use crate::*;
use std::collections::HashSet;

impl TermArena {
    /* ----------------------------- Instantiation ------------------------------ */

    /// Replace the `n` innermost loose bound variables of `e` by
    /// `subst[n - 1 - k]` and lower deeper loose indices by `n`.
    pub fn instantiate_rev(&mut self, e: ExprId, subst: &[ExprId]) -> ExprId {
        if subst.is_empty() {
            return e;
        }
        self.instantiate_rev_at(e, subst, 0)
    }

    /// Substitute a single binder.
    pub fn instantiate1(&mut self, e: ExprId, value: ExprId) -> ExprId {
        self.instantiate_rev(e, &[value])
    }

    fn instantiate_rev_at(&mut self, e: ExprId, subst: &[ExprId], depth: u32) -> ExprId {
        if self.expr_flags(e).loose_bvar_depth <= depth {
            return e;
        }
        let n = subst.len() as u32;
        match self.expr(e).clone() {
            | Expr::Bound(i) => {
                // the flags guard means i >= depth here
                let j = i - depth;
                if j < n {
                    self.lift_loose_bvars(subst[(n - 1 - j) as usize], depth)
                } else {
                    self.mk_bound(i - n)
                }
            }
            | Expr::App(App(f, a)) => {
                let f = self.instantiate_rev_at(f, subst, depth);
                let a = self.instantiate_rev_at(a, subst, depth);
                self.mk_app(f, a)
            }
            | Expr::Lambda(b) => {
                let ty = self.instantiate_rev_at(b.ty, subst, depth);
                let body = self.instantiate_rev_at(b.body, subst, depth + 1);
                self.mk_lambda(Binder { ty, body, ..b })
            }
            | Expr::Forall(b) => {
                let ty = self.instantiate_rev_at(b.ty, subst, depth);
                let body = self.instantiate_rev_at(b.body, subst, depth + 1);
                self.mk_forall(Binder { ty, body, ..b })
            }
            | Expr::Let(b) => {
                let ty = self.instantiate_rev_at(b.ty, subst, depth);
                let value = self.instantiate_rev_at(b.value, subst, depth);
                let body = self.instantiate_rev_at(b.body, subst, depth + 1);
                self.mk_let(LetBinder { ty, value, body, ..b })
            }
            | Expr::Proj(p) => {
                let inner = self.instantiate_rev_at(p.inner, subst, depth);
                self.mk_expr(Expr::Proj(Proj { inner, ..p }))
            }
            | Expr::MData(m) => {
                let inner = self.instantiate_rev_at(m.inner, subst, depth);
                self.mk_expr(Expr::MData(MData { inner, ..m }))
            }
            | Expr::Local(_)
            | Expr::Meta(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lit(_) => e,
        }
    }

    /// Raise all loose bound indices of `e` by `amount`.
    pub fn lift_loose_bvars(&mut self, e: ExprId, amount: u32) -> ExprId {
        if amount == 0 {
            return e;
        }
        self.lift_loose_bvars_at(e, amount, 0)
    }

    fn lift_loose_bvars_at(&mut self, e: ExprId, amount: u32, depth: u32) -> ExprId {
        if self.expr_flags(e).loose_bvar_depth <= depth {
            return e;
        }
        match self.expr(e).clone() {
            | Expr::Bound(i) => self.mk_bound(i + amount),
            | Expr::App(App(f, a)) => {
                let f = self.lift_loose_bvars_at(f, amount, depth);
                let a = self.lift_loose_bvars_at(a, amount, depth);
                self.mk_app(f, a)
            }
            | Expr::Lambda(b) => {
                let ty = self.lift_loose_bvars_at(b.ty, amount, depth);
                let body = self.lift_loose_bvars_at(b.body, amount, depth + 1);
                self.mk_lambda(Binder { ty, body, ..b })
            }
            | Expr::Forall(b) => {
                let ty = self.lift_loose_bvars_at(b.ty, amount, depth);
                let body = self.lift_loose_bvars_at(b.body, amount, depth + 1);
                self.mk_forall(Binder { ty, body, ..b })
            }
            | Expr::Let(b) => {
                let ty = self.lift_loose_bvars_at(b.ty, amount, depth);
                let value = self.lift_loose_bvars_at(b.value, amount, depth);
                let body = self.lift_loose_bvars_at(b.body, amount, depth + 1);
                self.mk_let(LetBinder { ty, value, body, ..b })
            }
            | Expr::Proj(p) => {
                let inner = self.lift_loose_bvars_at(p.inner, amount, depth);
                self.mk_expr(Expr::Proj(Proj { inner, ..p }))
            }
            | Expr::MData(m) => {
                let inner = self.lift_loose_bvars_at(m.inner, amount, depth);
                self.mk_expr(Expr::MData(MData { inner, ..m }))
            }
            | Expr::Local(_)
            | Expr::Meta(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lit(_) => e,
        }
    }

    /* ------------------------------- Abstraction ------------------------------ */

    /// Turn occurrences of `fvars[j]` into bound index `depth + n - 1 - j`,
    /// the inverse of [`TermArena::instantiate_rev`]. The caller wraps the
    /// result in `n` binders, outermost first.
    pub fn abstract_fvars(&mut self, e: ExprId, fvars: &[FVarId]) -> ExprId {
        if fvars.is_empty() {
            return e;
        }
        self.abstract_fvars_at(e, fvars, 0)
    }

    fn abstract_fvars_at(&mut self, e: ExprId, fvars: &[FVarId], depth: u32) -> ExprId {
        if !self.expr_flags(e).has_fvar {
            return e;
        }
        let n = fvars.len() as u32;
        match self.expr(e).clone() {
            | Expr::Local(f) => match fvars.iter().position(|x| *x == f) {
                | Some(j) => self.mk_bound(depth + n - 1 - j as u32),
                | None => e,
            },
            | Expr::App(App(f, a)) => {
                let f = self.abstract_fvars_at(f, fvars, depth);
                let a = self.abstract_fvars_at(a, fvars, depth);
                self.mk_app(f, a)
            }
            | Expr::Lambda(b) => {
                let ty = self.abstract_fvars_at(b.ty, fvars, depth);
                let body = self.abstract_fvars_at(b.body, fvars, depth + 1);
                self.mk_lambda(Binder { ty, body, ..b })
            }
            | Expr::Forall(b) => {
                let ty = self.abstract_fvars_at(b.ty, fvars, depth);
                let body = self.abstract_fvars_at(b.body, fvars, depth + 1);
                self.mk_forall(Binder { ty, body, ..b })
            }
            | Expr::Let(b) => {
                let ty = self.abstract_fvars_at(b.ty, fvars, depth);
                let value = self.abstract_fvars_at(b.value, fvars, depth);
                let body = self.abstract_fvars_at(b.body, fvars, depth + 1);
                self.mk_let(LetBinder { ty, value, body, ..b })
            }
            | Expr::Proj(p) => {
                let inner = self.abstract_fvars_at(p.inner, fvars, depth);
                self.mk_expr(Expr::Proj(Proj { inner, ..p }))
            }
            | Expr::MData(m) => {
                let inner = self.abstract_fvars_at(m.inner, fvars, depth);
                self.mk_expr(Expr::MData(MData { inner, ..m }))
            }
            | Expr::Bound(_)
            | Expr::Meta(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lit(_) => e,
        }
    }

    /* --------------------------------- Spines --------------------------------- */

    /// Flatten an application spine into its head and argument array.
    pub fn unfold_apps(&self, e: ExprId) -> (ExprId, Vec<ExprId>) {
        let mut args = Vec::new();
        let mut head = e;
        while let Expr::App(App(f, a)) = self.expr(head) {
            args.push(*a);
            head = *f;
        }
        args.reverse();
        (head, args)
    }

    /// Apply `f` to `args`, consuming leading lambdas by substitution and
    /// applying whatever arguments remain as a plain spine.
    pub fn beta_app(&mut self, f: ExprId, args: &[ExprId]) -> ExprId {
        let mut consumed = 0;
        let mut body = f;
        while consumed < args.len() {
            match self.expr(body) {
                | Expr::Lambda(b) => {
                    body = b.body;
                    consumed += 1;
                }
                | _ => break,
            }
        }
        let body = self.instantiate_rev(body, &args[..consumed]);
        self.mk_apps(body, &args[consumed..])
    }

    /* ----------------------------- Level parameters --------------------------- */

    /// Substitute universe parameters by the given levels, positionally.
    pub fn instantiate_level_params(
        &mut self, e: ExprId, params: &[Name], levels: &[LevelId],
    ) -> ExprId {
        if !self.expr_flags(e).has_level_param || params.is_empty() {
            return e;
        }
        match self.expr(e).clone() {
            | Expr::Sort(l) => {
                let l = self.subst_level_params(l, params, levels);
                self.mk_sort(l)
            }
            | Expr::Const(c) => {
                let ls = c
                    .levels
                    .iter()
                    .map(|l| self.subst_level_params(*l, params, levels))
                    .collect();
                self.mk_const(c.name, ls)
            }
            | Expr::App(App(f, a)) => {
                let f = self.instantiate_level_params(f, params, levels);
                let a = self.instantiate_level_params(a, params, levels);
                self.mk_app(f, a)
            }
            | Expr::Lambda(b) => {
                let ty = self.instantiate_level_params(b.ty, params, levels);
                let body = self.instantiate_level_params(b.body, params, levels);
                self.mk_lambda(Binder { ty, body, ..b })
            }
            | Expr::Forall(b) => {
                let ty = self.instantiate_level_params(b.ty, params, levels);
                let body = self.instantiate_level_params(b.body, params, levels);
                self.mk_forall(Binder { ty, body, ..b })
            }
            | Expr::Let(b) => {
                let ty = self.instantiate_level_params(b.ty, params, levels);
                let value = self.instantiate_level_params(b.value, params, levels);
                let body = self.instantiate_level_params(b.body, params, levels);
                self.mk_let(LetBinder { ty, value, body, ..b })
            }
            | Expr::Proj(p) => {
                let inner = self.instantiate_level_params(p.inner, params, levels);
                self.mk_expr(Expr::Proj(Proj { inner, ..p }))
            }
            | Expr::MData(m) => {
                let inner = self.instantiate_level_params(m.inner, params, levels);
                self.mk_expr(Expr::MData(MData { inner, ..m }))
            }
            | Expr::Bound(_) | Expr::Local(_) | Expr::Meta(_) | Expr::Lit(_) => e,
        }
    }

    pub fn subst_level_params(
        &mut self, l: LevelId, params: &[Name], levels: &[LevelId],
    ) -> LevelId {
        if !self.level_flags(l).has_param {
            return l;
        }
        match self.level(l).clone() {
            | Level::Param(n) => match params.iter().position(|p| *p == n) {
                | Some(j) if j < levels.len() => levels[j],
                | _ => l,
            },
            | Level::Succ(x) => {
                let x = self.subst_level_params(x, params, levels);
                self.mk_succ(x)
            }
            | Level::Max(a, b) => {
                let a = self.subst_level_params(a, params, levels);
                let b = self.subst_level_params(b, params, levels);
                self.mk_max(a, b)
            }
            | Level::IMax(a, b) => {
                let a = self.subst_level_params(a, params, levels);
                let b = self.subst_level_params(b, params, levels);
                self.mk_imax(a, b)
            }
            | Level::Zero | Level::Meta(_) => l,
        }
    }

    /* ------------------------------ Dependencies ------------------------------ */

    /// Does `e` mention the free variable?
    pub fn depends_on(&self, e: ExprId, fvar: FVarId) -> bool {
        self.depends_on_any(e, std::slice::from_ref(&fvar))
    }

    pub fn depends_on_any(&self, e: ExprId, fvars: &[FVarId]) -> bool {
        if !self.expr_flags(e).has_fvar {
            return false;
        }
        match self.expr(e) {
            | Expr::Local(f) => fvars.contains(f),
            | Expr::App(App(f, a)) => {
                self.depends_on_any(*f, fvars) || self.depends_on_any(*a, fvars)
            }
            | Expr::Lambda(b) | Expr::Forall(b) => {
                self.depends_on_any(b.ty, fvars) || self.depends_on_any(b.body, fvars)
            }
            | Expr::Let(b) => {
                self.depends_on_any(b.ty, fvars)
                    || self.depends_on_any(b.value, fvars)
                    || self.depends_on_any(b.body, fvars)
            }
            | Expr::Proj(p) => self.depends_on_any(p.inner, fvars),
            | Expr::MData(m) => self.depends_on_any(m.inner, fvars),
            | Expr::Bound(_)
            | Expr::Meta(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lit(_) => false,
        }
    }

    /// Collect every free variable mentioned in `e`.
    pub fn collect_fvars(&self, e: ExprId, acc: &mut HashSet<FVarId>) {
        if !self.expr_flags(e).has_fvar {
            return;
        }
        match self.expr(e) {
            | Expr::Local(f) => {
                acc.insert(*f);
            }
            | Expr::App(App(f, a)) => {
                self.collect_fvars(*f, acc);
                self.collect_fvars(*a, acc);
            }
            | Expr::Lambda(b) | Expr::Forall(b) => {
                self.collect_fvars(b.ty, acc);
                self.collect_fvars(b.body, acc);
            }
            | Expr::Let(b) => {
                self.collect_fvars(b.ty, acc);
                self.collect_fvars(b.value, acc);
                self.collect_fvars(b.body, acc);
            }
            | Expr::Proj(p) => self.collect_fvars(p.inner, acc),
            | Expr::MData(m) => self.collect_fvars(m.inner, acc),
            | Expr::Bound(_)
            | Expr::Meta(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lit(_) => {}
        }
    }
}
