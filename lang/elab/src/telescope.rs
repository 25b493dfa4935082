//! Binder telescopes.
//!
//! All shapes share one walk. Binders are peeled without substituting bodies
//! eagerly: replacements accumulate in an array built by `push`, and a
//! pending suffix of that array is substituted into a subterm only when the
//! walk actually needs it closed (a binder domain, a reduction step, or the
//! final body). Bound index `k` therefore resolves to `pending[len - 1 - k]`,
//! the reversed-order convention of [`TermArena::instantiate_rev`].

use crate::{syntax::*, *};

#[derive(Copy, Clone, Debug)]
enum TelescopeMode {
    Forall { reducing: bool },
    Lambda { lets: bool },
}

impl TelescopeMode {
    fn peels_forall(&self) -> bool {
        matches!(self, TelescopeMode::Forall { .. })
    }
    fn peels_lambda(&self) -> bool {
        matches!(self, TelescopeMode::Lambda { .. })
    }
    fn peels_lets(&self) -> bool {
        matches!(self, TelescopeMode::Lambda { lets: true })
    }
    fn reducing(&self) -> bool {
        matches!(self, TelescopeMode::Forall { reducing: true })
    }
}

impl Elaborator {
    /// Peel the leading forall binders of `e`, literally as written.
    pub fn forall_telescope<R>(
        &mut self, e: ExprId, f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        self.binder_telescope(e, TelescopeMode::Forall { reducing: false }, None, f)
    }

    /// Like [`Elaborator::forall_telescope`], but normalizes the head between
    /// binders so head-reducible type synonyms peel through.
    pub fn forall_telescope_reducing<R>(
        &mut self, e: ExprId, f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        self.binder_telescope(e, TelescopeMode::Forall { reducing: true }, None, f)
    }

    /// Reducing forall telescope that stops after `max` binders when a bound
    /// is given.
    pub fn forall_bounded_telescope<R>(
        &mut self, e: ExprId, max: Option<usize>,
        f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        self.binder_telescope(e, TelescopeMode::Forall { reducing: true }, max, f)
    }

    pub fn lambda_telescope<R>(
        &mut self, e: ExprId, f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        self.binder_telescope(e, TelescopeMode::Lambda { lets: false }, None, f)
    }

    /// Peels let binders as well; the introduced locals carry values and are
    /// never instance-tracked.
    pub fn lambda_let_telescope<R>(
        &mut self, e: ExprId, f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        self.binder_telescope(e, TelescopeMode::Lambda { lets: true }, None, f)
    }

    fn binder_telescope<R>(
        &mut self, e: ExprId, mode: TelescopeMode, max: Option<usize>,
        f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        let saved_lctx = self.lctx.clone();
        let saved_insts = self.local_instances.clone();
        let saved_cache = self.caches.synth_instance.clone();
        let res = self.guarded(|this| {
            this.stack.push_back(ElabTask::Telescope(e));
            this.binder_telescope_loop(e, mode, max, f)
        });
        self.lctx = saved_lctx;
        self.local_instances = saved_insts;
        self.caches.synth_instance = saved_cache;
        res
    }

    fn binder_telescope_loop<R>(
        &mut self, e: ExprId, mode: TelescopeMode, max: Option<usize>,
        f: impl FnOnce(&mut Self, &[ExprId], ExprId) -> Result<R>,
    ) -> Result<R> {
        let mut fvars: Vec<ExprId> = Vec::new();
        // fvars[done..] have not been substituted into `ty` yet
        let mut done = 0;
        let mut ty = e;
        loop {
            if let Some(limit) = max {
                if fvars.len() >= limit {
                    break;
                }
            }
            match self.terms.expr(ty).clone() {
                | Expr::Forall(b) if mode.peels_forall() => {
                    let pending = fvars[done..].to_vec();
                    let dom = self.terms.instantiate_rev(b.ty, &pending);
                    let fvar = self.push_local(b.name, b.kind, dom, None)?;
                    fvars.push(self.terms.mk_local(fvar));
                    ty = b.body;
                }
                | Expr::Lambda(b) if mode.peels_lambda() => {
                    let pending = fvars[done..].to_vec();
                    let dom = self.terms.instantiate_rev(b.ty, &pending);
                    let fvar = self.push_local(b.name, b.kind, dom, None)?;
                    fvars.push(self.terms.mk_local(fvar));
                    ty = b.body;
                }
                | Expr::Let(b) if mode.peels_lets() => {
                    let pending = fvars[done..].to_vec();
                    let dom = self.terms.instantiate_rev(b.ty, &pending);
                    let value = self.terms.instantiate_rev(b.value, &pending);
                    let fvar = self.push_local(b.name, BinderKind::Default, dom, Some(value))?;
                    fvars.push(self.terms.mk_local(fvar));
                    ty = b.body;
                }
                | _ => {
                    let pending = fvars[done..].to_vec();
                    ty = self.terms.instantiate_rev(ty, &pending);
                    done = fvars.len();
                    if mode.reducing() {
                        let red = self.whnf(ty)?;
                        if matches!(self.terms.expr(red), Expr::Forall(_)) {
                            ty = red;
                            continue;
                        }
                    }
                    break;
                }
            }
        }
        let pending = fvars[done..].to_vec();
        let ty = self.terms.instantiate_rev(ty, &pending);
        f(self, &fvars, ty)
    }

    /* ----------------------------- Meta telescopes ----------------------------- */

    /// Peel forall binders into fresh metavariables of the binder types,
    /// recording each binder kind so the caller knows which results demand
    /// typeclass resolution rather than unification.
    pub fn forall_meta_telescope(
        &mut self, e: ExprId,
    ) -> Result<(Vec<ExprId>, Vec<BinderKind>, ExprId)> {
        self.meta_telescope(e, true, false, None)
    }

    pub fn forall_meta_telescope_reducing(
        &mut self, e: ExprId, max: Option<usize>,
    ) -> Result<(Vec<ExprId>, Vec<BinderKind>, ExprId)> {
        self.meta_telescope(e, true, true, max)
    }

    pub fn forall_meta_bounded_telescope(
        &mut self, e: ExprId, max: usize,
    ) -> Result<(Vec<ExprId>, Vec<BinderKind>, ExprId)> {
        self.meta_telescope(e, true, true, Some(max))
    }

    /// Convert a lambda prefix into an application-of-metavariables skeleton.
    pub fn lambda_meta_telescope(
        &mut self, e: ExprId, max: Option<usize>,
    ) -> Result<(Vec<ExprId>, Vec<BinderKind>, ExprId)> {
        self.meta_telescope(e, false, false, max)
    }

    fn meta_telescope(
        &mut self, e: ExprId, foralls: bool, reducing: bool, max: Option<usize>,
    ) -> Result<(Vec<ExprId>, Vec<BinderKind>, ExprId)> {
        let mut mvars: Vec<ExprId> = Vec::new();
        let mut kinds: Vec<BinderKind> = Vec::new();
        let mut done = 0;
        let mut ty = e;
        loop {
            if let Some(limit) = max {
                if mvars.len() >= limit {
                    break;
                }
            }
            let binder = match self.terms.expr(ty).clone() {
                | Expr::Forall(b) if foralls => Some(b),
                | Expr::Lambda(b) if !foralls => Some(b),
                | _ => None,
            };
            match binder {
                | Some(b) => {
                    let pending = mvars[done..].to_vec();
                    let dom = self.terms.instantiate_rev(b.ty, &pending);
                    let mvar = self.mk_fresh_expr_mvar(dom, MetaKind::Natural, None);
                    mvars.push(mvar);
                    kinds.push(b.kind);
                    ty = b.body;
                }
                | None => {
                    let pending = mvars[done..].to_vec();
                    ty = self.terms.instantiate_rev(ty, &pending);
                    done = mvars.len();
                    if reducing && foralls {
                        let red = self.whnf(ty)?;
                        if matches!(self.terms.expr(red), Expr::Forall(_)) {
                            ty = red;
                            continue;
                        }
                    }
                    break;
                }
            }
        }
        let pending = mvars[done..].to_vec();
        let ty = self.terms.instantiate_rev(ty, &pending);
        Ok((mvars, kinds, ty))
    }
}
