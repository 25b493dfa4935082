//! Weak-head normalization.
//!
//! `whnf_core` performs the transparency-independent steps: metavariable
//! resolution, beta, zeta for let binders and let-bound locals, and metadata
//! unwrapping. `whnf` additionally unfolds constants permitted by the ambient
//! transparency, recursing under the depth guard so a non-terminating
//! unfolding chain surfaces as a depth error instead of a hung process.

use crate::{syntax::*, *};

impl Elaborator {
    pub fn whnf(&mut self, e: ExprId) -> Result<ExprId> {
        self.with_inc_rec_depth(|this| {
            let key = (this.cache_gen(), this.config.transparency, e);
            if let Some(res) = this.caches.whnf.get(&key) {
                return Ok(*res);
            }
            let res = this.guarded(|this| {
                this.stack.push_back(ElabTask::Whnf(e));
                let head = this.whnf_core(e)?;
                match this.unfold_definition(head)? {
                    | Some(next) => this.whnf(next),
                    | None => Ok(head),
                }
            })?;
            this.caches.whnf.insert(key, res);
            Ok(res)
        })
    }

    /// Reduction steps that do not consult the environment.
    pub fn whnf_core(&mut self, e: ExprId) -> Result<ExprId> {
        match self.terms.expr(e).clone() {
            | Expr::MData(m) => self.whnf_core(m.inner),
            | Expr::Meta(_) => {
                let resolved = self.instantiate_expr_mvars(e);
                if resolved == e { Ok(e) } else { self.whnf_core(resolved) }
            }
            | Expr::Local(fvar) => {
                let decl = self.get_local_decl(fvar)?;
                match decl.value {
                    | Some(value) => {
                        self.zeta_fvars.insert(fvar);
                        self.whnf_core(value)
                    }
                    | None => Ok(e),
                }
            }
            | Expr::App(_) => {
                let (head, args) = self.terms.unfold_apps(e);
                let head2 = self.whnf_core(head)?;
                let head_is_lambda = matches!(self.terms.expr(head2), Expr::Lambda(_));
                if head_is_lambda {
                    let reduced = self.terms.beta_app(head2, &args);
                    self.whnf_core(reduced)
                } else if head2 == head {
                    Ok(e)
                } else {
                    Ok(self.terms.mk_apps(head2, &args))
                }
            }
            | Expr::Let(b) => {
                let body = self.terms.instantiate1(b.body, b.value);
                self.whnf_core(body)
            }
            | Expr::Bound(_)
            | Expr::Sort(_)
            | Expr::Const(_)
            | Expr::Lambda(_)
            | Expr::Forall(_)
            | Expr::Proj(_)
            | Expr::Lit(_) => Ok(e),
        }
    }

    /// One step of delta reduction, if the head constant may be unfolded
    /// under the ambient transparency.
    fn unfold_definition(&mut self, e: ExprId) -> Result<Option<ExprId>> {
        let (head, args) = self.terms.unfold_apps(e);
        let Expr::Const(c) = self.terms.expr(head).clone() else {
            return Ok(None);
        };
        let info = self.get_const_info(&c.name)?;
        if !self.can_unfold(&info) {
            return Ok(None);
        }
        let Some(value) = info.value else {
            return Ok(None);
        };
        let value = self.terms.instantiate_level_params(value, &info.level_params, &c.levels);
        Ok(Some(self.terms.beta_app(value, &args)))
    }

    fn can_unfold(&self, info: &ConstantInfo) -> bool {
        match self.config.transparency {
            | Transparency::All => true,
            | Transparency::Default => !matches!(info.reducibility, Reducibility::Irreducible),
            | Transparency::Reducible | Transparency::Instances => {
                matches!(info.reducibility, Reducibility::Reducible)
            }
        }
    }
}
