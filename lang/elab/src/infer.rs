//! Type inference for the term language, enough to type telescope-minted
//! metavariables and binder re-assembly outputs. Results are memoized in the
//! generation-keyed persistent cache.

use crate::{syntax::*, *};

impl Elaborator {
    pub fn infer_type(&mut self, e: ExprId) -> Result<ExprId> {
        self.with_inc_rec_depth(|this| {
            let key = (this.cache_gen(), this.config.transparency, e);
            if let Some(res) = this.caches.infer_type.get(&key) {
                return Ok(*res);
            }
            let res = this.guarded(|this| {
                this.stack.push_back(ElabTask::InferType(e));
                this.infer_type_core(e)
            })?;
            this.caches.infer_type.insert(key, res);
            Ok(res)
        })
    }

    fn infer_type_core(&mut self, e: ExprId) -> Result<ExprId> {
        match self.terms.expr(e).clone() {
            | Expr::Bound(idx) => {
                self.err(ElabError::LooseBVar(idx), std::panic::Location::caller())
            }
            | Expr::Local(fvar) => Ok(self.get_local_decl(fvar)?.ty),
            | Expr::Meta(mvar) => Ok(self.get_mvar_decl(mvar)?.ty),
            | Expr::Sort(l) => {
                let succ = self.terms.mk_succ(l);
                Ok(self.terms.mk_sort(succ))
            }
            | Expr::Const(c) => {
                let info = self.get_const_info(&c.name)?;
                if info.level_params.len() != c.levels.len() {
                    return self.err(
                        ElabError::LevelParamMismatch(c.name),
                        std::panic::Location::caller(),
                    );
                }
                Ok(self.terms.instantiate_level_params(info.ty, &info.level_params, &c.levels))
            }
            | Expr::App(_) => {
                let (head, args) = self.terms.unfold_apps(e);
                let mut fty = self.infer_type(head)?;
                for arg in args {
                    if !matches!(self.terms.expr(fty), Expr::Forall(_)) {
                        fty = self.whnf(fty)?;
                    }
                    let Expr::Forall(b) = self.terms.expr(fty).clone() else {
                        return self.err(
                            ElabError::FunctionExpected(e),
                            std::panic::Location::caller(),
                        );
                    };
                    fty = self.terms.instantiate1(b.body, arg);
                }
                Ok(fty)
            }
            | Expr::Lambda(b) => {
                self.with_local_decl(b.name.clone(), b.kind, b.ty, |this, x| {
                    let body = this.terms.instantiate1(b.body, x);
                    let body_ty = this.infer_type(body)?;
                    this.mk_forall_fvars(&[x], body_ty)
                })
            }
            | Expr::Forall(b) => {
                let dom_level = self.sort_level_of(b.ty)?;
                self.with_local_decl(b.name.clone(), b.kind, b.ty, |this, x| {
                    let body = this.terms.instantiate1(b.body, x);
                    let body_level = this.sort_level_of(body)?;
                    let imax = this.terms.mk_imax(dom_level, body_level);
                    Ok(this.terms.mk_sort(imax))
                })
            }
            | Expr::Let(b) => {
                let body = self.terms.instantiate1(b.body, b.value);
                self.infer_type(body)
            }
            | Expr::Proj(_) => {
                self.err(ElabError::ProjUnsupported(e), std::panic::Location::caller())
            }
            | Expr::MData(m) => self.infer_type(m.inner),
            | Expr::Lit(Literal::Nat(_)) => Ok(self.terms.mk_const("Nat", vec![])),
            | Expr::Lit(Literal::Str(_)) => Ok(self.terms.mk_const("String", vec![])),
        }
    }

    /// The sort the given type lives in.
    pub fn sort_level_of(&mut self, ty: ExprId) -> Result<LevelId> {
        let ty_ty = self.infer_type(ty)?;
        let ty_ty = self.whnf(ty_ty)?;
        match self.terms.expr(ty_ty) {
            | Expr::Sort(l) => Ok(*l),
            | _ => self.err(ElabError::SortExpected(ty_ty), std::panic::Location::caller()),
        }
    }
}
