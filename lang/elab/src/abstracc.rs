//! Binder re-assembly: the inverse of the telescope walk.
//!
//! Given free variables and a body, abstract the variables back into a
//! forall/lambda chain. The variables are first reordered to local-context
//! declaration order, and out-of-set locals that depend on an abstracted
//! variable block the linearization.

use crate::{syntax::*, *};
use std::collections::HashSet;

impl Elaborator {
    /// Abstract `fvars` (free-variable references, outer-to-inner) out of
    /// `body` as a forall chain. Let-bound locals re-assemble as let binders.
    pub fn mk_forall_fvars(&mut self, fvars: &[ExprId], body: ExprId) -> Result<ExprId> {
        let fvars = self.fvar_ids(fvars)?;
        let lctx = self.lctx.clone();
        self.mk_binding_in(false, &lctx, &fvars, body)
    }

    /// The lambda analogue of [`Elaborator::mk_forall_fvars`].
    pub fn mk_lambda_fvars(&mut self, fvars: &[ExprId], body: ExprId) -> Result<ExprId> {
        let fvars = self.fvar_ids(fvars)?;
        let lctx = self.lctx.clone();
        self.mk_binding_in(true, &lctx, &fvars, body)
    }

    fn fvar_ids(&self, fvars: &[ExprId]) -> Result<Vec<FVarId>> {
        fvars
            .iter()
            .map(|e| match self.terms.expr(*e) {
                | Expr::Local(fvar) => Ok(*fvar),
                | _ => self.err(ElabError::RevertFailure, std::panic::Location::caller()),
            })
            .collect()
    }

    /// The shared re-abstraction primitive: order the targets by declaration
    /// position in `lctx`, verify the dependency graph linearizes, then fold
    /// binders from the innermost target outwards. Types and values of
    /// earlier targets are abstracted along the way because each step
    /// abstracts over the whole accumulated term.
    pub(crate) fn mk_binding_in(
        &mut self, lambda: bool, lctx: &LocalCtx, fvars: &[FVarId], body: ExprId,
    ) -> Result<ExprId> {
        let res = self.guarded(|this| {
            this.stack.push_back(ElabTask::MkBinding(body));
            let mut ordered: Vec<(usize, FVarId)> = Vec::with_capacity(fvars.len());
            for fvar in fvars {
                let Some(pos) = lctx.position(*fvar) else {
                    return this.err(ElabError::UnknownFVar(*fvar), std::panic::Location::caller());
                };
                ordered.push((pos, *fvar));
            }
            ordered.sort_by_key(|(pos, _)| *pos);
            let ordered: Vec<FVarId> = ordered.into_iter().map(|(_, fvar)| fvar).collect();

            this.check_revert_dependencies(lctx, &ordered, body)?;

            let mut e = body;
            for fvar in ordered.iter().rev() {
                let Some(decl) = lctx.get(*fvar).cloned() else { unreachable!() };
                e = this.terms.abstract_fvars(e, std::slice::from_ref(fvar));
                e = match decl.value {
                    | Some(value) => this.terms.mk_let(LetBinder {
                        name: decl.user_name,
                        ty: decl.ty,
                        value,
                        body: e,
                    }),
                    | None if lambda => this.terms.mk_lambda(Binder {
                        name: decl.user_name,
                        kind: decl.kind,
                        ty: decl.ty,
                        body: e,
                    }),
                    | None => this.terms.mk_forall(Binder {
                        name: decl.user_name,
                        kind: decl.kind,
                        ty: decl.ty,
                        body: e,
                    }),
                };
            }
            Ok(e)
        });
        res
    }

    /// An out-of-set local that (a) occurs in the term being reassembled and
    /// (b) depends on an abstracted variable would be captured by the new
    /// binders; reverting such dependents is not supported here.
    fn check_revert_dependencies(
        &mut self, lctx: &LocalCtx, targets: &[FVarId], body: ExprId,
    ) -> Result<()> {
        let mut used = HashSet::new();
        self.terms.collect_fvars(body, &mut used);
        for fvar in targets {
            if let Some(decl) = lctx.get(*fvar) {
                self.terms.collect_fvars(decl.ty, &mut used);
                if let Some(value) = decl.value {
                    self.terms.collect_fvars(value, &mut used);
                }
            }
        }
        for fvar in used {
            if targets.contains(&fvar) {
                continue;
            }
            let Some(decl) = lctx.get(fvar) else { continue };
            let mut deps = false;
            deps |= self.terms.depends_on_any(decl.ty, targets);
            if let Some(value) = decl.value {
                deps |= self.terms.depends_on_any(value, targets);
            }
            if deps {
                return self.err(ElabError::RevertFailure, std::panic::Location::caller());
            }
        }
        Ok(())
    }
}
