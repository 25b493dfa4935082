//! Deciding whether a binder domain is a registered class, feeding the
//! telescope walk's local-instance bookkeeping.

use crate::{syntax::*, *};

/// Verdict of the cheap syntactic check.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassQuick {
    Class(Name),
    NotClass,
    Undetermined,
}

impl Elaborator {
    /// Cheap syntactic check: unwrap metadata and let, chase assigned
    /// metavariables, and consult the environment for a constant-headed
    /// type. Anything else is undetermined and left to the expensive check.
    pub fn is_class_quick(&mut self, ty: ExprId) -> Result<ClassQuick> {
        match self.terms.expr(ty).clone() {
            | Expr::MData(m) => self.is_class_quick(m.inner),
            | Expr::Let(b) => {
                let body = self.terms.instantiate1(b.body, b.value);
                self.is_class_quick(body)
            }
            | Expr::Meta(m) => match self.mctx.get_expr_assignment(m) {
                | Some(value) => self.is_class_quick(value),
                | None => Ok(ClassQuick::Undetermined),
            },
            | Expr::Const(c) => Ok(self.class_verdict(c.name)),
            | Expr::App(_) => {
                let (head, _) = self.terms.unfold_apps(ty);
                match self.terms.expr(head).clone() {
                    | Expr::Const(c) => Ok(self.class_verdict(c.name)),
                    | Expr::Meta(m) if self.mctx.is_expr_assigned(m) => {
                        let resolved = self.instantiate_expr_mvars(ty);
                        if resolved == ty {
                            Ok(ClassQuick::Undetermined)
                        } else {
                            self.is_class_quick(resolved)
                        }
                    }
                    | _ => Ok(ClassQuick::Undetermined),
                }
            }
            | Expr::Sort(_)
            | Expr::Bound(_)
            | Expr::Local(_)
            | Expr::Lambda(_)
            | Expr::Forall(_)
            | Expr::Proj(_)
            | Expr::Lit(_) => Ok(ClassQuick::Undetermined),
        }
    }

    /// A constant head settles the question unless it is a reducible
    /// synonym, which may still unfold to a class under instance
    /// transparency.
    fn class_verdict(&self, name: Name) -> ClassQuick {
        if self.env.is_class_registered(&name) {
            return ClassQuick::Class(name);
        }
        match self.env.find(&name) {
            | Some(info)
                if info.value.is_some()
                    && matches!(info.reducibility, Reducibility::Reducible) =>
            {
                ClassQuick::Undetermined
            }
            | _ => ClassQuick::NotClass,
        }
    }

    /// The undetermined path: peel the forall telescope under instance
    /// transparency, so `outParam`-style reducible synonyms unfold until the
    /// class head becomes syntactically visible, then re-run the quick check.
    pub fn is_class_expensive(&mut self, ty: ExprId) -> Result<Option<Name>> {
        self.with_inc_rec_depth(|this| {
            this.with_transparency(Transparency::Instances, |this| {
                this.forall_telescope_reducing(ty, |this, _fvars, body| {
                    let body = this.whnf(body)?;
                    match this.is_class_quick(body)? {
                        | ClassQuick::Class(name) => Ok(Some(name)),
                        | ClassQuick::NotClass | ClassQuick::Undetermined => Ok(None),
                    }
                })
            })
        })
    }

    /// Quick-then-expensive; "not a class" and "does not apply" collapse
    /// into `None`.
    pub fn is_class(&mut self, ty: ExprId) -> Result<Option<Name>> {
        match self.is_class_quick(ty)? {
            | ClassQuick::Class(name) => Ok(Some(name)),
            | ClassQuick::NotClass => Ok(None),
            | ClassQuick::Undetermined => self.is_class_expensive(ty),
        }
    }
}
