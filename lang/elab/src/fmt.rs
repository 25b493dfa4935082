//! Formatters for terms, levels, and declarations.

use crate::{syntax::*, *};
use pretty::RcDoc;

pub use lumen_syntax::{Pretty, Ugly};

pub struct Formatter<'arena> {
    pub terms: &'arena TermArena,
    pub mctx: Option<&'arena MetaCtx>,
    pub lctx: Option<&'arena LocalCtx>,
}

impl<'arena> Formatter<'arena> {
    pub fn new(terms: &'arena TermArena) -> Self {
        Formatter { terms, mctx: None, lctx: None }
    }
    pub fn with_mctx(mut self, mctx: &'arena MetaCtx) -> Self {
        self.mctx = Some(mctx);
        self
    }
    pub fn with_lctx(mut self, lctx: &'arena LocalCtx) -> Self {
        self.lctx = Some(lctx);
        self
    }
}

impl Elaborator {
    pub fn formatter(&self) -> Formatter<'_> {
        Formatter::new(&self.terms).with_mctx(&self.mctx).with_lctx(&self.lctx)
    }
}

/* ---------------------------------- Ugly ----------------------------------- */

impl<'a> Ugly<'a, Formatter<'a>> for FVarId {
    fn ugly(&self, f: &'a Formatter) -> String {
        match f.lctx.and_then(|lctx| lctx.get(*self)) {
            | Some(decl) => format!("{}{}", decl.user_name, self.concise()),
            | None => self.concise(),
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for MVarId {
    fn ugly(&self, f: &'a Formatter) -> String {
        match f.mctx.and_then(|mctx| mctx.find_decl(*self)) {
            | Some(decl) => match &decl.user_name {
                | Some(name) => format!("?{}", name),
                | None => format!("?m{}", decl.index),
            },
            | None => format!("?{}", self.concise()),
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for LMVarId {
    fn ugly(&self, _f: &'a Formatter) -> String {
        format!("?u{}", self.concise())
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for LevelId {
    fn ugly(&self, f: &'a Formatter) -> String {
        match f.terms.level(*self) {
            | Level::Zero => format!("0"),
            | Level::Succ(x) => format!("{}+1", x.ugly(f)),
            | Level::Max(a, b) => format!("(max {} {})", a.ugly(f), b.ugly(f)),
            | Level::IMax(a, b) => format!("(imax {} {})", a.ugly(f), b.ugly(f)),
            | Level::Meta(m) => m.ugly(f),
            | Level::Param(name) => name.ugly(f),
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for ExprId {
    fn ugly(&self, f: &'a Formatter) -> String {
        match f.terms.expr(*self) {
            | Expr::Bound(idx) => format!("#{}", idx),
            | Expr::Local(fvar) => fvar.ugly(f),
            | Expr::Meta(mvar) => mvar.ugly(f),
            | Expr::Sort(l) => format!("Sort {}", l.ugly(f)),
            | Expr::Const(c) => {
                if c.levels.is_empty() {
                    c.name.ugly(f)
                } else {
                    let levels: Vec<_> = c.levels.iter().map(|l| l.ugly(f)).collect();
                    format!("{}.{{{}}}", c.name, levels.join(", "))
                }
            }
            | Expr::App(_) => {
                let (head, args) = f.terms.unfold_apps(*self);
                let mut s = head.ugly(f);
                for arg in args {
                    s = format!("{} {}", s, arg.ugly(f));
                }
                format!("({})", s)
            }
            | Expr::Lambda(b) => {
                format!("fun ({} : {}) => {}", b.name, b.ty.ugly(f), b.body.ugly(f))
            }
            | Expr::Forall(b) => {
                format!("forall ({} : {}), {}", b.name, b.ty.ugly(f), b.body.ugly(f))
            }
            | Expr::Let(b) => format!(
                "let {} : {} := {}; {}",
                b.name,
                b.ty.ugly(f),
                b.value.ugly(f),
                b.body.ugly(f)
            ),
            | Expr::Proj(p) => format!("{}.{}", p.inner.ugly(f), p.field),
            | Expr::MData(m) => m.inner.ugly(f),
            | Expr::Lit(lit) => lit.ugly(f),
        }
    }
}

impl<'a> Ugly<'a, Formatter<'a>> for LocalDecl {
    fn ugly(&self, f: &'a Formatter) -> String {
        match self.value {
            | Some(value) => format!(
                "{} : {} := {}",
                self.user_name,
                self.ty.ugly(f),
                value.ugly(f)
            ),
            | None => format!("{} : {}", self.user_name, self.ty.ugly(f)),
        }
    }
}

/* --------------------------------- Pretty ---------------------------------- */

impl<'a> Pretty<'a, Formatter<'a>> for ExprId {
    fn pretty(&self, f: &'a Formatter<'a>) -> RcDoc<'a> {
        match f.terms.expr(*self) {
            | Expr::App(_) => {
                let (head, args) = f.terms.unfold_apps(*self);
                let mut doc = head.pretty(f);
                for arg in args {
                    doc = doc.append(RcDoc::line()).append(arg.pretty(f));
                }
                RcDoc::text("(").append(doc.nest(2).group()).append(RcDoc::text(")"))
            }
            | Expr::Lambda(b) => RcDoc::text(format!("fun ({} : ", b.name))
                .append(b.ty.pretty(f))
                .append(RcDoc::text(") =>"))
                .append(RcDoc::line().append(b.body.pretty(f)).nest(2))
                .group(),
            | Expr::Forall(b) => RcDoc::text(format!("forall ({} : ", b.name))
                .append(b.ty.pretty(f))
                .append(RcDoc::text("),"))
                .append(RcDoc::line().append(b.body.pretty(f)).nest(2))
                .group(),
            | Expr::Let(b) => RcDoc::text(format!("let {} := ", b.name))
                .append(b.value.pretty(f))
                .append(RcDoc::text(";"))
                .append(RcDoc::line())
                .append(b.body.pretty(f))
                .group(),
            | _ => RcDoc::text(self.ugly(f)),
        }
    }
}

/// Render a term as an indented multi-line document, for driver output.
pub fn render_expr<'a>(f: &'a Formatter<'a>, e: ExprId, width: usize) -> String {
    let mut out = Vec::new();
    let _ = e.pretty(f).render(width, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}
