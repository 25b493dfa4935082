use crate::*;
use lumen_utils::arena::*;

/* ---------------------------------- Arena --------------------------------- */

/// Storage for expressions and levels. Nodes are hash-consed: allocating a
/// structurally identical node returns the existing id, so id equality is
/// structural equality and a rebuild that changed nothing hands back the
/// original id. Allocations are append-only; ids minted by a speculative
/// branch that later rolls back simply go unused.
#[derive(Debug)]
pub struct TermArena {
    pub exprs: ArenaSparse<ExprId, Expr>,
    pub levels: ArenaSparse<LevelId, Level>,
    expr_eqs: ArenaAssoc<Expr, ExprId>,
    level_eqs: ArenaAssoc<Level, LevelId>,
    expr_flags: ArenaAssoc<ExprId, ExprFlags>,
    level_flags: ArenaAssoc<LevelId, LevelFlags>,
}

impl TermArena {
    pub fn new_arc(alloc: ArcGlobalAlloc) -> Self {
        Self {
            exprs: ArenaSparse::new(alloc.alloc()),
            levels: ArenaSparse::new(alloc.alloc()),
            expr_eqs: ArenaAssoc::new(),
            level_eqs: ArenaAssoc::new(),
            expr_flags: ArenaAssoc::new(),
            level_flags: ArenaAssoc::new(),
        }
    }

    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[&id]
    }
    pub fn level(&self, id: LevelId) -> &Level {
        &self.levels[&id]
    }
    pub fn expr_flags(&self, id: ExprId) -> ExprFlags {
        self.expr_flags[&id]
    }
    pub fn level_flags(&self, id: LevelId) -> LevelFlags {
        self.level_flags[&id]
    }
    pub fn closed(&self, id: ExprId) -> bool {
        self.expr_flags(id).closed()
    }

    /* ------------------------------- Allocation ------------------------------- */

    pub fn mk_expr(&mut self, e: Expr) -> ExprId {
        if let Some(id) = self.expr_eqs.get(&e) {
            return *id;
        }
        let flags = self.compute_expr_flags(&e);
        let id = self.exprs.alloc(e.clone());
        self.expr_eqs.insert(e, id);
        self.expr_flags.insert(id, flags);
        id
    }

    pub fn mk_level(&mut self, l: Level) -> LevelId {
        if let Some(id) = self.level_eqs.get(&l) {
            return *id;
        }
        let flags = self.compute_level_flags(&l);
        let id = self.levels.alloc(l.clone());
        self.level_eqs.insert(l, id);
        self.level_flags.insert(id, flags);
        id
    }

    fn compute_expr_flags(&self, e: &Expr) -> ExprFlags {
        match e {
            | Expr::Bound(i) => {
                ExprFlags { loose_bvar_depth: i + 1, ..ExprFlags::default() }
            }
            | Expr::Local(_) => ExprFlags { has_fvar: true, ..ExprFlags::default() },
            | Expr::Meta(_) => ExprFlags { has_expr_mvar: true, ..ExprFlags::default() },
            | Expr::Sort(l) => self.level_flags_as_expr(*l),
            | Expr::Const(c) => {
                let mut flags = ExprFlags::default();
                for l in &c.levels {
                    flags = flags.union(self.level_flags_as_expr(*l));
                }
                flags
            }
            | Expr::App(App(f, a)) => self.expr_flags(*f).union(self.expr_flags(*a)),
            | Expr::Lambda(b) | Expr::Forall(b) => {
                self.expr_flags(b.ty).union(self.expr_flags(b.body).under_binder())
            }
            | Expr::Let(b) => self
                .expr_flags(b.ty)
                .union(self.expr_flags(b.value))
                .union(self.expr_flags(b.body).under_binder()),
            | Expr::Proj(p) => self.expr_flags(p.inner),
            | Expr::MData(m) => self.expr_flags(m.inner),
            | Expr::Lit(_) => ExprFlags::default(),
        }
    }

    fn level_flags_as_expr(&self, l: LevelId) -> ExprFlags {
        let lf = self.level_flags(l);
        ExprFlags {
            has_level_mvar: lf.has_mvar,
            has_level_param: lf.has_param,
            ..ExprFlags::default()
        }
    }

    fn compute_level_flags(&self, l: &Level) -> LevelFlags {
        match l {
            | Level::Zero => LevelFlags::default(),
            | Level::Succ(x) => self.level_flags(*x),
            | Level::Max(a, b) | Level::IMax(a, b) => {
                self.level_flags(*a).union(self.level_flags(*b))
            }
            | Level::Meta(_) => LevelFlags { has_mvar: true, has_param: false },
            | Level::Param(_) => LevelFlags { has_mvar: false, has_param: true },
        }
    }

    /* ------------------------------ Constructors ------------------------------ */

    pub fn mk_bound(&mut self, idx: u32) -> ExprId {
        self.mk_expr(Expr::Bound(idx))
    }
    pub fn mk_local(&mut self, fvar: FVarId) -> ExprId {
        self.mk_expr(Expr::Local(fvar))
    }
    pub fn mk_meta(&mut self, mvar: MVarId) -> ExprId {
        self.mk_expr(Expr::Meta(mvar))
    }
    pub fn mk_sort(&mut self, level: LevelId) -> ExprId {
        self.mk_expr(Expr::Sort(level))
    }
    pub fn mk_const(&mut self, name: impl Into<Name>, levels: Vec<LevelId>) -> ExprId {
        self.mk_expr(Expr::Const(Const { name: name.into(), levels }))
    }
    pub fn mk_app(&mut self, f: ExprId, a: ExprId) -> ExprId {
        self.mk_expr(Expr::App(App(f, a)))
    }
    /// Left-nested application of `f` to all of `args`.
    pub fn mk_apps(&mut self, f: ExprId, args: &[ExprId]) -> ExprId {
        let mut res = f;
        for a in args {
            res = self.mk_app(res, *a);
        }
        res
    }
    pub fn mk_lambda(&mut self, b: Binder) -> ExprId {
        self.mk_expr(Expr::Lambda(b))
    }
    pub fn mk_forall(&mut self, b: Binder) -> ExprId {
        self.mk_expr(Expr::Forall(b))
    }
    pub fn mk_let(&mut self, b: LetBinder) -> ExprId {
        self.mk_expr(Expr::Let(b))
    }
    pub fn mk_proj(&mut self, type_name: impl Into<Name>, field: usize, inner: ExprId) -> ExprId {
        self.mk_expr(Expr::Proj(Proj { type_name: type_name.into(), field, inner }))
    }
    pub fn mk_mdata(&mut self, data: Vec<(Name, Literal)>, inner: ExprId) -> ExprId {
        self.mk_expr(Expr::MData(MData { data, inner }))
    }
    pub fn mk_lit(&mut self, lit: Literal) -> ExprId {
        self.mk_expr(Expr::Lit(lit))
    }

    pub fn mk_zero(&mut self) -> LevelId {
        self.mk_level(Level::Zero)
    }
    pub fn mk_succ(&mut self, l: LevelId) -> LevelId {
        self.mk_level(Level::Succ(l))
    }
    pub fn mk_max(&mut self, a: LevelId, b: LevelId) -> LevelId {
        self.mk_level(Level::Max(a, b))
    }
    pub fn mk_imax(&mut self, a: LevelId, b: LevelId) -> LevelId {
        self.mk_level(Level::IMax(a, b))
    }
    pub fn mk_level_meta(&mut self, m: LMVarId) -> LevelId {
        self.mk_level(Level::Meta(m))
    }
    pub fn mk_level_param(&mut self, name: impl Into<Name>) -> LevelId {
        self.mk_level(Level::Param(name.into()))
    }
    /// `Sort 0`
    pub fn mk_prop(&mut self) -> ExprId {
        let zero = self.mk_zero();
        self.mk_sort(zero)
    }
    /// `Sort 1`
    pub fn mk_type(&mut self) -> ExprId {
        let zero = self.mk_zero();
        let one = self.mk_succ(zero);
        self.mk_sort(one)
    }
}
