use crate::{syntax::*, *};
use lumen_utils::arena::{ArcGlobalAlloc, IndexAlloc};

/* ---------------------------------- Caches --------------------------------- */

/// Persistent memoization tables. Entries are keyed by the current cache
/// generation, which bumps on every assignment and environment edit, so
/// rollback never resurrects a stale entry; superseded generations are
/// simply unreachable.
#[derive(Clone, Debug, Default)]
pub struct Caches {
    pub infer_type: im::HashMap<(u64, Transparency, ExprId), ExprId>,
    pub whnf: im::HashMap<(u64, Transparency, ExprId), ExprId>,
    /// Typeclass-resolution results, keyed loosely by type only. Whoever
    /// changes the set of visible local instances must reset this through
    /// the save/restore pair in [`crate::transact`].
    pub synth_instance: im::HashMap<ExprId, Option<ExprId>>,
}

/* -------------------------------- Elaborator ------------------------------- */

/// The engine state: term storage, the constant store, the metavariable
/// context, the ambient local context, caches, and the fresh-id generators.
/// Threaded by `&mut` through a strictly sequential call chain; the scoped
/// `with_*` helpers save and restore exactly what they shadow.
pub struct Elaborator {
    pub terms: TermArena,
    pub env: Environment,
    pub mctx: MetaCtx,
    pub lctx: LocalCtx,
    pub local_instances: im::Vector<LocalInstance>,
    pub config: Config,
    pub caches: Caches,
    pub postponed: im::Vector<PostponedEntry>,
    /// Let-bound locals unfolded during reduction so far.
    pub zeta_fvars: im::HashSet<FVarId>,
    /// call stack for debugging and error tracking
    pub stack: im::Vector<ElabTask>,
    rec_depth: usize,
    cache_gen: u64,
    mvar_count: usize,
    fvar_gen: IndexAlloc<usize>,
    mvar_gen: IndexAlloc<usize>,
    lmvar_gen: IndexAlloc<usize>,
}

impl Elaborator {
    pub fn new(env: Environment, config: Config) -> Self {
        Self::new_arc(env, config, ArcGlobalAlloc::new())
    }

    pub fn new_arc(env: Environment, config: Config, alloc: ArcGlobalAlloc) -> Self {
        Self {
            terms: TermArena::new_arc(alloc.clone()),
            env,
            mctx: MetaCtx::new(),
            lctx: LocalCtx::new(),
            local_instances: im::Vector::new(),
            config,
            caches: Caches::default(),
            postponed: im::Vector::new(),
            zeta_fvars: im::HashSet::new(),
            stack: im::Vector::new(),
            rec_depth: 0,
            cache_gen: 0,
            mvar_count: 0,
            fvar_gen: alloc.alloc(),
            mvar_gen: alloc.alloc(),
            lmvar_gen: alloc.alloc(),
        }
    }
}

mod impl_elaborator {
    use super::*;

    impl Elaborator {
        /// Place the body into a closure so administrative state is restored
        /// however the body exits.
        #[inline]
        pub(crate) fn guarded<R>(&mut self, with: impl FnOnce(&mut Self) -> R) -> R {
            let stack = self.stack.clone();
            let res = with(self);
            self.stack = stack;
            res
        }

        /// Throw an error, capturing the administrative stack.
        #[inline]
        pub(crate) fn err<T>(
            &self, error: ElabError, blame: &'static std::panic::Location<'static>,
        ) -> Result<T> {
            let stack = self.stack.clone();
            Err(ElabErrorEntry { error, blame, stack })
        }
    }
}

/* -------------------------------- Fresh ids -------------------------------- */

impl Elaborator {
    /// Ids are monotonic for the whole run and indifferent to rollback; ids
    /// consumed by an abandoned branch are never reused.
    pub fn fresh_fvar_id(&mut self) -> FVarId {
        self.fvar_gen.mint()
    }
    pub fn fresh_mvar_id(&mut self) -> MVarId {
        self.mvar_gen.mint()
    }
    pub fn fresh_lmvar_id(&mut self) -> LMVarId {
        self.lmvar_gen.mint()
    }

    /// A fresh expression metavariable declared in the ambient local context.
    pub fn mk_fresh_expr_mvar(
        &mut self, ty: ExprId, kind: MetaKind, user_name: Option<Name>,
    ) -> ExprId {
        let mvar = self.fresh_mvar_id();
        let index = self.mvar_count;
        self.mvar_count += 1;
        let decl = MetaDecl {
            user_name,
            index,
            lctx: self.lctx.clone(),
            local_instances: self.local_instances.clone(),
            ty,
            kind,
            depth: self.mctx.depth(),
        };
        self.mctx.add_expr_mvar_decl(mvar, decl);
        self.terms.mk_meta(mvar)
    }

    pub fn mk_fresh_level_mvar(&mut self) -> LevelId {
        let lmvar = self.fresh_lmvar_id();
        self.mctx.add_level_mvar_decl(lmvar);
        self.terms.mk_level_meta(lmvar)
    }

    /// A metavariable standing for a type: its own type is a sort at a fresh
    /// level metavariable.
    pub fn mk_fresh_type_mvar(&mut self) -> ExprId {
        let l = self.mk_fresh_level_mvar();
        let sort = self.terms.mk_sort(l);
        self.mk_fresh_expr_mvar(sort, MetaKind::Natural, None)
    }
}

/* ------------------------------ Hard lookups ------------------------------- */

impl Elaborator {
    #[track_caller]
    pub fn get_mvar_decl(&self, mvar: MVarId) -> Result<MetaDecl> {
        match self.mctx.find_decl(mvar) {
            | Some(decl) => Ok(decl.clone()),
            | None => self.err(ElabError::UnknownMVar(mvar), std::panic::Location::caller()),
        }
    }

    #[track_caller]
    pub fn get_level_mvar_decl(&self, lmvar: LMVarId) -> Result<LevelMetaDecl> {
        match self.mctx.find_level_decl(lmvar) {
            | Some(decl) => Ok(decl.clone()),
            | None => self.err(ElabError::UnknownLevelMVar(lmvar), std::panic::Location::caller()),
        }
    }

    #[track_caller]
    pub fn get_local_decl(&self, fvar: FVarId) -> Result<LocalDecl> {
        match self.lctx.get(fvar) {
            | Some(decl) => Ok(decl.clone()),
            | None => self.err(ElabError::UnknownFVar(fvar), std::panic::Location::caller()),
        }
    }

    #[track_caller]
    pub fn get_local_decl_from_user_name(&self, name: &Name) -> Result<LocalDecl> {
        match self.lctx.find_from_user_name(name) {
            | Some(decl) => Ok(decl.clone()),
            | None => {
                self.err(ElabError::UnknownUserName(name.clone()), std::panic::Location::caller())
            }
        }
    }

    #[track_caller]
    pub fn get_const_info(&self, name: &Name) -> Result<ConstantInfo> {
        match self.env.find(name) {
            | Some(info) => Ok(info.clone()),
            | None => {
                self.err(ElabError::UnknownConst(name.clone()), std::panic::Location::caller())
            }
        }
    }
}

/* ----------------------------- State front doors ---------------------------- */

impl Elaborator {
    pub(crate) fn cache_gen(&self) -> u64 {
        self.cache_gen
    }
    fn bump_cache_gen(&mut self) {
        self.cache_gen += 1;
    }

    /// Assignment front door; keeps memoized results from outliving the
    /// metavariable context they were computed under.
    pub fn assign_expr_mvar(&mut self, mvar: MVarId, value: ExprId) {
        self.log_term(format!("assign {}", mvar.concise()), value);
        self.mctx.assign_expr(mvar, value);
        self.bump_cache_gen();
    }
    pub fn assign_delayed_mvar(&mut self, mvar: MVarId, delayed: DelayedAssignment) {
        self.mctx.assign_delayed(mvar, delayed);
        self.bump_cache_gen();
    }
    pub fn assign_level_mvar(&mut self, lmvar: LMVarId, value: LevelId) {
        self.mctx.assign_level(lmvar, value);
        self.bump_cache_gen();
    }

    /// The only way to mutate the environment; rollback undoes edits made by
    /// a failed speculative branch.
    pub fn set_env(&mut self, env: Environment) {
        self.env = env;
        self.bump_cache_gen();
    }

    pub fn push_postponed(&mut self, entry: PostponedEntry) {
        self.postponed.push_back(entry);
    }
    pub fn take_postponed(&mut self) -> im::Vector<PostponedEntry> {
        std::mem::take(&mut self.postponed)
    }
}

/* ------------------------------ Scoped helpers ------------------------------ */

impl Elaborator {
    /// The recursion-depth guard shared by every potentially-nonterminating
    /// entry point.
    #[track_caller]
    pub fn with_inc_rec_depth<R>(
        &mut self, f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        if self.rec_depth >= self.config.max_rec_depth {
            return self.err(ElabError::MaxRecDepth, std::panic::Location::caller());
        }
        self.rec_depth += 1;
        let res = f(self);
        self.rec_depth -= 1;
        res
    }

    pub fn with_transparency<R>(
        &mut self, transparency: Transparency, f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved = self.config.transparency;
        self.config.transparency = transparency;
        let res = f(self);
        self.config.transparency = saved;
        res
    }

    pub fn with_reducible<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        self.with_transparency(Transparency::Reducible, f)
    }

    /// Run under a replacement local context and instance table, e.g. the
    /// declaration context of a metavariable.
    pub fn with_lctx<R>(
        &mut self, lctx: LocalCtx, local_instances: im::Vector<LocalInstance>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let saved_lctx = std::mem::replace(&mut self.lctx, lctx);
        let saved_insts = std::mem::replace(&mut self.local_instances, local_instances);
        let saved_cache = self.save_and_reset_synth_instance_cache();
        let res = f(self);
        self.lctx = saved_lctx;
        self.local_instances = saved_insts;
        self.restore_synth_instance_cache(saved_cache);
        res
    }

    pub fn with_mvar_context<R>(
        &mut self, mvar: MVarId, f: impl FnOnce(&mut Self) -> R,
    ) -> Result<R> {
        let decl = self.get_mvar_decl(mvar)?;
        Ok(self.with_lctx(decl.lctx, decl.local_instances, f))
    }

    /// Introduce a local binder for the duration of the continuation. The
    /// binder becomes a local instance when its type is a registered class.
    pub fn with_local_decl<R>(
        &mut self, name: Name, kind: BinderKind, ty: ExprId,
        f: impl FnOnce(&mut Self, ExprId) -> Result<R>,
    ) -> Result<R> {
        let saved_lctx = self.lctx.clone();
        let saved_insts = self.local_instances.clone();
        let saved_cache = self.caches.synth_instance.clone();
        let res = (|| {
            let fvar = self.push_local(name, kind, ty, None)?;
            let x = self.terms.mk_local(fvar);
            f(self, x)
        })();
        self.lctx = saved_lctx;
        self.local_instances = saved_insts;
        self.caches.synth_instance = saved_cache;
        res
    }

    /// Introduce a let-bound local; never instance-tracked.
    pub fn with_let_decl<R>(
        &mut self, name: Name, ty: ExprId, value: ExprId,
        f: impl FnOnce(&mut Self, ExprId) -> Result<R>,
    ) -> Result<R> {
        let saved_lctx = self.lctx.clone();
        let res = (|| {
            let fvar = self.push_local(name, BinderKind::Default, ty, Some(value))?;
            let x = self.terms.mk_local(fvar);
            f(self, x)
        })();
        self.lctx = saved_lctx;
        res
    }

    /// Extend the ambient context in place; callers are responsible for the
    /// surrounding save/restore.
    pub(crate) fn push_local(
        &mut self, name: Name, kind: BinderKind, ty: ExprId, value: Option<ExprId>,
    ) -> Result<FVarId> {
        let fvar = self.fresh_fvar_id();
        let is_let = value.is_some();
        self.lctx.extend(LocalDecl { fvar, user_name: name, ty, value, kind });
        if !is_let {
            if let Some(class_name) = self.is_class(ty)? {
                self.local_instances.push_back(LocalInstance { class_name, fvar });
                self.caches.synth_instance = Default::default();
            }
        }
        Ok(fvar)
    }
}
