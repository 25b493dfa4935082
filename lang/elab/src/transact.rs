//! Snapshot and rollback for speculative elaboration.
//!
//! Rollback is always a value overwrite of persistent structures, never an
//! undo log; only the environment and the metavariable context participate.
//! Trace output, consumed fresh ids, and memoized results survive a rollback
//! (the cache generation key makes the latter unreachable when stale).

use crate::{syntax::*, *};

/// What `orelse`-style combinators capture and restore.
#[derive(Clone)]
pub struct Snapshot {
    env: Environment,
    mctx: MetaCtx,
}

pub type SynthInstanceCache = im::HashMap<ExprId, Option<ExprId>>;

impl Elaborator {
    pub fn snapshot(&self) -> Snapshot {
        Snapshot { env: self.env.clone(), mctx: self.mctx.clone() }
    }

    pub fn rollback(&mut self, snapshot: Snapshot) {
        let Snapshot { env, mctx } = snapshot;
        self.set_env(env);
        self.mctx = mctx;
    }

    /// Run `a`; on failure restore the pre-`a` environment and metavariable
    /// context, then run `b` from that point.
    pub fn orelse<T>(
        &mut self, a: impl FnOnce(&mut Self) -> Result<T>, b: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let saved = self.snapshot();
        match a(self) {
            | Ok(res) => Ok(res),
            | Err(_) => {
                ::log::trace!("orelse: first branch failed, rolling back");
                self.rollback(saved);
                b(self)
            }
        }
    }

    /// Like [`Elaborator::orelse`], but when both branches fail the two
    /// errors are combined by the caller-supplied policy instead of
    /// discarding the first.
    pub fn orelse_merge_errors<T>(
        &mut self, a: impl FnOnce(&mut Self) -> Result<T>, b: impl FnOnce(&mut Self) -> Result<T>,
        merge: impl FnOnce(ElabErrorEntry, ElabErrorEntry) -> ElabErrorEntry,
    ) -> Result<T> {
        let saved = self.snapshot();
        match a(self) {
            | Ok(res) => Ok(res),
            | Err(err_a) => {
                self.rollback(saved);
                match b(self) {
                    | Ok(res) => Ok(res),
                    | Err(err_b) => Err(merge(err_a, err_b)),
                }
            }
        }
    }

    /// Run an action producing an optional result; keep the state only when
    /// it produces `Some`. Failures propagate after rolling back.
    pub fn commit_when_some<T>(
        &mut self, a: impl FnOnce(&mut Self) -> Result<Option<T>>,
    ) -> Result<Option<T>> {
        let saved = self.snapshot();
        match a(self) {
            | Ok(Some(res)) => {
                // commit through the same save/restore plumbing as the
                // non-committing paths
                let committed = self.snapshot();
                self.rollback(committed);
                Ok(Some(res))
            }
            | Ok(None) => {
                self.rollback(saved);
                Ok(None)
            }
            | Err(err) => {
                self.rollback(saved);
                Err(err)
            }
        }
    }

    /// Sandbox a nested unification attempt: metavariables created inside
    /// belong to a deeper generation, and the metavariable context is
    /// restored unconditionally on the way out, success or failure.
    pub fn with_new_mctx_depth<R>(
        &mut self, f: impl FnOnce(&mut Self) -> Result<R>,
    ) -> Result<R> {
        let saved = self.mctx.clone();
        self.mctx.inc_depth();
        let res = f(self);
        self.mctx = saved;
        res
    }

    /* ------------------------- Synth-instance cache ---------------------------- */

    /// The typeclass-resolution cache is keyed by type only, so any change to
    /// the visible local instances must clear it; the save half of the pair
    /// lets the caller restore the previous view afterwards.
    pub fn save_and_reset_synth_instance_cache(&mut self) -> SynthInstanceCache {
        std::mem::take(&mut self.caches.synth_instance)
    }

    pub fn restore_synth_instance_cache(&mut self, cache: SynthInstanceCache) {
        self.caches.synth_instance = cache;
    }
}
