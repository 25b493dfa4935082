use crate::{syntax::*, *};
use std::fmt::Display;

mod terms {
    use super::*;
    use crate::fmt::*;

    impl Elaborator {
        pub fn log_term<S>(&self, msg: S, e: ExprId)
        where
            S: Display,
        {
            if ::log::log_enabled!(::log::Level::Trace) {
                let fmt = self.formatter();
                ::log::trace!("[{}] {}", msg, e.ugly(&fmt));
            }
        }

        pub fn log_level<S>(&self, msg: S, l: LevelId)
        where
            S: Display,
        {
            if ::log::log_enabled!(::log::Level::Trace) {
                let fmt = self.formatter();
                ::log::trace!("[{}] {}", msg, l.ugly(&fmt));
            }
        }

        pub fn log_lctx<S>(&self, msg: S)
        where
            S: Display,
        {
            if ::log::log_enabled!(::log::Level::Trace) {
                let fmt = self.formatter();
                for decl in self.lctx.iter() {
                    ::log::trace!("[{}] {}", msg, decl.ugly(&fmt));
                }
            }
        }
    }
}

pub use ::log::*;
