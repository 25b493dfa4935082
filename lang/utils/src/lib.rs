#![allow(clippy::style)]

pub mod arena;

pub mod prelude {
    /// Data structures.
    pub use crate::arena::*;
}
