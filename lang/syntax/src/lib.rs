use derive_more::From;

/// Term and universe-level trees.
pub mod term;
pub use term::*;

/// Hash-consing storage for terms and levels.
pub mod arena;
pub use arena::*;

/// De Bruijn instantiation, abstraction, and spine helpers.
pub mod subst;

/// The formatter traits.
pub mod fmt;
pub use fmt::*;

/* ---------------------------------- Name ---------------------------------- */

/// A user-facing name: binder names, constant names, universe parameters.
#[derive(From, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Name(pub String);

impl Name {
    pub fn new(s: impl Into<String>) -> Self {
        Name(s.into())
    }
    /// The placeholder for binders the user never named.
    pub fn anonymous() -> Self {
        Name(String::from("_"))
    }
    pub fn is_anonymous(&self) -> bool {
        self.0 == "_"
    }
    /// `base.idx`, used when minting fresh user-visible names.
    pub fn suffixed(&self, idx: usize) -> Self {
        Name(format!("{}.{}", self.0, idx))
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Name(s.to_string())
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/* --------------------------------- Binder --------------------------------- */

/// How a binder interacts with elaboration: explicit argument, implicit
/// (solved by unification), strict-implicit, or instance-implicit (solved by
/// typeclass resolution).
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum BinderKind {
    Default,
    Implicit,
    StrictImplicit,
    InstImplicit,
}

impl BinderKind {
    pub fn is_inst_implicit(&self) -> bool {
        matches!(self, BinderKind::InstImplicit)
    }
}

/* --------------------------------- Literal -------------------------------- */

/// Literals in terms.
#[derive(From, Clone, Debug, Hash, PartialEq, Eq)]
pub enum Literal {
    Nat(u64),
    Str(String),
}
