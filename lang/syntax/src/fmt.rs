//! Formatter traits.
//!
//! Rendering needs the arenas (and sometimes the contexts) at hand, so the
//! traits are parameterized over a formatter type that borrows whatever the
//! implementor needs; `lumen-elab` provides the concrete formatter.

use pretty::RcDoc;

/// Single-line rendering into a plain [`String`]; the workhorse for error
/// messages and trace logging.
#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Ugly<'a, Fmter> {
    fn ugly(&self, f: &'a Fmter) -> String;
}

/// Document-based rendering for multi-line output at the driver boundary.
#[impl_tools::autoimpl(for<T: trait + ?Sized> &T, &mut T, Box<T>, std::rc::Rc<T>, std::sync::Arc<T>)]
pub trait Pretty<'a, Fmter> {
    fn pretty(&self, f: &'a Fmter) -> RcDoc<'a>;
}

impl<'a, Fmter> Ugly<'a, Fmter> for crate::Name {
    fn ugly(&self, _f: &'a Fmter) -> String {
        self.0.clone()
    }
}

impl<'a, Fmter> Ugly<'a, Fmter> for crate::Literal {
    fn ugly(&self, _f: &'a Fmter) -> String {
        match self {
            | crate::Literal::Nat(n) => format!("{}", n),
            | crate::Literal::Str(s) => format!("{:?}", s),
        }
    }
}
