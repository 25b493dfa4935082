use crate::syntax::*;

/* -------------------------------- Constants -------------------------------- */

/// How eagerly reduction may unfold a definition, set per constant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reducibility {
    Regular,
    Reducible,
    Irreducible,
}

#[derive(Clone, Debug)]
pub struct ConstantInfo {
    pub name: Name,
    pub level_params: Vec<Name>,
    pub ty: ExprId,
    /// `None` for axioms and opaque constants.
    pub value: Option<ExprId>,
    pub reducibility: Reducibility,
}

/* ------------------------------- Environment ------------------------------- */

/// The global constant table and class registry. Reads never require
/// exclusive access; mutations go through [`crate::Elaborator::set_env`] so
/// that speculative branches can roll environment edits back.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    consts: im::HashMap<Name, ConstantInfo>,
    classes: im::HashSet<Name>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, name: &Name) -> Option<&ConstantInfo> {
        self.consts.get(name)
    }
    pub fn contains(&self, name: &Name) -> bool {
        self.consts.contains_key(name)
    }
    pub fn reducibility(&self, name: &Name) -> Option<Reducibility> {
        self.consts.get(name).map(|info| info.reducibility)
    }

    pub fn add_const(&mut self, info: ConstantInfo) {
        self.consts.insert(info.name.clone(), info);
    }
    pub fn set_reducibility(&mut self, name: &Name, reducibility: Reducibility) {
        if let Some(info) = self.consts.get_mut(name) {
            info.reducibility = reducibility;
        }
    }

    pub fn register_class(&mut self, name: impl Into<Name>) {
        self.classes.insert(name.into());
    }
    pub fn is_class_registered(&self, name: &Name) -> bool {
        self.classes.contains(name)
    }
}
