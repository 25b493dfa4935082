use crate::syntax::*;

/// An ordered local context. Extension pushes onto persistent structures, so
/// cloning a context for a nested scope is cheap and the parent's view never
/// changes underneath it.
#[derive(Clone, Debug, Default)]
pub struct LocalCtx {
    fvars: im::Vector<FVarId>,
    decls: im::HashMap<FVarId, LocalDecl>,
}

impl LocalCtx {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fvars.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fvars.is_empty()
    }

    pub fn extend(&mut self, decl: LocalDecl) {
        debug_assert!(!self.decls.contains_key(&decl.fvar));
        self.fvars.push_back(decl.fvar);
        self.decls.insert(decl.fvar, decl);
    }

    pub fn get(&self, fvar: FVarId) -> Option<&LocalDecl> {
        self.decls.get(&fvar)
    }
    pub fn contains(&self, fvar: FVarId) -> bool {
        self.decls.contains_key(&fvar)
    }
    /// Declaration-order position of the free variable.
    pub fn position(&self, fvar: FVarId) -> Option<usize> {
        self.fvars.iter().position(|f| *f == fvar)
    }

    /// Newest declaration carrying the user name; shadowed entries stay in
    /// the context but are no longer found this way.
    pub fn find_from_user_name(&self, name: &Name) -> Option<&LocalDecl> {
        self.fvars
            .iter()
            .rev()
            .map(|f| &self.decls[f])
            .find(|decl| decl.user_name == *name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocalDecl> {
        self.fvars.iter().map(|f| &self.decls[f])
    }
}
