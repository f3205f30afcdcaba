//! Declaration scopes.
use super::ObjId;

/// Entities declared in one program, class or method body.
///
/// Scopes are kept on a stack by the [`SymTab`](super::SymTab);
/// the scope below is the enclosing one.
#[derive(Debug, Default)]
pub struct Scope {
    /// Declarations in source order.
    locals: Vec<ObjId>,
    /// Number of variables, used to give each one a storage offset.
    n_vars: usize,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn n_vars(&self) -> usize {
        self.n_vars
    }

    #[inline]
    pub fn locals(&self) -> &[ObjId] {
        &self.locals
    }

    pub fn insert(&mut self, obj: ObjId, is_var: bool) {
        self.locals.push(obj);
        if is_var {
            self.n_vars += 1;
        }
    }

    pub fn into_locals(self) -> Vec<ObjId> {
        self.locals
    }
}
