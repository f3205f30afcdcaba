//! Declared entities.
use smol_str::SmolStr;

use super::TypeId;

/// Handle to a declared entity in the [`SymTab`](super::SymTab).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjId(pub(super) u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjKind {
    /// Named constant with a value fixed at compile time.
    Con,
    /// Global variable, local variable, parameter or field.
    Var,
    /// Type name.
    Type,
    /// Method.
    Meth,
    /// The program itself.
    Prog,
}

#[derive(Debug, Clone)]
pub struct Obj {
    pub kind: ObjKind,
    pub name: SmolStr,
    pub ty: TypeId,
    /// Value of a constant.
    pub val: i32,
    /// Storage offset of a variable, or entry address of a method.
    pub adr: i32,
    /// Nesting level. 0 is global.
    pub level: usize,
    /// Number of parameters of a method.
    pub n_pars: usize,
    /// Whether the last parameter of a method takes a variable number of arguments.
    pub has_var_arg: bool,
    /// Parameters followed by local variables for a method,
    /// or the global declarations of the program.
    pub locals: Vec<ObjId>,
}

impl Obj {
    pub fn new(kind: ObjKind, name: impl Into<SmolStr>, ty: TypeId) -> Self {
        Self {
            kind,
            name: name.into(),
            ty,
            val: 0,
            adr: 0,
            level: 0,
            n_pars: 0,
            has_var_arg: false,
            locals: vec![],
        }
    }

    /// Formal parameters of a method, in declaration order.
    #[inline]
    pub fn params(&self) -> &[ObjId] {
        &self.locals[..self.n_pars.min(self.locals.len())]
    }
}
