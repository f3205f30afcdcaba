//! Compile time descriptors of expression values.
use super::{CompOp, Label};
use crate::{
    diagnostics::{Message, Report},
    symtab::{ObjId, ObjKind, SymTab, TypeId, Types},
};

/// Where the value of an operand currently lives, which decides
/// the instructions needed to read or write it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandKind {
    /// Constant known at compile time. `val`
    Con,
    /// Local variable. `adr` is the frame offset.
    Local,
    /// Global variable. `adr` is the offset in the data area.
    Static,
    /// Value already on the evaluation stack.
    Stack,
    /// Object field. The object reference is on the stack, `adr` is the field offset.
    Fld,
    /// Array element. The array reference and the index are on the stack.
    Elem,
    /// Method awaiting invocation. `adr` is its entry address.
    Meth,
    /// Comparison result, expressed as jumps to `t_label` and `f_label`.
    Cond,
    /// Nothing usable, after an error.
    None,
}

#[derive(Debug)]
pub struct Operand {
    pub kind: OperandKind,
    pub ty: TypeId,
    pub val: i32,
    pub adr: i32,
    /// Operator of the last comparison of a condition.
    pub op: Option<CompOp>,
    /// Method of a [`OperandKind::Meth`] operand.
    pub obj: Option<ObjId>,
    pub t_label: Label,
    pub f_label: Label,
}

impl Operand {
    fn new(kind: OperandKind, ty: TypeId) -> Self {
        Self {
            kind,
            ty,
            val: 0,
            adr: 0,
            op: None,
            obj: None,
            t_label: Label::new(),
            f_label: Label::new(),
        }
    }

    /// Operand denoting a declared entity.
    ///
    /// Only constants, variables and methods denote values.
    pub fn from_obj(tab: &SymTab, id: ObjId, errs: &mut dyn Report) -> Self {
        let obj = tab.obj(id);
        let kind = match obj.kind {
            ObjKind::Con => OperandKind::Con,
            ObjKind::Var if obj.level == 0 => OperandKind::Static,
            ObjKind::Var => OperandKind::Local,
            ObjKind::Meth => OperandKind::Meth,
            ObjKind::Type | ObjKind::Prog => {
                errs.report(Message::NoOperand);
                OperandKind::None
            }
        };

        let mut x = Operand::new(kind, obj.ty);
        x.val = obj.val;
        x.adr = obj.adr;
        if kind == OperandKind::Meth {
            x.obj = Some(id);
        }
        x
    }

    /// Integer constant.
    pub fn con(val: i32) -> Self {
        let mut x = Operand::new(OperandKind::Con, Types::INT);
        x.val = val;
        x
    }

    /// Character constant.
    pub fn char_con(val: i32) -> Self {
        let mut x = Operand::new(OperandKind::Con, Types::CHAR);
        x.val = val;
        x
    }

    /// Value of the given type on top of the stack.
    pub fn stack(ty: TypeId) -> Self {
        Operand::new(OperandKind::Stack, ty)
    }

    /// Condition with fresh true and false labels.
    pub fn cond(op: Option<CompOp>) -> Self {
        let mut x = Operand::new(OperandKind::Cond, Types::NONE);
        x.op = op;
        x
    }

    /// Placeholder for an expression that failed to parse.
    pub fn none() -> Self {
        Operand::new(OperandKind::None, Types::NONE)
    }

    /// Whether the operand denotes a location that can be stored to.
    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(
            self.kind,
            OperandKind::Local | OperandKind::Static | OperandKind::Fld | OperandKind::Elem
        )
    }

    /// Whether the operand yields no usable value.
    #[inline]
    pub fn is_valueless(&self) -> bool {
        matches!(self.kind, OperandKind::Cond | OperandKind::None)
    }
}
