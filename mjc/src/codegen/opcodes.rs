//! Instruction set of the target stack machine.
use std::fmt;

/// Width of an instruction operand. Multi-byte operands are big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandSize {
    /// 1 byte
    B,
    /// 2 bytes
    S,
    /// 4 bytes
    W,
}

impl OperandSize {
    #[inline]
    pub fn bytes(self) -> usize {
        match self {
            OperandSize::B => 1,
            OperandSize::S => 2,
            OperandSize::W => 4,
        }
    }
}

/// Opcodes, numbered consecutively from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum OpCode {
    Load = 1,
    Load0,
    Load1,
    Load2,
    Load3,
    Store,
    Store0,
    Store1,
    Store2,
    Store3,
    GetStatic,
    PutStatic,
    GetField,
    PutField,
    Const0,
    Const1,
    Const2,
    Const3,
    Const4,
    Const5,
    ConstM1,
    Const,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Neg,
    Shl,
    Shr,
    Inc,
    New,
    NewArray,
    ALoad,
    AStore,
    BALoad,
    BAStore,
    ArrayLength,
    Pop,
    Dup,
    Dup2,
    Jmp,
    Jeq,
    Jne,
    Jlt,
    Jle,
    Jgt,
    Jge,
    Call,
    Return,
    Enter,
    Exit,
    Read,
    Print,
    BRead,
    BPrint,
    Trap,
    Nop,
}

#[rustfmt::skip]
const OPCODES: [OpCode; 58] = {
    use OpCode::*;
    [
        Load, Load0, Load1, Load2, Load3,
        Store, Store0, Store1, Store2, Store3,
        GetStatic, PutStatic, GetField, PutField,
        Const0, Const1, Const2, Const3, Const4, Const5, ConstM1, Const,
        Add, Sub, Mul, Div, Rem, Neg, Shl, Shr, Inc,
        New, NewArray, ALoad, AStore, BALoad, BAStore, ArrayLength,
        Pop, Dup, Dup2,
        Jmp, Jeq, Jne, Jlt, Jle, Jgt, Jge,
        Call, Return, Enter, Exit,
        Read, Print, BRead, BPrint,
        Trap, Nop,
    ]
};

impl OpCode {
    /// Decode an opcode byte.
    pub fn from_u8(byte: u8) -> Option<OpCode> {
        match byte {
            0 => None,
            _ => OPCODES.get(byte as usize - 1).copied(),
        }
    }

    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Sizes of the operands that follow the opcode byte.
    #[rustfmt::skip]
    pub fn operands(self) -> &'static [OperandSize] {
        use OpCode as O;
        use OperandSize::*;
        match self {
            O::Load | O::Store | O::NewArray | O::Trap            => &[B],
            O::Inc | O::Enter                                     => &[B, B],
            O::GetStatic | O::PutStatic | O::GetField | O::PutField
            | O::New | O::Call
            | O::Jmp | O::Jeq | O::Jne | O::Jlt | O::Jle | O::Jgt | O::Jge
                                                                  => &[S],
            O::Const                                              => &[W],
            _                                                     => &[],
        }
    }

    /// Total encoded size including the opcode byte.
    pub fn size(self) -> usize {
        1 + self.operands().iter().map(|size| size.bytes()).sum::<usize>()
    }

    /// Load of the local variable at a small offset, if there is a
    /// dedicated opcode for it.
    pub fn load_n(adr: i32) -> Option<OpCode> {
        match adr {
            0 => Some(OpCode::Load0),
            1 => Some(OpCode::Load1),
            2 => Some(OpCode::Load2),
            3 => Some(OpCode::Load3),
            _ => None,
        }
    }

    /// Store to the local variable at a small offset, if there is a
    /// dedicated opcode for it.
    pub fn store_n(adr: i32) -> Option<OpCode> {
        match adr {
            0 => Some(OpCode::Store0),
            1 => Some(OpCode::Store1),
            2 => Some(OpCode::Store2),
            3 => Some(OpCode::Store3),
            _ => None,
        }
    }

    /// Push of a small constant, if there is a dedicated opcode for it.
    pub fn const_n(val: i32) -> Option<OpCode> {
        match val {
            -1 => Some(OpCode::ConstM1),
            0 => Some(OpCode::Const0),
            1 => Some(OpCode::Const1),
            2 => Some(OpCode::Const2),
            3 => Some(OpCode::Const3),
            4 => Some(OpCode::Const4),
            5 => Some(OpCode::Const5),
            _ => None,
        }
    }

    #[rustfmt::skip]
    pub fn mnemonic(self) -> &'static str {
        use OpCode as O;
        match self {
            O::Load        => "load",
            O::Load0       => "load_0",
            O::Load1       => "load_1",
            O::Load2       => "load_2",
            O::Load3       => "load_3",
            O::Store       => "store",
            O::Store0      => "store_0",
            O::Store1      => "store_1",
            O::Store2      => "store_2",
            O::Store3      => "store_3",
            O::GetStatic   => "getstatic",
            O::PutStatic   => "putstatic",
            O::GetField    => "getfield",
            O::PutField    => "putfield",
            O::Const0      => "const_0",
            O::Const1      => "const_1",
            O::Const2      => "const_2",
            O::Const3      => "const_3",
            O::Const4      => "const_4",
            O::Const5      => "const_5",
            O::ConstM1     => "const_m1",
            O::Const       => "const",
            O::Add         => "add",
            O::Sub         => "sub",
            O::Mul         => "mul",
            O::Div         => "div",
            O::Rem         => "rem",
            O::Neg         => "neg",
            O::Shl         => "shl",
            O::Shr         => "shr",
            O::Inc         => "inc",
            O::New         => "new",
            O::NewArray    => "newarray",
            O::ALoad       => "aload",
            O::AStore      => "astore",
            O::BALoad      => "baload",
            O::BAStore     => "bastore",
            O::ArrayLength => "arraylength",
            O::Pop         => "pop",
            O::Dup         => "dup",
            O::Dup2        => "dup2",
            O::Jmp         => "jmp",
            O::Jeq         => "jeq",
            O::Jne         => "jne",
            O::Jlt         => "jlt",
            O::Jle         => "jle",
            O::Jgt         => "jgt",
            O::Jge         => "jge",
            O::Call        => "call",
            O::Return      => "return",
            O::Enter       => "enter",
            O::Exit        => "exit",
            O::Read        => "read",
            O::Print       => "print",
            O::BRead       => "bread",
            O::BPrint      => "bprint",
            O::Trap        => "trap",
            O::Nop         => "nop",
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

/// Relational operator of a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompOp {
    /// Logical complement: the operator that holds exactly when this one doesn't.
    #[rustfmt::skip]
    pub fn invert(self) -> CompOp {
        use CompOp::*;
        match self {
            Eq => Ne,
            Ne => Eq,
            Lt => Ge,
            Le => Gt,
            Gt => Le,
            Ge => Lt,
        }
    }

    /// Conditional jump taken when the comparison holds.
    #[rustfmt::skip]
    pub fn jump(self) -> OpCode {
        match self {
            CompOp::Eq => OpCode::Jeq,
            CompOp::Ne => OpCode::Jne,
            CompOp::Lt => OpCode::Jlt,
            CompOp::Le => OpCode::Jle,
            CompOp::Gt => OpCode::Jgt,
            CompOp::Ge => OpCode::Jge,
        }
    }

    /// Whether the comparison holds for the given values.
    pub fn eval(self, a: i32, b: i32) -> bool {
        match self {
            CompOp::Eq => a == b,
            CompOp::Ne => a != b,
            CompOp::Lt => a < b,
            CompOp::Le => a <= b,
            CompOp::Gt => a > b,
            CompOp::Ge => a >= b,
        }
    }
}
