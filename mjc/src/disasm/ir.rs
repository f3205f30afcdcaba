//! Decoded instructions.
use std::fmt;

use crate::{
    codegen::{OpCode, OperandSize},
    constants::Address,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instr {
    /// Address in the code buffer where the instruction was read from.
    pub addr: Address,
    /// `None` for a byte that isn't a known opcode.
    pub op: Option<OpCode>,
    /// The opcode byte as it was read.
    pub code: u8,
    /// Operand bytes. Shorter than the opcode requires when the
    /// buffer ends in the middle of the instruction.
    pub bytes: Vec<u8>,
}

impl Instr {
    /// Encoded size in bytes, including the opcode.
    #[inline]
    pub fn len(&self) -> usize {
        1 + self.bytes.len()
    }

    /// Whether all operand bytes were present.
    pub fn is_complete(&self) -> bool {
        match self.op {
            Some(op) => op.size() == self.len(),
            None => true,
        }
    }

    /// Operands as signed values, decoded according to their sizes.
    pub fn operands(&self) -> Vec<i32> {
        let Some(op) = self.op else {
            return vec![];
        };
        if !self.is_complete() {
            return vec![];
        }

        let mut values = vec![];
        let mut bytes = self.bytes.as_slice();
        for size in op.operands() {
            let (head, tail) = bytes.split_at(size.bytes());
            values.push(match size {
                OperandSize::B => head[0] as i8 as i32,
                OperandSize::S => i16::from_be_bytes([head[0], head[1]]) as i32,
                OperandSize::W => i32::from_be_bytes([head[0], head[1], head[2], head[3]]),
            });
            bytes = tail;
        }
        values
    }

    /// Absolute destination of a jump or call.
    pub fn target(&self) -> Option<Address> {
        use OpCode as O;
        match self.op? {
            O::Jmp | O::Jeq | O::Jne | O::Jlt | O::Jle | O::Jgt | O::Jge | O::Call => {
                let offset = *self.operands().first()?;
                let target = (self.addr + self.len()) as i64 + offset as i64;
                usize::try_from(target).ok()
            }
            _ => None,
        }
    }

    #[inline(always)]
    pub fn repr(&self) -> InstrRepr<'_> {
        InstrRepr { instr: self }
    }
}

/// Object file form of an instruction: the mnemonic followed by
/// every operand byte in decimal.
pub struct InstrRepr<'a> {
    instr: &'a Instr,
}

impl<'a> fmt::Display for InstrRepr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let Instr { op, code, bytes, .. } = self.instr;

        match op {
            Some(op) => write!(f, "{}", op.mnemonic())?,
            None => write!(f, "?{code}")?,
        }
        for byte in bytes {
            write!(f, " {byte}")?;
        }
        Ok(())
    }
}
