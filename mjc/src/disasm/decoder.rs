//! Decoding of the instruction stream.
use std::iter::Enumerate;

use crate::codegen::OpCode;

use super::ir::Instr;

/// Iterator decoding instructions from a stream of bytes.
pub struct Decoder<I> {
    iter: Enumerate<I>,
}

impl<I: Iterator<Item = u8>> Decoder<I> {
    pub fn new(iter: I) -> Self {
        Self {
            iter: iter.enumerate(),
        }
    }
}

impl<I: Iterator<Item = u8>> Iterator for Decoder<I> {
    type Item = Instr;

    fn next(&mut self) -> Option<Instr> {
        let (addr, code) = self.iter.next()?;
        let op = OpCode::from_u8(code);

        let size = op.map(|op| op.size() - 1).unwrap_or(0);
        let bytes = self.iter.by_ref().take(size).map(|(_, byte)| byte).collect();

        Some(Instr { addr, op, code, bytes })
    }
}

/// Decode a whole code buffer.
pub fn decode(buf: &[u8]) -> Vec<Instr> {
    Decoder::new(buf.iter().copied()).collect()
}
