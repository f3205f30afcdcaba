//! Code generation.
//!
//! Instructions are appended to a growable buffer. The only bytes ever
//! rewritten are jump offsets reserved by a [`Label`] before its target
//! was known.
mod label;
mod opcodes;
mod operand;

pub use self::{
    label::{Fixup, Label},
    opcodes::{CompOp, OpCode, OperandSize},
    operand::{Operand, OperandKind},
};

use std::io;

use crate::{
    constants::TRAP_NO_RETURN,
    diagnostics::{Message, Report},
    disasm::Disassembler,
    error::MjResult,
    symtab::{TypeId, Types},
};

/// Instruction buffer of one compilation, together with the
/// header values of the object file.
#[derive(Debug, Default, Clone)]
pub struct Code {
    buf: Vec<u8>,
    /// Entry point, the address of `main`.
    main_pc: Option<usize>,
    /// Number of global variables.
    data_size: usize,
    /// Jump and call offsets that didn't fit their operand.
    far_jumps: usize,
}

impl Code {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current end of the buffer, where the next byte goes.
    #[inline]
    pub fn pc(&self) -> usize {
        self.buf.len()
    }

    #[inline]
    pub fn buf(&self) -> &[u8] {
        &self.buf
    }

    #[inline]
    pub fn main_pc(&self) -> Option<usize> {
        self.main_pc
    }

    #[inline]
    pub fn set_main_pc(&mut self, adr: usize) {
        self.main_pc = Some(adr);
    }

    #[inline]
    pub fn data_size(&self) -> usize {
        self.data_size
    }

    #[inline]
    pub fn set_data_size(&mut self, size: usize) {
        self.data_size = size;
    }

    /// Relative offset from `from` to `target`.
    #[inline]
    pub fn offset(target: usize, from: usize) -> i32 {
        target as i32 - from as i32
    }

    // ------------------------------------------------------------------------
    // Raw emission

    #[inline]
    pub fn put(&mut self, op: OpCode) {
        self.buf.push(op.code());
    }

    /// Append the low byte of the value.
    #[inline]
    pub fn put_byte(&mut self, x: i32) {
        self.buf.push(x as u8);
    }

    /// Append the low 16 bits of the value, big-endian.
    #[inline]
    pub fn put2(&mut self, x: i32) {
        self.buf.extend_from_slice(&(x as u16).to_be_bytes());
    }

    #[inline]
    pub fn put4(&mut self, x: i32) {
        self.buf.extend_from_slice(&x.to_be_bytes());
    }

    /// Append a 2-byte placeholder to be filled in later.
    pub fn reserve(&mut self) -> Fixup {
        let fixup = Fixup::new(self.pc());
        self.put2(0);
        fixup
    }

    /// Append a relative jump or call offset.
    pub fn put_offset(&mut self, offset: i32) {
        let off = self.checked_offset(offset);
        self.put2(off);
    }

    /// Fill in a placeholder with a relative offset.
    pub fn patch(&mut self, fixup: Fixup, offset: i32) {
        let pos = fixup.pos();
        let x = self.checked_offset(offset);
        self.buf[pos..pos + 2].copy_from_slice(&(x as u16).to_be_bytes());
    }

    /// Count offsets outside the signed 2-byte operand range.
    fn checked_offset(&mut self, offset: i32) -> i32 {
        if i16::try_from(offset).is_err() {
            self.far_jumps += 1;
        }
        offset
    }

    /// Number of offsets that didn't fit since the last call, resetting the count.
    pub fn take_far_jumps(&mut self) -> usize {
        std::mem::take(&mut self.far_jumps)
    }

    // ------------------------------------------------------------------------
    // Values

    /// Push the value of the operand, which then lives on the stack.
    pub fn load(&mut self, x: &mut Operand, errs: &mut dyn Report) {
        self.load_and_keep(x, errs);
        x.kind = OperandKind::Stack;
    }

    /// Push the value of the operand, leaving the operand as it is
    /// so it can still be stored to.
    pub fn load_and_keep(&mut self, x: &Operand, errs: &mut dyn Report) {
        match x.kind {
            OperandKind::Con => self.emit_const(x.val),
            OperandKind::Static => {
                self.put(OpCode::GetStatic);
                self.put2(x.adr);
            }
            OperandKind::Local => match OpCode::load_n(x.adr) {
                Some(op) => self.put(op),
                None => {
                    self.put(OpCode::Load);
                    self.put_byte(x.adr);
                }
            },
            OperandKind::Fld => {
                self.put(OpCode::GetField);
                self.put2(x.adr);
            }
            OperandKind::Elem => {
                self.put(if x.ty == Types::CHAR { OpCode::BALoad } else { OpCode::ALoad });
            }
            OperandKind::Stack => {}
            OperandKind::Meth | OperandKind::Cond | OperandKind::None => errs.report(Message::NoVal),
        }
    }

    pub fn load_const(&mut self, val: i32) {
        self.emit_const(val);
    }

    fn emit_const(&mut self, val: i32) {
        match OpCode::const_n(val) {
            Some(op) => self.put(op),
            None => {
                self.put(OpCode::Const);
                self.put4(val);
            }
        }
    }

    /// Store the value of `y` into the location `x`.
    pub fn assign(&mut self, x: &Operand, y: &mut Operand, errs: &mut dyn Report) {
        if y.kind == OperandKind::Meth {
            self.call(y, errs);
            y.kind = OperandKind::Stack;
        } else {
            self.load(y, errs);
        }

        match x.kind {
            OperandKind::Local => match OpCode::store_n(x.adr) {
                Some(op) => self.put(op),
                None => {
                    self.put(OpCode::Store);
                    self.put_byte(x.adr);
                }
            },
            OperandKind::Static => {
                self.put(OpCode::PutStatic);
                self.put2(x.adr);
            }
            OperandKind::Fld => {
                self.put(OpCode::PutField);
                self.put2(x.adr);
            }
            OperandKind::Elem => {
                self.put(if x.ty == Types::CHAR { OpCode::BAStore } else { OpCode::AStore });
            }
            _ => errs.report(Message::NoVar),
        }
    }

    /// Increment or decrement an integer variable by one.
    pub fn inc_dec(&mut self, x: &Operand, inc: bool, errs: &mut dyn Report) {
        if x.ty != Types::INT {
            errs.report(Message::NoInt);
        }

        match x.kind {
            OperandKind::Local => {
                self.put(OpCode::Inc);
                self.put_byte(x.adr);
                self.put_byte(if inc { 1 } else { -1 });
            }
            OperandKind::Static | OperandKind::Fld | OperandKind::Elem => {
                // Keep the address for the store.
                match x.kind {
                    OperandKind::Fld => self.put(OpCode::Dup),
                    OperandKind::Elem => self.put(OpCode::Dup2),
                    _ => {}
                }
                self.load_and_keep(x, errs);
                self.put(if inc { OpCode::Const1 } else { OpCode::ConstM1 });
                self.put(OpCode::Add);
                self.assign(x, &mut Operand::stack(Types::INT), errs);
            }
            _ => errs.report(Message::NoVar),
        }
    }

    /// Call the method. The offset is relative to the end of the instruction.
    pub fn call(&mut self, x: &Operand, errs: &mut dyn Report) {
        if x.kind != OperandKind::Meth {
            errs.report(Message::NoMeth);
        }
        self.put(OpCode::Call);
        let from = self.pc() as i32 + 2;
        self.put_offset(x.adr - from);
    }

    /// Set up the stack frame of a method.
    pub fn enter(&mut self, n_pars: usize, n_vars: usize) {
        self.put(OpCode::Enter);
        self.put_byte(n_pars as i32);
        self.put_byte(n_vars as i32);
    }

    /// Code at the end of a method body.
    ///
    /// Falling off the end of a method that must return a value traps.
    pub fn return_(&mut self, ty: TypeId) {
        if ty == Types::NONE {
            self.put(OpCode::Exit);
            self.put(OpCode::Return);
        } else {
            self.put(OpCode::Trap);
            self.put_byte(TRAP_NO_RETURN);
        }
    }

    // ------------------------------------------------------------------------
    // Control flow

    /// Unconditional jump.
    pub fn jump(&mut self, label: &mut Label) {
        self.put(OpCode::Jmp);
        label.put(self);
    }

    /// Jump to the true label when the condition holds.
    pub fn t_jump(&mut self, x: &mut Operand) {
        if let Some(op) = x.op {
            self.put(op.jump());
            x.t_label.put(self);
        }
    }

    /// Jump to the false label when the condition doesn't hold.
    pub fn f_jump(&mut self, x: &mut Operand) {
        if let Some(op) = x.op {
            self.put(op.invert().jump());
            x.f_label.put(self);
        }
    }

    // ------------------------------------------------------------------------
    // Output

    /// Write the textual object file.
    pub fn write(&self, out: &mut impl io::Write) -> MjResult<()> {
        let mut text = String::new();
        Disassembler::new(self).write_object(&mut text)?;
        out.write_all(text.as_bytes())?;
        out.flush()?;
        Ok(())
    }
}
