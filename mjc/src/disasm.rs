//! Disassembler.
//!
//! Renders a code buffer as the textual object file, or as a listing
//! for reading.
mod decoder;
mod ir;

pub use self::{
    decoder::{decode, Decoder},
    ir::{Instr, InstrRepr},
};

use std::fmt::{self, Write as FmtWrite};

use crate::{
    codegen::Code,
    constants::{MAGIC, NO_ENTRY},
};

pub struct Disassembler<'a> {
    code: &'a Code,
}

impl<'a> Disassembler<'a> {
    pub fn new(code: &'a Code) -> Self {
        Self { code }
    }

    fn write_header<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        let entry = match self.code.main_pc() {
            Some(adr) => adr as i32,
            None => NO_ENTRY,
        };
        writeln!(w, "{MAGIC}")?;
        writeln!(w, "{}", self.code.pc())?;
        writeln!(w, "{}", self.code.data_size())?;
        writeln!(w, "{entry}")
    }

    /// Write the object file: the header followed by one instruction per line.
    pub fn write_object<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        self.write_header(w)?;
        for instr in Decoder::new(self.code.buf().iter().copied()) {
            writeln!(w, "{}", instr.repr())?;
        }
        Ok(())
    }

    /// Write a listing with addresses and resolved jump targets.
    pub fn write_listing<W: FmtWrite>(&self, w: &mut W) -> fmt::Result {
        self.write_header(w)?;
        for instr in Decoder::new(self.code.buf().iter().copied()) {
            let marker = if Some(instr.addr) == self.code.main_pc() { '>' } else { ' ' };
            write!(w, "{marker}{:5}: {:<16}", instr.addr, instr.repr().to_string())?;
            match instr.target() {
                Some(target) => writeln!(w, " -> {target}")?,
                None => writeln!(w)?,
            }
        }
        Ok(())
    }

    pub fn print_listing(&self) {
        let mut s = String::new();
        match self.write_listing(&mut s) {
            Ok(()) => println!("{}", s),
            Err(err) => log::error!("failed to render listing: {}", err),
        }
    }
}
