//! Jump targets with backpatching.
use log::trace;

use super::Code;

/// Placeholder bytes reserved in the code buffer for a jump offset.
///
/// Only [`Code::reserve`] can create one, and [`Code::patch`] consumes
/// it, so every patch overwrites bytes that were reserved for it and
/// each placeholder is patched at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct Fixup(usize);

impl Fixup {
    #[inline]
    pub(super) fn new(pos: usize) -> Self {
        Fixup(pos)
    }

    /// Position of the placeholder in the buffer.
    #[inline]
    pub fn pos(&self) -> usize {
        self.0
    }
}

/// Jump target, possibly not yet known.
///
/// Jumps to an unresolved label leave a placeholder that is filled in
/// when the label is resolved with [`Label::here`].
#[derive(Debug, Default)]
pub struct Label {
    adr: Option<usize>,
    fixups: Vec<Fixup>,
}

impl Label {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn adr(&self) -> Option<usize> {
        self.adr
    }

    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.adr.is_some()
    }

    /// Emit the 2-byte relative offset of a jump to this label.
    pub fn put(&mut self, code: &mut Code) {
        match self.adr {
            Some(adr) => {
                let offset = Code::offset(adr, code.pc() + 2);
                code.put_offset(offset);
            }
            None => self.fixups.push(code.reserve()),
        }
    }

    /// Resolve the label to the current end of the code buffer,
    /// patching every jump emitted so far.
    ///
    /// # Panics
    ///
    /// Panics when the label was already resolved.
    pub fn here(&mut self, code: &mut Code) {
        if let Some(adr) = self.adr {
            panic!("label already resolved at {adr}");
        }

        let adr = code.pc();
        trace!("label at {} patches {} jump(s)", adr, self.fixups.len());
        for fixup in self.fixups.drain(..) {
            let offset = Code::offset(adr, fixup.pos() + 2);
            code.patch(fixup, offset);
        }
        self.adr = Some(adr);
    }
}
