//! Constant values of the compiler and its target machine.

/// First line of every object file.
pub const MAGIC: &str = "MJ";

/// Global variables are addressed with a 2-byte signed offset.
pub const MAX_GLOBALS: usize = 0x7FFF; // 32767

/// Fields are addressed with a 2-byte signed offset.
pub const MAX_FIELDS: usize = 0x7FFF; // 32767

/// Local variables are addressed with a 1-byte signed offset.
pub const MAX_LOCALS: usize = 0x7F; // 127

/// Deepest nesting of statements and expressions the parser descends into.
pub const MAX_NESTING: usize = 200;

/// Entry point written to the object file header when there is no `main`.
pub const NO_ENTRY: i32 = -1;

/// `newarray` operand for arrays of `char`.
pub const BYTE_ELEMS: i32 = 0;

/// `newarray` operand for arrays of `int` and references.
pub const WORD_ELEMS: i32 = 1;

/// `trap` operand raised when a method falls off its end without returning a value.
pub const TRAP_NO_RETURN: i32 = 1;

/// Type for storing addresses into the code buffer.
pub type Address = usize;
