//! Compiler configuration.
use crate::{
    constants::{MAX_FIELDS, MAX_GLOBALS, MAX_LOCALS},
    error::{MjError, MjResult},
};

/// Capacity limits checked while compiling.
///
/// Exceeding a limit is reported as an error, but compilation goes on.
/// A limit can be lowered, but never raised above what the instruction
/// operands can address.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct CompileConf {
    /// Maximum number of global variables.
    pub max_globals: usize,
    /// Maximum number of fields per class.
    pub max_fields: usize,
    /// Maximum number of parameters and local variables per method.
    pub max_locals: usize,
}

impl CompileConf {
    /// Fail when a limit exceeds what the instruction set can encode.
    pub fn validate(&self) -> MjResult<()> {
        let limits = [
            ("max_globals", self.max_globals, MAX_GLOBALS),
            ("max_fields", self.max_fields, MAX_FIELDS),
            ("max_locals", self.max_locals, MAX_LOCALS),
        ];
        for (name, value, max) in limits {
            if value > max {
                return Err(MjError::Config(format!("{name} is {value}, at most {max} is supported")));
            }
        }
        Ok(())
    }

    /// Copy with every limit capped at what the instruction set can encode.
    pub fn clamped(&self) -> Self {
        Self {
            max_globals: self.max_globals.min(MAX_GLOBALS),
            max_fields: self.max_fields.min(MAX_FIELDS),
            max_locals: self.max_locals.min(MAX_LOCALS),
        }
    }
}

impl Default for CompileConf {
    fn default() -> Self {
        Self {
            max_globals: MAX_GLOBALS,
            max_fields: MAX_FIELDS,
            max_locals: MAX_LOCALS,
        }
    }
}
