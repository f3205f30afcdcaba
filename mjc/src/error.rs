//! Result and errors.
use std::{fmt, io};

use crate::diagnostics::Errors;

pub type MjResult<T> = std::result::Result<T, MjError>;

#[derive(Debug, thiserror::Error)]
pub enum MjError {
    /// The source has errors. No code is produced.
    #[error("{}\n{} errors", .0, .0.count())]
    Compile(Errors),
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Fmt(#[from] fmt::Error),
    /// Malformed compiler configuration.
    #[error("config error: {0}")]
    Config(String),
}

impl MjError {
    /// Diagnostics of a failed compilation.
    pub fn diagnostics(&self) -> Option<&Errors> {
        match self {
            MjError::Compile(errors) => Some(errors),
            _ => None,
        }
    }
}

impl From<Errors> for MjError {
    fn from(errors: Errors) -> Self {
        MjError::Compile(errors)
    }
}
