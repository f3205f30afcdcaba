//! Single pass compiler for MicroJava.
//!
//! Source text is lowered straight into stack machine code while it
//! is being parsed. See [`compile`] for the usual entry point.
pub mod codegen;
pub mod conf;
pub mod constants;
pub mod diagnostics;
pub mod disasm;
pub mod error;
pub mod lex;
pub mod parser;
pub mod symtab;

use self::{codegen::Code, conf::CompileConf, error::MjResult, lex::Lexer, parser::Parser};

pub const IMPL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compile a program with the default configuration.
pub fn compile(source: &str) -> MjResult<Code> {
    compile_with(source, CompileConf::default())
}

/// Compile a program with the given limits. A configuration the
/// instruction set can't honour fails before anything is compiled.
pub fn compile_with(source: &str, conf: CompileConf) -> MjResult<Code> {
    conf.validate()?;
    Parser::with_conf(Lexer::new(source), conf).parse()
}

pub mod prelude {
    pub use super::{
        codegen::{Code, OpCode},
        conf::CompileConf,
        diagnostics::{Diagnostic, Errors, Message},
        disasm::Disassembler,
        error::{MjError, MjResult},
        lex::Lexer,
        parser::Parser,
    };
}
