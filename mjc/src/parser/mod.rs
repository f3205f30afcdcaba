//! Single pass compiler.
//!
//! The parser drives everything: it checks the source against the
//! grammar, declares and resolves names, and emits code as it goes.
//! There is no syntax tree.
mod decl;
mod expr;
mod stmt;

use log::{debug, trace};

use crate::{
    codegen::{Code, Label, Operand, OperandKind},
    conf::CompileConf,
    constants::{BYTE_ELEMS, MAX_NESTING, WORD_ELEMS},
    diagnostics::{Errors, Message, Report, Reporter},
    error::MjResult,
    lex::{Keyword, Lexer, Token, TokenKind, TokenStream},
    symtab::{ObjId, ObjKind, SymTab, TypeId, Types},
};

use Keyword as KW;
use TokenKind as TK;

/// Tokens that may start a global declaration.
const SYNC_DECL: &[TokenKind] = &[
    TK::Keyword(KW::Final),
    TK::Keyword(KW::Class),
    TK::LeftBrace,
    TK::EOF,
];

/// Tokens that may start a method declaration.
const SYNC_METH_DECL: &[TokenKind] = &[TK::Keyword(KW::Void), TK::EOF];

/// Tokens that may start or end a statement.
const SYNC_STAT: &[TokenKind] = &[
    TK::Keyword(KW::If),
    TK::Keyword(KW::While),
    TK::Keyword(KW::Break),
    TK::Keyword(KW::Return),
    TK::Keyword(KW::Read),
    TK::Keyword(KW::Print),
    TK::Semicolon,
    TK::Keyword(KW::Else),
    TK::RightBrace,
    TK::EOF,
];

pub struct Parser<'a> {
    stream: TokenStream<'a>,
    reporter: Reporter,
    tab: SymTab,
    code: Code,
    conf: CompileConf,
    /// Method whose body is being compiled.
    cur_meth: Option<ObjId>,
    /// Exit labels of the enclosing loops, innermost last.
    loop_exits: Vec<Label>,
    /// Statements and expressions currently being parsed.
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self::with_conf(lexer, CompileConf::default())
    }

    pub fn with_conf(lexer: Lexer<'a>, conf: CompileConf) -> Self {
        Self {
            stream: TokenStream::new(lexer),
            reporter: Reporter::new(),
            tab: SymTab::new(),
            code: Code::new(),
            conf: conf.clamped(),
            cur_meth: None,
            loop_exits: vec![],
            depth: 0,
        }
    }

    /// Compile the whole source, failing when anything was reported.
    pub fn parse(self) -> MjResult<Code> {
        let (code, errors) = self.parse_all();
        if errors.is_empty() {
            Ok(code)
        } else {
            Err(errors.into())
        }
    }

    /// Compile the whole source, returning the generated code
    /// even when errors were reported.
    pub fn parse_all(mut self) -> (Code, Errors) {
        self.scan();
        self.program();
        self.check(TK::EOF);

        let errors = self.reporter.into_errors();
        debug!(
            "compiled {} bytes of code, {} globals, {} errors",
            self.code.pc(),
            self.code.data_size(),
            errors.count()
        );
        (self.code, errors)
    }

    // ------------------------------------------------------------------------
    // Tokens

    /// Consume the lookahead token.
    fn scan(&mut self) {
        self.stream.advance(self.reporter.sink_mut());
        let la = self.stream.peek();
        self.reporter.advance(la.line, la.col);
    }

    /// Kind of the lookahead token.
    #[inline]
    fn sym(&self) -> TokenKind {
        self.stream.peek_kind()
    }

    /// Most recently consumed token.
    #[inline]
    fn prev(&self) -> &Token {
        self.stream.previous_token()
    }

    /// Consume the expected token, or report it missing and
    /// leave the lookahead as is.
    fn check(&mut self, expected: TokenKind) {
        if self.sym() == expected {
            self.scan();
        } else {
            self.error(Message::TokenExpected(expected));
        }
    }

    #[inline]
    fn error(&mut self, message: Message) {
        self.reporter.report(message);
    }

    // ------------------------------------------------------------------------
    // Recovery

    /// Whether the lookahead names a type, which likely starts a declaration.
    fn at_type_name(&self) -> bool {
        self.sym() == TK::Ident && self.tab.is_type_name(&self.stream.peek().name)
    }

    /// Skip to the start of the next global declaration.
    fn recover_decl(&mut self) {
        loop {
            self.scan();
            if SYNC_DECL.contains(&self.sym()) || self.at_type_name() {
                break;
            }
        }
        trace!("resumed declarations at {}", self.sym());
        self.reporter.reset_distance();
    }

    /// Skip to the start of the next method declaration.
    fn recover_meth_decl(&mut self) {
        loop {
            self.scan();
            if SYNC_METH_DECL.contains(&self.sym()) || self.at_type_name() {
                break;
            }
        }
        trace!("resumed method declarations at {}", self.sym());
        self.reporter.reset_distance();
    }

    /// Skip to the start or end of a statement.
    fn recover_stat(&mut self) {
        // A stray else is a sync token that no statement consumes.
        if self.sym() == TK::Keyword(KW::Else) {
            self.scan();
        }
        while !SYNC_STAT.contains(&self.sym()) {
            self.scan();
        }
        trace!("resumed statements at {}", self.sym());
        self.reporter.reset_distance();
    }

    /// Skip the rest of an expression nested too deeply, up to the
    /// bracket that closes it.
    fn skip_nested_expr(&mut self) {
        let mut open = 0_usize;
        loop {
            match self.sym() {
                TK::LeftParen | TK::LeftBracket => open += 1,
                TK::RightParen | TK::RightBracket if open == 0 => break,
                TK::RightParen | TK::RightBracket => open -= 1,
                TK::Semicolon | TK::RightBrace | TK::EOF => break,
                _ => {}
            }
            self.scan();
        }
        trace!("resumed expression at {}", self.sym());
    }

    /// Skip a statement nested too deeply, including any blocks in it.
    fn skip_nested_stat(&mut self) {
        let mut open = 0_usize;
        loop {
            match self.sym() {
                TK::EOF => break,
                TK::RightBrace if open == 0 => break,
                TK::Semicolon if open == 0 => {
                    self.scan();
                    break;
                }
                TK::LeftBrace => open += 1,
                TK::RightBrace => {
                    open -= 1;
                    if open == 0 {
                        self.scan();
                        break;
                    }
                }
                _ => {}
            }
            self.scan();
        }
        trace!("resumed statements at {}", self.sym());
    }

    // ------------------------------------------------------------------------
    // Nesting

    /// Run the closure one nesting level deeper. `None` when the
    /// nesting limit is reached, in which case nothing was parsed.
    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> Option<T> {
        if self.depth >= MAX_NESTING {
            self.error(Message::NestingTooDeep);
            return None;
        }
        self.depth += 1;
        let value = f(self);
        self.depth -= 1;
        Some(value)
    }

    // ------------------------------------------------------------------------
    // Scopes

    /// Run the closure in a new scope, returning the declarations made in it.
    fn scoped<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> (T, Vec<ObjId>) {
        self.tab.open_scope();
        let value = f(self);
        let locals = self.tab.close_scope();
        (value, locals)
    }

    /// Run the closure as the body of a loop, returning the label
    /// that `break` statements jump to.
    fn in_loop(&mut self, f: impl FnOnce(&mut Self)) -> Label {
        self.loop_exits.push(Label::new());
        f(self);
        match self.loop_exits.pop() {
            Some(exit) => exit,
            None => panic!("loop exit stack underflow"),
        }
    }

    // ------------------------------------------------------------------------
    // Code helpers

    /// Push the value of an operand, calling it if it is a method.
    fn load_value(&mut self, x: &mut Operand) {
        if x.kind == OperandKind::Meth {
            self.code.call(x, &mut self.reporter);
            x.kind = OperandKind::Stack;
        } else {
            self.code.load(x, &mut self.reporter);
        }
    }

    /// `newarray` operand for arrays of the element type.
    fn elem_size(ty: TypeId) -> i32 {
        if ty == Types::CHAR {
            BYTE_ELEMS
        } else {
            WORD_ELEMS
        }
    }

    // ------------------------------------------------------------------------
    // Program

    fn program(&mut self) {
        self.check(TK::Keyword(KW::Program));
        self.check(TK::Ident);
        let name = self.prev().name.clone();
        let prog = self.tab.insert(ObjKind::Prog, &name, Types::NONE, &mut self.reporter);

        let ((), locals) = self.scoped(|p| {
            loop {
                match p.sym() {
                    TK::Keyword(KW::Final) => p.const_decl(),
                    TK::Ident => p.var_decl(),
                    TK::Keyword(KW::Class) => p.class_decl(),
                    TK::LeftBrace | TK::EOF => break,
                    _ => {
                        p.error(Message::InvalidDecl);
                        p.recover_decl();
                    }
                }
            }

            let n_vars = p.tab.cur_scope().n_vars();
            if n_vars > p.conf.max_globals {
                p.error(Message::TooManyGlobals);
            }
            p.code.set_data_size(n_vars);

            p.check(TK::LeftBrace);
            while p.sym() != TK::RightBrace && p.sym() != TK::EOF {
                p.method_decl();
            }
            p.check(TK::RightBrace);

            p.tab.find_method("main", &mut p.reporter);
        });

        self.tab.obj_mut(prog).locals = locals;
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::diagnostics::Category;

    fn parse(source: &str) -> (Code, Errors) {
        Parser::new(Lexer::new(source)).parse_all()
    }

    #[test]
    fn test_empty_program() {
        let (code, errors) = parse("program P { void main() {} }");
        assert!(errors.is_empty(), "{errors}");
        assert_eq!(code.main_pc(), Some(0));
        assert_eq!(code.data_size(), 0);
    }

    #[test]
    fn test_missing_main() {
        let (code, errors) = parse("program P { void foo() {} }");
        assert_eq!(
            errors.messages().collect::<Vec<_>>(),
            vec![&Message::MethNotFound("main".into())]
        );
        assert_eq!(code.main_pc(), None);
    }

    #[test]
    fn test_data_size_counts_globals() {
        let (code, errors) = parse(
            "program P final int K = 1; int a, b; class C { int f; } C c; char[] s; { void main() {} }",
        );
        assert!(errors.is_empty(), "{errors}");
        assert_eq!(code.data_size(), 4);
    }

    #[test]
    fn test_invalid_declaration_recovers_at_type_name() {
        let (_, errors) = parse("program P 42 + int x; { void main() { x = 1; } }");
        let messages: Vec<_> = errors.messages().collect();
        assert_eq!(messages, vec![&Message::InvalidDecl]);
    }

    #[test]
    fn test_stray_else_terminates() {
        let (_, errors) = parse("program P { void main() { else ; else } }");
        assert_eq!(errors.messages().next(), Some(&Message::InvalidStat));
    }

    #[test]
    fn test_garbage_terminates() {
        let (_, errors) = parse("program P { void main() { ) ) ) ( } } } int");
        assert!(!errors.is_empty());
        assert!(errors
            .iter()
            .all(|d| matches!(d.message.category(), Category::Syntax | Category::Semantic)));
    }

    #[test]
    fn test_capacity_limits_are_configurable() {
        let conf = CompileConf {
            max_globals: 1,
            max_fields: 1,
            max_locals: 1,
        };
        let source = "program P class C { int a, b; } int x, y; { void main() int i, j; {} }";
        let (_, errors) = Parser::with_conf(Lexer::new(source), conf).parse_all();
        let messages: Vec<_> = errors.messages().cloned().collect();
        assert_eq!(
            messages,
            vec![Message::TooManyFields, Message::TooManyGlobals, Message::TooManyLocals]
        );
    }
}
