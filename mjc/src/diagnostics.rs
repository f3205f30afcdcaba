//! Compile diagnostics.
//!
//! Every user facing problem found while compiling is recorded as a
//! [`Diagnostic`] in an [`Errors`] sink. Nothing in here aborts a
//! compilation; the parser keeps going to find as many problems as it can
//! in one run.
use itertools::Itertools;
use smol_str::SmolStr;
use std::fmt;

use crate::lex::TokenKind;

/// Minimum number of tokens that must be consumed cleanly
/// after an error before the next error is recorded.
pub const MIN_ERROR_DISTANCE: u32 = 3;

/// Catalog of diagnostic messages.
///
/// A variant carries exactly the parameters its template substitutes,
/// so a message can't be built with the wrong number of arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    // ------------------------------------------------------------------------
    // Lexical
    EmptyCharConst,
    UndefinedEscape(char),
    MissingQuote,
    InvalidChar(char),
    BigNum(SmolStr),
    EofInComment,
    EofInChar,
    IllegalLineEnd,

    // ------------------------------------------------------------------------
    // Syntax
    AddOp,
    AssignOp,
    ConstDecl,
    DesignFollow,
    InvalidDecl,
    InvalidFact,
    InvalidStat,
    MethDecl,
    MulOp,
    RelOp,
    TokenExpected(TokenKind),

    // ------------------------------------------------------------------------
    // Semantic
    ArrayIndex,
    ArraySize,
    ConstType,
    EqCheck,
    IncompTypes,
    InvalidCall,
    InvalidVarargCall,
    LessActualParams,
    MoreActualParams,
    LessActualVarargs,
    MoreActualVarargs,
    MethNotFound(SmolStr),
    MainWithParams,
    MainNotVoid,
    NoArray,
    NoClass,
    NoClassType,
    NoInt,
    NoIntOp,
    NoLoop,
    NoMeth,
    NoType,
    ParamType,
    PrintValue,
    ReadValue,
    ReturnNoVal,
    ReturnType,
    ReturnVoid,
    DeclName(SmolStr),
    NoField(SmolStr),
    NotFound(SmolStr),
    NoOperand,
    NoVal,
    NoVar,

    // ------------------------------------------------------------------------
    // Capacity
    TooManyFields,
    TooManyGlobals,
    TooManyLocals,
    JumpTooFar,
    NestingTooDeep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lexical,
    Syntax,
    Semantic,
    Capacity,
}

impl Message {
    /// Number of values substituted into the message template.
    pub fn param_count(&self) -> usize {
        use Message as M;
        match self {
            M::UndefinedEscape(_)
            | M::InvalidChar(_)
            | M::BigNum(_)
            | M::TokenExpected(_)
            | M::MethNotFound(_)
            | M::DeclName(_)
            | M::NoField(_)
            | M::NotFound(_) => 1,
            _ => 0,
        }
    }

    pub fn category(&self) -> Category {
        use Message as M;
        match self {
            M::EmptyCharConst
            | M::UndefinedEscape(_)
            | M::MissingQuote
            | M::InvalidChar(_)
            | M::BigNum(_)
            | M::EofInComment
            | M::EofInChar
            | M::IllegalLineEnd => Category::Lexical,
            M::AddOp
            | M::AssignOp
            | M::ConstDecl
            | M::DesignFollow
            | M::InvalidDecl
            | M::InvalidFact
            | M::InvalidStat
            | M::MethDecl
            | M::MulOp
            | M::RelOp
            | M::TokenExpected(_) => Category::Syntax,
            M::TooManyFields
            | M::TooManyGlobals
            | M::TooManyLocals
            | M::JumpTooFar
            | M::NestingTooDeep => Category::Capacity,
            _ => Category::Semantic,
        }
    }
}

impl fmt::Display for Message {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Message as M;
        match self {
            M::EmptyCharConst       => write!(f, "empty character constant"),
            M::UndefinedEscape(c)   => write!(f, "undefined escape character sequence '\\{c}'"),
            M::MissingQuote         => write!(f, "missing ' at end of character constant"),
            M::InvalidChar(c)       => write!(f, "invalid character {c}"),
            M::BigNum(digits)       => write!(f, "{digits} too big for integer constant"),
            M::EofInComment         => write!(f, "unexpected end of file in comment"),
            M::EofInChar            => write!(f, "unexpected end of file in char"),
            M::IllegalLineEnd       => write!(f, "illegal line end in character constant"),

            M::AddOp                => write!(f, "additive operator (+ or -) expected"),
            M::AssignOp             => write!(f, "assignment operator (=, +=, -=, *=, /=, %=) expected"),
            M::ConstDecl            => write!(f, "number or character constant expected"),
            M::DesignFollow         => write!(f, "assignment, method call, increment (++) or decrement (--) expected"),
            M::InvalidDecl          => write!(f, "invalid global declaration"),
            M::InvalidFact          => write!(f, "invalid start of factor: identifier, number, character constant, new or ( expected"),
            M::InvalidStat          => write!(f, "invalid start of statement: identifier, if, while, break, return, read, print, '{{' or ; expected"),
            M::MethDecl             => write!(f, "type name or void expected"),
            M::MulOp                => write!(f, "multiplicative operator (*, /, %) expected"),
            M::RelOp                => write!(f, "relational operator (==, !=, >, >=, <, <=) expected"),
            M::TokenExpected(kind)  => write!(f, "{kind} expected"),

            M::ArrayIndex           => write!(f, "array index must be an integer"),
            M::ArraySize            => write!(f, "array size must be an integer"),
            M::ConstType            => write!(f, "value does not match constant type"),
            M::EqCheck              => write!(f, "only (un)equality checks are allowed for reference types"),
            M::IncompTypes          => write!(f, "incompatible types"),
            M::InvalidCall          => write!(f, "invalid call of void method"),
            M::InvalidVarargCall    => write!(f, "called method has no vararg parameter"),
            M::LessActualParams     => write!(f, "less actual than formal parameters"),
            M::MoreActualParams     => write!(f, "more actual than formal parameters"),
            M::LessActualVarargs    => write!(f, "less actual than stated varargs"),
            M::MoreActualVarargs    => write!(f, "more actual than stated varargs"),
            M::MethNotFound(name)   => write!(f, "method {name} not found"),
            M::MainWithParams       => write!(f, "main method must not have any parameters"),
            M::MainNotVoid          => write!(f, "main method must return void"),
            M::NoArray              => write!(f, "indexed object is not an array"),
            M::NoClass              => write!(f, "dereferenced object is not a class"),
            M::NoClassType          => write!(f, "class type expected"),
            M::NoInt                => write!(f, "variable must be an integer"),
            M::NoIntOp              => write!(f, "operand(s) must be of type int"),
            M::NoLoop               => write!(f, "break is not within a loop"),
            M::NoMeth               => write!(f, "called object is not a method"),
            M::NoType               => write!(f, "type expected"),
            M::ParamType            => write!(f, "parameter type mismatch"),
            M::PrintValue           => write!(f, "can only print int or char values"),
            M::ReadValue            => write!(f, "can only read int or char values"),
            M::ReturnNoVal          => write!(f, "return expression required"),
            M::ReturnType           => write!(f, "return type must match method type"),
            M::ReturnVoid           => write!(f, "void method must not return a value"),
            M::DeclName(name)       => write!(f, "{name} already declared"),
            M::NoField(name)        => write!(f, "{name} is not a field"),
            M::NotFound(name)       => write!(f, "{name} not found"),
            M::NoOperand            => write!(f, "cannot create code operand for this kind of symbol table object"),
            M::NoVal                => write!(f, "value expected"),
            M::NoVar                => write!(f, "left-hand side of assignment must be a variable"),

            M::TooManyFields        => write!(f, "too many fields"),
            M::TooManyGlobals       => write!(f, "too many global variables"),
            M::TooManyLocals        => write!(f, "too many local variables"),
            M::JumpTooFar           => write!(f, "jump or call target too far away"),
            M::NestingTooDeep       => write!(f, "nesting too deep"),
        }
    }
}

/// A message anchored to a source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: u32,
    pub col: u32,
    pub message: Message,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "-- line {} col {}: {}", self.line, self.col, self.message)
    }
}

/// Sink that accumulates diagnostics in the order they were recorded.
#[derive(Debug, Default, Clone)]
pub struct Errors {
    diagnostics: Vec<Diagnostic>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: u32, col: u32, message: Message) {
        self.diagnostics.push(Diagnostic { line, col, message });
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.diagnostics.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    /// Messages only, without positions.
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.diagnostics.iter().map(|diagnostic| &diagnostic.message)
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.diagnostics.iter().join("\n"))
    }
}

/// Capability to report a problem at the current parse position.
///
/// The symbol table and code generator only see this trait, never
/// the parser itself.
pub trait Report {
    fn report(&mut self, message: Message);
}

/// Reports into an [`Errors`] sink at the position of the parser's
/// lookahead token, throttling cascades of errors.
///
/// After an error is reported, further errors are dropped until at
/// least [`MIN_ERROR_DISTANCE`] tokens have been consumed.
#[derive(Debug)]
pub struct Reporter {
    errors: Errors,
    /// Tokens consumed since the last reported error.
    distance: u32,
    line: u32,
    col: u32,
}

impl Reporter {
    pub fn new() -> Self {
        Self {
            errors: Errors::new(),
            distance: MIN_ERROR_DISTANCE,
            line: 1,
            col: 1,
        }
    }

    /// Record that a token was consumed, and move the report
    /// position to the new lookahead token.
    #[inline]
    pub fn advance(&mut self, line: u32, col: u32) {
        self.distance = self.distance.saturating_add(1);
        self.line = line;
        self.col = col;
    }

    /// Suppress errors until enough tokens have been consumed again.
    #[inline]
    pub fn reset_distance(&mut self) {
        self.distance = 0;
    }

    /// Underlying sink, for errors that bypass suppression.
    #[inline]
    pub fn sink_mut(&mut self) -> &mut Errors {
        &mut self.errors
    }

    #[inline]
    pub fn errors(&self) -> &Errors {
        &self.errors
    }

    pub fn into_errors(self) -> Errors {
        self.errors
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Report for Reporter {
    fn report(&mut self, message: Message) {
        if self.distance >= MIN_ERROR_DISTANCE {
            self.errors.record(self.line, self.col, message);
        }
        self.distance = 0;
    }
}

/// Collects bare messages. Handy when testing components in isolation.
impl Report for Vec<Message> {
    fn report(&mut self, message: Message) {
        self.push(message);
    }
}
