//! Tokens
use smol_str::SmolStr;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    /// Line of the token's first character, starting at 1.
    pub line: u32,
    /// Column of the token's first character, starting at 1.
    pub col: u32,
    /// Decoded value of number and character literals.
    pub val: i32,
    /// Identifier text. Empty for every other kind of token.
    pub name: SmolStr,
}

impl Token {
    pub fn new(kind: TokenKind, line: u32, col: u32) -> Self {
        Self {
            kind,
            line,
            col,
            val: 0,
            name: SmolStr::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum TokenKind {
    // Simple
    Comma,        // ,
    Semicolon,    // ;
    Period,       // .
    PPeriod,      // ..
    PPPeriod,     // ...
    Hash,         // #
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]
    LeftBrace,    // {
    RightBrace,   // }

    // ------------------------------------------------------------------------
    // Operators
    Plus,         // +
    Minus,        // -
    Times,        // *
    Slash,        // /
    Rem,          // %
    PlusPlus,     // ++
    MinusMinus,   // --
    Assign,       // =
    PlusAssign,   // +=
    MinusAssign,  // -=
    TimesAssign,  // *=
    SlashAssign,  // /=
    RemAssign,    // %=
    Eq,           // ==
    NotEq,        // !=
    Less,         // <
    LessEq,       // <=
    Greater,      // >
    GreaterEq,    // >=
    And,          // &&
    Or,           // ||

    // ------------------------------------------------------------------------
    // Complex
    Ident,
    /// Reserved identifiers
    Keyword(Keyword),
    /// Decimal number literal
    Number,
    /// Single quoted character literal
    CharConst,

    // ------------------------------------------------------------------------
    // Special
    /// Token that could not be classified. Already reported by the lexer.
    None,
    /// End-of-file
    EOF,
}

impl TokenKind {
    /// Tokens that may start an expression.
    #[inline]
    pub fn starts_expr(self) -> bool {
        matches!(
            self,
            TokenKind::Minus
                | TokenKind::Ident
                | TokenKind::Number
                | TokenKind::CharConst
                | TokenKind::Keyword(Keyword::New)
                | TokenKind::LeftParen
        )
    }
}

impl fmt::Display for TokenKind {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TokenKind as TK;
        let text = match self {
            TK::Comma        => ",",
            TK::Semicolon    => ";",
            TK::Period       => ".",
            TK::PPeriod      => "..",
            TK::PPPeriod     => "...",
            TK::Hash         => "#",
            TK::LeftParen    => "(",
            TK::RightParen   => ")",
            TK::LeftBracket  => "[",
            TK::RightBracket => "]",
            TK::LeftBrace    => "{",
            TK::RightBrace   => "}",
            TK::Plus         => "+",
            TK::Minus        => "-",
            TK::Times        => "*",
            TK::Slash        => "/",
            TK::Rem          => "%",
            TK::PlusPlus     => "++",
            TK::MinusMinus   => "--",
            TK::Assign       => "=",
            TK::PlusAssign   => "+=",
            TK::MinusAssign  => "-=",
            TK::TimesAssign  => "*=",
            TK::SlashAssign  => "/=",
            TK::RemAssign    => "%=",
            TK::Eq           => "==",
            TK::NotEq        => "!=",
            TK::Less         => "<",
            TK::LessEq       => "<=",
            TK::Greater      => ">",
            TK::GreaterEq    => ">=",
            TK::And          => "&&",
            TK::Or           => "||",
            TK::Ident        => "identifier",
            TK::Keyword(kw)  => return fmt::Display::fmt(kw, f),
            TK::Number       => "number",
            TK::CharConst    => "character constant",
            TK::None         => "none",
            TK::EOF          => "end of file",
        };
        f.write_str(text)
    }
}

/// Reserved keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Keyword {
    Break,
    Class,
    Else,
    Final,
    If,
    New,
    Print,
    Program,
    Read,
    Return,
    Void,
    While,
}

impl Keyword {
    /// Keywords are case sensitive.
    #[rustfmt::skip]
    pub fn parse(text: impl AsRef<str>) -> Option<Self> {
        match text.as_ref() {
            "break"   => Some(Self::Break),
            "class"   => Some(Self::Class),
            "else"    => Some(Self::Else),
            "final"   => Some(Self::Final),
            "if"      => Some(Self::If),
            "new"     => Some(Self::New),
            "print"   => Some(Self::Print),
            "program" => Some(Self::Program),
            "read"    => Some(Self::Read),
            "return"  => Some(Self::Return),
            "void"    => Some(Self::Void),
            "while"   => Some(Self::While),
            _         => None,
        }
    }

    #[rustfmt::skip]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Break   => "break",
            Self::Class   => "class",
            Self::Else    => "else",
            Self::Final   => "final",
            Self::If      => "if",
            Self::New     => "new",
            Self::Print   => "print",
            Self::Program => "program",
            Self::Read    => "read",
            Self::Return  => "return",
            Self::Void    => "void",
            Self::While   => "while",
        }
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
