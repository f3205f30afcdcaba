//! Lexical analysis
mod cursor;
mod lexer;
mod token_stream;
mod tokens;

pub use self::{
    cursor::{Cursor, EOF_CHAR},
    lexer::{Lexer, LexerIter},
    token_stream::TokenStream,
    tokens::{Keyword, Token, TokenKind},
};
