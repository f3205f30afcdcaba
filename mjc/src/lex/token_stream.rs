//! Token stream with a single token of look ahead.
use crate::diagnostics::Errors;

use super::{Lexer, Token, TokenKind};

/// Keeps the most recently consumed token, and the
/// lookahead token that will be consumed next.
///
/// Tokens are lazily lexed. Advancing the stream
/// triggers the internal lexer exactly once.
pub struct TokenStream<'a> {
    lexer: Lexer<'a>,
    /// A copy of the previous token, so the parser can
    /// read the name or value of what it just consumed.
    prev: Token,
    /// Lookahead token.
    peek: Token,
}

impl<'a> TokenStream<'a> {
    /// Create a stream positioned before the first token.
    ///
    /// Call [`TokenStream::advance`] once to load the
    /// first lookahead token.
    pub fn new(lexer: Lexer<'a>) -> Self {
        Self {
            lexer,
            prev: Token::new(TokenKind::None, 1, 1),
            peek: Token::new(TokenKind::None, 1, 1),
        }
    }

    pub fn source_code(&self) -> &'a str {
        self.lexer.source_code()
    }

    /// Shift the lookahead into the previous slot and
    /// lex a new lookahead token.
    #[inline]
    pub fn advance(&mut self, errors: &mut Errors) {
        let next = self.lexer.next_token(errors);
        self.prev = std::mem::replace(&mut self.peek, next);
    }

    /// Most recently consumed token.
    #[inline]
    pub fn previous_token(&self) -> &Token {
        &self.prev
    }

    /// Token that will be consumed next.
    #[inline]
    pub fn peek(&self) -> &Token {
        &self.peek
    }

    #[inline]
    pub fn peek_kind(&self) -> TokenKind {
        self.peek.kind
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_advance_shifts_lookahead() {
        let mut errors = Errors::new();
        let mut stream = TokenStream::new(Lexer::new("a 42"));
        stream.advance(&mut errors);
        assert_eq!(stream.peek_kind(), TokenKind::Ident);

        stream.advance(&mut errors);
        assert_eq!(stream.previous_token().name, "a");
        assert_eq!(stream.peek().val, 42);

        stream.advance(&mut errors);
        stream.advance(&mut errors);
        assert_eq!(stream.previous_token().kind, TokenKind::EOF);
        assert_eq!(stream.peek_kind(), TokenKind::EOF);
    }
}
