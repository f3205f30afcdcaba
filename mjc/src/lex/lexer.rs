//! Lexical analysis
use smol_str::SmolStr;

use crate::diagnostics::{Errors, Message};

use super::{
    cursor::Cursor,
    tokens::{Keyword, Token, TokenKind},
};

pub struct Lexer<'a> {
    /// Character scanner
    cursor: Cursor<'a>,
    /// Keep reference to the source so tokens can
    /// be related back to the text.
    original: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(source_code: &'a str) -> Self {
        let mut cursor = Cursor::new(source_code);

        // Initial state of the cursor is a non-existant char,
        // but the initial state of the lexer should be a valid
        // token starting character.
        //
        // Prime the cursor for the first iteration.
        cursor.bump();

        Self {
            cursor,
            original: source_code,
        }
    }

    /// Original source code that was passed in during construction.
    pub fn source_code(&self) -> &'a str {
        self.original
    }

    /// Scan the source characters and construct the next token.
    ///
    /// Lexical errors are recorded in `errors`, and a token is produced
    /// regardless. Once the source is exhausted every call returns an
    /// [`TokenKind::EOF`] token.
    ///
    /// ## Implementation
    ///
    /// Each call starts with the assumption that the cursor is pointing
    /// at the first character of the remaining source, and must leave it
    /// pointing at the first character after the token it built.
    pub fn next_token(&mut self, errors: &mut Errors) -> Token {
        use TokenKind as TK;

        loop {
            // Erase leading whitespace.
            while self.cursor.current().is_whitespace() && !self.cursor.at_end() {
                self.cursor.bump();
            }

            let mut token = Token::new(TK::None, self.cursor.line(), self.cursor.col());

            if self.cursor.at_end() {
                token.kind = TK::EOF;
                return token;
            }

            token.kind = match self.cursor.current() {
                'a'..='z' | 'A'..='Z' => {
                    self.consume_ident(&mut token);
                    token.kind
                }
                '0'..='9' => {
                    self.consume_number(&mut token, errors);
                    token.kind
                }
                '\'' => {
                    self.consume_char(&mut token, errors);
                    token.kind
                }
                ';' => self.single(TK::Semicolon),
                ',' => self.single(TK::Comma),
                '(' => self.single(TK::LeftParen),
                ')' => self.single(TK::RightParen),
                '[' => self.single(TK::LeftBracket),
                ']' => self.single(TK::RightBracket),
                '{' => self.single(TK::LeftBrace),
                '}' => self.single(TK::RightBrace),
                '#' => self.single(TK::Hash),
                '=' => self.compound('=', TK::Eq, TK::Assign),
                '*' => self.compound('=', TK::TimesAssign, TK::Times),
                '%' => self.compound('=', TK::RemAssign, TK::Rem),
                '<' => self.compound('=', TK::LessEq, TK::Less),
                '>' => self.compound('=', TK::GreaterEq, TK::Greater),
                '+' => match self.cursor.bump() {
                    '+' => self.single(TK::PlusPlus),
                    '=' => self.single(TK::PlusAssign),
                    _ => TK::Plus,
                },
                '-' => match self.cursor.bump() {
                    '-' => self.single(TK::MinusMinus),
                    '=' => self.single(TK::MinusAssign),
                    _ => TK::Minus,
                },
                '/' => match self.cursor.bump() {
                    '*' => {
                        self.erase_comment(&token, errors);
                        continue;
                    }
                    '=' => self.single(TK::SlashAssign),
                    _ => TK::Slash,
                },
                '!' => self.pair('=', TK::NotEq, &token, errors),
                '&' => self.pair('&', TK::And, &token, errors),
                '|' => self.pair('|', TK::Or, &token, errors),
                '.' => {
                    if self.cursor.bump() == '.' {
                        if self.cursor.bump() == '.' {
                            self.single(TK::PPPeriod)
                        } else {
                            TK::PPeriod
                        }
                    } else {
                        TK::Period
                    }
                }
                c => {
                    errors.record(token.line, token.col, Message::InvalidChar(c));
                    self.cursor.bump();
                    TK::None
                }
            };

            return token;
        }
    }

    /// Consume a single character token.
    #[inline]
    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.cursor.bump();
        kind
    }

    /// Operator that is optionally followed by a second character.
    #[inline]
    fn compound(&mut self, second: char, long: TokenKind, short: TokenKind) -> TokenKind {
        if self.cursor.bump() == second {
            self.single(long)
        } else {
            short
        }
    }

    /// Operator that is only valid as a two character pair.
    fn pair(&mut self, second: char, kind: TokenKind, token: &Token, errors: &mut Errors) -> TokenKind {
        let first = self.cursor.current();
        if self.cursor.bump() == second {
            self.single(kind)
        } else {
            errors.record(token.line, token.col, Message::InvalidChar(first));
            TokenKind::None
        }
    }
}

/// Specialised tokens.
impl<'a> Lexer<'a> {
    /// Skip a block comment, including any comments nested inside it.
    ///
    /// The cursor must be on the `*` of the opening `/*`.
    fn erase_comment(&mut self, start: &Token, errors: &mut Errors) {
        debug_assert_eq!(self.cursor.current(), '*');

        let mut depth = 1_u32;
        self.cursor.bump();

        while !self.cursor.at_end() {
            match self.cursor.current() {
                '/' => {
                    if self.cursor.bump() == '*' {
                        depth += 1;
                        self.cursor.bump();
                    }
                }
                '*' => {
                    if self.cursor.bump() == '/' {
                        depth -= 1;
                        self.cursor.bump();
                        if depth == 0 {
                            return;
                        }
                    }
                }
                _ => {
                    self.cursor.bump();
                }
            }
        }

        errors.record(start.line, start.col, Message::EofInComment);
    }

    /// Identifier or keyword.
    fn consume_ident(&mut self, token: &mut Token) {
        debug_assert!(self.cursor.current().is_ascii_alphabetic());

        let mut name = String::new();
        while is_letter_or_digit(self.cursor.current()) && !self.cursor.at_end() {
            name.push(self.cursor.current());
            self.cursor.bump();
        }

        token.kind = match Keyword::parse(&name) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Ident,
        };
        token.name = SmolStr::from(name);
    }

    /// Decimal number literal, decoded as a signed 32-bit integer.
    ///
    /// A literal that doesn't fit is reported, but still
    /// produces a number token with value 0.
    fn consume_number(&mut self, token: &mut Token, errors: &mut Errors) {
        let mut digits = String::new();
        while self.cursor.current().is_ascii_digit() && !self.cursor.at_end() {
            digits.push(self.cursor.current());
            self.cursor.bump();
        }

        token.kind = TokenKind::Number;
        match digits.parse::<i32>() {
            Ok(value) => token.val = value,
            Err(_) => errors.record(token.line, token.col, Message::BigNum(SmolStr::from(digits))),
        }
    }

    /// Single quoted character literal.
    fn consume_char(&mut self, token: &mut Token, errors: &mut Errors) {
        debug_assert_eq!(self.cursor.current(), '\'');

        token.kind = TokenKind::CharConst;
        let c = self.cursor.bump();

        if self.cursor.at_end() {
            errors.record(token.line, token.col, Message::EofInChar);
            return;
        }

        match c {
            '\\' => {
                let escape = self.cursor.bump();
                if self.cursor.at_end() {
                    errors.record(token.line, token.col, Message::EofInChar);
                    return;
                }
                match escape {
                    'r' => token.val = '\r' as i32,
                    'n' => token.val = '\n' as i32,
                    '\'' => token.val = '\'' as i32,
                    '\\' => token.val = '\\' as i32,
                    other => errors.record(token.line, token.col, Message::UndefinedEscape(other)),
                }
            }
            '\'' => {
                errors.record(token.line, token.col, Message::EmptyCharConst);
                self.cursor.bump();
                return;
            }
            '\n' | '\r' => {
                errors.record(token.line, token.col, Message::IllegalLineEnd);
                return;
            }
            other => token.val = other as i32,
        }

        if self.cursor.bump() == '\'' && !self.cursor.at_end() {
            self.cursor.bump();
        } else {
            errors.record(token.line, token.col, Message::MissingQuote);
        }
    }
}

fn is_letter_or_digit(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

impl<'a> IntoIterator for Lexer<'a> {
    type Item = Token;
    type IntoIter = LexerIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        LexerIter {
            lexer: self,
            errors: Errors::new(),
            done: false,
        }
    }
}

/// Convenience iterator that wraps the lexer.
///
/// Yields the terminal EOF token once, then stops.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct LexerIter<'a> {
    lexer: Lexer<'a>,
    /// Lexical errors encountered so far.
    errors: Errors,
    // Track end so an EOF token is emitted once.
    done: bool,
}

impl<'a> LexerIter<'a> {
    pub fn errors(&self) -> &Errors {
        &self.errors
    }
}

impl<'a> Iterator for LexerIter<'a> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let token = self.lexer.next_token(&mut self.errors);
        if token.kind == TokenKind::EOF {
            self.done = true;
        }
        Some(token)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use TokenKind as TK;

    fn lex(source: &str) -> (Vec<Token>, Errors) {
        let mut iter = Lexer::new(source).into_iter();
        let tokens = iter.by_ref().collect::<Vec<_>>();
        (tokens, iter.errors().clone())
    }

    fn kinds(source: &str) -> Vec<TokenKind> {
        lex(source).0.into_iter().map(|token| token.kind).collect()
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            kinds("+ ++ += - -- -= * *= / /= % %= = == != < <= > >= && ||"),
            vec![
                TK::Plus, TK::PlusPlus, TK::PlusAssign,
                TK::Minus, TK::MinusMinus, TK::MinusAssign,
                TK::Times, TK::TimesAssign, TK::Slash, TK::SlashAssign,
                TK::Rem, TK::RemAssign, TK::Assign, TK::Eq, TK::NotEq,
                TK::Less, TK::LessEq, TK::Greater, TK::GreaterEq,
                TK::And, TK::Or, TK::EOF,
            ]
        );
    }

    #[test]
    fn test_periods() {
        assert_eq!(
            kinds(". .. ... ...."),
            vec![TK::Period, TK::PPeriod, TK::PPPeriod, TK::PPPeriod, TK::Period, TK::EOF]
        );
    }

    #[test]
    fn test_keywords_and_idents() {
        let (tokens, errors) = lex("program Prog while_ x1 void");
        assert!(errors.is_empty());
        assert_eq!(tokens[0].kind, TK::Keyword(Keyword::Program));
        assert_eq!(tokens[1].kind, TK::Ident);
        assert_eq!(tokens[1].name, "Prog");
        assert_eq!(tokens[2].kind, TK::Ident);
        assert_eq!(tokens[2].name, "while_");
        assert_eq!(tokens[3].name, "x1");
        assert_eq!(tokens[4].kind, TK::Keyword(Keyword::Void));
    }

    #[test]
    fn test_positions() {
        let (tokens, _) = lex("a\n  bc = 1;");
        assert_eq!((tokens[0].line, tokens[0].col), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].col), (2, 3));
        assert_eq!((tokens[2].line, tokens[2].col), (2, 6));
        assert_eq!((tokens[3].line, tokens[3].col), (2, 8));
    }

    #[test]
    fn test_numbers() {
        let (tokens, errors) = lex("0 2147483647 2147483648");
        assert_eq!(tokens[0].val, 0);
        assert_eq!(tokens[1].val, i32::MAX);
        assert_eq!(tokens[2].kind, TK::Number);
        assert_eq!(
            errors.messages().cloned().collect::<Vec<_>>(),
            vec![Message::BigNum("2147483648".into())]
        );
    }

    #[test]
    fn test_char_literals() {
        let (tokens, errors) = lex(r"'a' '\n' '\r' '\'' '\\'");
        assert!(errors.is_empty(), "{}", errors);
        let values = tokens.iter().take(5).map(|token| token.val).collect::<Vec<_>>();
        assert_eq!(values, vec!['a' as i32, 10, 13, '\'' as i32, '\\' as i32]);
        assert!(tokens.iter().take(5).all(|token| token.kind == TK::CharConst));
    }

    #[test]
    fn test_char_literal_errors() {
        let (_, errors) = lex("''");
        assert_eq!(errors.messages().next(), Some(&Message::EmptyCharConst));

        let (_, errors) = lex(r"'\t'");
        assert_eq!(errors.messages().next(), Some(&Message::UndefinedEscape('t')));

        let (_, errors) = lex("'ab'");
        assert_eq!(errors.messages().next(), Some(&Message::MissingQuote));

        let (_, errors) = lex("'\nx");
        assert_eq!(errors.messages().next(), Some(&Message::IllegalLineEnd));

        let (tokens, errors) = lex("'");
        assert_eq!(errors.messages().cloned().collect::<Vec<_>>(), vec![Message::EofInChar]);
        assert_eq!(tokens.last().map(|token| token.kind), Some(TK::EOF));
    }

    #[test]
    fn test_nested_comments() {
        assert_eq!(
            kinds("a /* one /* two */ still */ b"),
            vec![TK::Ident, TK::Ident, TK::EOF]
        );
        assert_eq!(kinds("/**/x"), vec![TK::Ident, TK::EOF]);
    }

    #[test]
    fn test_unterminated_comment() {
        let (tokens, errors) = lex("x /* /* */");
        assert_eq!(errors.count(), 1);
        assert_eq!(errors.messages().next(), Some(&Message::EofInComment));
        assert_eq!(
            tokens.iter().map(|token| token.kind).collect::<Vec<_>>(),
            vec![TK::Ident, TK::EOF]
        );
        let first = errors.iter().next().unwrap();
        assert_eq!((first.line, first.col), (1, 3));
    }

    #[test]
    fn test_invalid_chars() {
        let (tokens, errors) = lex("! & | $");
        assert_eq!(errors.count(), 4);
        assert!(tokens.iter().take(4).all(|token| token.kind == TK::None));
        assert_eq!(errors.messages().last(), Some(&Message::InvalidChar('$')));
    }

    #[test]
    fn test_eof_repeats() {
        let mut lexer = Lexer::new("  ");
        let mut errors = Errors::new();
        for _ in 0..3 {
            assert_eq!(lexer.next_token(&mut errors).kind, TK::EOF);
        }
    }
}
