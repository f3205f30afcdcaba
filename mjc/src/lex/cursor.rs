//! Character cursor.
use std::str::Chars;

/// Character returned once the source is exhausted.
///
/// Source text can contain null characters, so use
/// [`Cursor::at_end`] to tell them apart.
pub const EOF_CHAR: char = '\0';

/// Scans source text one character at a time, keeping
/// track of the line and column of the current character.
pub struct Cursor<'a> {
    chars: Chars<'a>,
    current: char,
    at_end: bool,
    line: u32,
    col: u32,
}

impl<'a> Cursor<'a> {
    /// Initial state of the cursor is a non-existant character
    /// before the start of the text. Call [`Cursor::bump`] to
    /// move onto the first character.
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.chars(),
            current: EOF_CHAR,
            at_end: false,
            line: 1,
            col: 0,
        }
    }

    #[inline]
    pub fn current(&self) -> char {
        self.current
    }

    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Indicates whether the cursor has moved past the last character.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.at_end
    }

    /// Move to the next character and return it.
    pub fn bump(&mut self) -> char {
        match self.chars.next() {
            Some(c) => {
                self.current = c;
                if c == '\n' {
                    self.line += 1;
                    self.col = 0;
                } else {
                    self.col += 1;
                }
            }
            None => {
                self.current = EOF_CHAR;
                if !self.at_end {
                    self.col += 1;
                }
                self.at_end = true;
            }
        }
        self.current
    }
}
