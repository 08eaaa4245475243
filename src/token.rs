//! Streaming tokenizer: one-pass, single-character-lookahead RFC 8259 scanner.
//!
//! Role
//! - Recognizes the full JSON grammar directly over caller-owned bytes, with
//!   no decoding/copying: a `String` token's `value` is the raw byte span
//!   between quotes, escapes included.
//! - Tracks line/column so `load` can report exactly where a parse failed.
use crate::error::{FixJsonError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum TokenType {
    Eof,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Colon,
    Comma,
    String,
    Number,
    True,
    False,
    Null,
    Invalid,
}

impl TokenType {
    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            TokenType::String | TokenType::Number | TokenType::True | TokenType::False | TokenType::Null
        )
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Token<'buf> {
    pub kind: TokenType,
    /// Raw byte span: for `String`, the bytes between the quotes
    /// (escapes not decoded); for `Number`/literals, the full token bytes;
    /// for delimiters, the single delimiter byte.
    pub value: &'buf [u8],
    pub line: usize,
    pub column: usize,
}

/// Bytewise scan position over the input, tracking line/column for
/// diagnostics. LF, CR, and CR+LF all count as one line break.
struct Cursor<'buf> {
    bytes: &'buf [u8],
    pos: usize,
    line: usize,
    column: usize,
}

impl<'buf> Cursor<'buf> {
    fn new(bytes: &'buf [u8]) -> Self {
        Cursor { bytes, pos: 0, line: 1, column: 1 }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<u8> {
        let byte = self.peek()?;
        self.pos += 1;
        if byte == b'\n' {
            self.line += 1;
            self.column = 1;
        } else if byte == b'\r' {
            if self.peek() != Some(b'\n') {
                self.line += 1;
                self.column = 1;
            }
            // A following '\n' will itself bump the line; CRLF counts once.
        } else {
            self.column += 1;
        }
        Some(byte)
    }

    fn skip_spaces(&mut self) {
        while let Some(byte) = self.peek() {
            match byte {
                b' ' | b'\t' | b'\n' | b'\r' | 0x0c => {
                    self.advance();
                }
                _ => break,
            }
        }
    }
}

pub struct Tokenizer<'buf> {
    cursor: Cursor<'buf>,
}

impl<'buf> Tokenizer<'buf> {
    pub fn new(bytes: &'buf [u8]) -> Self {
        Tokenizer { cursor: Cursor::new(bytes) }
    }

    pub fn line(&self) -> usize {
        self.cursor.line
    }

    pub fn column(&self) -> usize {
        self.cursor.column
    }

    pub fn next_token(&mut self) -> Result<Token<'buf>> {
        self.cursor.skip_spaces();
        let line = self.cursor.line;
        let column = self.cursor.column;

        let Some(byte) = self.cursor.peek() else {
            return Ok(Token { kind: TokenType::Eof, value: &[], line, column });
        };

        let token = match byte {
            b'{' => self.single(TokenType::OpenBrace, line, column),
            b'}' => self.single(TokenType::CloseBrace, line, column),
            b'[' => self.single(TokenType::OpenBracket, line, column),
            b']' => self.single(TokenType::CloseBracket, line, column),
            b':' => self.single(TokenType::Colon, line, column),
            b',' => self.single(TokenType::Comma, line, column),
            b'"' => self.string(line, column)?,
            b'-' | b'0'..=b'9' => self.number(line, column)?,
            b't' => self.literal(b"true", TokenType::True, line, column)?,
            b'f' => self.literal(b"false", TokenType::False, line, column)?,
            b'n' => self.literal(b"null", TokenType::Null, line, column)?,
            _ => {
                return Err(FixJsonError::UnexpectedSymbol { found: byte, line, column });
            }
        };
        trace_token(&token);
        Ok(token)
    }

    fn single(&mut self, kind: TokenType, line: usize, column: usize) -> Token<'buf> {
        let start = self.cursor.pos;
        self.cursor.advance();
        Token { kind, value: &self.cursor.bytes[start..self.cursor.pos], line, column }
    }

    fn literal(
        &mut self,
        literal: &'static [u8],
        kind: TokenType,
        line: usize,
        column: usize,
    ) -> Result<Token<'buf>> {
        let start = self.cursor.pos;
        for &expected in literal {
            match self.cursor.advance() {
                Some(byte) if byte == expected => {}
                _ => {
                    return Err(FixJsonError::UnexpectedSymbol {
                        found: self.cursor.bytes.get(self.cursor.pos.saturating_sub(1)).copied().unwrap_or(0),
                        line,
                        column,
                    });
                }
            }
        }
        Ok(Token { kind, value: &self.cursor.bytes[start..self.cursor.pos], line, column })
    }

    /// Consume `"..."`, validating escapes. `value` excludes the outer
    /// quotes; `length` is the raw (un-decoded) byte span.
    fn string(&mut self, line: usize, column: usize) -> Result<Token<'buf>> {
        self.cursor.advance(); // opening quote
        let start = self.cursor.pos;

        loop {
            let char_line = self.cursor.line;
            let char_column = self.cursor.column;
            let Some(byte) = self.cursor.advance() else {
                return Err(FixJsonError::UnexpectedEof { line: char_line, column: char_column });
            };
            match byte {
                b'"' => {
                    let value = &self.cursor.bytes[start..self.cursor.pos - 1];
                    return Ok(Token { kind: TokenType::String, value, line, column });
                }
                b'\\' => self.escape(char_line, char_column)?,
                0x00..=0x1f => {
                    return Err(FixJsonError::UnexpectedSymbol { found: byte, line: char_line, column: char_column });
                }
                _ => {}
            }
        }
    }

    /// Consume the escape sequence following a `\` already advanced over.
    /// Accepts the full RFC 8259 set, not only `\u`.
    fn escape(&mut self, line: usize, column: usize) -> Result<()> {
        let Some(byte) = self.cursor.advance() else {
            return Err(FixJsonError::UnexpectedEof { line, column });
        };
        match byte {
            b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't' => Ok(()),
            b'u' => {
                let unit = self.hex_quad(line, column)?;
                if (0xD800..=0xDBFF).contains(&unit) {
                    match (self.cursor.advance(), self.cursor.advance()) {
                        (Some(b'\\'), Some(b'u')) => {
                            let low = self.hex_quad(line, column)?;
                            if (0xDC00..=0xDFFF).contains(&low) {
                                Ok(())
                            } else {
                                Err(FixJsonError::InvalidUnicode { line, column })
                            }
                        }
                        _ => Err(FixJsonError::InvalidUnicode { line, column }),
                    }
                } else if (0xDC00..=0xDFFF).contains(&unit) {
                    // An unpaired low surrogate can never open a valid pair.
                    Err(FixJsonError::InvalidUnicode { line, column })
                } else {
                    Ok(())
                }
            }
            _ => Err(FixJsonError::UnexpectedSymbol { found: byte, line, column }),
        }
    }

    fn hex_quad(&mut self, line: usize, column: usize) -> Result<u16> {
        let mut value: u16 = 0;
        for _ in 0..4 {
            let Some(byte) = self.cursor.advance() else {
                return Err(FixJsonError::UnexpectedEof { line, column });
            };
            let digit = match byte {
                b'0'..=b'9' => byte - b'0',
                b'a'..=b'f' => byte - b'a' + 10,
                b'A'..=b'F' => byte - b'A' + 10,
                _ => return Err(FixJsonError::InvalidUnicode { line, column }),
            };
            value = (value << 4) | digit as u16;
        }
        Ok(value)
    }

    /// `-? (0 | [1-9][0-9]*) (\. [0-9]+)? ([eE] [+-]? [0-9]+)?`
    pub(crate) fn number(&mut self, line: usize, column: usize) -> Result<Token<'buf>> {
        let start = self.cursor.pos;

        if self.cursor.peek() == Some(b'-') {
            self.cursor.advance();
        }

        match self.cursor.peek() {
            Some(b'0') => {
                self.cursor.advance();
                if matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                    return Err(FixJsonError::InvalidNumber { line, column });
                }
            }
            Some(b'1'..=b'9') => {
                while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                    self.cursor.advance();
                }
            }
            _ => return Err(FixJsonError::InvalidNumber { line, column }),
        }

        if self.cursor.peek() == Some(b'.') {
            self.cursor.advance();
            if !matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                return Err(FixJsonError::InvalidNumber { line, column });
            }
            while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                self.cursor.advance();
            }
        }

        if matches!(self.cursor.peek(), Some(b'e') | Some(b'E')) {
            self.cursor.advance();
            if matches!(self.cursor.peek(), Some(b'+') | Some(b'-')) {
                self.cursor.advance();
            }
            if !matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                return Err(FixJsonError::InvalidNumber { line, column });
            }
            while matches!(self.cursor.peek(), Some(b'0'..=b'9')) {
                self.cursor.advance();
            }
        }

        let value = &self.cursor.bytes[start..self.cursor.pos];
        Ok(Token { kind: TokenType::Number, value, line, column })
    }
}

/// Validate that `bytes` is, in full, one well-formed JSON number literal
/// (not a prefix of one). Used by the builder API, which accepts caller
/// text directly rather than scanning it out of a larger document.
pub(crate) fn validate_number(bytes: &[u8]) -> Result<()> {
    let mut tokenizer = Tokenizer::new(bytes);
    let token = tokenizer.number(1, 1)?;
    if token.value.len() == bytes.len() {
        Ok(())
    } else {
        Err(FixJsonError::InvalidNumber { line: 1, column: 1 })
    }
}

fn trace_token(token: &Token<'_>) {
    log::trace!(
        "tokenizer: {:?} at {}:{} ({} bytes)",
        token.kind,
        token.line,
        token.column,
        token.value.len()
    );
}
