//! Tokenizer shared by the expression and legacy statement grammars.

use std::time::Duration;

use crate::duration::parse_duration;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    Number(f64),
    Str(String),
    Duration(Duration),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Assign,
    Eql,
    Neq,
    RegexMatch,
    RegexNoMatch,
    Lss,
    Gtr,
    Lte,
    Gte,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eof,
}

impl TokenKind {
    /// Human-readable token description for error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(name) => format!("identifier \"{}\"", name),
            TokenKind::Number(n) => format!("number \"{}\"", n),
            TokenKind::Str(_) => "string".to_string(),
            TokenKind::Duration(d) => format!("duration \"{}\"", crate::format_duration(*d)),
            TokenKind::LParen => "\"(\"".to_string(),
            TokenKind::RParen => "\")\"".to_string(),
            TokenKind::LBrace => "\"{\"".to_string(),
            TokenKind::RBrace => "\"}\"".to_string(),
            TokenKind::LBracket => "\"[\"".to_string(),
            TokenKind::RBracket => "\"]\"".to_string(),
            TokenKind::Comma => "\",\"".to_string(),
            TokenKind::Assign => "\"=\"".to_string(),
            TokenKind::Eql => "\"==\"".to_string(),
            TokenKind::Neq => "\"!=\"".to_string(),
            TokenKind::RegexMatch => "\"=~\"".to_string(),
            TokenKind::RegexNoMatch => "\"!~\"".to_string(),
            TokenKind::Lss => "\"<\"".to_string(),
            TokenKind::Gtr => "\">\"".to_string(),
            TokenKind::Lte => "\"<=\"".to_string(),
            TokenKind::Gte => "\">=\"".to_string(),
            TokenKind::Add => "\"+\"".to_string(),
            TokenKind::Sub => "\"-\"".to_string(),
            TokenKind::Mul => "\"*\"".to_string(),
            TokenKind::Div => "\"/\"".to_string(),
            TokenKind::Mod => "\"%\"".to_string(),
            TokenKind::Pow => "\"^\"".to_string(),
            TokenKind::Eof => "end of input".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    /// Byte offset of the token's first character.
    pub offset: usize,
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == ':'
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == ':'
}

struct Lexer<'a> {
    input: &'a str,
    chars: Vec<(usize, char)>,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).map(|(_, c)| *c)
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).map(|(_, c)| *c)
    }

    fn offset(&self) -> usize {
        self.chars
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.input.len())
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.input, offset, message)
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();

        while let Some(c) = self.peek() {
            let offset = self.offset();

            if c.is_whitespace() {
                self.pos += 1;
                continue;
            }
            if c == '#' {
                while let Some(c) = self.peek() {
                    if c == '\n' {
                        break;
                    }
                    self.pos += 1;
                }
                continue;
            }

            let digit_follows = self.peek_at(1).is_some_and(|d| d.is_ascii_digit());
            let starts_number = c.is_ascii_digit() || (c == '.' && digit_follows);
            let kind = if starts_number {
                self.number_or_duration(offset)?
            } else if is_ident_start(c) {
                let start = self.pos;
                while self.peek().is_some_and(is_ident_char) {
                    self.pos += 1;
                }
                TokenKind::Ident(self.chars[start..self.pos].iter().map(|(_, c)| c).collect())
            } else if c == '"' || c == '\'' {
                self.quoted(c, offset)?
            } else if c == '`' {
                self.raw_string(offset)?
            } else {
                self.operator(c, offset)?
            };

            tokens.push(Token { kind, offset });
        }

        tokens.push(Token {
            kind: TokenKind::Eof,
            offset: self.input.len(),
        });
        Ok(tokens)
    }

    fn number_or_duration(&mut self, offset: usize) -> Result<TokenKind, ParseError> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            self.pos += 1;
        }
        let mut run: String = self.chars[start..self.pos].iter().map(|(_, c)| c).collect();

        if let Some(d) = parse_duration(&run) {
            return Ok(TokenKind::Duration(d));
        }

        // Signed exponent: "1e-3" stops the run at the sign.
        if run.ends_with(|c| c == 'e' || c == 'E')
            && matches!(self.peek(), Some('+') | Some('-'))
            && self.peek_at(1).is_some_and(|c| c.is_ascii_digit())
        {
            run.push(self.peek().unwrap_or('+'));
            self.pos += 1;
            while let Some(c) = self.peek().filter(|c| c.is_ascii_digit()) {
                run.push(c);
                self.pos += 1;
            }
        }

        let parsed = if let Some(hex) = run.strip_prefix("0x").or_else(|| run.strip_prefix("0X")) {
            i64::from_str_radix(hex, 16).ok().map(|n| n as f64)
        } else {
            run.parse::<f64>().ok()
        };

        parsed
            .map(TokenKind::Number)
            .ok_or_else(|| {
                self.error(offset, format!("bad number or duration syntax: \"{}\"", run))
            })
    }

    fn quoted(&mut self, quote: char, offset: usize) -> Result<TokenKind, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            let Some(c) = self.peek() else {
                return Err(self.error(offset, "unterminated quoted string"));
            };
            self.pos += 1;
            match c {
                '\n' => return Err(self.error(offset, "unterminated quoted string")),
                c if c == quote => return Ok(TokenKind::Str(out)),
                '\\' => {
                    let escape_offset = self.offset();
                    let Some(e) = self.peek() else {
                        return Err(self.error(offset, "unterminated quoted string"));
                    };
                    self.pos += 1;
                    match e {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        'a' => out.push('\u{07}'),
                        'b' => out.push('\u{08}'),
                        'f' => out.push('\u{0c}'),
                        'v' => out.push('\u{0b}'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        '\'' => out.push('\''),
                        'x' => out.push(self.hex_escape(2, escape_offset)?),
                        'u' => out.push(self.hex_escape(4, escape_offset)?),
                        'U' => out.push(self.hex_escape(8, escape_offset)?),
                        other => {
                            return Err(self.error(
                                escape_offset,
                                format!("unknown escape sequence \"\\{}\"", other),
                            ))
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn hex_escape(&mut self, digits: usize, offset: usize) -> Result<char, ParseError> {
        let mut value: u32 = 0;
        for _ in 0..digits {
            let digit = self
                .peek()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| self.error(offset, "invalid hex escape sequence"))?;
            value = value * 16 + digit;
            self.pos += 1;
        }
        char::from_u32(value)
            .ok_or_else(|| self.error(offset, "escape sequence is an invalid Unicode code point"))
    }

    fn raw_string(&mut self, offset: usize) -> Result<TokenKind, ParseError> {
        self.pos += 1;
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(self.error(offset, "unterminated raw string")),
                Some('`') => {
                    self.pos += 1;
                    return Ok(TokenKind::Str(out));
                }
                Some(c) => {
                    out.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    fn operator(&mut self, c: char, offset: usize) -> Result<TokenKind, ParseError> {
        let next = self.peek_at(1);
        let (kind, width) = match (c, next) {
            ('(', _) => (TokenKind::LParen, 1),
            (')', _) => (TokenKind::RParen, 1),
            ('{', _) => (TokenKind::LBrace, 1),
            ('}', _) => (TokenKind::RBrace, 1),
            ('[', _) => (TokenKind::LBracket, 1),
            (']', _) => (TokenKind::RBracket, 1),
            (',', _) => (TokenKind::Comma, 1),
            ('=', Some('=')) => (TokenKind::Eql, 2),
            ('=', Some('~')) => (TokenKind::RegexMatch, 2),
            ('=', _) => (TokenKind::Assign, 1),
            ('!', Some('=')) => (TokenKind::Neq, 2),
            ('!', Some('~')) => (TokenKind::RegexNoMatch, 2),
            ('<', Some('=')) => (TokenKind::Lte, 2),
            ('<', _) => (TokenKind::Lss, 1),
            ('>', Some('=')) => (TokenKind::Gte, 2),
            ('>', _) => (TokenKind::Gtr, 1),
            ('+', _) => (TokenKind::Add, 1),
            ('-', _) => (TokenKind::Sub, 1),
            ('*', _) => (TokenKind::Mul, 1),
            ('/', _) => (TokenKind::Div, 1),
            ('%', _) => (TokenKind::Mod, 1),
            ('^', _) => (TokenKind::Pow, 1),
            (other, _) => {
                return Err(self.error(offset, format!("unexpected character: {:?}", other)));
            }
        };
        self.pos += width;
        Ok(kind)
    }
}

/// Split `input` into tokens, always terminated by [`TokenKind::Eof`].
pub(crate) fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    Lexer {
        input,
        chars: input.char_indices().collect(),
        pos: 0,
    }
    .run()
}
