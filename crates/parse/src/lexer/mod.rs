//! Surface-syntax lexer.
//!
//! Turns the source text into a token stream. `#` starts a line comment.
//! Identifiers are letters and digits plus `$` (no underscores: an
//! underscore always introduces a wildcard suffix, as in `x_Integer`).

mod cursor;
use cursor::Cursor;

use crate::{
    ParseError,
    token::{Delimiter, Token, TokenKind},
};
use finch_interface::Symbol;
use num_bigint::BigInt;

/// Returns `true` if the given character is considered a whitespace.
#[inline]
pub const fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r')
}

/// Returns `true` if the given character is valid at the start of an
/// identifier.
#[inline]
pub const fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '$'
}

/// Returns `true` if the given character is valid in an identifier.
#[inline]
pub const fn is_id_continue(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

/// Tokenizes the whole input, appending a trailing [`TokenKind::Eof`].
pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { src, cursor: Cursor::new(src), tokens: Vec::new() };
    lexer.run()?;
    Ok(lexer.tokens)
}

struct Lexer<'a> {
    src: &'a str,
    cursor: Cursor<'a>,
    tokens: Vec<Token>,
}

impl Lexer<'_> {
    fn run(&mut self) -> Result<(), ParseError> {
        loop {
            self.skip_trivia();
            let lo = self.cursor.pos();
            let Some(c) = self.cursor.bump() else {
                self.push(TokenKind::Eof, lo);
                return Ok(());
            };
            let kind = match c {
                '(' => TokenKind::OpenDelim(Delimiter::Parenthesis),
                ')' => TokenKind::CloseDelim(Delimiter::Parenthesis),
                '[' => TokenKind::OpenDelim(Delimiter::Bracket),
                ']' => TokenKind::CloseDelim(Delimiter::Bracket),
                '{' => TokenKind::OpenDelim(Delimiter::Brace),
                '}' => TokenKind::CloseDelim(Delimiter::Brace),
                ',' => TokenKind::Comma,
                ';' => TokenKind::Semi,
                '+' => TokenKind::Plus,
                '-' => TokenKind::Minus,
                '*' => TokenKind::Star,
                '/' => TokenKind::Slash,
                '^' => TokenKind::Caret,
                '<' => self.either('=', TokenKind::Le, TokenKind::Lt),
                '>' => self.either('=', TokenKind::Ge, TokenKind::Gt),
                '!' => self.either('=', TokenKind::Ne, TokenKind::Not),
                '&' => self.either('&', TokenKind::AndAnd, TokenKind::Amp),
                '|' => {
                    if self.cursor.first() == '|' {
                        self.cursor.bump();
                        TokenKind::OrOr
                    } else {
                        return Err(self.error(lo, "unknown token `|`"));
                    }
                }
                '=' => self.lex_eq(),
                ':' => match self.cursor.first() {
                    '=' => {
                        self.cursor.bump();
                        TokenKind::ColonEq
                    }
                    '>' => {
                        self.cursor.bump();
                        TokenKind::ColonGt
                    }
                    _ => TokenKind::Colon,
                },
                '"' => self.lex_string(lo)?,
                '_' => self.lex_pattern(None, lo)?,
                c if c.is_ascii_digit() => self.lex_number(c, lo)?,
                c if is_id_start(c) => self.lex_ident(lo)?,
                c => return Err(self.error(lo, format!("unknown token `{c}`"))),
            };
            self.push(kind, lo);
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            self.cursor.eat_while(is_whitespace);
            if self.cursor.first() == '#' {
                self.cursor.eat_while(|c| c != '\n');
            } else {
                return;
            }
        }
    }

    fn either(&mut self, next: char, hit: TokenKind, miss: TokenKind) -> TokenKind {
        if self.cursor.first() == next {
            self.cursor.bump();
            hit
        } else {
            miss
        }
    }

    fn lex_eq(&mut self) -> TokenKind {
        match (self.cursor.first(), self.cursor.second()) {
            ('=', '=') => {
                self.cursor.bump();
                self.cursor.bump();
                TokenKind::TripleEq
            }
            ('=', _) => {
                self.cursor.bump();
                TokenKind::EqEq
            }
            ('!', '=') => {
                self.cursor.bump();
                self.cursor.bump();
                TokenKind::EqBangEq
            }
            ('.', _) => {
                self.cursor.bump();
                TokenKind::EqDot
            }
            _ => TokenKind::Eq,
        }
    }

    fn lex_string(&mut self, lo: usize) -> Result<TokenKind, ParseError> {
        let mut value = String::new();
        loop {
            let Some(c) = self.cursor.bump() else {
                return Err(self.incomplete(lo, "unterminated string literal"));
            };
            match c {
                '"' => return Ok(TokenKind::Str(value)),
                '\\' => {
                    let esc = self
                        .cursor
                        .bump()
                        .ok_or_else(|| self.incomplete(lo, "unterminated string literal"))?;
                    match esc {
                        'n' => value.push('\n'),
                        't' => value.push('\t'),
                        'r' => value.push('\r'),
                        '\\' => value.push('\\'),
                        '"' => value.push('"'),
                        'x' => {
                            let hi = self.hex_digit(lo)?;
                            let lo_digit = self.hex_digit(lo)?;
                            value.push((hi * 16 + lo_digit) as char);
                        }
                        other => {
                            return Err(
                                self.error(lo, format!("unknown escape sequence `\\{other}`"))
                            );
                        }
                    }
                }
                c => value.push(c),
            }
        }
    }

    fn hex_digit(&mut self, lo: usize) -> Result<u8, ParseError> {
        match self.cursor.bump().and_then(|c| c.to_digit(16)) {
            Some(d) => Ok(d as u8),
            None => Err(self.error(lo, "invalid `\\x` escape")),
        }
    }

    fn lex_number(&mut self, first: char, lo: usize) -> Result<TokenKind, ParseError> {
        if first == '0' && self.cursor.first() == 'x' {
            self.cursor.bump();
            let digits_lo = self.cursor.pos();
            self.cursor.eat_while(|c| c.is_ascii_hexdigit());
            let digits = &self.src[digits_lo..self.cursor.pos()];
            if digits.is_empty() {
                return Err(self.error(lo, "missing digits after `0x`"));
            }
            let value = BigInt::parse_bytes(digits.as_bytes(), 16)
                .ok_or_else(|| self.error(lo, "invalid hexadecimal literal"))?;
            return Ok(TokenKind::Int(value));
        }

        self.cursor.eat_while(|c| c.is_ascii_digit());
        let mut is_real = false;
        if self.cursor.first() == '.' && self.cursor.second() != '.' {
            is_real = true;
            self.cursor.bump();
            self.cursor.eat_while(|c| c.is_ascii_digit());
        }
        if matches!(self.cursor.first(), 'e' | 'E') {
            let digits_at = if matches!(self.cursor.second(), '+' | '-') { 2 } else { 1 };
            // Only consume the exponent if digits follow.
            if self.cursor.nth(digits_at).is_ascii_digit() {
                is_real = true;
                self.cursor.bump();
                if matches!(self.cursor.first(), '+' | '-') {
                    self.cursor.bump();
                }
                self.cursor.eat_while(|c| c.is_ascii_digit());
            }
        }
        let text = &self.src[lo..self.cursor.pos()];
        if is_real {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.error(lo, format!("invalid real literal `{text}`")))?;
            Ok(TokenKind::Real(value))
        } else {
            let value = text
                .parse::<BigInt>()
                .map_err(|_| self.error(lo, format!("invalid integer literal `{text}`")))?;
            Ok(TokenKind::Int(value))
        }
    }

    fn lex_ident(&mut self, lo: usize) -> Result<TokenKind, ParseError> {
        self.cursor.eat_while(is_id_continue);
        let name = Symbol::intern(&self.src[lo..self.cursor.pos()]);
        if self.cursor.first() == '_' {
            return self.lex_pattern(Some(name), lo);
        }
        Ok(TokenKind::Ident(name))
    }

    /// Lexes the wildcard suffix: one to three underscores plus an optional
    /// type head.
    fn lex_pattern(&mut self, name: Option<Symbol>, lo: usize) -> Result<TokenKind, ParseError> {
        let mut blanks = if name.is_some() { 0u8 } else { 1 };
        while self.cursor.first() == '_' {
            self.cursor.bump();
            blanks += 1;
            if blanks > 3 {
                return Err(self.error(lo, "too many `_` in a wildcard"));
            }
        }
        let ty = if is_id_start(self.cursor.first()) {
            let ty_lo = self.cursor.pos();
            self.cursor.bump();
            self.cursor.eat_while(is_id_continue);
            Some(Symbol::intern(&self.src[ty_lo..self.cursor.pos()]))
        } else {
            None
        };
        Ok(TokenKind::Pattern { name, blanks, ty })
    }

    fn push(&mut self, kind: TokenKind, lo: usize) {
        let hi = self.cursor.pos();
        self.tokens.push(Token::new(kind, lo as u32, hi as u32));
    }

    fn error(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError { message: message.into(), pos, incomplete: false }
    }

    fn incomplete(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError { message: message.into(), pos, incomplete: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        finch_interface::enter(|| {
            tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
        })
    }

    #[test]
    fn operators() {
        assert_eq!(
            kinds("== === =!= = =. := :> :"),
            vec![
                TokenKind::EqEq,
                TokenKind::TripleEq,
                TokenKind::EqBangEq,
                TokenKind::Eq,
                TokenKind::EqDot,
                TokenKind::ColonEq,
                TokenKind::ColonGt,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers() {
        assert_eq!(
            kinds("12 1.5 2e3 0x1f"),
            vec![
                TokenKind::Int(BigInt::from(12)),
                TokenKind::Real(1.5),
                TokenKind::Real(2000.0),
                TokenKind::Int(BigInt::from(31)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn patterns() {
        finch_interface::enter(|| {
            let toks = tokenize("x_Integer __ y___ _").unwrap();
            let x = Symbol::intern("x");
            let y = Symbol::intern("y");
            let int = Symbol::intern("Integer");
            assert_eq!(
                toks.into_iter().map(|t| t.kind).collect::<Vec<_>>(),
                vec![
                    TokenKind::Pattern { name: Some(x), blanks: 1, ty: Some(int) },
                    TokenKind::Pattern { name: None, blanks: 2, ty: None },
                    TokenKind::Pattern { name: Some(y), blanks: 3, ty: None },
                    TokenKind::Pattern { name: None, blanks: 1, ty: None },
                    TokenKind::Eof,
                ]
            );
        });
    }

    #[test]
    fn comments_and_strings() {
        assert_eq!(
            kinds("\"a\\nb\" # trailing comment\n1"),
            vec![
                TokenKind::Str("a\nb".into()),
                TokenKind::Int(BigInt::from(1)),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn unterminated_string_is_incomplete() {
        finch_interface::enter(|| {
            let err = tokenize("\"abc").unwrap_err();
            assert!(err.incomplete);
        });
    }

    #[test]
    fn slots() {
        finch_interface::enter(|| {
            let toks = tokenize("$1 $").unwrap();
            assert_eq!(toks[0].kind, TokenKind::Ident(Symbol::intern("$1")));
            assert_eq!(toks[1].kind, TokenKind::Ident(Symbol::intern("$")));
        });
    }
}
