mod scanner;

use std::fmt;
use tracing::trace;
use crate::{
    error::{Error, Thing},
    util::SrcLoc,
};

pub use self::scanner::{Character, Scanner};

const KEYWORDS: &[&str] = &[
    "if", "else", "while", "print", "println", "append", "len", "get", "set", "break",
];
const BOOLS: &[&str] = &["True", "False"];
const SCANS: &[&str] = &["scan_int", "scan_char", "scan_string"];

const THREE_CHAR_SYMBOLS: &[&[u8; 3]] = &[b"==="];
const TWO_CHAR_SYMBOLS: &[&[u8; 2]] = &[b"<=", b">=", b"==", b"&&", b"||", b"!="];
const ONE_CHAR_SYMBOLS: &[u8] = b"=+-*/%<>!(){},\n";

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Ident,
    Int,
    Char,
    Bool,
    Str,
    List,
    Scan,
    Symbol,
}

impl TokenKind {
    fn name(self) -> &'static str {
        match self {
            TokenKind::Eof => "EOF",
            TokenKind::Ident => "IDENTIFIER",
            TokenKind::Int => "INT",
            TokenKind::Char => "CHAR",
            TokenKind::Bool => "BOOL",
            TokenKind::Str => "STRING",
            TokenKind::List => "LIST",
            TokenKind::Scan => "SCAN",
            TokenKind::Symbol => "SYMBOL",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: SrcLoc,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, loc: SrcLoc) -> Self {
        Self {
            kind,
            text: text.into(),
            loc,
        }
    }

    /// Is this the symbol (or keyword) `text`?
    pub fn is(&self, text: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == text
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }

    /// What to call this token in a diagnostic.
    pub fn thing(&self) -> Thing {
        match self.kind {
            TokenKind::Eof => Thing::Eof,
            _ => Thing::token(self.text.clone()),
        }
    }

    fn ends_operand(&self) -> bool {
        match self.kind {
            TokenKind::Symbol => self.text == ")",
            TokenKind::Eof => false,
            _ => true,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = if self.text == "\n" { "NEWLINE" } else { self.text.as_str() };
        write!(f, "{:>4} {:>4} {:>12} {}", self.loc.line, self.loc.col, self.kind.name(), text)
    }
}

/// Pulls characters from a [`Scanner`] and groups them into tokens.
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    last_ends_operand: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            scanner: Scanner::new(code),
            last_ends_operand: false,
        }
    }

    fn peek(&self, steps: usize) -> Option<u8> {
        self.scanner.lookahead(steps).byte
    }

    fn skip_blanks(&mut self) {
        loop {
            match self.peek(0) {
                Some(b' ') | Some(b'\t') | Some(b'\r') => {
                    self.scanner.get();
                },
                Some(b'#') => while !matches!(self.peek(0), Some(b'\n') | None) {
                    self.scanner.get();
                },
                _ => break,
            }
        }
    }

    pub fn get(&mut self) -> Result<Token, Error> {
        let token = self.next_token()?;
        trace!(kind = token.kind.name(), text = %token.text.escape_debug(), "lexed token");
        self.last_ends_operand = token.ends_operand();
        Ok(token)
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        self.skip_blanks();

        let start = self.scanner.lookahead(0);
        let loc = start.loc;
        let c = match start.byte {
            Some(c) => c,
            None => return Ok(Token::new(TokenKind::Eof, "", loc)),
        };

        if c.is_ascii_alphabetic() || c == b'_' {
            let mut text = String::new();
            while let Some(c) = self.peek(0).filter(|c| c.is_ascii_alphanumeric() || *c == b'_') {
                text.push(c as char);
                self.scanner.get();
            }
            let kind = if KEYWORDS.contains(&text.as_str()) {
                TokenKind::Symbol
            } else if BOOLS.contains(&text.as_str()) {
                TokenKind::Bool
            } else if SCANS.contains(&text.as_str()) {
                TokenKind::Scan
            } else {
                TokenKind::Ident
            };
            return Ok(Token::new(kind, text, loc));
        }

        let negative_literal = c == b'-'
            && !self.last_ends_operand
            && self.peek(1).map_or(false, |c| c.is_ascii_digit());
        if c.is_ascii_digit() || negative_literal {
            let mut text = String::new();
            text.push(self.scanner.get().byte.map_or('-', |b| b as char));
            while let Some(c) = self.peek(0).filter(u8::is_ascii_digit) {
                text.push(c as char);
                self.scanner.get();
            }
            return Ok(Token::new(TokenKind::Int, text, loc));
        }

        if c == b'\'' {
            self.scanner.get();
            let inner = self.scanner.get();
            let close = self.scanner.get();
            return match inner.byte {
                Some(b) if b != b'\n' && close.is(b'\'') => {
                    Ok(Token::new(TokenKind::Char, (b as char).to_string(), loc))
                },
                _ => Err(Error::unterminated(Thing::CharLiteral).at(close.loc)),
            };
        }

        if c == b'"' {
            self.scanner.get();
            let mut bytes = Vec::new();
            loop {
                let c = self.scanner.get();
                match c.byte {
                    Some(b'"') => break,
                    Some(b'\n') | None => return Err(Error::unterminated(Thing::StringLiteral).at(c.loc)),
                    Some(b) => bytes.push(b),
                }
            }
            return Ok(Token::new(TokenKind::Str, String::from_utf8_lossy(&bytes), loc));
        }

        if c == b'[' && self.peek(1) == Some(b']') {
            self.scanner.get();
            self.scanner.get();
            return Ok(Token::new(TokenKind::List, "[]", loc));
        }

        let c3 = [c, self.peek(1).unwrap_or(0), self.peek(2).unwrap_or(0)];
        let len = if THREE_CHAR_SYMBOLS.iter().any(|s| **s == c3) {
            3
        } else if TWO_CHAR_SYMBOLS.iter().any(|s| s[..] == c3[..2]) {
            2
        } else if ONE_CHAR_SYMBOLS.contains(&c) {
            1
        } else {
            return Err(Error::unexpected_char(c as char).at(loc));
        };

        let text = (0..len)
            .filter_map(|_| self.scanner.get().byte)
            .map(char::from)
            .collect::<String>();
        Ok(Token::new(TokenKind::Symbol, text, loc))
    }
}

/// Lex an entire source string, up to and including the end-of-file token.
pub fn lex(code: &str) -> Result<Vec<Token>, Error> {
    let mut lexer = Lexer::new(code);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.get()?;
        let eof = token.is_eof();
        tokens.push(token);
        if eof {
            return Ok(tokens);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn kinds_and_text(code: &str) -> Vec<(TokenKind, String)> {
        lex(code)
            .unwrap()
            .into_iter()
            .map(|tok| (tok.kind, tok.text))
            .collect()
    }

    #[test]
    fn classifies_words() {
        let toks = kinds_and_text("while x True scan_int len foo_1");
        let kinds = toks.iter().map(|(k, _)| *k).collect::<Vec<_>>();
        assert_eq!(kinds, vec![
            TokenKind::Symbol,
            TokenKind::Ident,
            TokenKind::Bool,
            TokenKind::Scan,
            TokenKind::Symbol,
            TokenKind::Ident,
            TokenKind::Eof,
        ]);
        assert_eq!(toks[5].1, "foo_1");
    }

    #[test]
    fn longest_symbol_wins() {
        let texts = kinds_and_text("a === b == c = d != !e <= >")
            .into_iter()
            .filter(|(k, _)| *k == TokenKind::Symbol)
            .map(|(_, t)| t)
            .collect::<Vec<_>>();
        assert_eq!(texts, vec!["===", "==", "=", "!=", "!", "<=", ">"]);
    }

    #[test]
    fn literals() {
        let toks = kinds_and_text("'a' \"Dogs\" [] 42");
        assert_eq!(toks[0], (TokenKind::Char, "a".to_string()));
        assert_eq!(toks[1], (TokenKind::Str, "Dogs".to_string()));
        assert_eq!(toks[2], (TokenKind::List, "[]".to_string()));
        assert_eq!(toks[3], (TokenKind::Int, "42".to_string()));
    }

    #[test]
    fn minus_after_operand_is_subtraction() {
        let toks = kinds_and_text("x-1\ny = -1\n(2)-3");
        let ints = toks
            .iter()
            .filter(|(k, _)| *k == TokenKind::Int)
            .map(|(_, t)| t.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ints, vec!["1", "-1", "2", "3"]);
    }

    #[test]
    fn comments_and_newlines() {
        let toks = lex("x = 1 # the answer\n# whole line\ny").unwrap();
        let texts = toks.iter().map(|t| t.text.as_str()).collect::<Vec<_>>();
        assert_eq!(texts, vec!["x", "=", "1", "\n", "\n", "y", ""]);
        assert_eq!(toks[5].loc, SrcLoc::new(3, 1));
    }

    #[test]
    fn bad_input() {
        let err = lex("x = 'ab'").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Unterminated(Thing::CharLiteral));

        let err = lex("s = \"open\nx").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::Unterminated(Thing::StringLiteral));

        let err = lex("x = 1 @ 2").unwrap_err();
        assert_eq!(err.kind(), &ErrorKind::UnexpectedChar('@'));
        assert_eq!(err.loc(), Some(SrcLoc::new(1, 7)));
    }

    #[test]
    fn token_dump_format() {
        let toks = lex("x\n").unwrap();
        assert_eq!(toks[0].to_string(), "   1    1   IDENTIFIER x");
        assert_eq!(toks[1].to_string(), "   1    2       SYMBOL NEWLINE");
    }
}
