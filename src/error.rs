use std::fmt;
use crate::util::SrcLoc;

/// Something the parser can find, expect, or be in the middle of parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Thing {
    Token(String),
    Newline,
    Eof,
    Expr,
    Block,
    Print,
    While,
    IfElse,
    VarDef,
    CharLiteral,
    StringLiteral,
}

impl Thing {
    pub fn token(text: impl Into<String>) -> Self {
        match text.into() {
            text if text == "\n" => Thing::Newline,
            text => Thing::Token(text),
        }
    }
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Thing::Token(text) => write!(f, "`{}`", text),
            Thing::Newline => write!(f, "newline"),
            Thing::Eof => write!(f, "end of file"),
            Thing::Expr => write!(f, "expression"),
            Thing::Block => write!(f, "block"),
            Thing::Print => write!(f, "print statement"),
            Thing::While => write!(f, "while loop"),
            Thing::IfElse => write!(f, "if statement"),
            Thing::VarDef => write!(f, "variable definition"),
            Thing::CharLiteral => write!(f, "character literal"),
            Thing::StringLiteral => write!(f, "string literal"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ErrorKind {
    #[error("unexpected character {0:?}")]
    UnexpectedChar(char),
    #[error("unterminated {0}")]
    Unterminated(Thing),
    #[error("unclosed delimiter `{0}`")]
    UnclosedDelimiter(char),
    #[error("unbalanced parenthesis")]
    UnbalancedParen,
    #[error("not enough operands for `{0}`")]
    MissingOperand(String),
    #[error("invalid expression")]
    InvalidExpression,
    #[error("`{name}` takes {expected} argument(s), found {found}")]
    WrongArgCount {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("integer literal `{0}` does not fit in 32 bits")]
    IntOutOfRange(String),
    #[error("unexpected {0}")]
    Unexpected(Thing),
}

/// A parse-time failure. Parsing aborts on the first one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    loc: Option<SrcLoc>,
    while_parsing: Vec<Thing>,
    expected: Vec<Thing>,
}

impl Error {
    pub fn unexpected_char(c: char) -> Self {
        Self::from(ErrorKind::UnexpectedChar(c))
    }

    pub fn unterminated(thing: Thing) -> Self {
        Self::from(ErrorKind::Unterminated(thing))
    }

    pub fn unclosed_delimiter(c: char) -> Self {
        Self::from(ErrorKind::UnclosedDelimiter(c))
    }

    pub fn unbalanced_paren() -> Self {
        Self::from(ErrorKind::UnbalancedParen)
    }

    pub fn missing_operand(op: impl Into<String>) -> Self {
        Self::from(ErrorKind::MissingOperand(op.into()))
    }

    pub fn invalid_expression() -> Self {
        Self::from(ErrorKind::InvalidExpression)
    }

    pub fn wrong_arg_count(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::from(ErrorKind::WrongArgCount {
            name: name.into(),
            expected,
            found,
        })
    }

    pub fn int_out_of_range(text: impl Into<String>) -> Self {
        Self::from(ErrorKind::IntOutOfRange(text.into()))
    }

    pub fn unexpected(thing: impl Into<Thing>) -> Self {
        Self::from(ErrorKind::Unexpected(thing.into()))
    }

    pub fn at(mut self, loc: impl Into<Option<SrcLoc>>) -> Self {
        self.loc = loc.into();
        self
    }

    pub fn while_parsing(mut self, thing: impl Into<Thing>) -> Self {
        self.while_parsing.push(thing.into());
        self
    }

    pub fn expected(mut self, thing: impl Into<Thing>) -> Self {
        let thing = thing.into();
        if !self.expected.contains(&thing) {
            self.expected.push(thing);
        }
        self
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn loc(&self) -> Option<SrcLoc> {
        self.loc
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self {
            kind,
            loc: None,
            while_parsing: Vec::new(),
            expected: Vec::new(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "parse error")?;
        if let Some(loc) = self.loc {
            write!(f, " at {}", loc)?;
        }
        write!(f, ": {}", self.kind)?;
        for (i, thing) in self.expected.iter().enumerate() {
            write!(f, "{}{}", if i == 0 { ", expecting " } else { " or " }, thing)?;
        }
        if let Some(thing) = self.while_parsing.first() {
            write!(f, " (while parsing {})", thing)?;
        }
        Ok(())
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_found_and_expected() {
        let err = Error::unexpected(Thing::token(")"))
            .expected(Thing::token("{"))
            .at(SrcLoc::new(3, 7))
            .while_parsing(Thing::While);
        assert_eq!(
            err.to_string(),
            "parse error at line 3, col 7: unexpected `)`, expecting `{` (while parsing while loop)",
        );
    }

    #[test]
    fn newline_token_is_named() {
        assert_eq!(Thing::token("\n"), Thing::Newline);
        let err = Error::unexpected(Thing::Eof).expected(Thing::Newline).expected(Thing::Newline);
        assert_eq!(err.to_string(), "parse error: unexpected end of file, expecting newline");
    }
}
