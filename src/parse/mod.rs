pub mod ast;
mod expr;

use tracing::debug;
use crate::{
    error::{Error, Thing},
    lex::{Lexer, Token, TokenKind},
    util::{Ident, SrcLoc},
};

pub use self::{
    ast::{BinaryOp, Block, Literal, Node},
    expr::parse_expr,
};

/// Recursive-descent parser over the statement structure. Expression runs are handed to
/// [`parse_expr`].
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(code: &'a str) -> Self {
        Self {
            lexer: Lexer::new(code),
            peeked: None,
        }
    }

    fn next(&mut self) -> Result<Token, Error> {
        match self.peeked.take() {
            Some(token) => Ok(token),
            None => self.lexer.get(),
        }
    }

    fn peek(&mut self) -> Result<&Token, Error> {
        let token = match self.peeked.take() {
            Some(token) => token,
            None => self.lexer.get()?,
        };
        Ok(self.peeked.insert(token))
    }

    /// Consume the next token, failing unless it is the symbol `text`.
    fn expect(&mut self, text: &str, ctx: Thing) -> Result<Token, Error> {
        let token = self.next()?;
        if token.is(text) {
            Ok(token)
        } else {
            Err(Error::unexpected(token.thing())
                .expected(Thing::token(text))
                .at(token.loc)
                .while_parsing(ctx))
        }
    }

    /// A statement ends at a newline. End of file and `}` also end it but are left for the
    /// enclosing block to consume.
    fn expect_end(&mut self, ctx: Thing) -> Result<(), Error> {
        let token = self.peek()?;
        if token.is("\n") {
            self.next()?;
            Ok(())
        } else if token.is_eof() || token.is("}") {
            Ok(())
        } else {
            Err(Error::unexpected(token.thing())
                .expected(Thing::Newline)
                .at(token.loc)
                .while_parsing(ctx))
        }
    }

    fn skip_newlines(&mut self) -> Result<(), Error> {
        while self.peek()?.is("\n") {
            self.next()?;
        }
        Ok(())
    }

    pub fn parse_program(&mut self) -> Result<Block, Error> {
        let block = self.parse_block(None)?;
        debug!(statements = block.nodes.len(), "parsed program");
        Ok(block)
    }

    /// Parse statements until end of file (`open` is `None`) or until the `}` matching the
    /// `{` at `open`.
    fn parse_block(&mut self, open: Option<SrcLoc>) -> Result<Block, Error> {
        let mut nodes = Vec::new();
        loop {
            let token = self.next()?;
            match token.kind {
                TokenKind::Eof => match open {
                    Some(loc) => return Err(Error::unclosed_delimiter('{')
                        .expected(Thing::token("}"))
                        .at(loc)
                        .while_parsing(Thing::Block)),
                    None => break,
                },
                TokenKind::Symbol => match token.text.as_str() {
                    "}" if open.is_some() => break,
                    "\n" => {},
                    "{" => {
                        let block = self.parse_block(Some(token.loc))?;
                        self.expect_end(Thing::Block)?;
                        nodes.push(Node::Block(block));
                    },
                    "print" => nodes.push(self.parse_print(false)?),
                    "println" => nodes.push(self.parse_print(true)?),
                    "while" => nodes.push(self.parse_while()?),
                    "if" => nodes.push(self.parse_if_else()?),
                    "break" => {
                        self.expect_end(Thing::Block)?;
                        nodes.push(Node::Break);
                    },
                    "}" | "else" => return Err(Error::unexpected(token.thing())
                        .at(token.loc)
                        .while_parsing(Thing::Block)),
                    _ => nodes.push(self.parse_line_expr(token)?),
                },
                TokenKind::Ident => if self.peek()?.is("=") {
                    nodes.push(self.parse_var_def(token)?);
                } else {
                    nodes.push(self.parse_line_expr(token)?);
                },
                _ => nodes.push(self.parse_line_expr(token)?),
            }
        }
        Ok(Block::new(nodes))
    }

    /// Collect tokens up to the end of the current line.
    fn read_line(&mut self) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        loop {
            let token = self.peek()?;
            if token.is("\n") || token.is("}") || token.is_eof() {
                return Ok(tokens);
            }
            tokens.push(self.next()?);
        }
    }

    /// Collect tokens up to the `)` that closes an already-consumed `(`.
    fn read_parenthesized(&mut self, ctx: Thing) -> Result<Vec<Token>, Error> {
        let mut tokens = Vec::new();
        let mut depth = 0usize;
        loop {
            let token = self.next()?;
            if token.is(")") {
                if depth == 0 {
                    return Ok(tokens);
                }
                depth -= 1;
            } else if token.is("(") {
                depth += 1;
            } else if token.is("\n") || token.is_eof() {
                return Err(Error::unexpected(token.thing())
                    .expected(Thing::token(")"))
                    .at(token.loc)
                    .while_parsing(ctx));
            }
            tokens.push(token);
        }
    }

    fn parse_line_expr(&mut self, first: Token) -> Result<Node, Error> {
        let loc = first.loc;
        let mut tokens = vec![first];
        tokens.extend(self.read_line()?);
        let expr = parse_expr(&tokens, loc).map_err(|e| e.while_parsing(Thing::Expr))?;
        self.expect_end(Thing::Expr)?;
        Ok(expr)
    }

    fn parse_var_def(&mut self, ident: Token) -> Result<Node, Error> {
        let eq = self.expect("=", Thing::VarDef)?;
        let tokens = self.read_line()?;
        let value = parse_expr(&tokens, eq.loc).map_err(|e| e.while_parsing(Thing::VarDef))?;
        self.expect_end(Thing::VarDef)?;
        Ok(Node::VariableDefinition {
            name: Ident::new(ident.text),
            value: Box::new(value),
        })
    }

    fn parse_print(&mut self, newline: bool) -> Result<Node, Error> {
        let open = self.expect("(", Thing::Print)?;
        let tokens = self.read_parenthesized(Thing::Print)?;
        let value = parse_expr(&tokens, open.loc).map_err(|e| e.while_parsing(Thing::Print))?;
        self.expect_end(Thing::Print)?;
        Ok(Node::Print {
            value: Box::new(value),
            newline,
        })
    }

    fn parse_condition(&mut self, ctx: Thing) -> Result<Node, Error> {
        let open = self.expect("(", ctx.clone())?;
        let tokens = self.read_parenthesized(ctx.clone())?;
        parse_expr(&tokens, open.loc).map_err(|e| e.while_parsing(ctx))
    }

    fn parse_braced_block(&mut self, ctx: Thing) -> Result<Block, Error> {
        let open = self.expect("{", ctx.clone())?;
        self.parse_block(Some(open.loc)).map_err(|e| e.while_parsing(ctx))
    }

    fn parse_while(&mut self) -> Result<Node, Error> {
        let condition = self.parse_condition(Thing::While)?;
        let body = self.parse_braced_block(Thing::While)?;
        self.expect_end(Thing::While)?;
        Ok(Node::While {
            condition: Box::new(condition),
            body,
        })
    }

    fn parse_if_else(&mut self) -> Result<Node, Error> {
        let condition = self.parse_condition(Thing::IfElse)?;
        let then_block = self.parse_braced_block(Thing::IfElse)?;
        self.skip_newlines()?;
        self.expect("else", Thing::IfElse)?;
        let else_block = self.parse_braced_block(Thing::IfElse)?;
        self.expect_end(Thing::IfElse)?;
        Ok(Node::IfElse {
            condition: Box::new(condition),
            then_block,
            else_block,
        })
    }
}

/// Parse a whole program into its root block.
pub fn parse(code: &str) -> Result<Block, Error> {
    Parser::new(code).parse_program()
}
