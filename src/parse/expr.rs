//! Operator-precedence parsing of a single expression.
//!
//! The statement parser hands over a flat run of tokens; this module turns it into one tree
//! using two stacks: `output` holds finished nodes and `operators` holds operators that are
//! still waiting for their right-hand side.

use crate::{
    error::{Error, Thing},
    lex::{Token, TokenKind},
    util::{Ident, SrcLoc},
};
use super::ast::{BinaryOp, Literal, Node};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Builtin {
    Len,
    Append,
    Get,
    Set,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Operator {
    LParen,
    Not,
    Binary(BinaryOp),
    Builtin(Builtin),
}

impl Builtin {
    fn arity(self) -> usize {
        match self {
            Builtin::Len => 1,
            Builtin::Append | Builtin::Get => 2,
            Builtin::Set => 3,
        }
    }
}

impl Operator {
    fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "(" => Operator::LParen,
            "!" => Operator::Not,
            "len" => Operator::Builtin(Builtin::Len),
            "append" => Operator::Builtin(Builtin::Append),
            "get" => Operator::Builtin(Builtin::Get),
            "set" => Operator::Builtin(Builtin::Set),
            s => Operator::Binary(BinaryOp::from_symbol(s)?),
        })
    }

    fn priority(self) -> u8 {
        match self {
            Operator::LParen => 0,
            Operator::Binary(op) => match op {
                BinaryOp::Or => 4,
                BinaryOp::And => 5,
                BinaryOp::Eq | BinaryOp::NotEq | BinaryOp::EqEq => 6,
                BinaryOp::Greater | BinaryOp::Less | BinaryOp::GreaterEq | BinaryOp::LessEq => 7,
                BinaryOp::Add | BinaryOp::Sub => 8,
                BinaryOp::Mul | BinaryOp::Div | BinaryOp::Rem => 9,
            },
            Operator::Not => 10,
            Operator::Builtin(_) => 12,
        }
    }

    /// `(` and prefix operators have no left operand, so pushing one never completes anything
    /// already on the stack.
    fn is_prefix(self) -> bool {
        matches!(self, Operator::LParen | Operator::Not | Operator::Builtin(_))
    }

    fn symbol(self) -> &'static str {
        match self {
            Operator::LParen => "(",
            Operator::Not => "!",
            Operator::Binary(op) => op.as_str(),
            Operator::Builtin(Builtin::Len) => "len",
            Operator::Builtin(Builtin::Append) => "append",
            Operator::Builtin(Builtin::Get) => "get",
            Operator::Builtin(Builtin::Set) => "set",
        }
    }
}

struct Pending {
    op: Operator,
    loc: SrcLoc,
    /// Commas seen so far directly inside this `(`.
    commas: usize,
}

/// Called when the `(` at `loc` closes. If it follows a builtin it holds that builtin's
/// arguments; otherwise it only groups, and must hold a single expression.
fn check_args(callee: Option<&Pending>, commas: usize, loc: SrcLoc) -> Result<(), Error> {
    let found = commas + 1;
    match callee.map(|pending| pending.op) {
        Some(op @ Operator::Builtin(builtin)) if builtin.arity() != found => {
            Err(Error::wrong_arg_count(op.symbol(), builtin.arity(), found).at(loc))
        },
        Some(Operator::Builtin(_)) => Ok(()),
        _ if commas > 0 => Err(Error::unexpected(Thing::token(","))
            .at(loc)
            .while_parsing(Thing::Expr)),
        _ => Ok(()),
    }
}

fn take<const N: usize>(output: &mut Vec<Node>, pending: &Pending) -> Result<[Node; N], Error> {
    let missing = || Error::missing_operand(pending.op.symbol()).at(pending.loc);
    if output.len() < N {
        return Err(missing());
    }
    let args = output.split_off(output.len() - N);
    <[Node; N]>::try_from(args).map_err(|_| missing())
}

fn reduce(pending: Pending, output: &mut Vec<Node>) -> Result<(), Error> {
    let node = match pending.op {
        Operator::LParen => return Err(Error::unbalanced_paren().at(pending.loc)),
        Operator::Not => {
            let [a] = take::<1>(output, &pending)?;
            Node::NotOperator(Box::new(a))
        },
        Operator::Binary(op) => {
            let [a, b] = take::<2>(output, &pending)?;
            Node::binary(op, a, b)
        },
        Operator::Builtin(Builtin::Len) => {
            let [list] = take::<1>(output, &pending)?;
            Node::Len(Box::new(list))
        },
        Operator::Builtin(Builtin::Append) => {
            let [list, value] = take::<2>(output, &pending)?;
            Node::Append { list: Box::new(list), value: Box::new(value) }
        },
        Operator::Builtin(Builtin::Get) => {
            let [list, index] = take::<2>(output, &pending)?;
            Node::Get { list: Box::new(list), index: Box::new(index) }
        },
        Operator::Builtin(Builtin::Set) => {
            let [list, index, value] = take::<3>(output, &pending)?;
            Node::Set { list: Box::new(list), index: Box::new(index), value: Box::new(value) }
        },
    };
    output.push(node);
    Ok(())
}

fn leaf(token: &Token) -> Result<Node, Error> {
    Ok(match token.kind {
        TokenKind::Int => Node::Constant(Literal::Int(token.text
            .parse()
            .map_err(|_| Error::int_out_of_range(token.text.clone()).at(token.loc))?)),
        TokenKind::Char => match token.text.bytes().next() {
            Some(c) => Node::Constant(Literal::Char(c)),
            None => return Err(Error::unterminated(Thing::CharLiteral).at(token.loc)),
        },
        TokenKind::Bool => Node::Constant(Literal::Bool(token.text == "True")),
        TokenKind::Str => Node::Constant(Literal::string(&token.text)),
        TokenKind::List => Node::Constant(Literal::List(Vec::new())),
        TokenKind::Scan => match token.text.as_str() {
            "scan_int" => Node::ScanInt,
            "scan_char" => Node::ScanChar,
            _ => Node::ScanString,
        },
        TokenKind::Ident => Node::VariableReference(Ident::new(token.text.clone())),
        TokenKind::Symbol | TokenKind::Eof => return Err(Error::unexpected(token.thing())
            .at(token.loc)
            .while_parsing(Thing::Expr)),
    })
}

/// Parse exactly one expression out of `tokens`. `loc` is reported if the tokens do not form
/// a single expression.
pub fn parse_expr(tokens: &[Token], loc: SrcLoc) -> Result<Node, Error> {
    let mut output = Vec::new();
    let mut operators: Vec<Pending> = Vec::new();

    for token in tokens {
        if token.kind != TokenKind::Symbol {
            output.push(leaf(token)?);
            continue;
        }

        match token.text.as_str() {
            ")" => loop {
                match operators.pop() {
                    Some(Pending { op: Operator::LParen, loc, commas }) => {
                        check_args(operators.last(), commas, loc)?;
                        break;
                    },
                    Some(pending) => reduce(pending, &mut output)?,
                    None => return Err(Error::unbalanced_paren().at(token.loc)),
                }
            },
            "," => loop {
                match operators.pop() {
                    Some(mut pending) if pending.op == Operator::LParen => {
                        pending.commas += 1;
                        operators.push(pending);
                        break;
                    },
                    Some(pending) => reduce(pending, &mut output)?,
                    None => return Err(Error::unexpected(token.thing())
                        .at(token.loc)
                        .while_parsing(Thing::Expr)),
                }
            },
            text => {
                let op = Operator::from_symbol(text)
                    .ok_or_else(|| Error::unexpected(token.thing())
                        .at(token.loc)
                        .while_parsing(Thing::Expr))?;

                if !op.is_prefix() {
                    while operators
                        .last()
                        .map_or(false, |top| top.op.priority() >= op.priority())
                    {
                        if let Some(pending) = operators.pop() {
                            reduce(pending, &mut output)?;
                        }
                    }
                }

                operators.push(Pending { op, loc: token.loc, commas: 0 });
            },
        }
    }

    while let Some(pending) = operators.pop() {
        reduce(pending, &mut output)?;
    }

    match (output.pop(), output.is_empty()) {
        (Some(node), true) => Ok(node),
        _ => Err(Error::invalid_expression().at(loc)),
    }
}
