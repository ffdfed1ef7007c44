use std::fmt;
use crate::util::Ident;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,

    Eq,
    NotEq,
    /// Same heap identity (`===`).
    EqEq,

    Greater,
    Less,
    GreaterEq,
    LessEq,

    And,
    Or,
}

impl BinaryOp {
    pub fn from_symbol(s: &str) -> Option<Self> {
        Some(match s {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "/" => BinaryOp::Div,
            "%" => BinaryOp::Rem,
            "==" => BinaryOp::Eq,
            "!=" => BinaryOp::NotEq,
            "===" => BinaryOp::EqEq,
            ">" => BinaryOp::Greater,
            "<" => BinaryOp::Less,
            ">=" => BinaryOp::GreaterEq,
            "<=" => BinaryOp::LessEq,
            "&&" => BinaryOp::And,
            "||" => BinaryOp::Or,
            _ => return None,
        })
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::EqEq => "===",
            BinaryOp::Greater => ">",
            BinaryOp::Less => "<",
            BinaryOp::GreaterEq => ">=",
            BinaryOp::LessEq => "<=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A literal as written in the source. Evaluating a [`Node::Constant`] copies it into the heap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Bool(bool),
    Char(u8),
    Int(i32),
    List(Vec<Literal>),
}

impl Literal {
    pub fn string(s: &str) -> Self {
        Literal::List(s.bytes().map(Literal::Char).collect())
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub nodes: Vec<Node>,
}

impl Block {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Block(Block),
    VariableDefinition {
        name: Ident,
        value: Box<Node>,
    },
    VariableReference(Ident),
    Print {
        value: Box<Node>,
        newline: bool,
    },
    BinaryOperator {
        op: BinaryOp,
        lhs: Box<Node>,
        rhs: Box<Node>,
    },
    NotOperator(Box<Node>),
    Constant(Literal),
    While {
        condition: Box<Node>,
        body: Block,
    },
    IfElse {
        condition: Box<Node>,
        then_block: Block,
        else_block: Block,
    },
    ScanInt,
    ScanChar,
    ScanString,
    Break,
    Len(Box<Node>),
    Append {
        list: Box<Node>,
        value: Box<Node>,
    },
    Get {
        list: Box<Node>,
        index: Box<Node>,
    },
    Set {
        list: Box<Node>,
        index: Box<Node>,
        value: Box<Node>,
    },
}

impl Node {
    pub fn binary(op: BinaryOp, lhs: Node, rhs: Node) -> Self {
        Node::BinaryOperator {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn var(name: &str) -> Self {
        Node::VariableReference(Ident::new(name.to_string()))
    }
}
