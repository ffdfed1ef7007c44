use std::fmt;
use crate::parse::BinaryOp;
use super::heap::{HeapRef, HeapValue};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Type {
    Bool,
    Char,
    Int,
    List,
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Type::Bool => "bool",
            Type::Char => "char",
            Type::Int => "int",
            Type::List => "list",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Bool(bool),
    Char(u8),
    Int(i32),
    List(Vec<HeapRef>),
}

impl HeapValue for Value {
    fn children(&self) -> &[HeapRef] {
        match self {
            Value::List(items) => items,
            _ => &[],
        }
    }
}

impl Value {
    pub fn ty(&self) -> Type {
        match self {
            Value::Bool(_) => Type::Bool,
            Value::Char(_) => Type::Char,
            Value::Int(_) => Type::Int,
            Value::List(_) => Type::List,
        }
    }

    /// Whether values of this type accept `op`. Identity comparison is accepted by every type.
    pub fn supports(&self, op: BinaryOp) -> bool {
        use BinaryOp::*;
        match (self, op) {
            (_, EqEq) => true,
            (Value::Bool(_), Eq | NotEq | And | Or) => true,
            (Value::Char(_), Eq | NotEq | Greater | Less | GreaterEq | LessEq) => true,
            (Value::Int(_), _) => !matches!(op, And | Or),
            (Value::List(_), Add | Eq | NotEq | Greater | Less | GreaterEq | LessEq) => true,
            _ => false,
        }
    }
}
