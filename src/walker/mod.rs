mod console;
mod env;
mod heap;
mod ops;
mod value;

use tracing::debug;
use crate::parse::{BinaryOp, Block, Literal, Node};

pub use self::{
    console::Console,
    env::{Environment, DEFAULT_HEAP_LIMIT},
    heap::{Heap, HeapRef, HeapValue, Stats},
    ops::{compare, equals, render, render_bytes},
    value::{Type, Value},
};

#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    #[error("undefined variable `{0}`")]
    UndefinedVariable(String),
    #[error("type mismatch: cannot apply `{op}` to {lhs} and {rhs}")]
    TypeMismatch {
        op: BinaryOp,
        lhs: Type,
        rhs: Type,
    },
    #[error("type mismatch in {context}: expected {expected}, found {found}")]
    WrongType {
        context: &'static str,
        expected: Type,
        found: Type,
    },
    #[error("operator `{op}` is not supported by {ty}")]
    UnsupportedOperator {
        op: BinaryOp,
        ty: Type,
    },
    #[error("division by zero")]
    DivisionByZero,
    #[error("modulo by zero")]
    ModuloByZero,
    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange {
        index: i32,
        len: usize,
    },
    #[error("out of memory: more than {limit} live values")]
    OutOfMemory {
        limit: usize,
    },
    #[error("`break` outside of a loop")]
    BreakOutsideLoop,
    #[error("`{0}` does not produce a value")]
    NoValue(&'static str),
    #[error("invalid input: expected {expected}, found `{found}`")]
    InvalidInput {
        expected: &'static str,
        found: String,
    },
    #[error("input exhausted")]
    InputExhausted,
    #[error("dangling heap reference")]
    DanglingRef,
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// How a statement finished.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Completed(Option<HeapRef>),
    Break,
}

fn describe(node: &Node) -> &'static str {
    match node {
        Node::Append { .. } => "append",
        Node::Set { .. } => "set",
        Node::VariableDefinition { .. } => "variable definition",
        Node::Print { .. } => "print",
        Node::While { .. } => "while",
        Node::IfElse { .. } => "if",
        _ => "statement",
    }
}

/// Tree-walking evaluator. Every value lives on the [`Environment`]'s heap; the machine only
/// holds handles, and roots any it needs to keep across an allocation.
pub struct AbstractMachine<'a> {
    env: &'a mut Environment,
    console: Console<'a>,
}

impl<'a> AbstractMachine<'a> {
    pub fn new(env: &'a mut Environment, console: Console<'a>) -> Self {
        Self { env, console }
    }

    fn alloc_literal(&mut self, literal: &Literal) -> Result<HeapRef, ExecError> {
        match literal {
            Literal::Bool(x) => self.env.alloc_bool(*x),
            Literal::Char(c) => self.env.alloc_char(*c),
            Literal::Int(x) => self.env.alloc_int(*x),
            Literal::List(elements) => {
                let depth = self.env.temp_depth();
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    let r = self.alloc_literal(element)?;
                    self.env.root(r);
                    items.push(r);
                }
                let list = self.env.alloc_list(items);
                self.env.unroot_to(depth);
                list
            },
        }
    }

    fn eval(&mut self, node: &Node) -> Result<HeapRef, ExecError> {
        match self.exec(node)? {
            Flow::Completed(Some(r)) => Ok(r),
            Flow::Completed(None) => Err(ExecError::NoValue(describe(node))),
            Flow::Break => Err(ExecError::BreakOutsideLoop),
        }
    }

    fn eval_bool(&mut self, node: &Node, context: &'static str) -> Result<bool, ExecError> {
        let r = self.eval(node)?;
        match self.env.get(r)? {
            Value::Bool(x) => Ok(*x),
            other => Err(ExecError::WrongType { context, expected: Type::Bool, found: other.ty() }),
        }
    }

    fn eval_int(&mut self, node: &Node, context: &'static str) -> Result<i32, ExecError> {
        let r = self.eval(node)?;
        match self.env.get(r)? {
            Value::Int(x) => Ok(*x),
            other => Err(ExecError::WrongType { context, expected: Type::Int, found: other.ty() }),
        }
    }

    fn eval_list(&mut self, node: &Node, context: &'static str) -> Result<HeapRef, ExecError> {
        let r = self.eval(node)?;
        match self.env.get(r)? {
            Value::List(_) => Ok(r),
            other => Err(ExecError::WrongType { context, expected: Type::List, found: other.ty() }),
        }
    }

    fn list_mut(&mut self, r: HeapRef) -> Result<&mut Vec<HeapRef>, ExecError> {
        match self.env.get_mut(r)? {
            Value::List(items) => Ok(items),
            other => Err(ExecError::WrongType {
                context: "list operation",
                expected: Type::List,
                found: other.ty(),
            }),
        }
    }

    fn index(&mut self, list: HeapRef, index: i32) -> Result<usize, ExecError> {
        let len = self.list_mut(list)?.len();
        usize::try_from(index)
            .ok()
            .filter(|i| *i < len)
            .ok_or(ExecError::IndexOutOfRange { index, len })
    }

    fn exec_block(&mut self, block: &Block) -> Result<Flow, ExecError> {
        let mut last = Flow::Completed(None);
        for node in &block.nodes {
            last = self.exec(node)?;
            if last == Flow::Break {
                break;
            }
        }
        Ok(last)
    }

    fn exec(&mut self, node: &Node) -> Result<Flow, ExecError> {
        let value = match node {
            Node::Block(block) => return self.exec_block(block),
            Node::VariableDefinition { name, value } => {
                let r = self.eval(value)?;
                self.env.set_variable(*name, r);
                return Ok(Flow::Completed(None));
            },
            Node::Print { value, newline } => {
                let r = self.eval(value)?;
                let text = render_bytes(self.env, r)?;
                self.console.print(&text, *newline)?;
                return Ok(Flow::Completed(None));
            },
            Node::While { condition, body } => {
                while self.eval_bool(condition, "while condition")? {
                    if self.exec_block(body)? == Flow::Break {
                        break;
                    }
                }
                return Ok(Flow::Completed(None));
            },
            Node::IfElse { condition, then_block, else_block } => {
                let branch = if self.eval_bool(condition, "if condition")? {
                    then_block
                } else {
                    else_block
                };
                return match self.exec_block(branch)? {
                    Flow::Break => Ok(Flow::Break),
                    Flow::Completed(_) => Ok(Flow::Completed(None)),
                };
            },
            Node::Break => return Ok(Flow::Break),
            Node::Append { list, value } => {
                let depth = self.env.temp_depth();
                let list = self.eval_list(list, "append")?;
                self.env.root(list);
                let value = self.eval(value)?;
                self.list_mut(list)?.push(value);
                self.env.unroot_to(depth);
                return Ok(Flow::Completed(None));
            },
            Node::Set { list, index, value } => {
                let depth = self.env.temp_depth();
                let list = self.eval_list(list, "set")?;
                self.env.root(list);
                let index = self.eval_int(index, "set index")?;
                let value = self.eval(value)?;
                let i = self.index(list, index)?;
                self.list_mut(list)?[i] = value;
                self.env.unroot_to(depth);
                return Ok(Flow::Completed(None));
            },

            Node::VariableReference(name) => self.env.get_variable(*name)?,
            Node::Constant(literal) => self.alloc_literal(literal)?,
            Node::BinaryOperator { op, lhs, rhs } => {
                let depth = self.env.temp_depth();
                let lhs = self.eval(lhs)?;
                self.env.root(lhs);
                let rhs = self.eval(rhs)?;
                self.env.root(rhs);
                let result = ops::apply(self.env, *op, lhs, rhs)?;
                self.env.unroot_to(depth);
                result
            },
            Node::NotOperator(operand) => {
                let x = self.eval_bool(operand, "`!`")?;
                self.env.alloc_bool(!x)?
            },
            Node::ScanInt => {
                let word = self.console.read_word()?;
                let text = String::from_utf8_lossy(&word);
                let x = text.parse::<i32>().map_err(|_| ExecError::InvalidInput {
                    expected: "int",
                    found: text.to_string(),
                })?;
                self.env.alloc_int(x)?
            },
            Node::ScanChar => {
                let c = self.console.read_char()?;
                self.env.alloc_char(c)?
            },
            Node::ScanString => {
                let word = self.console.read_word()?;
                self.alloc_literal(&Literal::List(word.into_iter().map(Literal::Char).collect()))?
            },
            Node::Len(list) => {
                let list = self.eval_list(list, "len")?;
                let len = self.list_mut(list)?.len();
                self.env.alloc_int(len as i32)?
            },
            Node::Get { list, index } => {
                let depth = self.env.temp_depth();
                let list = self.eval_list(list, "get")?;
                self.env.root(list);
                let index = self.eval_int(index, "get index")?;
                let i = self.index(list, index)?;
                let element = self.list_mut(list)?[i];
                self.env.unroot_to(depth);
                element
            },
        };
        Ok(Flow::Completed(Some(value)))
    }

    /// Run a whole program. The result is the value of its last statement, if it has one.
    pub fn execute(mut self, program: &Block) -> Result<Option<HeapRef>, ExecError> {
        let flow = self.exec_block(program);
        self.console.flush()?;
        let value = match flow? {
            Flow::Completed(value) => value,
            Flow::Break => return Err(ExecError::BreakOutsideLoop),
        };
        debug!(live = self.env.stats().live_values, "program finished");
        Ok(value)
    }
}
