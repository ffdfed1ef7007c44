pub mod error;
pub mod lex;
pub mod parse;
pub mod util;
pub mod walker;

use std::io::{BufRead, Write};
use self::{
    parse::Block,
    walker::{AbstractMachine, Console, Environment, ExecError},
};

pub use self::parse::parse;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Parse(#[from] error::Error),
    #[error("runtime error: {0}")]
    Exec(#[from] ExecError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Live heap values allowed before allocation fails, after a collection has been tried.
    pub heap_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heap_limit: walker::DEFAULT_HEAP_LIMIT,
        }
    }
}

/// Runs programs against one long-lived [`Environment`], so bindings made by one call to
/// [`Engine::execute`] are visible to the next.
pub struct Engine {
    env: Environment,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Self {
            env: Environment::new(config.heap_limit),
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Parse and run `code`, returning the printed form of its final value, if any.
    pub fn execute(
        &mut self,
        code: &str,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<Option<String>, Error> {
        let program = parse(code)?;
        self.run(&program, input, output)
    }

    pub fn run(
        &mut self,
        program: &Block,
        input: &mut dyn BufRead,
        output: &mut dyn Write,
    ) -> Result<Option<String>, Error> {
        self.env.clear_temps();
        let result = AbstractMachine::new(&mut self.env, Console::new(input, output))
            .execute(program);
        self.env.clear_temps();

        match result? {
            Some(value) => Ok(Some(walker::render(&self.env, value)?)),
            None => Ok(None),
        }
    }
}

/// One-shot convenience: run `code` in a fresh engine.
pub fn run(
    code: &str,
    input: &mut dyn BufRead,
    output: &mut dyn Write,
    config: Config,
) -> Result<Option<String>, Error> {
    Engine::new(config).execute(code, input, output)
}
