pub mod builtins;
pub mod control_flow;
pub mod debug;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod host;
pub mod parser;

pub use control_flow::ControlFlow;
pub use debug::{DebugSession, Machine, Step};
pub use environment::Environment;
pub use error::InterpreterError;
pub use evaluator::Interpreter;
pub use host::{Host, StdioHost};
pub use parser::TokenParser;

use crate::ast::Stmt;

/// Lex and parse a whole program.
pub fn parse_program(source: &str) -> Result<Vec<Stmt>, InterpreterError> {
    let tokens = crate::lexer::lex(source)?;
    TokenParser::new(tokens).parse()
}

/// Run a program to completion against the given host. Each run constructs a
/// fresh global environment; nothing is shared between calls.
pub fn interpret(source: &str, host: &mut dyn Host) -> Result<(), InterpreterError> {
    let program = parse_program(source)?;
    let mut machine = Machine::new(program, host)?;
    while machine.advance()?.is_some() {}
    Ok(())
}

/// Parse a program and return a stepping session for debugger drivers.
pub fn debug<'h>(
    source: &str,
    host: &'h mut dyn Host,
) -> Result<DebugSession<'h>, InterpreterError> {
    let program = parse_program(source)?;
    Ok(DebugSession::new(Machine::new(program, host)?))
}
