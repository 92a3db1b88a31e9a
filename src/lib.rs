pub mod ast;
pub mod cli;
pub mod config;
pub mod convert;
pub mod diagnostic;
pub mod flowchart;
pub mod format;
pub mod interpreter;
pub mod lexer;
pub mod token;
pub mod value;

// Re-export commonly used types for convenience
pub use ast::{Expr, ExprKind, Stmt, StmtKind};
pub use flowchart::{generate_flowchart, Flowchart};
pub use format::format_source;
pub use interpreter::{
    debug, interpret, parse_program, DebugSession, Host, InterpreterError, StdioHost, Step,
};
pub use token::{Token, TokenKind};
pub use value::Value;
