//! Type checking and conversion built-in functions.

use super::super::error::InterpreterError;
use super::{require_args, with_number, with_string};
use crate::convert::{is_integer_literal, is_real_literal};
use crate::value::Value;

/// Truncation toward zero.
pub fn builtin_to_integer(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "toInteger", line);
    with_number!(args, "toInteger", line, |n: f64| Ok(Value::integer(
        n.trunc()
    )))
}

pub fn builtin_to_real(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "toReal", line);
    with_number!(args, "toReal", line, |n: f64| Ok(Value::real(n)))
}

pub fn builtin_string_to_integer(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "stringToInteger", line);
    with_string!(args, "stringToInteger", line, |s: &str| {
        let trimmed = s.trim();
        if is_integer_literal(trimmed) {
            trimmed
                .parse::<f64>()
                .map(Value::integer)
                .map_err(|_| invalid_number("stringToInteger", s, line))
        } else {
            Err(invalid_number("stringToInteger", s, line))
        }
    })
}

pub fn builtin_string_to_real(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "stringToReal", line);
    with_string!(args, "stringToReal", line, |s: &str| {
        let trimmed = s.trim();
        if is_real_literal(trimmed) {
            trimmed
                .parse::<f64>()
                .map(Value::real)
                .map_err(|_| invalid_number("stringToReal", s, line))
        } else {
            Err(invalid_number("stringToReal", s, line))
        }
    })
}

fn invalid_number(name: &str, text: &str, line: usize) -> InterpreterError {
    InterpreterError::type_error(format!("{}: '{}' is not a valid number", name, text), line)
}

pub fn builtin_is_integer(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "isInteger", line);
    Ok(Value::Bool(match &args[0] {
        Value::String(s) => is_integer_literal(s.trim()),
        Value::Number(n, is_real) => !is_real || n.fract() == 0.0,
        _ => false,
    }))
}

pub fn builtin_is_real(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "isReal", line);
    Ok(Value::Bool(match &args[0] {
        Value::String(s) => is_real_literal(s.trim()),
        Value::Number(_, _) => true,
        _ => false,
    }))
}
