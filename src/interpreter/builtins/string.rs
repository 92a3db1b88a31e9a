//! String built-in functions.

use super::super::error::InterpreterError;
use super::{require_args, with_number, with_string};
use crate::convert::format_currency;
use crate::value::Value;

/// String length in characters.
pub fn builtin_length(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "length", line);
    with_string!(args, "length", line, |s: &str| Ok(Value::integer(
        s.chars().count() as f64
    )))
}

pub fn builtin_to_upper(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "toUpper", line);
    with_string!(args, "toUpper", line, |s: &str| Ok(Value::string(
        s.to_uppercase()
    )))
}

pub fn builtin_to_lower(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "toLower", line);
    with_string!(args, "toLower", line, |s: &str| Ok(Value::string(
        s.to_lowercase()
    )))
}

pub fn builtin_append(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 2, "append", line);
    match (&args[0], &args[1]) {
        (Value::String(a), Value::String(b)) => Ok(Value::string(format!("{}{}", a, b))),
        _ => Err(InterpreterError::type_error(
            "append requires two strings",
            line,
        )),
    }
}

pub fn builtin_contains(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 2, "contains", line);
    match (&args[0], &args[1]) {
        (Value::String(s), Value::String(needle)) => {
            Ok(Value::Bool(s.contains(needle.as_ref())))
        }
        _ => Err(InterpreterError::type_error(
            "contains requires two strings",
            line,
        )),
    }
}

/// `substring(s, start)` takes the tail from `start`; `substring(s, start,
/// end)` takes `[start, end)`. Indices are character positions; `end` is
/// clamped to the length, `start > end` is an error.
pub fn builtin_substring(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    if args.len() != 2 && args.len() != 3 {
        return Err(InterpreterError::semantic(
            format!("substring expects 2 or 3 argument(s), got {}", args.len()),
            line,
        ));
    }

    let s = match &args[0] {
        Value::String(s) => s.as_ref(),
        other => {
            return Err(InterpreterError::type_error(
                format!("substring requires a string, got {}", other.type_name()),
                line,
            ));
        }
    };

    let index_at = |arg: &Value| -> Result<usize, InterpreterError> {
        match arg {
            Value::Number(n, _) if n.fract() == 0.0 && *n >= 0.0 => Ok(*n as usize),
            _ => Err(InterpreterError::type_error(
                "substring indices must be non-negative integers",
                line,
            )),
        }
    };

    let len = s.chars().count();
    let start = index_at(&args[1])?;
    let end = match args.get(2) {
        Some(arg) => index_at(arg)?.min(len),
        None => len,
    };
    if start > end {
        return Err(InterpreterError::range(
            format!("substring start {} is past end {}", start, end),
            line,
        ));
    }

    let taken: String = s.chars().skip(start).take(end - start).collect();
    Ok(Value::string(taken))
}

/// USD rendering: `currencyFormat(1234.5)` -> `"$1,234.50"`.
pub fn builtin_currency_format(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "currencyFormat", line);
    with_number!(args, "currencyFormat", line, |n: f64| Ok(Value::string(
        format_currency(n)
    )))
}
