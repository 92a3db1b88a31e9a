//! Mathematical built-in functions.

use rand::Rng;

use super::super::error::InterpreterError;
use super::{require_args, with_number};
use crate::value::Value;

macro_rules! unary_real {
    ($name:ident, $op:ident) => {
        pub fn $name(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
            require_args!(args, 1, stringify!($op), line);
            with_number!(args, stringify!($op), line, |n: f64| Ok(Value::real(
                n.$op()
            )))
        }
    };
}

unary_real!(builtin_cos, cos);
unary_real!(builtin_sin, sin);
unary_real!(builtin_tan, tan);

pub fn builtin_sqrt(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "sqrt", line);
    with_number!(args, "sqrt", line, |n: f64| {
        if n < 0.0 {
            Err(InterpreterError::range(
                "sqrt of a negative number",
                line,
            ))
        } else {
            Ok(Value::real(n.sqrt()))
        }
    })
}

/// Rounds half away from zero (`2.5` -> `3`, `-2.5` -> `-3`) and yields an
/// Integer.
pub fn builtin_round(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "round", line);
    with_number!(args, "round", line, |n: f64| Ok(Value::integer(n.round())))
}

pub fn builtin_abs(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 1, "abs", line);
    match &args[0] {
        Value::Number(n, is_real) => Ok(Value::Number(n.abs(), *is_real)),
        other => Err(InterpreterError::type_error(
            format!("abs requires a number, got {}", other.type_name()),
            line,
        )),
    }
}

pub fn builtin_power(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 2, "power", line);
    match (&args[0], &args[1]) {
        (Value::Number(base, _), Value::Number(exp, _)) => Ok(Value::real(base.powf(*exp))),
        _ => Err(InterpreterError::type_error(
            "power requires two numbers",
            line,
        )),
    }
}

/// Uniform integer in `[min, max]`, both bounds inclusive.
pub fn builtin_random(args: &[Value], line: usize) -> Result<Value, InterpreterError> {
    require_args!(args, 2, "random", line);
    let (min, max) = match (&args[0], &args[1]) {
        (Value::Number(min, _), Value::Number(max, _))
            if min.fract() == 0.0 && max.fract() == 0.0 =>
        {
            (*min as i64, *max as i64)
        }
        _ => {
            return Err(InterpreterError::type_error(
                "random requires two integers",
                line,
            ));
        }
    };
    if min > max {
        return Err(InterpreterError::range(
            format!("random range is reversed: {} > {}", min, max),
            line,
        ));
    }
    let n = rand::thread_rng().gen_range(min..=max);
    Ok(Value::integer(n as f64))
}
