//! Built-in functions of the pseudocode language.
//!
//! Categories follow the library reference:
//! - **Math**: `sqrt`, `round`, `abs`, `cos`, `sin`, `tan`, `power`, `random`
//! - **String**: `length`, `toUpper`, `toLower`, `append`, `contains`,
//!   `substring`, `currencyFormat`
//! - **Type**: `toInteger`, `toReal`, `stringToInteger`, `stringToReal`,
//!   `isInteger`, `isReal`
//!
//! Names are matched case-insensitively and shadow user-declared functions.

mod math;
mod string;
mod types;

pub use math::*;
pub use string::*;
pub use types::*;

#[allow(unused_imports)]
use crate::interpreter::error::InterpreterError;
#[allow(unused_imports)]
use crate::value::Value;

macro_rules! require_args {
    ($args:expr, $n:expr, $name:expr, $line:expr) => {
        if $args.len() != $n {
            return Err(InterpreterError::semantic(
                format!("{} expects {} argument(s), got {}", $name, $n, $args.len()),
                $line,
            ));
        }
    };
}

macro_rules! with_number {
    ($args:expr, $name:expr, $line:expr, $body:expr) => {
        match &$args[0] {
            Value::Number(n, _) => $body(*n),
            other => Err(InterpreterError::type_error(
                format!("{} requires a number, got {}", $name, other.type_name()),
                $line,
            )),
        }
    };
}

macro_rules! with_string {
    ($args:expr, $name:expr, $line:expr, $body:expr) => {
        match &$args[0] {
            Value::String(s) => $body(s.as_ref()),
            other => Err(InterpreterError::type_error(
                format!("{} requires a string, got {}", $name, other.type_name()),
                $line,
            )),
        }
    };
}

pub(crate) use require_args;
pub(crate) use with_number;
pub(crate) use with_string;

pub fn is_builtin(folded: &str) -> bool {
    matches!(
        folded,
        "sqrt"
            | "round"
            | "abs"
            | "cos"
            | "sin"
            | "tan"
            | "power"
            | "random"
            | "length"
            | "toupper"
            | "tolower"
            | "append"
            | "contains"
            | "substring"
            | "currencyformat"
            | "tointeger"
            | "toreal"
            | "stringtointeger"
            | "stringtoreal"
            | "isinteger"
            | "isreal"
    )
}

/// Dispatch a call by case-folded name. `None` means the name is not a
/// builtin and should be resolved as a user function.
pub fn dispatch(
    folded: &str,
    args: &[Value],
    line: usize,
) -> Option<Result<Value, InterpreterError>> {
    Some(match folded {
        "sqrt" => builtin_sqrt(args, line),
        "round" => builtin_round(args, line),
        "abs" => builtin_abs(args, line),
        "cos" => builtin_cos(args, line),
        "sin" => builtin_sin(args, line),
        "tan" => builtin_tan(args, line),
        "power" => builtin_power(args, line),
        "random" => builtin_random(args, line),
        "length" => builtin_length(args, line),
        "toupper" => builtin_to_upper(args, line),
        "tolower" => builtin_to_lower(args, line),
        "append" => builtin_append(args, line),
        "contains" => builtin_contains(args, line),
        "substring" => builtin_substring(args, line),
        "currencyformat" => builtin_currency_format(args, line),
        "tointeger" => builtin_to_integer(args, line),
        "toreal" => builtin_to_real(args, line),
        "stringtointeger" => builtin_string_to_integer(args, line),
        "stringtoreal" => builtin_string_to_real(args, line),
        "isinteger" => builtin_is_integer(args, line),
        "isreal" => builtin_is_real(args, line),
        _ => return None,
    })
}
