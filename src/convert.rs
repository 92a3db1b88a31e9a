//! Textual conversions: validation of user input against declared types and
//! currency rendering for the `currencyFormat` builtin.

use crate::ast::DataType;
use crate::value::Value;

/// `^-?\d+$`
pub fn is_integer_literal(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

/// `^-?\d+(\.\d+)?$`
pub fn is_real_literal(s: &str) -> bool {
    let body = s.strip_prefix('-').unwrap_or(s);
    match body.split_once('.') {
        None => !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit()),
        Some((whole, frac)) => {
            !whole.is_empty()
                && !frac.is_empty()
                && whole.bytes().all(|b| b.is_ascii_digit())
                && frac.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

/// Validate one line of user input against a declared type. `None` means the
/// text does not satisfy the type and the caller should reprompt. String
/// targets accept anything, whitespace preserved; `Auto` targets take the
/// narrowest numeric reading, falling back to String.
pub fn parse_input(text: &str, data_type: DataType) -> Option<Value> {
    match data_type {
        DataType::Integer => {
            if is_integer_literal(text) {
                text.parse::<f64>().ok().map(Value::integer)
            } else {
                None
            }
        }
        DataType::Real => {
            if is_real_literal(text) {
                text.parse::<f64>().ok().map(Value::real)
            } else {
                None
            }
        }
        DataType::String => Some(Value::string(text)),
        DataType::Auto => {
            if is_integer_literal(text) {
                text.parse::<f64>().ok().map(Value::integer)
            } else if is_real_literal(text) {
                text.parse::<f64>().ok().map(Value::real)
            } else {
                Some(Value::string(text))
            }
        }
    }
}

/// USD rendering with thousands grouping and two decimals: `$1,234.50`,
/// negatives as `-$1,234.50`.
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as i64;
    let dollars = cents / 100;
    let rem = cents % 100;

    let digits = dollars.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    format!(
        "{}${}.{:02}",
        if negative { "-" } else { "" },
        grouped,
        rem
    )
}
