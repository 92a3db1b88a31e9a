use std::cell::RefCell;
use std::rc::Rc;

/// Runtime value. Numbers carry an `is_real` flag: Integer and Real share the
/// `f64` payload and Integer widens to Real whenever the two mix. `Null` is
/// the uninitialized-array-slot sentinel.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64, bool),
    String(Rc<str>),
    Array(Rc<RefCell<Vec<Value>>>),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        values_equal(self, other)
    }
}

impl Value {
    pub fn integer(n: f64) -> Self {
        Value::Number(n, false)
    }

    pub fn real(n: f64) -> Self {
        Value::Number(n, true)
    }

    pub fn string(s: impl AsRef<str>) -> Self {
        Value::String(Rc::from(s.as_ref()))
    }

    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn as_number(&self) -> Option<f64> {
        if let Value::Number(n, _) = self {
            Some(*n)
        } else {
            None
        }
    }

    pub fn as_string(&self) -> Option<&str> {
        if let Value::String(s) = self {
            Some(s.as_ref())
        } else {
            None
        }
    }

    pub fn is_real(&self) -> bool {
        matches!(self, Value::Number(_, true))
    }

    /// Falsy values are `false`, 0, the empty string and Null.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n, _) => *n != 0.0,
            Value::String(s) => !s.is_empty(),
            Value::Array(_) => true,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Boolean",
            Value::Number(_, false) => "Integer",
            Value::Number(_, true) => "Real",
            Value::String(_) => "String",
            Value::Array(_) => "Array",
        }
    }
}

pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a, _), Value::Number(b, _)) => a == b,
        (Value::String(a), Value::String(b)) => a == b,
        _ => false,
    }
}

pub fn value_to_string(val: &Value) -> String {
    match val {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n, is_real) => {
            if *is_real || n.fract() != 0.0 {
                n.to_string()
            } else {
                format!("{:.0}", n)
            }
        }
        Value::String(s) => s.to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.borrow().iter().map(value_to_string).collect();
            format!("[{}]", items.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::integer(0.0).is_truthy());
        assert!(!Value::string("").is_truthy());
        assert!(Value::integer(-1.0).is_truthy());
        assert!(Value::string("0").is_truthy());
    }

    #[test]
    fn test_equality_ignores_real_flag() {
        assert_eq!(Value::integer(5.0), Value::real(5.0));
        assert_ne!(Value::integer(5.0), Value::string("5"));
    }

    #[test]
    fn test_rendering() {
        assert_eq!(value_to_string(&Value::integer(42.0)), "42");
        assert_eq!(value_to_string(&Value::real(5.0)), "5");
        assert_eq!(value_to_string(&Value::real(2.5)), "2.5");
        assert_eq!(value_to_string(&Value::string("hi")), "hi");
        assert_eq!(
            value_to_string(&Value::array(vec![Value::integer(1.0), Value::integer(2.0)])),
            "[1, 2]"
        );
    }
}
