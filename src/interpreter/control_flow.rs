use crate::value::Value;

/// Statement outcome. `Return` is the non-error unwind signal raised by a
/// Return statement and intercepted at the enclosing call.
#[derive(Debug, Clone)]
pub enum ControlFlow {
    Next,
    Return(Value),
}
