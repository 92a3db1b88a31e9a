use indexmap::IndexMap;
use std::rc::Rc;

use super::builtins;
use super::control_flow::ControlFlow;
use super::environment::{AssignError, Environment};
use super::error::InterpreterError;
use super::host::Host;
use crate::ast::{
    BinaryOp, DataType, Declarator, DisplayItem, Expr, ExprKind, Stmt, StmtKind, UnaryOp,
};
use crate::convert;
use crate::value::{values_equal, Value};

pub(super) const INPUT_CANCELLED: &str = "Input cancelled.";

fn reprompt_for(data_type: DataType) -> &'static str {
    match data_type {
        DataType::Integer => "Invalid input. Please enter an Integer.",
        DataType::Real => "Invalid input. Please enter a Real.",
        DataType::String | DataType::Auto => "Invalid input.",
    }
}

/// IEEE 754 remainder: `a - n*b` where `n` is `a/b` rounded to the nearest
/// integer, ties to even. Differs from `%`, which truncates the quotient.
fn ieee_remainder(a: f64, b: f64) -> f64 {
    let quotient = a / b;
    let mut n = quotient.round();
    if (quotient - quotient.trunc()).abs() == 0.5 && n % 2.0 != 0.0 {
        n -= quotient.signum();
    }
    a - n * b
}

fn default_value(data_type: DataType) -> Value {
    match data_type {
        DataType::Integer => Value::integer(0.0),
        DataType::Real => Value::real(0.0),
        DataType::String => Value::string(""),
        DataType::Auto => Value::Null,
    }
}

/// A named subroutine: a module (procedure) or a function with a return type.
#[derive(Debug)]
pub struct Subroutine {
    pub name: Rc<str>,
    pub params: Vec<crate::ast::Param>,
    pub return_type: Option<DataType>,
    pub body: Rc<Vec<Stmt>>,
    pub line: usize,
}

/// Recursive tree-walker. Called subroutine bodies run here atomically; the
/// statement-by-statement stepping of the entry body lives in the machine,
/// which delegates simple statements to this type.
pub struct Interpreter<'h> {
    pub(super) env: Environment,
    modules: IndexMap<String, Rc<Subroutine>>,
    functions: IndexMap<String, Rc<Subroutine>>,
    host: &'h mut dyn Host,
}

impl<'h> Interpreter<'h> {
    /// Collects the module and function registries from the program's
    /// top-level declarations.
    pub fn new(program: &[Stmt], host: &'h mut dyn Host) -> Result<Self, InterpreterError> {
        let mut modules: IndexMap<String, Rc<Subroutine>> = IndexMap::new();
        let mut functions: IndexMap<String, Rc<Subroutine>> = IndexMap::new();

        for stmt in program {
            match &stmt.kind {
                StmtKind::Module { name, params, body } => {
                    let sub = Rc::new(Subroutine {
                        name: Rc::clone(name),
                        params: params.clone(),
                        return_type: None,
                        body: Rc::new(body.clone()),
                        line: stmt.line,
                    });
                    if modules.insert(name.to_ascii_lowercase(), sub).is_some() {
                        return Err(InterpreterError::semantic(
                            format!("Module '{}' is declared more than once", name),
                            stmt.line,
                        ));
                    }
                }
                StmtKind::Function {
                    name,
                    return_type,
                    params,
                    body,
                } => {
                    let sub = Rc::new(Subroutine {
                        name: Rc::clone(name),
                        params: params.clone(),
                        return_type: Some(*return_type),
                        body: Rc::new(body.clone()),
                        line: stmt.line,
                    });
                    if functions.insert(name.to_ascii_lowercase(), sub).is_some() {
                        return Err(InterpreterError::semantic(
                            format!("Function '{}' is declared more than once", name),
                            stmt.line,
                        ));
                    }
                }
                _ => {}
            }
        }

        Ok(Self {
            env: Environment::new(),
            modules,
            functions,
            host,
        })
    }

    pub(super) fn has_modules(&self) -> bool {
        !self.modules.is_empty()
    }

    pub(super) fn main_module(&self) -> Option<Rc<Subroutine>> {
        self.modules.get("main").cloned()
    }

    pub(super) fn should_stop(&self) -> bool {
        self.host.should_stop()
    }

    fn check_stop(&self) -> Result<(), InterpreterError> {
        if self.host.should_stop() {
            Err(InterpreterError::Stopped)
        } else {
            Ok(())
        }
    }

    pub(super) fn execute_block(&mut self, body: &[Stmt]) -> Result<ControlFlow, InterpreterError> {
        for stmt in body {
            if let ControlFlow::Return(value) = self.execute_statement(stmt)? {
                return Ok(ControlFlow::Return(value));
            }
        }
        Ok(ControlFlow::Next)
    }

    fn execute_block_scoped(&mut self, body: &[Stmt]) -> Result<ControlFlow, InterpreterError> {
        self.env.push_scope();
        let result = self.execute_block(body);
        self.env.pop_scope();
        result
    }

    pub(super) fn execute_statement(
        &mut self,
        stmt: &Stmt,
    ) -> Result<ControlFlow, InterpreterError> {
        if self.host.should_stop() {
            return Err(InterpreterError::Stopped);
        }

        match &stmt.kind {
            StmtKind::Declaration {
                data_type,
                is_constant,
                declarators,
            } => {
                for declarator in declarators {
                    self.execute_declarator(*data_type, *is_constant, declarator, stmt.line)?;
                }
                Ok(ControlFlow::Next)
            }

            StmtKind::Assignment { target, value } => {
                let value = self.evaluate(value)?;
                self.assign_to(target, value)?;
                Ok(ControlFlow::Next)
            }

            StmtKind::Display { items } => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        DisplayItem::Expr(expr) => values.push(self.evaluate(expr)?),
                        DisplayItem::Tap => values.push(Value::string("    ")),
                    }
                }
                self.host.display(&values);
                Ok(ControlFlow::Next)
            }

            StmtKind::Input { name } => {
                self.execute_input(name, stmt.line)?;
                Ok(ControlFlow::Next)
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    self.execute_block_scoped(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_block_scoped(else_branch)
                } else {
                    Ok(ControlFlow::Next)
                }
            }

            StmtKind::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    self.check_stop()?;
                    if let ControlFlow::Return(value) = self.execute_block_scoped(body)? {
                        return Ok(ControlFlow::Return(value));
                    }
                }
                Ok(ControlFlow::Next)
            }

            StmtKind::DoWhile { body, condition } => loop {
                self.check_stop()?;
                if let ControlFlow::Return(value) = self.execute_block_scoped(body)? {
                    return Ok(ControlFlow::Return(value));
                }
                if !self.evaluate(condition)?.is_truthy() {
                    return Ok(ControlFlow::Next);
                }
            },

            StmtKind::DoUntil { body, condition } => loop {
                self.check_stop()?;
                if let ControlFlow::Return(value) = self.execute_block_scoped(body)? {
                    return Ok(ControlFlow::Return(value));
                }
                if self.evaluate(condition)?.is_truthy() {
                    return Ok(ControlFlow::Next);
                }
            },

            StmtKind::For {
                counter,
                start,
                end,
                body,
            } => {
                let start = self.numeric_bound(start, "start")?;
                let end = self.numeric_bound(end, "end")?;
                self.env.push_scope();
                let result = self.run_for(counter, start, end, body, stmt.line);
                self.env.pop_scope();
                result
            }

            StmtKind::Call { name, args } => {
                self.call_module(name, args, stmt.line)?;
                Ok(ControlFlow::Next)
            }

            StmtKind::Return(expr) => {
                let value = self.evaluate(expr)?;
                Ok(ControlFlow::Return(value))
            }

            // Nested module/function declarations cannot be parsed; top-level
            // ones are registered before execution and skipped here.
            StmtKind::Module { .. } | StmtKind::Function { .. } => Ok(ControlFlow::Next),
        }
    }

    fn execute_declarator(
        &mut self,
        data_type: DataType,
        is_constant: bool,
        declarator: &Declarator,
        line: usize,
    ) -> Result<(), InterpreterError> {
        let value = if let Some(size_expr) = &declarator.size {
            let size = match self.evaluate(size_expr)? {
                Value::Number(n, _) if n.fract() == 0.0 => {
                    if n < 0.0 {
                        return Err(InterpreterError::range(
                            format!("Array '{}' cannot have a negative size", declarator.name),
                            line,
                        ));
                    }
                    n as usize
                }
                _ => {
                    return Err(InterpreterError::type_error(
                        format!("Array size for '{}' must be an integer", declarator.name),
                        line,
                    ));
                }
            };
            let mut items = vec![Value::Null; size];
            if let Some(init) = &declarator.initializer {
                match &init.kind {
                    ExprKind::ArrayLiteral(elements) => {
                        if elements.len() > size {
                            return Err(InterpreterError::range(
                                format!(
                                    "Too many initializers for '{}': {} values for {} slots",
                                    declarator.name,
                                    elements.len(),
                                    size
                                ),
                                line,
                            ));
                        }
                        for (i, element) in elements.iter().enumerate() {
                            items[i] = self.evaluate(element)?;
                        }
                    }
                    _ => {
                        return Err(InterpreterError::type_error(
                            format!("Array '{}' requires a list initializer", declarator.name),
                            line,
                        ));
                    }
                }
            }
            Value::array(items)
        } else {
            match &declarator.initializer {
                Some(init) => self.evaluate(init)?,
                None => {
                    if is_constant {
                        return Err(InterpreterError::semantic(
                            format!("Constant '{}' must have an initializer", declarator.name),
                            line,
                        ));
                    }
                    default_value(data_type)
                }
            }
        };

        self.env
            .define(&declarator.name, is_constant, data_type, value)
            .map_err(|_| {
                InterpreterError::semantic(
                    format!("'{}' is already declared in this scope", declarator.name),
                    line,
                )
            })
    }

    fn assign_to(&mut self, target: &Expr, value: Value) -> Result<(), InterpreterError> {
        match &target.kind {
            ExprKind::Identifier(name) => {
                self.env.assign(name, value).map_err(|e| match e {
                    AssignError::Undeclared => InterpreterError::semantic(
                        format!("'{}' has not been declared", name),
                        target.line,
                    ),
                    AssignError::Constant => InterpreterError::semantic(
                        format!("Cannot assign to constant '{}'", name),
                        target.line,
                    ),
                })
            }
            ExprKind::ArrayAccess { array, index } => {
                let array_value = self.evaluate(array)?;
                match array_value {
                    Value::Array(items) => {
                        let len = items.borrow().len();
                        let idx = self.evaluate_index(index, len, target.line)?;
                        items.borrow_mut()[idx] = value;
                        Ok(())
                    }
                    other => Err(InterpreterError::type_error(
                        format!("Cannot index into {}", other.type_name()),
                        target.line,
                    )),
                }
            }
            _ => Err(InterpreterError::semantic(
                "Invalid assignment target",
                target.line,
            )),
        }
    }

    fn execute_input(&mut self, name: &str, line: usize) -> Result<(), InterpreterError> {
        let slot = self.env.resolve_slot(name).ok_or_else(|| {
            InterpreterError::semantic(format!("'{}' has not been declared", name), line)
        })?;
        let data_type = {
            let cell = slot.borrow();
            if cell.is_constant {
                return Err(InterpreterError::semantic(
                    format!("Cannot assign to constant '{}'", name),
                    line,
                ));
            }
            if matches!(cell.value, Value::Array(_)) {
                return Err(InterpreterError::type_error(
                    format!("Cannot Input into array '{}'", name),
                    line,
                ));
            }
            cell.data_type
        };

        let prompt = format!("Enter a value for {}: ", name);
        loop {
            if self.host.should_stop() {
                return Err(InterpreterError::Stopped);
            }
            let answer = self.host.input(&prompt);
            if self.host.should_stop() {
                return Err(InterpreterError::Stopped);
            }
            match answer {
                None => {
                    self.host.display(&[Value::string(INPUT_CANCELLED)]);
                    return Ok(());
                }
                Some(text) => match convert::parse_input(&text, data_type) {
                    Some(value) => {
                        slot.borrow_mut().value = value;
                        return Ok(());
                    }
                    None => {
                        self.host.display(&[Value::string(reprompt_for(data_type))]);
                    }
                },
            }
        }
    }

    fn numeric_bound(&mut self, expr: &Expr, which: &str) -> Result<f64, InterpreterError> {
        match self.evaluate(expr)? {
            Value::Number(n, _) => Ok(n),
            other => Err(InterpreterError::type_error(
                format!("For {} bound must be a number, got {}", which, other.type_name()),
                expr.line,
            )),
        }
    }

    /// Loop body of a For statement; the counter scope is already pushed.
    fn run_for(
        &mut self,
        counter: &str,
        start: f64,
        end: f64,
        body: &[Stmt],
        line: usize,
    ) -> Result<ControlFlow, InterpreterError> {
        self.env
            .define(counter, false, DataType::Real, Value::real(start))
            .map_err(|_| {
                InterpreterError::semantic(
                    format!("'{}' is already declared in this scope", counter),
                    line,
                )
            })?;

        loop {
            self.check_stop()?;
            let current = match self.env.get(counter) {
                Some(Value::Number(n, _)) => n,
                _ => {
                    return Err(InterpreterError::type_error(
                        format!("For counter '{}' must stay numeric", counter),
                        line,
                    ));
                }
            };
            if current > end {
                return Ok(ControlFlow::Next);
            }
            if let ControlFlow::Return(value) = self.execute_block_scoped(body)? {
                return Ok(ControlFlow::Return(value));
            }
            let after = match self.env.get(counter) {
                Some(Value::Number(n, _)) => n,
                _ => {
                    return Err(InterpreterError::type_error(
                        format!("For counter '{}' must stay numeric", counter),
                        line,
                    ));
                }
            };
            self.env
                .assign(counter, Value::real(after + 1.0))
                .map_err(|_| {
                    InterpreterError::semantic(
                        format!("Cannot assign to constant '{}'", counter),
                        line,
                    )
                })?;
        }
    }

    pub(super) fn call_module(
        &mut self,
        name: &str,
        args: &[Expr],
        line: usize,
    ) -> Result<(), InterpreterError> {
        let module = self
            .modules
            .get(&name.to_ascii_lowercase())
            .cloned()
            .ok_or_else(|| {
                InterpreterError::semantic(format!("Undefined module '{}'", name), line)
            })?;
        // A Return inside a module just ends it; any value is discarded.
        self.invoke(&module, args, line)?;
        Ok(())
    }

    /// Bind arguments and run a subroutine body in a fresh environment whose
    /// enclosing scope is the globals frame, never the caller's locals.
    fn invoke(
        &mut self,
        sub: &Subroutine,
        args: &[Expr],
        line: usize,
    ) -> Result<ControlFlow, InterpreterError> {
        if args.len() != sub.params.len() {
            return Err(InterpreterError::semantic(
                format!(
                    "'{}' expects {} argument(s), got {}",
                    sub.name,
                    sub.params.len(),
                    args.len()
                ),
                line,
            ));
        }

        let mut callee_env = self.env.call_scope();
        for (param, arg) in sub.params.iter().zip(args) {
            if param.is_reference {
                let target = match &arg.kind {
                    ExprKind::Identifier(target) => target,
                    _ => {
                        return Err(InterpreterError::semantic(
                            format!(
                                "Parameter '{}' is passed by reference and needs a variable argument",
                                param.name
                            ),
                            arg.line,
                        ));
                    }
                };
                let slot = self.env.resolve_slot(target).ok_or_else(|| {
                    InterpreterError::semantic(
                        format!("'{}' has not been declared", target),
                        arg.line,
                    )
                })?;
                callee_env.define_alias(&param.name, slot).map_err(|_| {
                    InterpreterError::semantic(
                        format!("Duplicate parameter '{}'", param.name),
                        line,
                    )
                })?;
            } else {
                let value = self.evaluate(arg)?;
                let data_type = if param.data_type == DataType::Auto {
                    match &arg.kind {
                        ExprKind::Identifier(target) => {
                            self.env.data_type(target).unwrap_or(DataType::Auto)
                        }
                        _ => DataType::Auto,
                    }
                } else {
                    param.data_type
                };
                callee_env
                    .define(&param.name, false, data_type, value)
                    .map_err(|_| {
                        InterpreterError::semantic(
                            format!("Duplicate parameter '{}'", param.name),
                            line,
                        )
                    })?;
            }
        }

        let saved = std::mem::replace(&mut self.env, callee_env);
        let result = self.execute_block(&sub.body);
        self.env = saved;
        result
    }

    pub(super) fn evaluate(&mut self, expr: &Expr) -> Result<Value, InterpreterError> {
        match &expr.kind {
            ExprKind::Literal(value) => Ok(value.clone()),

            ExprKind::Identifier(name) => self.env.get(name).ok_or_else(|| {
                InterpreterError::semantic(format!("'{}' has not been declared", name), expr.line)
            }),

            ExprKind::ArrayLiteral(elements) => {
                let mut items = Vec::with_capacity(elements.len());
                for element in elements {
                    items.push(self.evaluate(element)?);
                }
                Ok(Value::array(items))
            }

            ExprKind::ArrayAccess { array, index } => {
                let array_value = self.evaluate(array)?;
                match array_value {
                    Value::Array(items) => {
                        let len = items.borrow().len();
                        let idx = self.evaluate_index(index, len, expr.line)?;
                        let value = items.borrow()[idx].clone();
                        Ok(value)
                    }
                    other => Err(InterpreterError::type_error(
                        format!("Cannot index into {}", other.type_name()),
                        expr.line,
                    )),
                }
            }

            ExprKind::Grouping(inner) => self.evaluate(inner),

            ExprKind::Unary { op, right } => {
                let value = self.evaluate(right)?;
                match op {
                    UnaryOp::Neg => match value {
                        Value::Number(n, is_real) => Ok(Value::Number(-n, is_real)),
                        other => Err(InterpreterError::type_error(
                            format!("Cannot negate {}", other.type_name()),
                            expr.line,
                        )),
                    },
                    UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
                }
            }

            ExprKind::Binary { left, op, right } => {
                self.evaluate_binary(left, *op, right, expr.line)
            }

            ExprKind::Call { callee, args } => self.evaluate_call(callee, args, expr.line),
        }
    }

    fn evaluate_index(
        &mut self,
        index: &Expr,
        len: usize,
        line: usize,
    ) -> Result<usize, InterpreterError> {
        match self.evaluate(index)? {
            Value::Number(n, _) if n.fract() == 0.0 => {
                if n < 0.0 || n as usize >= len {
                    Err(InterpreterError::range(
                        format!("Array index {} is out of bounds for length {}", n, len),
                        line,
                    ))
                } else {
                    Ok(n as usize)
                }
            }
            _ => Err(InterpreterError::type_error(
                "Array index must be an integer",
                line,
            )),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        op: BinaryOp,
        right: &Expr,
        line: usize,
    ) -> Result<Value, InterpreterError> {
        // Logical operators short-circuit on the left operand's truthiness.
        match op {
            BinaryOp::And => {
                if !self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Bool(false));
                }
                return Ok(Value::Bool(self.evaluate(right)?.is_truthy()));
            }
            BinaryOp::Or => {
                if self.evaluate(left)?.is_truthy() {
                    return Ok(Value::Bool(true));
                }
                return Ok(Value::Bool(self.evaluate(right)?.is_truthy()));
            }
            _ => {}
        }

        let lhs = self.evaluate(left)?;
        let rhs = self.evaluate(right)?;

        match op {
            BinaryOp::Add => match (&lhs, &rhs) {
                (Value::String(a), Value::String(b)) => {
                    Ok(Value::string(format!("{}{}", a, b)))
                }
                (Value::Number(a, a_real), Value::Number(b, b_real)) => {
                    Ok(Value::Number(a + b, *a_real || *b_real))
                }
                _ => Err(InterpreterError::type_error(
                    format!("Cannot add {} and {}", lhs.type_name(), rhs.type_name()),
                    line,
                )),
            },

            BinaryOp::Sub => {
                let (a, b, real) = Self::numeric_operands(&lhs, &rhs, "-", line)?;
                Ok(Value::Number(a - b, real))
            }

            BinaryOp::Mul => {
                let (a, b, real) = Self::numeric_operands(&lhs, &rhs, "*", line)?;
                Ok(Value::Number(a * b, real))
            }

            BinaryOp::Div => {
                let (a, b, _) = Self::numeric_operands(&lhs, &rhs, "/", line)?;
                if b == 0.0 {
                    return Err(InterpreterError::division_by_zero(line));
                }
                Ok(Value::real(a / b))
            }

            BinaryOp::Mod => {
                let (a, b, real) = Self::numeric_operands(&lhs, &rhs, "Mod", line)?;
                if b == 0.0 {
                    return Err(InterpreterError::division_by_zero(line));
                }
                if real {
                    Ok(Value::real(ieee_remainder(a, b)))
                } else {
                    Ok(Value::integer(a % b))
                }
            }

            BinaryOp::Eq => Ok(Value::Bool(values_equal(&lhs, &rhs))),
            BinaryOp::NotEq => Ok(Value::Bool(!values_equal(&lhs, &rhs))),

            BinaryOp::Less | BinaryOp::LessEq | BinaryOp::Greater | BinaryOp::GreaterEq => {
                let ordering = match (&lhs, &rhs) {
                    (Value::Number(a, _), Value::Number(b, _)) => a.partial_cmp(b),
                    (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
                    _ => None,
                };
                let ordering = ordering.ok_or_else(|| {
                    InterpreterError::type_error(
                        format!(
                            "Cannot compare {} and {}",
                            lhs.type_name(),
                            rhs.type_name()
                        ),
                        line,
                    )
                })?;
                let result = match op {
                    BinaryOp::Less => ordering.is_lt(),
                    BinaryOp::LessEq => ordering.is_le(),
                    BinaryOp::Greater => ordering.is_gt(),
                    _ => ordering.is_ge(),
                };
                Ok(Value::Bool(result))
            }

            BinaryOp::And | BinaryOp::Or => unreachable!("handled above"),
        }
    }

    fn numeric_operands(
        lhs: &Value,
        rhs: &Value,
        op: &str,
        line: usize,
    ) -> Result<(f64, f64, bool), InterpreterError> {
        match (lhs, rhs) {
            (Value::Number(a, a_real), Value::Number(b, b_real)) => {
                Ok((*a, *b, *a_real || *b_real))
            }
            _ => Err(InterpreterError::type_error(
                format!(
                    "'{}' requires numeric operands, got {} and {}",
                    op,
                    lhs.type_name(),
                    rhs.type_name()
                ),
                line,
            )),
        }
    }

    /// Builtins are matched first (case-insensitively) and shadow user
    /// functions; a user function body that finishes without Return is an
    /// error.
    fn evaluate_call(
        &mut self,
        callee: &str,
        args: &[Expr],
        line: usize,
    ) -> Result<Value, InterpreterError> {
        let folded = callee.to_ascii_lowercase();

        if builtins::is_builtin(&folded) {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(self.evaluate(arg)?);
            }
            if let Some(result) = builtins::dispatch(&folded, &values, line) {
                return result;
            }
        }

        let function = self.functions.get(&folded).cloned().ok_or_else(|| {
            InterpreterError::semantic(format!("Undefined function '{}'", callee), line)
        })?;
        match self.invoke(&function, args, line)? {
            ControlFlow::Return(value) => Ok(value),
            ControlFlow::Next => Err(InterpreterError::missing_return(
                function.name.as_ref(),
                line,
            )),
        }
    }
}
