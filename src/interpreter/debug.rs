//! Statement-granular stepping. The machine unrolls compound statements onto
//! an explicit frame stack so that every executed statement of the entry body
//! is announced exactly once, while called subroutine bodies run atomically
//! inside the recursive walker ("step over").

use indexmap::IndexMap;
use std::rc::Rc;

use super::control_flow::ControlFlow;
use super::error::InterpreterError;
use super::evaluator::Interpreter;
use super::host::Host;
use crate::ast::{DataType, Expr, Stmt, StmtKind};
use crate::value::Value;

/// One debugger pause: the line about to execute and the flattened variable
/// scope at that point.
#[derive(Debug, Clone)]
pub struct Step {
    pub line: usize,
    pub scope: IndexMap<String, Value>,
}

enum Frame {
    Seq {
        stmts: Rc<Vec<Stmt>>,
        index: usize,
    },
    PopScope,
    While {
        condition: Expr,
        body: Rc<Vec<Stmt>>,
    },
    DoLoop {
        condition: Expr,
        body: Rc<Vec<Stmt>>,
        until: bool,
        ran_body: bool,
    },
    For {
        counter: Rc<str>,
        end: f64,
        body: Rc<Vec<Stmt>>,
        iterating: bool,
        line: usize,
    },
    EnterMain,
}

enum Decision {
    Step(Stmt),
    Pop,
    PopScope,
    RunBody(Rc<Vec<Stmt>>),
    WhileTest {
        condition: Expr,
        body: Rc<Vec<Stmt>>,
    },
    DoTest {
        condition: Expr,
        until: bool,
    },
    ForTest {
        counter: Rc<str>,
        end: f64,
        body: Rc<Vec<Stmt>>,
        line: usize,
    },
    ForIncrement {
        counter: Rc<str>,
        line: usize,
    },
    EnterMain,
}

pub struct Machine<'h> {
    interp: Interpreter<'h>,
    frames: Vec<Frame>,
    pending: Option<Stmt>,
}

impl<'h> Machine<'h> {
    pub fn new(program: Vec<Stmt>, host: &'h mut dyn Host) -> Result<Self, InterpreterError> {
        let interp = Interpreter::new(&program, host)?;
        let mut frames = Vec::new();

        if interp.has_modules() {
            let first_module_line = program
                .iter()
                .find(|s| matches!(s.kind, StmtKind::Module { .. }))
                .map(|s| s.line)
                .unwrap_or(1);
            let main = interp.main_module().ok_or_else(|| {
                InterpreterError::semantic(
                    "A module named 'main' is required",
                    first_module_line,
                )
            })?;
            if !main.params.is_empty() {
                return Err(InterpreterError::semantic(
                    "'main' takes no arguments",
                    main.line,
                ));
            }

            // Globals first, then main; other stray statements do not run.
            let globals: Vec<Stmt> = program
                .iter()
                .filter(|s| matches!(s.kind, StmtKind::Declaration { .. }))
                .cloned()
                .collect();
            frames.push(Frame::EnterMain);
            frames.push(Frame::Seq {
                stmts: Rc::new(globals),
                index: 0,
            });
        } else {
            let stmts: Vec<Stmt> = program
                .iter()
                .filter(|s| !matches!(s.kind, StmtKind::Function { .. }))
                .cloned()
                .collect();
            frames.push(Frame::Seq {
                stmts: Rc::new(stmts),
                index: 0,
            });
        }

        Ok(Self {
            interp,
            frames,
            pending: None,
        })
    }

    pub fn snapshot(&self) -> IndexMap<String, Value> {
        self.interp.env.serialize()
    }

    /// Run the statement announced by the previous call, then announce the
    /// next one. `None` means the program has finished.
    pub fn advance(&mut self) -> Result<Option<usize>, InterpreterError> {
        if self.interp.should_stop() {
            return Err(InterpreterError::Stopped);
        }

        if let Some(stmt) = self.pending.take() {
            if !self.dispatch(&stmt)? {
                // A Return unwound the entry body; the program is over.
                self.frames.clear();
                return Ok(None);
            }
        }

        loop {
            // Loop frames with empty bodies spin here without reaching a
            // statement boundary, so the stop flag is polled per round.
            if self.interp.should_stop() {
                return Err(InterpreterError::Stopped);
            }

            let decision = match self.frames.last_mut() {
                None => return Ok(None),
                Some(Frame::Seq { stmts, index }) => {
                    if *index < stmts.len() {
                        let stmt = stmts[*index].clone();
                        *index += 1;
                        Decision::Step(stmt)
                    } else {
                        Decision::Pop
                    }
                }
                Some(Frame::PopScope) => Decision::PopScope,
                Some(Frame::While { condition, body }) => Decision::WhileTest {
                    condition: condition.clone(),
                    body: Rc::clone(body),
                },
                Some(Frame::DoLoop {
                    condition,
                    body,
                    until,
                    ran_body,
                }) => {
                    if *ran_body {
                        Decision::DoTest {
                            condition: condition.clone(),
                            until: *until,
                        }
                    } else {
                        *ran_body = true;
                        Decision::RunBody(Rc::clone(body))
                    }
                }
                Some(Frame::For {
                    counter,
                    end,
                    body,
                    iterating,
                    line,
                }) => {
                    if *iterating {
                        *iterating = false;
                        Decision::ForIncrement {
                            counter: Rc::clone(counter),
                            line: *line,
                        }
                    } else {
                        Decision::ForTest {
                            counter: Rc::clone(counter),
                            end: *end,
                            body: Rc::clone(body),
                            line: *line,
                        }
                    }
                }
                Some(Frame::EnterMain) => Decision::EnterMain,
            };

            match decision {
                Decision::Step(stmt) => {
                    let line = stmt.line;
                    self.pending = Some(stmt);
                    return Ok(Some(line));
                }
                Decision::Pop => {
                    self.frames.pop();
                }
                Decision::PopScope => {
                    self.frames.pop();
                    self.interp.env.pop_scope();
                }
                Decision::RunBody(body) => self.push_body(body),
                Decision::WhileTest { condition, body } => {
                    if self.interp.evaluate(&condition)?.is_truthy() {
                        self.push_body(body);
                    } else {
                        self.frames.pop();
                    }
                }
                Decision::DoTest { condition, until } => {
                    let truthy = self.interp.evaluate(&condition)?.is_truthy();
                    let repeat = if until { !truthy } else { truthy };
                    if repeat {
                        if let Some(Frame::DoLoop { ran_body, .. }) = self.frames.last_mut() {
                            *ran_body = false;
                        }
                    } else {
                        self.frames.pop();
                    }
                }
                Decision::ForTest {
                    counter,
                    end,
                    body,
                    line,
                } => {
                    let current = self.counter_value(&counter, line)?;
                    if current <= end {
                        if let Some(Frame::For { iterating, .. }) = self.frames.last_mut() {
                            *iterating = true;
                        }
                        self.push_body(body);
                    } else {
                        self.frames.pop();
                        // The counter's own scope.
                        self.interp.env.pop_scope();
                    }
                }
                Decision::ForIncrement { counter, line } => {
                    let current = self.counter_value(&counter, line)?;
                    self.interp
                        .env
                        .assign(&counter, Value::real(current + 1.0))
                        .map_err(|_| {
                            InterpreterError::semantic(
                                format!("Cannot assign to constant '{}'", counter),
                                line,
                            )
                        })?;
                }
                Decision::EnterMain => {
                    self.frames.pop();
                    let main = self
                        .interp
                        .main_module()
                        .expect("validated when the machine was built");
                    self.interp.env = self.interp.env.call_scope();
                    self.frames.push(Frame::Seq {
                        stmts: Rc::clone(&main.body),
                        index: 0,
                    });
                }
            }
        }
    }

    fn push_body(&mut self, body: Rc<Vec<Stmt>>) {
        self.interp.env.push_scope();
        self.frames.push(Frame::PopScope);
        self.frames.push(Frame::Seq {
            stmts: body,
            index: 0,
        });
    }

    fn counter_value(&self, counter: &str, line: usize) -> Result<f64, InterpreterError> {
        match self.interp.env.get(counter) {
            Some(Value::Number(n, _)) => Ok(n),
            _ => Err(InterpreterError::type_error(
                format!("For counter '{}' must stay numeric", counter),
                line,
            )),
        }
    }

    /// Compound statements become frames; everything else executes in the
    /// recursive walker. Returns `false` when a Return ends the program.
    fn dispatch(&mut self, stmt: &Stmt) -> Result<bool, InterpreterError> {
        match &stmt.kind {
            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let branch = if self.interp.evaluate(condition)?.is_truthy() {
                    Some(then_branch)
                } else {
                    else_branch.as_ref()
                };
                if let Some(body) = branch {
                    self.push_body(Rc::new(body.clone()));
                }
                Ok(true)
            }

            StmtKind::While { condition, body } => {
                self.frames.push(Frame::While {
                    condition: condition.clone(),
                    body: Rc::new(body.clone()),
                });
                Ok(true)
            }

            StmtKind::DoWhile { body, condition } => {
                self.frames.push(Frame::DoLoop {
                    condition: condition.clone(),
                    body: Rc::new(body.clone()),
                    until: false,
                    ran_body: false,
                });
                Ok(true)
            }

            StmtKind::DoUntil { body, condition } => {
                self.frames.push(Frame::DoLoop {
                    condition: condition.clone(),
                    body: Rc::new(body.clone()),
                    until: true,
                    ran_body: false,
                });
                Ok(true)
            }

            StmtKind::For {
                counter,
                start,
                end,
                body,
            } => {
                let start_value = match self.interp.evaluate(start)? {
                    Value::Number(n, _) => n,
                    other => {
                        return Err(InterpreterError::type_error(
                            format!("For start bound must be a number, got {}", other.type_name()),
                            start.line,
                        ));
                    }
                };
                let end_value = match self.interp.evaluate(end)? {
                    Value::Number(n, _) => n,
                    other => {
                        return Err(InterpreterError::type_error(
                            format!("For end bound must be a number, got {}", other.type_name()),
                            end.line,
                        ));
                    }
                };
                self.interp.env.push_scope();
                self.interp
                    .env
                    .define(counter, false, DataType::Real, Value::real(start_value))
                    .map_err(|_| {
                        InterpreterError::semantic(
                            format!("'{}' is already declared in this scope", counter),
                            stmt.line,
                        )
                    })?;
                self.frames.push(Frame::For {
                    counter: Rc::clone(counter),
                    end: end_value,
                    body: Rc::new(body.clone()),
                    iterating: false,
                    line: stmt.line,
                });
                Ok(true)
            }

            _ => match self.interp.execute_statement(stmt)? {
                ControlFlow::Next => Ok(true),
                ControlFlow::Return(_) => Ok(false),
            },
        }
    }
}

/// Pull-based debugger handle: each [`next_step`](DebugSession::next_step)
/// runs one statement and reports the next pause.
pub struct DebugSession<'h> {
    machine: Machine<'h>,
}

impl<'h> DebugSession<'h> {
    pub(super) fn new(machine: Machine<'h>) -> Self {
        Self { machine }
    }

    pub fn next_step(&mut self) -> Result<Option<Step>, InterpreterError> {
        match self.machine.advance()? {
            Some(line) => Ok(Some(Step {
                line,
                scope: self.machine.snapshot(),
            })),
            None => Ok(None),
        }
    }

    /// Drain the session, which continues the program to completion.
    pub fn run_to_end(&mut self) -> Result<(), InterpreterError> {
        while self.next_step()?.is_some() {}
        Ok(())
    }
}
