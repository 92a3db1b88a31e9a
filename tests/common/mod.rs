#![allow(dead_code)]

use std::collections::VecDeque;

use gaddis::interpreter::{interpret, Host, InterpreterError};
use gaddis::value::{value_to_string, Value};

/// Scripted host: records Display lines and prompts, serves queued inputs.
/// An exhausted input queue (or a queued `None`) behaves as a cancellation,
/// and `stop_after_displays` flips the cooperative stop flag once that many
/// lines have been written.
pub struct TestHost {
    pub output: Vec<String>,
    pub prompts: Vec<String>,
    pub inputs: VecDeque<Option<String>>,
    pub stop_after_displays: Option<usize>,
}

impl TestHost {
    pub fn new() -> Self {
        Self {
            output: Vec::new(),
            prompts: Vec::new(),
            inputs: VecDeque::new(),
            stop_after_displays: None,
        }
    }

    pub fn with_inputs(inputs: &[&str]) -> Self {
        let mut host = Self::new();
        host.inputs = inputs.iter().map(|s| Some(s.to_string())).collect();
        host
    }

    pub fn with_raw_inputs(inputs: Vec<Option<String>>) -> Self {
        let mut host = Self::new();
        host.inputs = inputs.into();
        host
    }
}

impl Host for TestHost {
    fn display(&mut self, values: &[Value]) {
        let line: String = values.iter().map(value_to_string).collect();
        self.output.push(line);
    }

    fn input(&mut self, prompt: &str) -> Option<String> {
        self.prompts.push(prompt.to_string());
        self.inputs.pop_front().flatten()
    }

    fn should_stop(&self) -> bool {
        self.stop_after_displays
            .is_some_and(|n| self.output.len() >= n)
    }
}

pub fn run_program(source: &str) -> Vec<String> {
    let mut host = TestHost::new();
    interpret(source, &mut host).expect("program should run");
    host.output
}

pub fn run_with_inputs(source: &str, inputs: &[&str]) -> (Vec<String>, Vec<String>) {
    let mut host = TestHost::with_inputs(inputs);
    interpret(source, &mut host).expect("program should run");
    (host.output, host.prompts)
}

pub fn run_error(source: &str) -> InterpreterError {
    let mut host = TestHost::new();
    interpret(source, &mut host).expect_err("program should fail")
}
