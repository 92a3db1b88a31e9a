use std::io::{self, BufRead, Write};

use crate::value::{value_to_string, Value};

/// The driver side of program execution. The evaluator never touches stdio
/// or shared flags directly; everything observable flows through this trait.
pub trait Host {
    /// Deliver one Display line. The values are the evaluated items of a
    /// single Display statement, in order; rendering policy is the host's.
    fn display(&mut self, values: &[Value]);

    /// Ask the user for a line of input. `None` signals cancellation.
    fn input(&mut self, prompt: &str) -> Option<String>;

    /// Cooperative stop flag, polled before every step and at every input
    /// resolution.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Console host used by the CLI driver: Display lines go to stdout, input is
/// prompted on stdout and read from stdin (EOF cancels).
#[derive(Debug, Default)]
pub struct StdioHost;

impl Host for StdioHost {
    fn display(&mut self, values: &[Value]) {
        let line: String = values.iter().map(value_to_string).collect();
        println!("{}", line);
        io::stdout().flush().ok();
    }

    fn input(&mut self, prompt: &str) -> Option<String> {
        print!("{}", prompt);
        io::stdout().flush().ok();

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches(['\n', '\r']).to_string()),
        }
    }
}
