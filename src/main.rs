use clap::Parser;
use gaddis::cli::{generate_completions, Args, Commands};
use gaddis::config::AppConfig;
use gaddis::diagnostic::render_diagnostics;
use gaddis::flowchart::generate_flowchart;
use gaddis::format::format_source;
use gaddis::interpreter::{debug, interpret, InterpreterError, StdioHost};
use gaddis::value::value_to_string;
use owo_colors::OwoColorize;
use std::io::{self, BufRead, Read, Write};
use std::path::Path;

fn main() {
    let args = Args::parse();

    if let Some(Commands::Complete { shell }) = args.command {
        generate_completions(shell);
        return;
    }

    let config = AppConfig::from_args(&args);
    verbose_log(&config, "Starting gaddis");

    let source = match read_source(&args, &config) {
        Ok(s) => s,
        Err(e) => {
            error_message(&config, &e);
            std::process::exit(1);
        }
    };
    verbose_log(&config, &format!("Read {} bytes of source", source.len()));

    if args.fmt {
        print!("{}", format_source(&source));
        return;
    }

    if args.flowchart {
        match generate_flowchart(&source) {
            Ok(chart) => {
                let json = chart.to_json();
                let rendered = if config.compact {
                    json.to_string()
                } else {
                    serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
                };
                println!("{}", rendered);
            }
            Err(e) => fail(&source, &e, &config),
        }
        return;
    }

    if args.debug {
        run_debugger(&source, &config);
        return;
    }

    let mut host = StdioHost;
    if let Err(e) = interpret(&source, &mut host) {
        fail(&source, &e, &config);
    }
    verbose_log(&config, "Program finished");
}

fn read_source(args: &Args, config: &AppConfig) -> Result<String, String> {
    if let Some(file) = &args.file {
        verbose_log(config, &format!("Reading source from {}", file.display()));
        read_file(file)
    } else if let Some(source) = &args.source {
        verbose_log(config, "Reading source from command-line argument");
        Ok(source.clone())
    } else {
        verbose_log(config, "Reading source from stdin");
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        if buffer.trim().is_empty() {
            return Err(
                "No input provided. Pass a program, --file, or pipe source on stdin".to_string(),
            );
        }
        Ok(buffer)
    }
}

fn read_file(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {}", path.display(), e))
}

/// Interactive stepper: prints the upcoming line and the variable scope,
/// advancing on Enter. `q` stops the session.
fn run_debugger(source: &str, config: &AppConfig) {
    let mut host = StdioHost;
    let mut session = match debug(source, &mut host) {
        Ok(session) => session,
        Err(e) => fail(source, &e, config),
    };

    let stdin = io::stdin();
    loop {
        match session.next_step() {
            Ok(Some(step)) => {
                eprintln!("-- line {}", step.line);
                for (name, value) in &step.scope {
                    eprintln!("   {} = {}", name, value_to_string(value));
                }
                eprint!("[Enter to step, q to quit] ");
                io::stderr().flush().ok();

                let mut answer = String::new();
                if stdin.lock().read_line(&mut answer).unwrap_or(0) == 0 {
                    break;
                }
                if answer.trim().eq_ignore_ascii_case("q") {
                    break;
                }
            }
            Ok(None) => {
                verbose_log(config, "Program finished");
                break;
            }
            Err(e) => fail(source, &e, config),
        }
    }
}

fn fail(source: &str, error: &InterpreterError, config: &AppConfig) -> ! {
    if matches!(error, InterpreterError::Stopped) {
        eprintln!("Program stopped by user.");
    } else {
        let rendered = render_diagnostics(
            source,
            "program",
            &[error.to_diagnostic()],
            config.color_enabled,
        );
        eprint!("{}", rendered);
        verbose_log(config, &error.report());
    }
    std::process::exit(1);
}

fn verbose_log(config: &AppConfig, message: &str) {
    if config.verbose {
        eprintln!("[gaddis:debug] {}", message);
    }
}

fn error_message(config: &AppConfig, message: &str) {
    if config.color_enabled {
        eprintln!("{}", message.red().bold());
    } else {
        eprintln!("{}", message);
    }
}
