use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{generate, Shell};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gaddis")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Gaddis-style pseudocode interpreter", long_about = None)]
pub struct Args {
    /// Program text given inline; reads stdin when neither this nor --file is set
    #[arg(value_name = "SOURCE")]
    pub source: Option<String>,

    #[arg(short, long, value_name = "FILE", conflicts_with = "source")]
    pub file: Option<PathBuf>,

    /// Reindent the program instead of running it
    #[arg(long = "fmt")]
    pub fmt: bool,

    /// Emit the flowchart graph as JSON instead of running
    #[arg(long = "flowchart", conflicts_with = "fmt")]
    pub flowchart: bool,

    /// Step through the program, printing line and scope between statements
    #[arg(short = 'd', long = "debug", conflicts_with_all = ["fmt", "flowchart"])]
    pub debug: bool,

    /// Single-line flowchart JSON
    #[arg(long = "compact")]
    pub compact: bool,

    #[arg(long = "color", value_name = "WHEN", default_value = "auto")]
    pub color: ColorChoice,

    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Complete {
        #[arg(value_name = "SHELL")]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy)]
pub enum ColorChoice {
    Auto,
    Always,
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "Invalid color choice: {}. Must be 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

pub fn generate_completions(shell: Shell) {
    let mut cmd = Args::command();
    let bin_name = cmd.get_name().to_string();
    generate(shell, &mut cmd, &bin_name, &mut io::stdout());
}
