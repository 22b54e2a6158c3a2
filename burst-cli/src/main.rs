//! The `burst` binary: an interactive debugger shell over the BURST
//! virtual machine.

use burst_cli::{Command, Outcome, Session};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// BURST virtual machine debugger.
#[derive(Debug, Parser)]
#[command(name = "burst", version, about)]
struct Args {
    /// Binary image to load at address zero on startup
    file: Option<PathBuf>,

    /// Assemble and load this source file instead of a binary
    #[arg(long, value_name = "FILE", conflicts_with = "file")]
    asm: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut session = Session::default();

    let startup = match (&args.file, &args.asm) {
        (Some(file), _) => Some(Command::Load { file: file.clone() }),
        (None, Some(asm)) => Some(Command::Assemble {
            file: asm.clone(),
            load: true,
        }),
        (None, None) => None,
    };

    if let Some(command) = startup {
        match session.execute(command) {
            Ok(Outcome::Continue(text)) => println!("{text}"),
            Ok(Outcome::Quit) => return ExitCode::SUCCESS,
            Err(err) => {
                eprintln!("error: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        // Guest output must land before the prompt.
        session.flush();
        print!("burst> ");
        let _ = io::stdout().flush();

        let Some(line) = lines.next() else {
            break;
        };

        let line = match line {
            Ok(line) => line,
            Err(err) => {
                eprintln!("error: {err}");
                break;
            }
        };

        match session.execute_line(&line) {
            Ok(Outcome::Quit) => break,
            Ok(Outcome::Continue(text)) => {
                if !text.is_empty() {
                    println!("{text}");
                }
            }
            Err(err) => eprintln!("error: {err}"),
        }
    }

    ExitCode::SUCCESS
}
