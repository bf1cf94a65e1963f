use clap::Parser;
use kiwi::{logger, Kiwi, EX_IOERR};
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    process,
};

/// Runs a kiwi script, or starts an interactive prompt when no script is given.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the script to run.
    script: Option<PathBuf>,

    /// Log more about each stage. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Also write logs to a timestamped file in this directory.
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    if let Err(e) = logger::init(logger::level_for_verbosity(args.verbose), args.log_dir.as_deref()) {
        eprintln!("Failed to initialise logging: {}", e);
        process::exit(EX_IOERR);
    }

    let result = match &args.script {
        Some(path) => run_file(path),
        None => run_prompt(),
    };

    if let Err(e) = result {
        log::error!("{}", e);
        process::exit(EX_IOERR);
    }
}

fn run_file(path: &Path) -> io::Result<()> {
    let contents = std::fs::read_to_string(path)?;
    log::info!("running {}", path.display());

    let mut kiwi = Kiwi::new(io::stdout());
    if let Err(e) = kiwi.run(contents.as_str()) {
        process::exit(e.exit_code());
    }
    Ok(())
}

fn run_prompt() -> io::Result<()> {
    let mut buffer = String::new();
    let stdin = io::stdin();
    let mut out = io::stdout();

    let mut kiwi = Kiwi::new(io::stdout());

    loop {
        write!(out, "> ")?;
        out.flush()?;

        buffer.clear();

        let num_bytes = stdin.read_line(&mut buffer)?;
        if num_bytes == 0 { break };

        // Errors are already logged by the session. Only lost output ends the prompt.
        if let Err(e) = kiwi.run_line(buffer.as_str()) {
            if e.is_io() {
                process::exit(e.exit_code());
            }
        }
    }

    Ok(())
}
