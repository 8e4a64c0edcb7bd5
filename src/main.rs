use std::{
    error::Error,
    io::{self, IsTerminal, Write},
    path::PathBuf,
};

use clap::Parser;
use log::{info, warn};
use rustyline::{DefaultEditor, error::ReadlineError};
use tinysql::{
    repl::{self, Flow, PROMPT},
    storage::table::Table,
    types::TABLE_MAX_PAGES,
};

/// Single-table database with a B+ tree on disk
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Database file
    #[arg(default_value = "dbfile.db")]
    filename: PathBuf,

    /// Maximum number of 4 KiB pages the file may grow to
    #[arg(long, default_value_t = TABLE_MAX_PAGES)]
    max_pages: u32,

    /// Line history file for interactive sessions
    #[arg(long)]
    history: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn run_interactive(mut table: Table, history: Option<&PathBuf>) -> Result<(), Box<dyn Error>> {
    let mut rl = DefaultEditor::new()?;
    if let Some(path) = history {
        if rl.load_history(path).is_err() {
            info!("No history at {}", path.display());
        }
    }

    let stdout = io::stdout();
    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    rl.add_history_entry(line.as_str())?;
                }
                let mut out = stdout.lock();
                let flow = repl::process_line(&mut table, &line, &mut out)?;
                out.flush()?;
                if flow == Flow::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                warn!("Readline error: {:?}", err);
                break;
            }
        }
    }

    if let Some(path) = history {
        rl.save_history(path)?;
    }
    table.close()?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    // Logs go to stderr; stdout carries the prompt protocol.
    let log_level = if args.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let table = Table::open_with_max_pages(&args.filename, args.max_pages)?;

    if io::stdin().is_terminal() {
        run_interactive(table, args.history.as_ref())
    } else {
        let stdin = io::stdin();
        let stdout = io::stdout();
        repl::run(table, stdin.lock(), &mut stdout.lock())?;
        Ok(())
    }
}
