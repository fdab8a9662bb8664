//! Terminal shell for the notes store.
//!
//! # Responsibility
//! - Offer the add/list flow of the mobile shell from a terminal.
//! - Show the live list refreshing on change notifications (`watch`).
//! - Report provider failures as messages instead of crashing.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;
use quicknotes_core::{
    init_logging, ContentProvider, LogLevel, Note, NoteCursor, NoteService, NotesProvider,
    ProviderConfig,
};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "quicknotes")]
#[command(version)]
#[command(about = "Quick text notes backed by a local SQLite store")]
#[command(long_about = r#"
Example usage:
  quicknotes add "call the plumber"
  quicknotes list --json
  quicknotes edit 3 "call the plumber at 5"
  quicknotes watch          # type notes, one per line
"#)]
struct Cli {
    /// Directory holding the database file
    #[arg(short, long, global = true, default_value = ".")]
    data_dir: PathBuf,

    /// Locator authority of the notes collection
    #[arg(long, global = true)]
    authority: Option<String>,

    /// Absolute directory for rolling log files (logging is off without it)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add one note
    Add {
        /// Note text, stored as given
        text: String,
    },

    /// Print every note, oldest first
    List {
        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replace the text of one note
    Edit { id: i64, text: String },

    /// Remove one note
    Remove { id: i64 },

    /// Print the type tag of a locator
    Type { locator: String },

    /// Read notes from stdin, one per line, reprinting the live list after
    /// every change
    Watch {
        /// Stop after this many refreshes
        #[arg(long)]
        changes: Option<usize>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli
            .log_level
            .clone()
            .unwrap_or_else(|| LogLevel::build_default().to_string());
        let log_dir = log_dir
            .to_str()
            .context("log directory must be valid UTF-8")?;
        init_logging(&level, log_dir).map_err(anyhow::Error::msg)?;
    }

    let mut config = ProviderConfig::default();
    if let Some(authority) = cli.authority {
        config.authority = authority;
    }
    let provider = NotesProvider::open(config, &cli.data_dir)
        .with_context(|| format!("failed to open notes in {}", cli.data_dir.display()))?;
    let provider = Arc::new(provider);
    let service = NoteService::for_provider(Arc::clone(&provider));

    match cli.command {
        Commands::Add { text } => {
            let note = service.add_note(text)?;
            println!("{}", provider.note_locator(note.id));
        }
        Commands::List { json } => {
            let cursor = service.list_notes()?;
            print_notes(&cursor, json)?;
        }
        Commands::Edit { id, text } => {
            let note = service.edit_note(id, text)?;
            print_note(&note);
        }
        Commands::Remove { id } => {
            service.remove_note(id)?;
            println!("removed {}", provider.note_locator(id));
        }
        Commands::Type { locator } => {
            let locator = provider.parse_locator(&locator)?;
            println!("{}", provider.get_type(&locator)?);
        }
        Commands::Watch { changes } => watch(&service, changes)?,
    }
    Ok(())
}

fn watch(service: &NoteService<Arc<NotesProvider>>, limit: Option<usize>) -> Result<()> {
    let cursor = service.list_notes()?;
    print_notes(&cursor, false)?;
    info!("event=cli_watch module=cli status=start locator={}", cursor.locator());

    let mut refreshes = 0;
    for line in io::stdin().lock().lines() {
        let line = line.context("failed to read stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        if let Err(err) = service.add_note(line) {
            eprintln!("error: {err}");
            continue;
        }

        if cursor.is_dirty() {
            println!("--");
            print_notes(&cursor, false)?;
            refreshes += 1;
        }
        if limit.is_some_and(|limit| refreshes >= limit) {
            break;
        }
    }
    Ok(())
}

fn print_notes(cursor: &NoteCursor, json: bool) -> Result<()> {
    if json {
        let rows = cursor.rows()?;
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, &rows)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let notes = cursor.notes()?;
    if notes.is_empty() {
        println!("(no notes)");
    }
    for note in &notes {
        print_note(note);
    }
    Ok(())
}

fn print_note(note: &Note) {
    println!("{:>4}  {}", note.id, note.text_or_empty());
}
