use std::{
    io::{self, stdin},
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use chrono::Utc;
use clap::{error::ErrorKind, CommandFactory, Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};

use typeboard::{
    app::{App, Control},
    app_dirs::AppDirs,
    clock::SystemClock,
    config::{ConfigStore, FileConfigStore},
    export, logging,
    reference::ReferenceText,
    runtime::{AppEventSource, CrosstermEventSource, Runner},
    store::{ContentSource, LeaderboardQuery, NewContent, SortBy, SourceType, Store},
    ui,
};

/// Redraw at least this often so the header timer keeps moving.
const IDLE_REDRAW_MS: u64 = 250;

/// typing speed trainer with live metrics and a shared leaderboard
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Type a passage with live wpm and accuracy, then see where the run ranks."
)]
pub struct Cli {
    /// passage id to practice (see `typeboard content`)
    #[clap(short = 'c', long)]
    content: Option<String>,

    /// type this text instead of a library passage; it is added to the library
    #[clap(short = 'p', long, conflicts_with = "content")]
    prompt: Option<String>,

    /// name to submit scores under; remembered for next time
    #[clap(short = 'u', long)]
    username: Option<String>,

    /// database file (defaults to the state directory)
    #[clap(long, global = true)]
    db: Option<PathBuf>,

    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// add a passage from a UTF-8 file or from --text
    Add {
        /// file to read the passage from
        #[clap(required_unless_present = "text")]
        path: Option<PathBuf>,

        /// passage text
        #[clap(long, conflicts_with = "path")]
        text: Option<String>,

        /// title (defaults to the file name)
        #[clap(long)]
        title: Option<String>,
    },

    /// list the passages in the library
    Content {
        #[clap(long)]
        json: bool,
    },

    /// print the leaderboard
    Leaderboard {
        #[clap(short = 's', long, value_enum, default_value_t = SortBy::Wpm)]
        sort_by: SortBy,

        #[clap(
            short = 'n',
            long,
            default_value_t = 10,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        limit: u32,

        /// only entries for this passage, by wpm
        #[clap(short = 'c', long)]
        content: Option<String>,

        #[clap(long)]
        json: bool,

        #[clap(long, conflicts_with = "json")]
        csv: bool,
    },
}

fn main() -> anyhow::Result<()> {
    let mut cli = Cli::parse();

    let db_path = match &cli.db {
        Some(path) => path.clone(),
        None => AppDirs::db_path().context("could not determine a state directory")?,
    };

    match cli.command.take() {
        Some(command) => {
            logging::init_stderr();
            run_command(command, &db_path)
        }
        None => run_tui(cli, &db_path),
    }
}

fn open_store(db_path: &Path) -> anyhow::Result<Store> {
    Store::open(db_path).with_context(|| format!("could not open database {}", db_path.display()))
}

fn run_command(command: Command, db_path: &Path) -> anyhow::Result<()> {
    let store = open_store(db_path)?;

    match command {
        Command::Add { path, text, title } => {
            let new_content = match (path, text) {
                (_, Some(text)) => {
                    NewContent::new(title.as_deref().unwrap_or(""), &text, SourceType::Paste)?
                }
                (Some(path), None) => NewContent::from_file(&path, title.as_deref())
                    .with_context(|| format!("could not add {}", path.display()))?,
                (None, None) => anyhow::bail!("provide a file path or --text"),
            };
            let record = store.create_content(&new_content)?;
            log::info!("added passage {} ({} words)", record.id, record.word_count);
            println!("{}", record.id);
        }
        Command::Content { json } => {
            let records = store.list_content()?;
            if json {
                export::write_json(io::stdout().lock(), &records)?;
            } else {
                println!("{}", export::content_table(&records));
            }
        }
        Command::Leaderboard {
            sort_by,
            limit,
            content,
            json,
            csv,
        } => {
            let limit = limit as usize;
            let entries = match content {
                Some(id) => {
                    store.get_content(&id)?;
                    store.leaderboard_for_content(&id, limit)?
                }
                None => store.leaderboard(sort_by, limit)?,
            };

            if json {
                export::write_json(io::stdout().lock(), &entries)?;
            } else if csv {
                export::write_leaderboard_csv(io::stdout().lock(), &entries)?;
            } else if entries.is_empty() {
                println!("no scores yet");
            } else {
                println!("{}", export::leaderboard_table(&entries, Utc::now()));
            }
        }
    }
    Ok(())
}

fn pick_reference(store: &Store, cli: &Cli) -> anyhow::Result<ReferenceText> {
    let record = if let Some(text) = &cli.prompt {
        store.find_or_create(&NewContent::new("Custom prompt", text, SourceType::Paste)?)?
    } else if let Some(id) = &cli.content {
        store.get_content(id)?
    } else {
        store.random_content().context("could not load a passage")?
    };
    Ok(record.reference_text()?)
}

fn run_tui(cli: Cli, db_path: &Path) -> anyhow::Result<()> {
    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    logging::init_file(&db_path.with_extension("log")).context("could not open log file")?;

    let store = open_store(db_path)?;
    let config_store = FileConfigStore::new();
    let mut config = config_store.load();
    if let Some(name) = cli.username.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        config.username = Some(name.to_string());
        if let Err(e) = config_store.save(&config) {
            log::warn!("could not save username to {}: {e}", config_store.path().display());
        }
    }

    let reference = pick_reference(&store, &cli)?;
    log::info!("starting session on {}", reference.content_id());

    let runner = Runner::new(
        CrosstermEventSource::new(),
        Duration::from_millis(IDLE_REDRAW_MS),
    );
    let mut app = App::new(store, SystemClock, reference, config)
        .with_tick_sender(runner.sender())
        .with_config_store(Box::new(config_store));

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = start_tui(&mut terminal, &mut app, &runner);
    app.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App<Store, SystemClock>,
    runner: &Runner<E>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        let Some(event) = runner.step() else {
            continue;
        };
        if app.handle_event(event) == Control::Quit {
            return Ok(());
        }
    }
}
