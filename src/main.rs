mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::AppModel;
use crate::cli::CliInvocation;
use crate::infra::{build_journal, init_file_logger, resolve_journal_dir};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),

    #[error(transparent)]
    ResolveJournalDir(#[from] crate::infra::ResolveJournalDirError),
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui { dir } => {
            init_file_logger();
            let dir = resolve_journal_dir(dir)?;
            Ok(run_tui(dir)?)
        }
        CliInvocation::Command { dir, command } => {
            init_file_logger();
            let dir = resolve_journal_dir(dir)?;
            crate::cli::run(command, &dir)?;
            Ok(())
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} — browse daily journal files by project, task, and date\n\
         \n\
         USAGE:\n\
         \x20 {name} [--dir PATH]                     Start the TUI\n\
         \x20 {name} projects [--dir PATH]            List projects (name, task count, entry count)\n\
         \x20 {name} tasks [project] [--dir PATH]     List project/task pairs with entry counts\n\
         \x20 {name} day [YYYY-MM-DD] [--json]        Print the summary for one day (default: today)\n\
         \x20 {name} recent [--days N] [--json]       Print the rolling summary (default: 28 days)\n\
         \x20 {name} --help | --version\n\
         \n\
         FLAGS:\n\
         \x20 --dir PATH, -d PATH  Journal directory (default: current directory)\n\
         \x20 --days N, -n N       Window size for `recent`\n\
         \x20 --json               Structured output instead of text\n\
         \n\
         JOURNAL FORMAT:\n\
         \x20 A header line carries `@project` and `+task` markers; the lines under it\n\
         \x20 starting with `*`, `-`, or whitespace are entries for that pair. Entry dates\n\
         \x20 come from a YY-MM-DD substring in the file name, e.g. 25-06-01.md.\n\
         \n\
         ENV:\n\
         \x20 TRAIL_JOURNAL_DIR    Journal directory used when --dir is not given\n\
         \x20 XDG_STATE_HOME       Diagnostics go to $XDG_STATE_HOME/trail/trail.log\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui(dir: PathBuf) -> Result<(), crate::app::AppError> {
    let journal = build_journal(&dir)?;
    let mut model = AppModel::new(dir, journal);

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, &mut model);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, crate::app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), crate::app::AppError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
) -> Result<(), crate::app::AppError> {
    loop {
        terminal.draw(|frame| ui::render(frame, model))?;

        if event::poll(Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    app::handle_key(model, key);
                }
                _ => {}
            }
        }

        if model.rescan_requested {
            model.rescan_requested = false;
            // Rescan failures are fatal, same as the initial build.
            model.journal = build_journal(&model.journal_dir)?;
            app::clamp_after_rescan(model);
            model.notice = Some(format!(
                "rescanned: {} project(s)",
                model.journal.projects.len()
            ));
        }

        if model.should_quit {
            return Ok(());
        }
    }
}
