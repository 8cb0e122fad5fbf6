mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use app::{
    AppCommand, AppError, AppModel, AppConfig, AppEvent, ProfileState, load_app_data,
};
use cli::{CliInvocation, CliParseError, CliRunError, TuiArgs, parse_invocation};
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use infra::{
    fetch_github_profile, resolve_github_user, resolve_loc_path, resolve_projects_path,
    resolve_remote_base,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::Stdout;
use std::process::ExitCode;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error("{0}")]
    Args(#[from] CliParseError),
    #[error(transparent)]
    App(#[from] AppError),
    #[error(transparent)]
    Cli(#[from] CliRunError),
}

fn main() -> ExitCode {
    match run_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("locdash: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run_main() -> Result<(), MainError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match parse_invocation(&args)? {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            println!("locdash {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Command(command) => Ok(cli::run(command)?),
        CliInvocation::Tui(tui_args) => Ok(run_tui(tui_args)?),
    }
}

fn print_help() {
    println!("locdash — commit dashboard for per-line change logs");
    println!();
    println!("Usage:");
    println!("  locdash [--loc PATH] [--projects PATH] [--user LOGIN] [--remote URL]");
    println!("  locdash stats [--loc PATH] [--json]");
    println!("  locdash commits [--loc PATH] [--remote URL] [--limit N] [--offset N] [--json]");
    println!("  locdash breakdown [--loc PATH]");
    println!();
    println!("Environment:");
    println!("  LOCDASH_LOC           change log path (default loc.csv)");
    println!("  LOCDASH_PROJECTS      projects listing path (default projects.json)");
    println!("  LOCDASH_GITHUB_USER   GitHub login for the profile view");
    println!("  LOCDASH_REMOTE        repository URL for commit links");
}

/// Kicks off the background profile fetch; the resulting state arrives over
/// the channel so the draw loop never blocks on the network.
fn spawn_profile_fetch(model: &mut AppModel, sender: &Sender<ProfileState>) {
    let Some(login) = model.data.config.github_user.clone() else {
        model.profile = ProfileState::Unconfigured;
        return;
    };
    model.profile = ProfileState::Loading;
    let sender = sender.clone();
    thread::spawn(move || {
        // The receiver is gone once the app exits; nothing to do then.
        let _ = sender.send(ProfileState::from_fetch(fetch_github_profile(&login)));
    });
}

fn run_tui(args: TuiArgs) -> Result<(), AppError> {
    let config = AppConfig {
        loc_path: resolve_loc_path(args.loc),
        projects_path: resolve_projects_path(args.projects),
        github_user: resolve_github_user(args.user),
        remote_base: resolve_remote_base(args.remote),
    };
    let data = load_app_data(config);

    let mut terminal = setup_terminal()?;
    let size = terminal.size()?;
    let mut model = AppModel::new(data).with_terminal_size(size.width, size.height);

    let result = run(&mut terminal, &mut model);
    restore_terminal(&mut terminal)?;
    result
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
) -> Result<(), AppError> {
    let (profile_tx, profile_rx): (Sender<ProfileState>, Receiver<ProfileState>) = channel();
    spawn_profile_fetch(model, &profile_tx);

    loop {
        while let Ok(state) = profile_rx.try_recv() {
            model.profile = state;
        }

        terminal.draw(|frame| ui::render(frame, model))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let app_event = match event::read()? {
            Event::Key(key) => {
                if key.kind == KeyEventKind::Release {
                    continue;
                }
                AppEvent::Key(key)
            }
            Event::Mouse(mouse) => AppEvent::Mouse(mouse),
            Event::Paste(text) => AppEvent::Paste(text),
            Event::Resize(width, height) => {
                model.terminal_size = (width, height);
                continue;
            }
            _ => continue,
        };

        let (next, command) = app::update(model.clone(), app_event);
        *model = next;
        match command {
            AppCommand::None => {}
            AppCommand::Quit => return Ok(()),
            AppCommand::Reload => {
                let data = load_app_data(model.data.config.clone());
                *model = model
                    .clone()
                    .with_data(data)
                    .with_notice(Some("Reloaded.".to_string()));
                spawn_profile_fetch(model, &profile_tx);
            }
        }
    }
}
