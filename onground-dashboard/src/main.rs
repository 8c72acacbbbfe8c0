use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;

use onground_dashboard::app::App;
use onground_dashboard::backend::HttpBackend;
use onground_dashboard::cli::{Args, Command};
use onground_dashboard::config::DashboardConfig;
use onground_dashboard::logging::{init_file_logging, init_stderr_logging};
use onground_dashboard::ui::ui;

fn main() -> Result<()> {
    let args = Args::parse();
    let config = DashboardConfig::load(args.config.as_deref(), args.base_url.as_deref())?;

    match args.command() {
        Command::Tui => run_tui(&config),
        Command::Send {
            message,
            timeout_secs,
        } => run_send(&config, &message, Duration::from_secs(timeout_secs)),
    }
}

fn build_app(config: &DashboardConfig) -> Result<App> {
    let backend = HttpBackend::new(&config.base_url, config.request_timeout())?;
    App::new(config, Arc::new(backend))
}

fn run_tui(config: &DashboardConfig) -> Result<()> {
    init_file_logging(config.log_path().as_deref())?;
    tracing::info!(base_url = %config.base_url, "starting dashboard");

    let mut app = build_app(config)?;
    app.start();

    // Setup terminal
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, config.tick_rate());

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "dashboard exited with an error");
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick_rate: Duration,
) -> Result<()> {
    loop {
        app.process_pending();

        terminal.draw(|f| ui(f, app))?;

        if app.should_quit {
            return Ok(());
        }

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key);
                }
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
        }
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Enter => {
            app.submit_chat();
        }
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::End => {
            app.dashboard.log.scroll_to_end();
            app.dashboard.chat.scroll_back = 0;
        }
        KeyCode::Backspace => {
            app.input_buffer.pop();
        }
        KeyCode::Char(c) => app.input_buffer.push(c),
        _ => {}
    }
}

fn run_send(config: &DashboardConfig, message: &str, timeout: Duration) -> Result<()> {
    init_stderr_logging();
    tracing::info!(base_url = %config.base_url, "sending one message");

    let mut app = build_app(config)?;
    app.start();
    if !app.wait_idle(timeout) {
        bail!("Timed out loading dashboard data from {}", config.base_url);
    }

    app.input_buffer = message.to_string();
    if !app.submit_chat() {
        bail!("Message is empty");
    }
    if !app.wait_idle(timeout) {
        bail!("Timed out waiting for the agent after {}s", timeout.as_secs());
    }

    println!("== Chat ==");
    for line in app.dashboard.chat.transcript_lines() {
        println!("{}", line);
    }

    println!();
    println!("== Execution Log ==");
    for line in app.dashboard.log.lines() {
        println!("{}", line);
    }

    let header = &app.dashboard.header;
    println!();
    println!(
        "Session: {}  Agents: {}  Duration: {}",
        header.session_id,
        header.agents_completed,
        header.duration.as_deref().unwrap_or("-")
    );

    Ok(())
}
