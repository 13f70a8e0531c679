//! flameshop - a terminal fan-shop landing page.
//!
//! Outbound links play a short transition: a full-screen overlay with a
//! themed message, a synthesized whoosh, then navigation in the browser.
//! A simulated shop sits next to the links.
//!
//! # Usage
//!
//! ```bash
//! flameshop                          # Terminal UI
//! flameshop whoosh                   # Play the whoosh once
//! flameshop export whoosh.wav        # Render the whoosh to a WAV file
//! flameshop open https://example.com # Run one transition headlessly
//! flameshop --dry-run follow --dm    # Log the deep link instead of opening it
//! ```
//!
//! Press `?` in the UI for keyboard shortcuts.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
    MouseButton, MouseEvent, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use flameshop::app::{App, FocusedPanel};
use flameshop::audio::{export_whoosh_wav, AudioBackend, Cue, NullBackend, RodioBackend};
use flameshop::config::Config;
use flameshop::sequencer::{
    BrowserHost, Click, ClickButton, LinkInterceptor, LoggingHost, NavigationHost, OpenMode,
    OverlayController, Scheduler, Sequencer, SystemClock,
};
use flameshop::shop::Shop;
use flameshop::{ui, WhooshPlayer};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Mutex;

/// Command-line options.
#[derive(Debug, Parser)]
#[command(name = "flameshop", version, about)]
struct Cli {
    /// JSON config file; every field is optional.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write logs to this file (the UI owns the terminal).
    #[arg(long, global = true, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Disable audio output.
    #[arg(long, global = true)]
    mute: bool,

    /// Log navigations instead of opening the browser.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the terminal UI (default).
    Tui,
    /// Play the whoosh once and exit.
    Whoosh,
    /// Render the whoosh to a 16-bit WAV file.
    Export {
        output: PathBuf,
        #[arg(long, default_value_t = 44_100)]
        sample_rate: u32,
    },
    /// Run one overlay transition to URL without the UI.
    Open {
        url: String,
        /// Open in a new tab instead of the current one.
        #[arg(long)]
        new_tab: bool,
    },
    /// Open the Instagram profile through the deep-link sequence.
    Follow {
        /// Fall back to the DM page instead of the profile.
        #[arg(long)]
        dm: bool,
    },
}

/// Main entry point.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);
    init_tracing(cli.log_file.as_deref(), matches!(command, Command::Tui))?;

    let config = Config::load(cli.config.as_deref())?;
    let host: Rc<dyn NavigationHost> = if cli.dry_run {
        Rc::new(LoggingHost)
    } else {
        Rc::new(BrowserHost::new())
    };
    let audio: Rc<dyn AudioBackend> = if cli.mute {
        Rc::new(NullBackend::new("muted"))
    } else {
        Rc::new(RodioBackend::new())
    };

    match command {
        Command::Tui => run_tui(config, host, audio),
        Command::Whoosh => {
            let player = WhooshPlayer::new(audio, config.whoosh);
            let mut scheduler = Scheduler::new(Rc::new(SystemClock::new()));
            player.play(&mut scheduler);
            scheduler.run_until_idle();
            Ok(())
        }
        Command::Export {
            output,
            sample_rate,
        } => {
            let samples =
                export_whoosh_wav(&config.whoosh, sample_rate, &output, &mut rand::rng())
                    .with_context(|| format!("Failed to export {}", output.display()))?;
            println!("Wrote {} samples to {}", samples, output.display());
            Ok(())
        }
        Command::Open { url, new_tab } => {
            let mode = if new_tab {
                OpenMode::NewTab
            } else {
                OpenMode::SameTab
            };
            let message = LinkInterceptor::new(config.messages.clone())
                .pick_message(&mut rand::rng())
                .to_string();
            run_headless(&config, host, audio, |sequencer, scheduler| {
                sequencer.trigger_transition(scheduler, &url, mode, &message);
            });
            Ok(())
        }
        Command::Follow { dm } => {
            let fallback = if dm {
                config.shop.dm_url.clone()
            } else {
                config.shop.follow_url.clone()
            };
            let uri = config.shop.instagram_app_uri();
            let message = config.deep_link_message.clone();
            run_headless(&config, host, audio, |sequencer, scheduler| {
                sequencer.trigger_deep_link(scheduler, &uri, &fallback, &message);
            });
            Ok(())
        }
    }
}

/// Sends logs to `log_file` if given; otherwise to stderr, or nowhere
/// while the UI owns the terminal.
fn init_tracing(log_file: Option<&Path>, tui: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None if tui => builder.with_writer(io::sink).init(),
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

/// Runs one sequence to completion on the wall clock.
fn run_headless(
    config: &Config,
    host: Rc<dyn NavigationHost>,
    audio: Rc<dyn AudioBackend>,
    trigger: impl FnOnce(&mut Sequencer, &mut Scheduler),
) {
    let overlay = OverlayController::new();
    let cue = Rc::new(WhooshPlayer::new(audio, config.whoosh.clone()));
    let mut sequencer = Sequencer::new(
        overlay.clone(),
        host,
        cue,
        config.timings.clone(),
        config.overlap_policy,
    );
    let mut scheduler = Scheduler::new(Rc::new(SystemClock::new()));

    trigger(&mut sequencer, &mut scheduler);
    println!("{}", overlay.message());
    scheduler.run_until_idle();
}

fn run_tui(
    config: Config,
    host: Rc<dyn NavigationHost>,
    audio: Rc<dyn AudioBackend>,
) -> Result<()> {
    let shop = Shop::from_config(&config.shop).context("Failed to open shop storage")?;
    let mut app = App::new(config, Rc::new(SystemClock::new()), host, audio, shop);

    let mut terminal = setup_terminal().context("Failed to setup terminal")?;
    let result = run_app(&mut terminal, &mut app);
    restore_terminal(&mut terminal).context("Failed to restore terminal")?;
    result
}

/// Sets up the terminal for TUI rendering.
fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend).context("Failed to create terminal")?;
    Ok(terminal)
}

/// Restores the terminal to its original state.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}

/// Main application loop.
fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        app.tick();

        terminal.draw(|frame| ui::render(frame, app))?;

        // Wake in time for the next scheduled transition step
        if event::poll(app.poll_timeout())? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if handle_key(app, key.code, key.modifiers) {
                        return Ok(());
                    }
                }
                Event::Mouse(mouse) => handle_mouse(app, mouse),
                _ => {}
            }
        }
    }
}

/// Handles a key press.
///
/// # Returns
///
/// `true` if the application should quit
fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) -> bool {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    // The overlay covers the page; only cancelling or quitting gets through
    if app.overlay().visible {
        match code {
            KeyCode::Esc => app.cancel_transition(),
            KeyCode::Char('q') => return true,
            _ => {}
        }
        return false;
    }

    if app.show_help {
        if matches!(code, KeyCode::Char('?') | KeyCode::Esc) {
            app.toggle_help();
        }
        return false;
    }

    if app.login_dialog.open {
        match code {
            KeyCode::Enter => app.login_confirm(),
            KeyCode::Esc => app.login_cancel(),
            KeyCode::Tab => app.login_toggle_follows(),
            KeyCode::Backspace => app.login_backspace(),
            KeyCode::Char(c) => app.login_input(c),
            _ => {}
        }
        return false;
    }

    if app.product_dialog.open {
        match code {
            KeyCode::Enter => app.product_confirm(),
            KeyCode::Esc => app.product_cancel(),
            KeyCode::Tab => app.product_next_field(),
            KeyCode::Backspace => app.product_backspace(),
            KeyCode::Char(c) => app.product_input(c),
            _ => {}
        }
        return false;
    }

    if app.dm_dialog.open {
        match code {
            KeyCode::Enter => app.dm_confirm(),
            KeyCode::Esc => app.dm_cancel(),
            KeyCode::Backspace => app.dm_backspace(),
            KeyCode::Char(c) => app.dm_input(c),
            _ => {}
        }
        return false;
    }

    match code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Esc => app.cancel_transition(),
        KeyCode::Tab => app.cycle_focus(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),

        KeyCode::Enter => match app.focus {
            FocusedPanel::Links => app.activate_link(app.selected_link, Click::primary()),
            FocusedPanel::Shop => app.buy_selected(),
            FocusedPanel::Mailbox => app.open_reply(),
        },
        KeyCode::Char('o') if app.focus == FocusedPanel::Links => {
            app.activate_link(app.selected_link, Click::with_ctrl());
        }
        KeyCode::Char('f') => app.follow_on_instagram(),
        KeyCode::Char('m') => app.dm_on_instagram(),

        KeyCode::Char('l') => app.open_login_dialog(),
        KeyCode::Char('L') => app.logout(),
        KeyCode::Char('b') => app.buy_selected(),
        KeyCode::Char('d') => app.open_product_dm(),
        KeyCode::Char('a') => app.open_add_product(),
        KeyCode::Char('e') => app.open_edit_product(),
        KeyCode::Char('x') => app.delete_selected_product(),
        KeyCode::Char('r') => app.open_reply(),
        _ => {}
    }
    false
}

/// Handles mouse input: clicks on links, products and messages.
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let MouseEventKind::Down(button) = mouse.kind else {
        return;
    };
    if app.overlay().visible || app.has_modal() {
        return;
    }

    let (x, y) = (mouse.column, mouse.row);
    if let Some(index) = app.layout.link_at(x, y) {
        let click = Click {
            button: match button {
                MouseButton::Left => ClickButton::Primary,
                MouseButton::Middle => ClickButton::Middle,
                MouseButton::Right => ClickButton::Secondary,
            },
            ctrl: mouse.modifiers.contains(KeyModifiers::CONTROL),
            meta: mouse.modifiers.contains(KeyModifiers::SUPER),
        };
        app.focus = FocusedPanel::Links;
        app.activate_link(index, click);
    } else if let Some(index) = app.layout.product_at(x, y) {
        app.focus = FocusedPanel::Shop;
        app.selected_product = index;
    } else if let Some(index) = app.layout.message_at(x, y) {
        app.focus = FocusedPanel::Mailbox;
        app.selected_message = index;
    }
}
