//! clawdeck CLI - binary entry point and terminal session management.
//!
//! # Architecture
//!
//! The CLI bridges [`clawdeck_engine`] (dashboard state) and [`clawdeck_tui`]
//! (rendering), providing RAII-based terminal management with guaranteed
//! cleanup.
//!
//! # Event Loop
//!
//! A fixed frame cadence drives everything:
//!
//! 1. Wait for frame tick
//! 2. Drain input queue (non-blocking via [`clawdeck_tui::InputPump`])
//! 3. Apply finished gateway calls and start due polls (`app.tick()`)
//! 4. Render frame

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableBracketedPaste, EnableBracketedPaste},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io::{Stdout, stdout},
    path::PathBuf,
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use clawdeck_engine::{App, GatewayClient, Overrides, Settings, log_dir};
use clawdeck_tui::{InputPump, draw, handle_events, log_viewport};

const LOG_FILE_NAME: &str = "clawdeck.log";
const FRAME_DURATION: Duration = Duration::from_millis(50);

/// Terminal dashboard for OpenClaw agent sessions.
#[derive(Debug, Parser)]
#[command(name = "clawdeck", version, about)]
struct Cli {
    /// Gateway base URL (overrides config and OPENCLAW_GATEWAY_URL)
    #[arg(long)]
    url: Option<String>,

    /// Gateway bearer token (overrides config and OPENCLAW_GATEWAY_TOKEN)
    #[arg(long)]
    token: Option<String>,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if let Some((log_path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %log_path.display(), "Logging initialized");
    }
    // Without a log file there are no logs; the TUI owns stdout/stderr.
}

fn open_log_file() -> Option<(PathBuf, fs::File)> {
    let dir = log_dir()?;
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .ok()?;
    Some((path, file))
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(stdout(), LeaveAlternateScreen, DisableBracketedPaste);
}

/// RAII wrapper for terminal state with guaranteed cleanup on drop.
///
/// Raw mode, bracketed paste and the alternate screen are entered on
/// construction and restored on drop, so the terminal stays usable after an
/// early return. Panics are covered by the hook installed in [`main`].
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;

        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen, EnableBracketedPaste) {
            restore_terminal();
            return Err(err.into());
        }

        match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(err) => {
                restore_terminal();
                Err(err.into())
            }
        }
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableBracketedPaste
        );
        let _ = self.terminal.show_cursor();
    }
}

fn install_panic_hook() {
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        tracing::error!("panic: {info}");
        previous(info);
    }));
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let settings = Settings::load(&Overrides {
        url: cli.url,
        token: cli.token,
    });
    tracing::info!(url = %settings.gateway_url, "starting");

    let gateway = GatewayClient::from_settings(&settings).context("failed to create gateway client")?;
    let mut app = App::new(Arc::new(gateway), &settings);

    install_panic_hook();
    let result = {
        let mut session = TerminalSession::new().context("failed to set up terminal")?;
        run_app(&mut session.terminal, &mut app).await
    };

    if let Err(err) = &result {
        tracing::error!("{err:?}");
    }
    result
}

async fn run_app<B>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
{
    let mut input = InputPump::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result: Result<()> = loop {
        frames.tick().await;

        // Non-blocking input (drain queue only)
        match handle_events(app, &mut input) {
            Ok(true) => break Ok(()),
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        let size = match terminal.size() {
            Ok(size) => size,
            Err(e) => break Err(e.into()),
        };
        app.set_log_viewport(log_viewport(Rect::new(0, 0, size.width, size.height)));
        app.tick(Instant::now());

        if let Err(e) = terminal.draw(|frame| draw(frame, app)) {
            break Err(e.into());
        }
    };

    input.shutdown().await;
    result
}
