// Terminal front-end
//
// run_interactive() wires the pieces together: the host bridge on one side,
// the keyboard task on the other, and the event loop owning the session in
// between. The terminal is restored on every exit path.

pub mod event_loop;
pub mod input;
pub mod replay;
pub mod view;

pub use event_loop::EventLoop;
pub use input::{spawn_input_task, InputEvent};
pub use replay::{replay_file, ReplayFormat};
pub use view::ViewStyle;

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::{history_path, Config};
use crate::host::{spawn_host, HostOptions};
use crate::session::{CommandHistory, Session, SessionOptions};

/// How long to wait for the host task after the UI closes
const HOST_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

/// Launch-time choices that are not part of the config file
#[derive(Debug, Clone)]
pub struct LaunchOptions {
    pub shells: Vec<String>,
    pub cwd: PathBuf,
}

pub async fn run_interactive(config: Config, launch: LaunchOptions) -> Result<()> {
    let history_file = history_path().ok();
    let history = history_file
        .as_deref()
        .map(CommandHistory::load)
        .unwrap_or_default();

    let (client_tx, client_rx) = mpsc::unbounded_channel();
    let (host_tx, host_rx) = mpsc::unbounded_channel();
    let shutdown = CancellationToken::new();

    let host = spawn_host(
        HostOptions {
            shells: launch.shells,
            cwd: launch.cwd,
        },
        host_tx,
        client_rx,
        shutdown.clone(),
    )
    .context("Failed to start shell")?;

    let session = Session::new(SessionOptions::from(&config), client_tx).with_history(history);
    let style = ViewStyle {
        colors: config.colors.clone(),
        caret: config.caret.clone(),
    };

    let mut terminal = setup_terminal()?;
    let input_rx = spawn_input_task(shutdown.clone());
    let result = EventLoop::new(session, host_rx, input_rx, style)
        .run(&mut terminal)
        .await;
    restore_terminal(&mut terminal)?;

    shutdown.cancel();
    if tokio::time::timeout(HOST_SHUTDOWN_TIMEOUT, host).await.is_err() {
        tracing::warn!("host task did not stop in time");
    }

    let session = result?;
    if let Some(path) = history_file {
        if let Err(e) = save_history(session.history(), &path) {
            tracing::warn!("{:#}", e);
        }
    }
    Ok(())
}

fn save_history(history: &CommandHistory, path: &std::path::Path) -> Result<()> {
    history
        .save(path)
        .with_context(|| format!("Failed to save history to {}", path.display()))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    crossterm::terminal::enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(
        stdout,
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableBracketedPaste
    )?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).context("Failed to create terminal")
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::event::DisableBracketedPaste
    )?;
    terminal.show_cursor()?;
    Ok(())
}
