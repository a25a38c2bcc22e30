// Event loop - one task owns the session and the terminal
//
// Host messages, key presses and the redraw tick are multiplexed with
// tokio::select!. Each event is applied to the session in full before the
// next one is taken, and the screen is redrawn at most once per tick.

use std::time::Duration;

use anyhow::{Context, Result};
use ratatui::backend::Backend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use super::input::InputEvent;
use super::view::{self, ViewStyle};
use crate::config::constants::RENDER_TICK_MS;
use crate::protocol::HostMessage;
use crate::session::Session;

pub struct EventLoop {
    session: Session,
    host_rx: mpsc::UnboundedReceiver<HostMessage>,
    input_rx: mpsc::UnboundedReceiver<InputEvent>,
    style: ViewStyle,
    dirty: bool,
}

impl EventLoop {
    pub fn new(
        session: Session,
        host_rx: mpsc::UnboundedReceiver<HostMessage>,
        input_rx: mpsc::UnboundedReceiver<InputEvent>,
        style: ViewStyle,
    ) -> Self {
        Self {
            session,
            host_rx,
            input_rx,
            style,
            dirty: true,
        }
    }

    /// Run until the user quits or the keyboard goes away; returns the session
    pub async fn run<B: Backend>(mut self, terminal: &mut Terminal<B>) -> Result<Session> {
        let mut render_interval = tokio::time::interval(Duration::from_millis(RENDER_TICK_MS));
        let mut host_open = true;

        loop {
            tokio::select! {
                message = self.host_rx.recv(), if host_open => match message {
                    Some(message) => {
                        self.session.handle_host_message(message);
                        self.dirty = true;
                    }
                    None => {
                        tracing::debug!("host channel closed");
                        host_open = false;
                    }
                },

                input = self.input_rx.recv() => match input {
                    Some(InputEvent::Action(action)) => {
                        tracing::trace!("action: {:?}", action);
                        self.session.handle_action(action);
                        self.dirty = true;
                    }
                    Some(InputEvent::Resize) => self.dirty = true,
                    Some(InputEvent::Quit) | None => break,
                },

                _ = render_interval.tick() => {
                    if self.dirty {
                        self.draw(terminal)?;
                    }
                }
            }
        }

        Ok(self.session)
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let session = &self.session;
        let style = &self.style;
        terminal
            .draw(|frame| view::draw(frame, session, style))
            .context("Failed to draw terminal frame")?;
        self.dirty = false;
        Ok(())
    }
}
