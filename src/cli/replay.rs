// Replay - render a recorded host transcript without a terminal UI
//
// A transcript is a JSON Lines file of host messages, one per line, exactly
// as the bridge would send them. Each message goes through a fresh session
// and the resulting output log is printed either as plain text or with the
// resolved styles re-encoded as 24-bit SGR sequences.

use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::protocol::decode_host_message;
use crate::render::{strip_escapes, OutputLine, StyleState};
use crate::session::{Session, SessionOptions};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayFormat {
    /// Text only
    Plain,
    /// Text with SGR escapes rebuilt from the resolved styles
    Styled,
}

/// Feed every message of a transcript into a new session
///
/// Undecodable lines are logged and skipped.
pub fn replay_session<R: BufRead>(reader: R, options: SessionOptions) -> Result<Session> {
    let (tx, _rx) = mpsc::unbounded_channel();
    let mut session = Session::new(options, tx);

    for (index, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read transcript line {}", index + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        match decode_host_message(&line) {
            Ok(message) => session.handle_host_message(message),
            Err(e) => tracing::warn!("skipping transcript line {}: {}", index + 1, e),
        }
    }
    Ok(session)
}

/// Replay `path` and write the rendered log to `out`
pub fn replay_file(path: &Path, options: SessionOptions, format: ReplayFormat, out: &mut impl Write) -> Result<()> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open transcript {}", path.display()))?;
    let session = replay_session(BufReader::new(file), options)?;
    write_log(&session, format, out)
}

pub fn write_log(session: &Session, format: ReplayFormat, out: &mut impl Write) -> Result<()> {
    for line in session.log().lines() {
        let rendered = match format {
            ReplayFormat::Plain => strip_escapes(line.text().trim_end_matches('\n')).into_owned(),
            ReplayFormat::Styled => to_sgr(line),
        };
        writeln!(out, "{}", rendered).context("Failed to write replay output")?;
    }
    out.flush().context("Failed to flush replay output")?;
    Ok(())
}

/// Re-encode a rendered line with explicit SGR sequences
pub fn to_sgr(line: &OutputLine) -> String {
    let mut out = String::new();
    let mut current = StyleState::default();
    for fragment in line.fragments() {
        let text = strip_escapes(fragment.text.trim_end_matches('\n'));
        if text.is_empty() {
            continue;
        }
        if fragment.style != current {
            out.push_str(&sgr_for(fragment.style));
            current = fragment.style;
        }
        out.push_str(&text);
    }
    if !current.is_plain() {
        out.push_str("\x1b[0m");
    }
    out
}

/// Full SGR sequence for `style`, starting from a reset
fn sgr_for(style: StyleState) -> String {
    let mut codes = vec!["0".to_string()];
    if style.bold {
        codes.push("1".into());
    }
    if style.italic {
        codes.push("3".into());
    }
    if style.underline {
        codes.push("4".into());
    }
    if let Some(fg) = style.fg {
        codes.push(format!("38;2;{};{};{}", fg.r, fg.g, fg.b));
    }
    if let Some(bg) = style.bg {
        codes.push(format!("48;2;{};{};{}", bg.r, bg.g, bg.b));
    }
    format!("\x1b[{}m", codes.join(";"))
}
