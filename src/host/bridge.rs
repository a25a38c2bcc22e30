// Host bridge task
//
// spawn_host() starts the first shell candidate that launches, announces the
// initial working directory, and hands the child to a background task. The
// task forwards stdout/stderr chunks, services input/interrupt/complete
// requests and reports the exit status once both pipes have drained.
//
// On unix the shell leads its own process group. POSIX shells get a no-op
// SIGINT trap first, so an interrupt sent to the whole group stops the
// running command and leaves the shell alive. Shells without `trap` get the
// ETX byte instead.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, ChildStdin, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::completion::path_completions;
use super::cwd::{normalize, CwdTracker};
use super::HostError;
use crate::protocol::{ClientMessage, HostMessage};
use crate::session::StreamKind;

const READ_CHUNK: usize = 4096;

/// How long to wait for the pipes to drain after the shell exits
const DRAIN_TIMEOUT: Duration = Duration::from_millis(500);

/// Keeps a POSIX shell alive when its process group is interrupted
#[cfg(unix)]
const INTERRUPT_GUARD: &[u8] = b"trap true INT\n";

/// Shells that understand `trap true INT`
#[cfg(unix)]
const TRAP_SHELLS: &[&str] = &["sh", "bash", "dash", "zsh", "ksh", "mksh", "ash", "yash", "fish"];

/// How the host starts its shell
#[derive(Debug, Clone)]
pub struct HostOptions {
    /// Executables tried in order
    pub shells: Vec<String>,
    /// Initial working directory
    pub cwd: PathBuf,
}

/// Start the shell and the task that serves it
///
/// The initial `cwd` message is sent before the shell starts. Fails only
/// when no candidate could be spawned.
pub fn spawn_host(
    options: HostOptions,
    events: mpsc::UnboundedSender<HostMessage>,
    requests: mpsc::UnboundedReceiver<ClientMessage>,
    shutdown: CancellationToken,
) -> Result<JoinHandle<()>, HostError> {
    let cwd = absolute_dir(&options.cwd)?;

    let _ = events.send(HostMessage::Cwd {
        path: cwd.display().to_string(),
    });

    let (mut child, shell) = spawn_first(&options.shells, &cwd)?;
    info!("started shell `{}` in {}", shell, cwd.display());

    let stdout = child.stdout.take().ok_or_else(|| HostError::MissingPipe {
        shell: shell.clone(),
        stream: "stdout",
    })?;
    let stderr = child.stderr.take().ok_or_else(|| HostError::MissingPipe {
        shell: shell.clone(),
        stream: "stderr",
    })?;
    let stdin = child.stdin.take();

    let readers = [
        tokio::spawn(forward_stream(stdout, StreamKind::Stdout, events.clone())),
        tokio::spawn(forward_stream(stderr, StreamKind::Stderr, events.clone())),
    ];

    let bridge = Bridge {
        child,
        stdin,
        cwd: CwdTracker::new(cwd),
        events,
        group_interrupt: supports_trap(&shell),
    };
    Ok(tokio::spawn(bridge.run(requests, readers, shutdown)))
}

/// Absolute form of `dir`, which must exist
fn absolute_dir(dir: &Path) -> Result<PathBuf, HostError> {
    let absolute = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        std::env::current_dir()?.join(dir)
    };
    let absolute = normalize(&absolute);
    match std::fs::metadata(&absolute) {
        Ok(meta) if meta.is_dir() => Ok(absolute),
        Ok(_) => Err(HostError::BadCwd {
            path: absolute.display().to_string(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "not a directory"),
        }),
        Err(source) => Err(HostError::BadCwd {
            path: absolute.display().to_string(),
            source,
        }),
    }
}

/// Whether `shell` is a POSIX-style shell that accepts the interrupt guard
#[cfg(unix)]
fn supports_trap(shell: &str) -> bool {
    Path::new(shell)
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| TRAP_SHELLS.contains(&name))
}

#[cfg(not(unix))]
fn supports_trap(_shell: &str) -> bool {
    false
}

fn spawn_first(shells: &[String], cwd: &Path) -> Result<(Child, String), HostError> {
    for shell in shells {
        let mut command = Command::new(shell);
        command
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);
        match command.spawn() {
            Ok(child) => return Ok((child, shell.clone())),
            Err(e) => debug!("shell `{}` unavailable: {}", shell, e),
        }
    }
    Err(HostError::NoShell {
        tried: shells.to_vec(),
    })
}

/// Forward raw chunks from one pipe until EOF
///
/// Multi-byte characters split across reads are held back until complete;
/// invalid bytes are replaced.
async fn forward_stream<R>(mut pipe: R, stream: StreamKind, events: mpsc::UnboundedSender<HostMessage>)
where
    R: AsyncRead + Unpin,
{
    let mut buf = vec![0u8; READ_CHUNK];
    let mut decoder = Utf8Chunker::default();
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.push(&buf[..n]);
                if !text.is_empty() && events.send(HostMessage::output(stream, text)).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("{:?} read failed: {}", stream, e);
                break;
            }
        }
    }
    let rest = decoder.finish();
    if !rest.is_empty() {
        let _ = events.send(HostMessage::output(stream, rest));
    }
}

/// Incremental UTF-8 decoding of a byte stream
#[derive(Debug, Default)]
pub struct Utf8Chunker {
    carry: Vec<u8>,
}

impl Utf8Chunker {
    /// Decode as much of the buffered input as forms complete characters
    pub fn push(&mut self, bytes: &[u8]) -> String {
        self.carry.extend_from_slice(bytes);
        let keep = incomplete_tail(&self.carry);
        let complete: Vec<u8> = self.carry.drain(..self.carry.len() - keep).collect();
        String::from_utf8_lossy(&complete).into_owned()
    }

    /// Decode whatever is left, replacing a truncated character
    pub fn finish(&mut self) -> String {
        let rest = std::mem::take(&mut self.carry);
        String::from_utf8_lossy(&rest).into_owned()
    }
}

/// Length of a trailing, not yet complete UTF-8 sequence
fn incomplete_tail(bytes: &[u8]) -> usize {
    match std::str::from_utf8(bytes) {
        Ok(_) => 0,
        Err(e) if e.error_len().is_none() => bytes.len() - e.valid_up_to(),
        Err(_) => {
            // Invalid bytes somewhere; only hold back a trailing partial sequence
            let start = bytes.len().saturating_sub(3);
            (start..bytes.len())
                .find(|&i| {
                    let b = bytes[i];
                    b & 0xC0 == 0xC0 && std::str::from_utf8(&bytes[i..]).err().is_some_and(|e| e.error_len().is_none())
                })
                .map_or(0, |i| bytes.len() - i)
        }
    }
}

struct Bridge {
    child: Child,
    stdin: Option<ChildStdin>,
    cwd: CwdTracker,
    events: mpsc::UnboundedSender<HostMessage>,
    /// Interrupts go to the process group instead of stdin
    group_interrupt: bool,
}

impl Bridge {
    async fn run(
        mut self,
        mut requests: mpsc::UnboundedReceiver<ClientMessage>,
        mut readers: [JoinHandle<()>; 2],
        shutdown: CancellationToken,
    ) {
        self.install_interrupt_guard().await;
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("host bridge shutting down");
                    self.kill();
                    break;
                }

                status = self.child.wait() => {
                    // Exit goes out after the last output chunk
                    for reader in &mut readers {
                        if tokio::time::timeout(DRAIN_TIMEOUT, reader).await.is_err() {
                            debug!("output pipe still open after exit");
                        }
                    }
                    let code = match status {
                        Ok(status) => status.code(),
                        Err(e) => {
                            warn!("waiting for shell failed: {}", e);
                            None
                        }
                    };
                    info!("shell exited with {:?}", code);
                    let _ = self.events.send(HostMessage::Exit { code });
                    break;
                }

                request = requests.recv() => match request {
                    Some(request) => self.handle_request(request).await,
                    None => {
                        debug!("session closed the request channel");
                        self.kill();
                        break;
                    }
                },
            }
        }
    }

    async fn handle_request(&mut self, request: ClientMessage) {
        debug!("host request: {}", request.kind());
        match request {
            ClientMessage::Input { text } => self.write_input(text).await,
            ClientMessage::Interrupt => self.interrupt().await,
            ClientMessage::Complete { prefix } => {
                let items = path_completions(&prefix, self.cwd.current());
                let _ = self.events.send(HostMessage::CompletionItems {
                    items,
                    prefix: Some(prefix),
                });
            }
        }
    }

    async fn write_input(&mut self, mut text: String) {
        if let Some(dir) = self.cwd.observe(&text) {
            let _ = self.events.send(HostMessage::Cwd {
                path: dir.display().to_string(),
            });
        }
        let Some(stdin) = self.stdin.as_mut() else {
            debug!("input after stdin closed, dropped");
            return;
        };
        if !text.ends_with('\n') {
            text.push('\n');
        }
        let written = async {
            stdin.write_all(text.as_bytes()).await?;
            stdin.flush().await
        }
        .await;
        if let Err(e) = written {
            warn!("writing to shell stdin failed: {}", e);
        }
    }

    #[cfg(unix)]
    async fn install_interrupt_guard(&mut self) {
        if !self.group_interrupt {
            return;
        }
        let written = match self.stdin.as_mut() {
            Some(stdin) => stdin.write_all(INTERRUPT_GUARD).await,
            None => Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
        };
        if let Err(e) = written {
            warn!("installing SIGINT trap failed ({}), interrupts go through stdin", e);
            self.group_interrupt = false;
        }
    }

    #[cfg(not(unix))]
    async fn install_interrupt_guard(&mut self) {}

    async fn interrupt(&mut self) {
        #[cfg(unix)]
        if self.group_interrupt {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let sent = match self.child.id() {
                Some(pid) => killpg(Pid::from_raw(pid as i32), Signal::SIGINT).map_err(|e| e.to_string()),
                None => Err("shell has no pid".to_string()),
            };
            if let Err(e) = sent {
                warn!("SIGINT failed ({}), killing shell", e);
                self.kill();
            }
            return;
        }

        let written = match self.stdin.as_mut() {
            Some(stdin) => async {
                stdin.write_all(b"\x03").await?;
                stdin.flush().await
            }
            .await,
            None => Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe)),
        };
        if let Err(e) = written {
            warn!("interrupt write failed ({}), killing shell", e);
            self.kill();
        }
    }

    fn kill(&mut self) {
        #[cfg(unix)]
        if let Some(pid) = self.child.id() {
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            // Takes down commands the shell started as well
            if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                debug!("killpg: {}", e);
            }
        }
        if let Err(e) = self.child.start_kill() {
            debug!("kill: {}", e);
        }
    }
}
