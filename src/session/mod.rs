// Session - the single owner of all renderer state
//
// Every inbound host message and every editor action is applied here, one
// at a time, in arrival order. Outbound requests go to the host through an
// unbounded channel and are never awaited: completion answers come back
// later as their own `completionItems` message.

pub mod completion;
pub mod edit_buffer;
pub mod events;
pub mod history;
pub mod output_log;
pub mod reassembler;

pub use completion::{common_prefix, CompletionCoordinator, CompletionOutcome, CompletionRequest};
pub use edit_buffer::{EditBuffer, PromptView, WordSpan};
pub use events::EditorAction;
pub use history::CommandHistory;
pub use output_log::OutputLog;
pub use reassembler::{LineReassembler, StreamKind};

use tokio::sync::mpsc;

use crate::config::{constants, Config};
use crate::protocol::{ClientMessage, HostMessage};
use crate::render::{contains_clear_screen, render_line, LineClass, Shaper, ShapingMode, StyleState};

/// Presentation settings a session needs from the configuration
#[derive(Debug, Clone)]
pub struct SessionOptions {
    pub prompt_prefix: String,
    pub cwd_prefix: String,
    pub scrollback_limit: usize,
    pub shaping: ShapingMode,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            prompt_prefix: constants::DEFAULT_PROMPT_PREFIX.to_string(),
            cwd_prefix: constants::DEFAULT_CWD_PREFIX.to_string(),
            scrollback_limit: constants::DEFAULT_SCROLLBACK_LIMIT,
            shaping: ShapingMode::default(),
        }
    }
}

impl From<&Config> for SessionOptions {
    fn from(config: &Config) -> Self {
        Self {
            prompt_prefix: config.prompt_prefix.clone(),
            cwd_prefix: config.cwd_prefix.clone(),
            scrollback_limit: config.scrollback_limit,
            shaping: config.shaping,
        }
    }
}

/// Commands that wipe the output log in addition to running in the shell
pub fn is_clear_command(command: &str) -> bool {
    let trimmed = command.trim();
    trimmed.eq_ignore_ascii_case("clear") || trimmed.eq_ignore_ascii_case("cls")
}

pub struct Session {
    options: SessionOptions,
    shaper: Box<dyn Shaper>,
    outbound: mpsc::UnboundedSender<ClientMessage>,

    reassembler: LineReassembler,
    stdout_style: StyleState,
    stderr_style: StyleState,
    log: OutputLog,

    buffer: EditBuffer,
    prompt: PromptView,
    history: CommandHistory,
    completion: CompletionCoordinator,

    cwd: Option<String>,
    exited: bool,
    exit_code: Option<i32>,
}

impl Session {
    pub fn new(options: SessionOptions, outbound: mpsc::UnboundedSender<ClientMessage>) -> Self {
        let shaper = options.shaping.build();
        let log = OutputLog::new(options.scrollback_limit);
        Self {
            options,
            shaper,
            outbound,
            reassembler: LineReassembler::new(),
            stdout_style: StyleState::default(),
            stderr_style: StyleState::default(),
            log,
            buffer: EditBuffer::new(),
            prompt: PromptView::default(),
            history: CommandHistory::new(),
            completion: CompletionCoordinator::new(),
            cwd: None,
            exited: false,
            exit_code: None,
        }
    }

    /// Use a custom shaper instead of the configured one
    pub fn with_shaper(mut self, shaper: Box<dyn Shaper>) -> Self {
        self.shaper = shaper;
        self.refresh_prompt();
        self
    }

    pub fn with_history(mut self, history: CommandHistory) -> Self {
        self.history = history;
        self
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn log(&self) -> &OutputLog {
        &self.log
    }

    pub fn buffer(&self) -> &EditBuffer {
        &self.buffer
    }

    pub fn prompt(&self) -> &PromptView {
        &self.prompt
    }

    pub fn prompt_prefix(&self) -> &str {
        &self.options.prompt_prefix
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_deref()
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn pending_completion(&self) -> Option<&CompletionRequest> {
        self.completion.pending()
    }

    pub fn stream_style(&self, stream: StreamKind) -> StyleState {
        match stream {
            StreamKind::Stdout => self.stdout_style,
            StreamKind::Stderr => self.stderr_style,
        }
    }

    // ── Inbound host messages ────────────────────────────────────────────────

    pub fn handle_host_message(&mut self, message: HostMessage) {
        tracing::debug!("host message: {}", message.kind());
        match message {
            HostMessage::Stdout { text } => self.handle_output(StreamKind::Stdout, &text),
            HostMessage::Stderr { text } => self.handle_output(StreamKind::Stderr, &text),
            HostMessage::Exit { code } => self.handle_exit(code),
            HostMessage::Cwd { path } => self.handle_cwd(path),
            HostMessage::CompletionItems { items, prefix } => {
                self.handle_completion_items(items, prefix.as_deref())
            }
        }
    }

    fn handle_output(&mut self, stream: StreamKind, chunk: &str) {
        if contains_clear_screen(chunk) {
            tracing::debug!("clear-screen sequence on {:?}", stream);
            self.clear_log();
        }
        for line in self.reassembler.consume(stream, chunk) {
            self.append_stream_line(stream, &line);
        }
    }

    fn handle_exit(&mut self, code: Option<i32>) {
        if self.exited {
            return;
        }
        self.exited = true;
        self.exit_code = code;

        for (stream, text) in self.reassembler.flush() {
            self.append_stream_line(stream, &text);
        }
        let banner = match code {
            Some(code) => format!("[process exited with code {}]", code),
            None => "[process exited]".to_string(),
        };
        self.append_plain(&banner, LineClass::None);

        self.completion.cancel();
        self.buffer.clear();
        self.buffer.lock();
        self.refresh_prompt();
    }

    fn handle_cwd(&mut self, path: String) {
        self.cwd = Some(path);
        self.show_cwd_line();
    }

    fn handle_completion_items(&mut self, items: Vec<String>, echoed_prefix: Option<&str>) {
        if self.exited {
            return;
        }
        match self.completion.resolve(items, echoed_prefix, &self.buffer) {
            CompletionOutcome::Discarded => return,
            CompletionOutcome::Unique(item) => self.buffer.replace_word(&item),
            CompletionOutcome::Ambiguous { fill, candidates } => {
                if let Some(fill) = fill {
                    self.buffer.replace_word(&fill);
                }
                self.append_plain(&candidates.join(" "), LineClass::None);
            }
        }
        self.refresh_prompt();
    }

    // ── Editor actions ───────────────────────────────────────────────────────

    pub fn handle_action(&mut self, action: EditorAction) {
        match action {
            EditorAction::Insert(text) => self.buffer.insert(&text),
            EditorAction::Backspace => self.buffer.backspace(),
            EditorAction::Delete => self.buffer.delete_forward(),
            EditorAction::CursorLeft => self.buffer.move_cursor(-1),
            EditorAction::CursorRight => self.buffer.move_cursor(1),
            EditorAction::CursorHome => self.buffer.move_to_start(),
            EditorAction::CursorEnd => self.buffer.move_to_end(),
            EditorAction::HistoryPrevious => self.history_previous(),
            EditorAction::HistoryNext => self.history_next(),
            EditorAction::Submit => self.submit(),
            EditorAction::Interrupt => self.interrupt(),
            EditorAction::Complete => self.request_completion(),
            EditorAction::ScrollUp(rows) => self.log.scroll_by(rows as isize),
            EditorAction::ScrollDown(rows) => self.log.scroll_by(-(rows as isize)),
        }
        self.refresh_prompt();
    }

    fn history_previous(&mut self) {
        if self.exited {
            return;
        }
        let current = self.buffer.text();
        if let Some(entry) = self.history.previous(&current).map(str::to_string) {
            self.buffer.set_text(&entry);
        }
    }

    fn history_next(&mut self) {
        if self.exited {
            return;
        }
        if let Some(entry) = self.history.next() {
            self.buffer.set_text(&entry);
        }
    }

    /// Echo the line, send it to the shell and reset the prompt
    pub fn submit(&mut self) {
        if self.exited {
            return;
        }
        let command = self.buffer.text();
        let echo = format!("{}{}", self.options.prompt_prefix, command);
        self.append_plain(&echo, LineClass::StdinEcho);
        self.send(ClientMessage::Input {
            text: command.clone(),
        });
        self.history.push(&command);
        self.completion.cancel();
        self.buffer.clear();

        if is_clear_command(&command) {
            self.clear_screen();
            self.show_cwd_line();
        }
        self.refresh_prompt();
    }

    pub fn interrupt(&mut self) {
        if self.exited {
            return;
        }
        self.send(ClientMessage::Interrupt);
        self.append_plain("^C", LineClass::StdinEcho);
        self.completion.cancel();
        self.buffer.clear();
        self.refresh_prompt();
    }

    pub fn request_completion(&mut self) {
        if self.exited {
            return;
        }
        let request = self.completion.request(&self.buffer);
        self.send(ClientMessage::Complete {
            prefix: request.prefix,
        });
    }

    // ── Output log plumbing ──────────────────────────────────────────────────

    /// Wipe the log and forget any open styles or partial lines
    pub fn clear_screen(&mut self) {
        self.clear_log();
        self.reassembler.reset();
    }

    /// Wipe the log and styles; a line still being received survives
    fn clear_log(&mut self) {
        self.log.clear();
        self.stdout_style = StyleState::default();
        self.stderr_style = StyleState::default();
    }

    fn show_cwd_line(&mut self) {
        if let Some(cwd) = self.cwd.clone() {
            let line = format!("{}{}", self.options.cwd_prefix, cwd);
            self.append_plain(&line, LineClass::None);
        }
    }

    fn append_stream_line(&mut self, stream: StreamKind, text: &str) {
        let (class, incoming) = match stream {
            StreamKind::Stdout => (LineClass::Stdout, self.stdout_style),
            StreamKind::Stderr => (LineClass::Stderr, self.stderr_style),
        };
        let (line, outgoing) = render_line(text, class, incoming, self.shaper.as_ref());
        match stream {
            StreamKind::Stdout => self.stdout_style = outgoing,
            StreamKind::Stderr => self.stderr_style = outgoing,
        }
        self.log.append(line);
    }

    fn append_plain(&mut self, text: &str, class: LineClass) {
        let (line, _) = render_line(text, class, StyleState::default(), self.shaper.as_ref());
        self.log.append(line);
    }

    fn refresh_prompt(&mut self) {
        self.prompt = self.buffer.render(self.shaper.as_ref());
    }

    fn send(&self, message: ClientMessage) {
        let kind = message.kind();
        if self.outbound.send(message).is_err() {
            tracing::warn!("host channel closed, dropping {} message", kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::PassthroughShaper;

    fn session() -> (Session, mpsc::UnboundedReceiver<ClientMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let options = SessionOptions {
            shaping: ShapingMode::None,
            ..SessionOptions::default()
        };
        (Session::new(options, tx), rx)
    }

    fn texts(session: &Session) -> Vec<String> {
        session.log().lines().map(|l| l.text()).collect()
    }

    fn type_text(session: &mut Session, text: &str) {
        session.handle_action(EditorAction::Insert(text.to_string()));
    }

    #[test]
    fn test_is_clear_command() {
        assert!(is_clear_command("clear"));
        assert!(is_clear_command("  CLS "));
        assert!(!is_clear_command("clear-host"));
        assert!(!is_clear_command("echo clear"));
    }

    #[test]
    fn test_submit_echoes_and_sends() {
        let (mut s, mut rx) = session();
        type_text(&mut s, "ls");
        s.handle_action(EditorAction::Submit);

        assert_eq!(texts(&s), vec!["PS> ls"]);
        assert_eq!(s.log().last().map(|l| l.class()), Some(LineClass::StdinEcho));
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::Input { text: "ls".into() });
        assert!(s.buffer().is_empty());
        assert_eq!(s.history().entries(), &["ls".to_string()]);
    }

    #[test]
    fn test_style_persists_between_chunks_per_stream() {
        let (mut s, _rx) = session();
        s.handle_host_message(HostMessage::Stdout { text: "\x1b[31mred".into() });
        s.handle_host_message(HostMessage::Stderr { text: "plain err\n".into() });
        s.handle_host_message(HostMessage::Stdout { text: " still red\n".into() });

        let lines: Vec<_> = s.log().lines().collect();
        assert_eq!(lines[0].class(), LineClass::Stderr);
        assert!(lines[0].fragments()[0].style.is_plain());
        assert_eq!(lines[1].text(), "red still red\n");
        assert!(lines[1].fragments().iter().all(|f| f.style.fg.is_some()));
    }

    #[test]
    fn test_interrupt_echo() {
        let (mut s, mut rx) = session();
        type_text(&mut s, "sleep 10");
        s.handle_action(EditorAction::Interrupt);
        assert_eq!(rx.try_recv().unwrap(), ClientMessage::Interrupt);
        assert_eq!(texts(&s), vec!["^C"]);
        assert!(s.buffer().is_empty());
    }

    #[test]
    fn test_exit_flushes_and_locks() {
        let (mut s, mut rx) = session();
        s.handle_host_message(HostMessage::Stdout { text: "partial".into() });
        s.handle_host_message(HostMessage::Exit { code: Some(0) });

        assert_eq!(texts(&s), vec!["partial", "[process exited with code 0]"]);
        type_text(&mut s, "more");
        s.handle_action(EditorAction::Submit);
        s.handle_action(EditorAction::Interrupt);
        s.handle_action(EditorAction::Complete);
        assert!(s.buffer().is_empty());
        assert!(rx.try_recv().is_err());
        assert!(s.has_exited());
    }

    #[test]
    fn test_exit_without_code() {
        let (mut s, _rx) = session();
        s.handle_host_message(HostMessage::Exit { code: None });
        assert_eq!(texts(&s), vec!["[process exited]"]);
    }

    #[test]
    fn test_cwd_line() {
        let (mut s, _rx) = session();
        s.handle_host_message(HostMessage::Cwd { path: "/tmp".into() });
        assert_eq!(s.cwd(), Some("/tmp"));
        assert_eq!(texts(&s), vec![format!("{}/tmp", constants::DEFAULT_CWD_PREFIX)]);
    }

    #[test]
    fn test_history_recall() {
        let (mut s, _rx) = session();
        type_text(&mut s, "first");
        s.handle_action(EditorAction::Submit);
        type_text(&mut s, "dra");
        s.handle_action(EditorAction::HistoryPrevious);
        assert_eq!(s.buffer().text(), "first");
        s.handle_action(EditorAction::HistoryNext);
        assert_eq!(s.buffer().text(), "dra");
    }

    #[test]
    fn test_prompt_rerendered_after_edit() {
        let (mut s, _rx) = session();
        type_text(&mut s, "abc");
        s.handle_action(EditorAction::CursorLeft);
        assert_eq!(s.prompt().before, "ab");
        assert_eq!(s.prompt().after, "c");
    }

    #[test]
    fn test_custom_shaper() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let s = Session::new(SessionOptions::default(), tx).with_shaper(Box::new(PassthroughShaper));
        assert!(s.prompt().before.is_empty());
    }
}
