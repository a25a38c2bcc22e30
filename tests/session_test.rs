// Session behaviour end to end: host messages in, log lines and requests out

use rtl_shell::config::constants::DEFAULT_CWD_PREFIX;
use rtl_shell::protocol::{ClientMessage, HostMessage};
use rtl_shell::render::{LineClass, ShapingMode};
use rtl_shell::session::{EditorAction, Session, SessionOptions};
use tokio::sync::mpsc;

fn new_session() -> (Session, mpsc::UnboundedReceiver<ClientMessage>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let options = SessionOptions {
        shaping: ShapingMode::None,
        ..SessionOptions::default()
    };
    (Session::new(options, tx), rx)
}

fn log_texts(session: &Session) -> Vec<String> {
    session.log().lines().map(|l| l.text()).collect()
}

fn type_line(session: &mut Session, text: &str) {
    session.handle_action(EditorAction::Insert(text.to_string()));
}

#[test]
fn test_clear_leaves_single_cwd_line_and_forwards_input() {
    let (mut session, mut rx) = new_session();
    session.handle_host_message(HostMessage::Cwd { path: "/home/u".into() });
    session.handle_host_message(HostMessage::Stdout { text: "a\nb\n".into() });

    type_line(&mut session, "clear");
    session.handle_action(EditorAction::Submit);

    assert_eq!(log_texts(&session), vec![format!("{}/home/u", DEFAULT_CWD_PREFIX)]);
    assert_eq!(rx.try_recv().unwrap(), ClientMessage::Input { text: "clear".into() });
}

#[test]
fn test_cls_without_known_cwd_leaves_empty_log() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stdout { text: "x\n".into() });
    type_line(&mut session, "  CLS ");
    session.handle_action(EditorAction::Submit);
    assert!(session.log().is_empty());
}

#[test]
fn test_clear_screen_escape_clears_before_chunk_text() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stdout { text: "old line\n".into() });
    session.handle_host_message(HostMessage::Stdout { text: "\x1b[2J\x1b[Hfresh\n".into() });

    let texts = log_texts(&session);
    assert_eq!(texts.len(), 1);
    assert!(texts[0].ends_with("fresh\n"));
}

#[test]
fn test_clear_screen_escape_keeps_partial_line_and_resets_style() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stdout { text: "\x1b[31mred\n".into() });
    session.handle_host_message(HostMessage::Stdout { text: "tw".into() });
    session.handle_host_message(HostMessage::Stdout { text: "o\n\x1b[2Jthree\n".into() });

    let lines: Vec<_> = session.log().lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].text(), "two\n");
    assert_eq!(lines[1].text(), "\x1b[2Jthree\n");
    assert!(lines
        .iter()
        .flat_map(|l| l.fragments())
        .all(|f| f.style.is_plain()));
}

#[test]
fn test_clear_command_drops_partial_line() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stdout { text: "half".into() });
    type_line(&mut session, "clear");
    session.handle_action(EditorAction::Submit);
    session.handle_host_message(HostMessage::Stdout { text: " done\n".into() });

    assert_eq!(log_texts(&session), vec![" done\n".to_string()]);
}

#[test]
fn test_rtl_only_line_keeps_newline_at_end() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let options = SessionOptions {
        shaping: ShapingMode::Reorder,
        ..SessionOptions::default()
    };
    let mut session = Session::new(options, tx);
    session.handle_host_message(HostMessage::Stdout {
        text: "\u{0645}\u{0631}\u{062D}\u{0628}\u{0627}\nok\n".into(),
    });

    assert_eq!(
        log_texts(&session),
        vec![
            "\u{0627}\u{0628}\u{062D}\u{0631}\u{0645}\n".to_string(),
            "ok\n".to_string(),
        ]
    );
}

#[test]
fn test_reset_then_plain_is_unstyled() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stdout { text: "\x1b[1;4;35;44mloud\n".into() });
    session.handle_host_message(HostMessage::Stdout { text: "\x1b[0mquiet\n".into() });

    let last = session.log().last().unwrap();
    assert_eq!(last.fragments().len(), 1);
    assert!(last.fragments()[0].style.is_plain());
}

#[test]
fn test_stderr_keeps_its_own_style() {
    let (mut session, _rx) = new_session();
    session.handle_host_message(HostMessage::Stderr { text: "\x1b[33mwarn ".into() });
    session.handle_host_message(HostMessage::Stdout { text: "out\n".into() });
    session.handle_host_message(HostMessage::Stderr { text: "more\n".into() });

    let lines: Vec<_> = session.log().lines().collect();
    assert_eq!(lines[0].class(), LineClass::Stdout);
    assert!(lines[0].fragments()[0].style.is_plain());
    assert_eq!(lines[1].class(), LineClass::Stderr);
    assert_eq!(lines[1].text(), "warn more\n");
}

#[test]
fn test_completion_ambiguous_then_unique() {
    let (mut session, mut rx) = new_session();
    type_line(&mut session, "cat b");
    session.handle_action(EditorAction::Complete);
    assert_eq!(rx.try_recv().unwrap(), ClientMessage::Complete { prefix: "b".into() });

    session.handle_host_message(HostMessage::CompletionItems {
        items: vec!["bar.txt".into(), "baz.txt".into()],
        prefix: Some("b".into()),
    });
    assert_eq!(session.buffer().text(), "cat ba");
    assert_eq!(log_texts(&session), vec!["bar.txt baz.txt"]);

    session.handle_action(EditorAction::Insert("r".into()));
    session.handle_action(EditorAction::Complete);
    assert_eq!(rx.try_recv().unwrap(), ClientMessage::Complete { prefix: "bar".into() });
    session.handle_host_message(HostMessage::CompletionItems {
        items: vec!["bar.txt".into()],
        prefix: Some("bar".into()),
    });
    assert_eq!(session.buffer().text(), "cat bar.txt");
}

#[test]
fn test_stale_completion_is_ignored() {
    let (mut session, _rx) = new_session();
    type_line(&mut session, "ls sr");
    session.handle_action(EditorAction::Complete);
    session.handle_action(EditorAction::Insert("c/m".into()));

    session.handle_host_message(HostMessage::CompletionItems {
        items: vec!["src/".into()],
        prefix: Some("sr".into()),
    });
    assert_eq!(session.buffer().text(), "ls src/m");
    assert!(session.log().is_empty());
}

#[test]
fn test_unsolicited_completion_is_ignored() {
    let (mut session, _rx) = new_session();
    type_line(&mut session, "ls");
    session.handle_host_message(HostMessage::CompletionItems {
        items: vec!["lsblk".into()],
        prefix: None,
    });
    assert_eq!(session.buffer().text(), "ls");
}

#[test]
fn test_exit_banner_and_lock() {
    let (mut session, mut rx) = new_session();
    type_line(&mut session, "half typed");
    session.handle_host_message(HostMessage::Stderr { text: "bye".into() });
    session.handle_host_message(HostMessage::Exit { code: Some(130) });

    assert_eq!(log_texts(&session), vec!["bye", "[process exited with code 130]"]);
    assert!(session.buffer().is_empty());
    assert!(session.buffer().is_locked());

    type_line(&mut session, "ignored");
    session.handle_action(EditorAction::Submit);
    assert!(session.buffer().is_empty());
    assert!(rx.try_recv().is_err());
}

#[test]
fn test_scrollback_limit_drops_oldest() {
    let (tx, _rx) = mpsc::unbounded_channel();
    let options = SessionOptions {
        scrollback_limit: 3,
        shaping: ShapingMode::None,
        ..SessionOptions::default()
    };
    let mut session = Session::new(options, tx);
    session.handle_host_message(HostMessage::Stdout { text: "1\n2\n3\n4\n5\n".into() });
    assert_eq!(log_texts(&session), vec!["3\n", "4\n", "5\n"]);
}
