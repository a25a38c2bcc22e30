// Editor actions - the keyboard-independent vocabulary the session reacts to

/// One user action against the prompt or the output view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorAction {
    /// Typed or pasted text
    Insert(String),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    HistoryPrevious,
    HistoryNext,
    Submit,
    Interrupt,
    Complete,
    /// Scroll the output view towards older lines
    ScrollUp(usize),
    /// Scroll the output view towards newer lines
    ScrollDown(usize),
}
