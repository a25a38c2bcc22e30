// Completion coordinator - tab completion over an async query
//
// A request records the word span under the cursor and the raw prefix sent
// to the host. Only one request is outstanding at a time; a newer request
// replaces the older one. Responses that no longer match the outstanding
// request or the current buffer are dropped.

use super::edit_buffer::{EditBuffer, WordSpan};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub span: WordSpan,
    pub prefix: String,
}

/// What the session should do with a completion response
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Nothing to apply (no request, stale response, or no candidates)
    Discarded,
    /// Exactly one candidate: replace the word with it
    Unique(String),
    /// Several candidates: fill the shared prefix (if any) and list them
    Ambiguous {
        fill: Option<String>,
        candidates: Vec<String>,
    },
}

#[derive(Debug, Default)]
pub struct CompletionCoordinator {
    pending: Option<CompletionRequest>,
}

impl CompletionCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&CompletionRequest> {
        self.pending.as_ref()
    }

    /// Record a request for the word under the cursor and return it
    pub fn request(&mut self, buffer: &EditBuffer) -> CompletionRequest {
        let span = buffer.word_bounds_at_cursor();
        let request = CompletionRequest {
            span,
            prefix: buffer.slice(span),
        };
        if self.pending.is_some() {
            tracing::debug!("replacing outstanding completion request");
        }
        self.pending = Some(request.clone());
        request
    }

    /// Forget any outstanding request
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Consume the outstanding request against a response
    ///
    /// `echoed_prefix` is the prefix the host says it answered, when it
    /// reports one.
    pub fn resolve(
        &mut self,
        items: Vec<String>,
        echoed_prefix: Option<&str>,
        buffer: &EditBuffer,
    ) -> CompletionOutcome {
        let Some(request) = self.pending.as_ref() else {
            tracing::debug!("completion response with no outstanding request");
            return CompletionOutcome::Discarded;
        };

        if echoed_prefix.is_some_and(|p| p != request.prefix) {
            tracing::debug!("completion response answers an older request");
            return CompletionOutcome::Discarded;
        }

        // Consumed from here on, whether or not it still applies
        let Some(request) = self.pending.take() else {
            return CompletionOutcome::Discarded;
        };

        let span = buffer.word_bounds_at_cursor();
        if span != request.span || buffer.slice(span) != request.prefix {
            tracing::debug!("buffer changed since completion was requested");
            return CompletionOutcome::Discarded;
        }

        match items.len() {
            0 => CompletionOutcome::Discarded,
            1 => CompletionOutcome::Unique(items.into_iter().next().unwrap_or_default()),
            _ => {
                let prefix = common_prefix(&items);
                CompletionOutcome::Ambiguous {
                    fill: (!prefix.is_empty()).then_some(prefix),
                    candidates: items,
                }
            }
        }
    }
}

/// Longest prefix of the first item that every item starts with, ignoring case
///
/// The result keeps the first item's casing.
pub fn common_prefix(items: &[String]) -> String {
    let Some(first) = items.first() else {
        return String::new();
    };

    let mut prefix: Vec<char> = first.chars().collect();
    while !prefix.is_empty() {
        let candidate: String = prefix.iter().collect::<String>().to_lowercase();
        if items
            .iter()
            .all(|item| item.to_lowercase().starts_with(&candidate))
        {
            break;
        }
        prefix.pop();
    }
    prefix.into_iter().collect()
}
