// Line reassembler - turns arbitrary output chunks into complete lines
//
// Each stream keeps its own partial trailing line. The pending text never
// contains a newline: as soon as one arrives the line is emitted.

/// Which process stream a chunk came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

#[derive(Debug, Default, Clone)]
pub struct LineReassembler {
    pending_stdout: String,
    pending_stderr: String,
}

impl LineReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    fn pending_mut(&mut self, stream: StreamKind) -> &mut String {
        match stream {
            StreamKind::Stdout => &mut self.pending_stdout,
            StreamKind::Stderr => &mut self.pending_stderr,
        }
    }

    /// Partial line currently held for `stream`
    pub fn pending(&self, stream: StreamKind) -> &str {
        match stream {
            StreamKind::Stdout => &self.pending_stdout,
            StreamKind::Stderr => &self.pending_stderr,
        }
    }

    /// Feed a chunk; returns every line it completes, each ending in `\n`
    pub fn consume(&mut self, stream: StreamKind, chunk: &str) -> Vec<String> {
        let pending = self.pending_mut(stream);
        pending.push_str(chunk);
        // A CR held back from the previous chunk may pair with a leading LF
        if pending.contains("\r\n") {
            *pending = pending.replace("\r\n", "\n");
        }

        let Some(last_newline) = pending.rfind('\n') else {
            return Vec::new();
        };

        let remainder = pending.split_off(last_newline + 1);
        let complete = std::mem::replace(pending, remainder);
        complete
            .split_inclusive('\n')
            .map(str::to_string)
            .collect()
    }

    /// Drain whatever is left, stdout first; empty buffers produce nothing
    pub fn flush(&mut self) -> Vec<(StreamKind, String)> {
        let mut out = Vec::new();
        for stream in [StreamKind::Stdout, StreamKind::Stderr] {
            let pending = std::mem::take(self.pending_mut(stream));
            if !pending.is_empty() {
                out.push((stream, pending));
            }
        }
        out
    }

    /// Drop both partial lines without emitting them
    pub fn reset(&mut self) {
        self.pending_stdout.clear();
        self.pending_stderr.clear();
    }
}
