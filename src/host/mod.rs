// Host bridge - runs the shell and speaks the message protocol
//
// The bridge owns the child process. Output chunks are forwarded as they
// arrive; requests from the session are answered in order.

pub mod bridge;
pub mod completion;
pub mod cwd;

pub use bridge::{spawn_host, HostOptions};
pub use completion::path_completions;
pub use cwd::CwdTracker;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("no shell could be started (tried: {})", tried.join(", "))]
    NoShell { tried: Vec<String> },

    #[error("shell `{shell}` has no {stream} pipe")]
    MissingPipe { shell: String, stream: &'static str },

    #[error("working directory {path} is not usable: {source}")]
    BadCwd {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
