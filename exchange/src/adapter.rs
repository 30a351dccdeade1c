pub mod replay;
pub mod simulated;

use crate::snapshot::RawSnapshot;

#[derive(thiserror::Error, Debug, Clone)]
pub enum AdapterError {
    #[error("I/O: {0}")]
    Io(String),
    #[error("Parsing: {0}")]
    Parse(String),
    #[error("Stream: {0}")]
    Stream(String),
}

impl AdapterError {
    pub fn to_user_message(&self) -> &'static str {
        match self {
            AdapterError::Io(err) => {
                log::error!("Adapter I/O error: {err}");
                "Could not read from the data source. Check logs for details."
            }
            AdapterError::Parse(err) => {
                log::error!("Adapter parse error: {err}");
                "Unexpected data from the feed. Check logs for details."
            }
            AdapterError::Stream(err) => {
                log::error!("Adapter stream error: {err}");
                "Feed stream interrupted."
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    Simulated,
    Replay,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Simulated => write!(f, "Simulated"),
            Source::Replay => write!(f, "Replay"),
        }
    }
}

/// What a feed pushes to its host. Snapshots are passed on unvalidated; each display
/// validates at its own boundary.
#[derive(Debug, Clone)]
pub enum Event {
    Connected(Source),
    Disconnected(Source, String),
    SnapshotReceived(Box<RawSnapshot>),
}
