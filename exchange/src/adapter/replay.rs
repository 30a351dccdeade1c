//! Replays recorded snapshots from a JSON-lines file, one `RawSnapshot` per line.

use super::{AdapterError, Event, Source};
use crate::snapshot::RawSnapshot;

use iced_futures::{
    futures::{SinkExt, Stream},
    stream,
};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReplayConfig {
    pub path: PathBuf,
    pub interval: Duration,
}

/// Decodes every non-blank line, keeping the 1-based line number of each failure.
pub fn parse_lines(contents: &str) -> Vec<Result<RawSnapshot, (usize, AdapterError)>> {
    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(idx, line)| {
            RawSnapshot::decode(line).map_err(|e| (idx + 1, AdapterError::Parse(e.to_string())))
        })
        .collect()
}

pub fn connect(config: ReplayConfig) -> impl Stream<Item = Event> {
    stream::channel(100, async move |mut output| {
        let contents = match tokio::fs::read_to_string(&config.path).await {
            Ok(contents) => contents,
            Err(e) => {
                let err = AdapterError::Io(format!("{}: {e}", config.path.display()));
                let _ = output
                    .send(Event::Disconnected(
                        Source::Replay,
                        err.to_user_message().to_string(),
                    ))
                    .await;
                return;
            }
        };

        log::info!("Replaying snapshots from {}", config.path.display());
        let _ = output.send(Event::Connected(Source::Replay)).await;

        let mut interval = tokio::time::interval(config.interval);
        for record in parse_lines(&contents) {
            match record {
                Ok(snapshot) => {
                    interval.tick().await;
                    if output
                        .send(Event::SnapshotReceived(Box::new(snapshot)))
                        .await
                        .is_err()
                    {
                        return;
                    }
                }
                Err((line, err)) => {
                    log::warn!("Skipping replay line {line}: {err}");
                }
            }
        }

        let _ = output
            .send(Event::Disconnected(
                Source::Replay,
                "End of replay file".to_string(),
            ))
            .await;
    })
}
