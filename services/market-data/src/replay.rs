//! Replay depth source
//!
//! Plays back recorded depth events instead of a live exchange feed. Used
//! for offline runs of the gateway and for deterministic tests.
//!
//! Recordings are JSON lines, one `DepthEvent` per line:
//!
//! ```text
//! {"symbol":"BTCUSDT","event_time":"2024-02-16T22:30:56.789Z","first_update_id":1,"last_update_id":1,"bids":[["101.0","0.4"]]}
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use matching_engine::source::{DepthCallback, ErrorCallback};
use matching_engine::{DepthSource, SourceError, Subscription};
use tracing::{debug, info};
use types::depth::DepthEvent;
use types::ids::Symbol;

/// What a subscription does after the last recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplayEnd {
    /// Stay open until stopped, like a quiet live feed
    #[default]
    HoldOpen,
    /// End the stream straight away
    Complete,
}

/// Depth source backed by a fixed list of events
#[derive(Debug, Clone, Default)]
pub struct ReplaySource {
    events: Vec<DepthEvent>,
    delay: Duration,
    end: ReplayEnd,
    fail_on_open: Option<String>,
}

impl ReplaySource {
    pub fn new(events: Vec<DepthEvent>) -> Self {
        Self {
            events,
            ..Self::default()
        }
    }

    /// A source whose every subscribe call fails
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_on_open: Some(reason.into()),
            ..Self::default()
        }
    }

    /// Load a JSON-lines recording; blank lines are ignored
    pub fn from_json_lines(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SourceError::Replay(format!("{}: {e}", path.display())))?;

        let events = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(idx, line)| {
                serde_json::from_str::<DepthEvent>(line).map_err(|e| {
                    SourceError::Replay(format!("{}:{}: {e}", path.display(), idx + 1))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        info!(path = %path.display(), events = events.len(), "Loaded depth recording");
        Ok(Self::new(events))
    }

    /// Pause before each delivered event
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_end(mut self, end: ReplayEnd) -> Self {
        self.end = end;
        self
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl DepthSource for ReplaySource {
    async fn subscribe(
        &self,
        symbol: &Symbol,
        on_event: DepthCallback,
        _on_error: ErrorCallback,
    ) -> Result<Subscription, SourceError> {
        if let Some(reason) = &self.fail_on_open {
            return Err(SourceError::Replay(reason.clone()));
        }

        let events: Vec<DepthEvent> = self
            .events
            .iter()
            .filter(|event| &event.symbol == symbol)
            .cloned()
            .collect();
        debug!(%symbol, events = events.len(), "Starting replay");

        let (subscription, mut delivery) = Subscription::channel();
        let delay = self.delay;
        let end = self.end;

        tokio::spawn(async move {
            for event in events {
                if !delay.is_zero() {
                    tokio::select! {
                        biased;
                        _ = delivery.stopped() => return,
                        _ = tokio::time::sleep(delay) => {}
                    }
                }
                if delivery.is_stopped() {
                    return;
                }
                on_event(event);
            }

            if end == ReplayEnd::HoldOpen {
                delivery.stopped().await;
            }
        });

        Ok(subscription)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use chrono::DateTime;
    use types::depth::DepthLevel;

    fn event(symbol: &str, update_id: u64) -> DepthEvent {
        DepthEvent {
            symbol: Symbol::new(symbol).unwrap(),
            event_time: DateTime::from_timestamp_millis(1_708_123_456_789).unwrap(),
            first_update_id: update_id,
            last_update_id: update_id,
            bids: vec![DepthLevel::new("101.0", "0.4")],
            asks: vec![],
        }
    }

    fn collector() -> (DepthCallback, Arc<Mutex<Vec<u64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let callback: DepthCallback = Arc::new(move |event: DepthEvent| {
            sink.lock().unwrap().push(event.last_update_id);
        });
        (callback, seen)
    }

    fn no_errors() -> ErrorCallback {
        Arc::new(|err| panic!("unexpected error: {err}"))
    }

    #[tokio::test]
    async fn test_delivers_matching_symbol_in_order() {
        let source = ReplaySource::new(vec![
            event("BTCUSDT", 1),
            event("ETHUSDT", 2),
            event("BTCUSDT", 3),
        ])
        .with_end(ReplayEnd::Complete);
        let (on_event, seen) = collector();

        let subscription = source
            .subscribe(&Symbol::new("BTCUSDT").unwrap(), on_event, no_errors())
            .await
            .unwrap();
        subscription.completion.wait().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hold_open_until_stopped() {
        let source = ReplaySource::new(vec![event("BTCUSDT", 1)]);
        let (on_event, seen) = collector();

        let Subscription { stop, completion } = source
            .subscribe(&Symbol::new("BTCUSDT").unwrap(), on_event, no_errors())
            .await
            .unwrap();

        let mut completion = tokio::spawn(completion.wait());
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert!(!completion.is_finished());

        assert!(stop.stop());
        (&mut completion).await.unwrap();
        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_interrupts_paced_replay() {
        let source = ReplaySource::new(vec![event("BTCUSDT", 1), event("BTCUSDT", 2)])
            .with_delay(Duration::from_secs(10));
        let (on_event, seen) = collector();

        let Subscription { stop, completion } = source
            .subscribe(&Symbol::new("BTCUSDT").unwrap(), on_event, no_errors())
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_secs(15)).await;
        stop.stop();
        completion.wait().await;

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[tokio::test]
    async fn test_failing_source() {
        let source = ReplaySource::failing("exchange unavailable");
        let (on_event, _) = collector();

        let err = source
            .subscribe(&Symbol::new("BTCUSDT").unwrap(), on_event, no_errors())
            .await
            .unwrap_err();

        assert_eq!(err, SourceError::Replay("exchange unavailable".into()));
    }

    #[test]
    fn test_from_json_lines() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        for id in 1..=2 {
            writeln!(file, "{}", serde_json::to_string(&event("BTCUSDT", id)).unwrap()).unwrap();
            writeln!(file).unwrap();
        }

        let source = ReplaySource::from_json_lines(file.path()).unwrap();
        assert_eq!(source.len(), 2);
    }

    #[test]
    fn test_from_json_lines_reports_bad_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{}", serde_json::to_string(&event("BTCUSDT", 1)).unwrap()).unwrap();
        writeln!(file, "{{not json").unwrap();

        let err = ReplaySource::from_json_lines(file.path()).unwrap_err();
        match err {
            SourceError::Replay(msg) => assert!(msg.contains(":2:"), "{msg}"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        assert!(ReplaySource::from_json_lines("/nonexistent/depth.jsonl").is_err());
    }
}
