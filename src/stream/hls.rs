//! Adaptive stream engine (segmented video-over-HTTP)
//!
//! ## Responsibilities
//!
//! - Poll a `.m3u8` playlist on a fixed interval and pull new segments
//! - Surface playback errors, classified by category and severity
//! - Honor session commands: resume loading, recover the media pipeline,
//!   destroy
//!
//! Transport failures surface as network-category errors and only turn
//! fatal after repeated consecutive misses; a corrupt playlist surfaces as
//! a fatal media-category error. The session stalls after any fatal error
//! until the matching recovery command arrives.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use url::Url;

/// Consecutive playlist misses before a network error is fatal
pub const MAX_CONSECUTIVE_NETWORK_FAILURES: u32 = 3;

/// Error category, mirroring the classes the attachment layer reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Media,
    Other,
}

/// A playback error emitted by a session
#[derive(Debug, Clone)]
pub struct SessionError {
    pub category: ErrorCategory,
    pub fatal: bool,
    pub detail: String,
}

/// Commands a session accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    /// Resume loading after a fatal network error
    StartLoad,
    /// Re-initialize the media pipeline after a fatal media error
    RecoverMediaError,
    /// Tear the session down
    Destroy,
}

/// Handle to a running session
pub struct HlsSessionHandle {
    commands: mpsc::UnboundedSender<SessionCommand>,
    task: JoinHandle<()>,
}

impl HlsSessionHandle {
    pub fn start_load(&self) {
        let _ = self.commands.send(SessionCommand::StartLoad);
    }

    pub fn recover_media_error(&self) {
        let _ = self.commands.send(SessionCommand::RecoverMediaError);
    }

    /// Stop the session task and release it
    pub fn destroy(&self) {
        let _ = self.commands.send(SessionCommand::Destroy);
        self.task.abort();
    }

    /// Sender half for supervisors that react to session errors
    pub fn command_sender(&self) -> mpsc::UnboundedSender<SessionCommand> {
        self.commands.clone()
    }
}

/// HlsEngine instance
///
/// Constructed once; every popup video panel gets its own session from it.
pub struct HlsEngine {
    client: reqwest::Client,
    poll_interval: Duration,
    sessions_started: AtomicUsize,
}

impl HlsEngine {
    pub fn new(poll_interval: Duration, http_timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(http_timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            poll_interval,
            sessions_started: AtomicUsize::new(0),
        }
    }

    /// Sessions constructed over the engine's lifetime
    pub fn sessions_started(&self) -> usize {
        self.sessions_started.load(Ordering::Relaxed)
    }

    /// Construct a session for `source` and start loading immediately.
    ///
    /// Returns the command handle and the error stream the caller must
    /// supervise.
    pub fn start_session(
        &self,
        source: &str,
    ) -> (HlsSessionHandle, mpsc::UnboundedReceiver<SessionError>) {
        self.sessions_started.fetch_add(1, Ordering::Relaxed);

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (error_tx, error_rx) = mpsc::unbounded_channel();

        let session = SessionTask {
            client: self.client.clone(),
            source: source.to_string(),
            poll_interval: self.poll_interval,
            commands: command_rx,
            errors: error_tx,
            loading: true,
            consecutive_failures: 0,
            seen_segments: HashSet::new(),
        };
        let task = tokio::spawn(session.run());

        tracing::debug!(source = %source, "Stream session started");

        (
            HlsSessionHandle {
                commands: command_tx,
                task,
            },
            error_rx,
        )
    }
}

struct SessionTask {
    client: reqwest::Client,
    source: String,
    poll_interval: Duration,
    commands: mpsc::UnboundedReceiver<SessionCommand>,
    errors: mpsc::UnboundedSender<SessionError>,
    loading: bool,
    consecutive_failures: u32,
    seen_segments: HashSet<String>,
}

impl SessionTask {
    async fn run(mut self) {
        let playlist_url = match Url::parse(&self.source) {
            Ok(url) => url,
            Err(e) => {
                self.emit(ErrorCategory::Other, true, format!("invalid stream URL: {}", e));
                // Nothing to poll; wait for the destroy command.
                while let Some(command) = self.commands.recv().await {
                    if command == SessionCommand::Destroy {
                        break;
                    }
                }
                return;
            }
        };

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(SessionCommand::StartLoad) => {
                        self.consecutive_failures = 0;
                        self.loading = true;
                    }
                    Some(SessionCommand::RecoverMediaError) => {
                        self.seen_segments.clear();
                        self.loading = true;
                    }
                    Some(SessionCommand::Destroy) | None => break,
                },
                _ = ticker.tick() => {
                    if self.loading {
                        self.poll(&playlist_url).await;
                    }
                }
            }
        }
    }

    async fn poll(&mut self, playlist_url: &Url) {
        let body = match self.fetch_playlist(playlist_url).await {
            Ok(body) => body,
            Err(detail) => {
                self.consecutive_failures += 1;
                let fatal = self.consecutive_failures >= MAX_CONSECUTIVE_NETWORK_FAILURES;
                if fatal {
                    self.loading = false;
                }
                self.emit(ErrorCategory::Network, fatal, detail);
                return;
            }
        };
        self.consecutive_failures = 0;

        let segments = match parse_playlist(&body) {
            Ok(segments) => segments,
            Err(detail) => {
                self.loading = false;
                self.emit(ErrorCategory::Media, true, detail);
                return;
            }
        };

        for segment in segments {
            if !self.seen_segments.insert(segment.clone()) {
                continue;
            }
            if let Err(detail) = self.fetch_segment(playlist_url, &segment).await {
                self.emit(ErrorCategory::Network, false, detail);
            }
        }
    }

    async fn fetch_playlist(&self, url: &Url) -> Result<String, String> {
        let resp = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| format!("playlist fetch failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("playlist fetch returned HTTP {}", resp.status()));
        }

        resp.text()
            .await
            .map_err(|e| format!("playlist read failed: {}", e))
    }

    async fn fetch_segment(&self, playlist_url: &Url, segment: &str) -> Result<(), String> {
        let url = playlist_url
            .join(segment)
            .map_err(|e| format!("bad segment URI {}: {}", segment, e))?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("segment fetch failed: {}", e))?;

        if !resp.status().is_success() {
            return Err(format!("segment fetch returned HTTP {}", resp.status()));
        }

        // Segment bytes are drained to keep the live edge warm; decoding is
        // the panel's concern, not the session's.
        let _ = resp.bytes().await;
        Ok(())
    }

    fn emit(&self, category: ErrorCategory, fatal: bool, detail: String) {
        tracing::debug!(
            source = %self.source,
            category = ?category,
            fatal = fatal,
            detail = %detail,
            "Stream session error"
        );
        let _ = self.errors.send(SessionError {
            category,
            fatal,
            detail,
        });
    }
}

/// Parse a media playlist into its segment URIs
fn parse_playlist(body: &str) -> Result<Vec<String>, String> {
    let mut lines = body.lines().map(str::trim);
    match lines.next() {
        Some("#EXTM3U") => {}
        _ => return Err("playlist is missing the #EXTM3U header".to_string()),
    }

    Ok(lines
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_playlist_extracts_segments() {
        let body = "#EXTM3U\n#EXT-X-TARGETDURATION:4\n#EXTINF:4.0,\nstream000.ts\n#EXTINF:4.0,\nstream001.ts\n";
        let segments = parse_playlist(body).unwrap();
        assert_eq!(segments, vec!["stream000.ts", "stream001.ts"]);
    }

    #[test]
    fn test_parse_playlist_rejects_non_playlist_body() {
        assert!(parse_playlist("<html>not found</html>").is_err());
    }

    #[tokio::test]
    async fn test_unreachable_playlist_turns_fatal_after_repeated_misses() {
        let engine = HlsEngine::new(Duration::from_millis(10), Duration::from_millis(200));
        // Port 9 (discard) is not listening in the test environment.
        let (handle, mut errors) = engine.start_session("http://127.0.0.1:9/stream.m3u8");

        let mut non_fatal = 0;
        let fatal = loop {
            let err = tokio::time::timeout(Duration::from_secs(5), errors.recv())
                .await
                .expect("expected a session error")
                .expect("error stream closed");
            assert_eq!(err.category, ErrorCategory::Network);
            if err.fatal {
                break err;
            }
            non_fatal += 1;
        };

        assert!(fatal.fatal);
        assert_eq!(non_fatal, (MAX_CONSECUTIVE_NETWORK_FAILURES - 1) as usize);
        handle.destroy();
    }

    #[tokio::test]
    async fn test_invalid_source_url_is_a_fatal_other_error() {
        let engine = HlsEngine::new(Duration::from_millis(10), Duration::from_millis(200));
        let (handle, mut errors) = engine.start_session("not a url");

        let err = tokio::time::timeout(Duration::from_secs(5), errors.recv())
            .await
            .expect("expected a session error")
            .expect("error stream closed");
        assert_eq!(err.category, ErrorCategory::Other);
        assert!(err.fatal);
        handle.destroy();
    }

    #[tokio::test]
    async fn test_sessions_started_counts_instances() {
        let engine = HlsEngine::new(Duration::from_secs(60), Duration::from_secs(1));
        assert_eq!(engine.sessions_started(), 0);
        let (first, _rx1) = engine.start_session("http://127.0.0.1:9/a.m3u8");
        let (second, _rx2) = engine.start_session("http://127.0.0.1:9/b.m3u8");
        assert_eq!(engine.sessions_started(), 2);
        first.destroy();
        second.destroy();
    }
}
