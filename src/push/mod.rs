//! Push channel adapter for job status events.
//!
//! Opens one WebSocket per dashboard mount and forwards decoded
//! `StatusEvent`s in arrival order. On connection failure or close it makes
//! a single alternate-endpoint attempt and then gives up silently; the
//! dashboard keeps working through explicit refetches.

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, info, warn};

use crate::api::job::models::StatusEvent;

/// Derive the status-push URL from the REST base URL
///
/// Protocol-upgrades the scheme, strips a trailing `/api`, and appends the
/// well-known status path.
pub fn status_url(base: &str) -> String {
    let upgraded = if let Some(rest) = base.strip_prefix("https") {
        format!("wss{}", rest)
    } else if let Some(rest) = base.strip_prefix("http") {
        format!("ws{}", rest)
    } else {
        base.to_string()
    };
    let trimmed = upgraded.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix("/api").unwrap_or(trimmed);
    format!("{}/ws/jobs/status/", trimmed)
}

/// Pluggable one-shot reconnection fallback
///
/// Kept narrow on purpose: the environment-specific alternate endpoint can
/// be swapped without touching the merge logic downstream.
pub trait ReconnectStrategy: Send + Sync {
    /// Alternate URL to try once after `url` fails, if any
    fn alternate(&self, url: &str) -> Option<String>;
}

/// Default fallback: retry once on a secondary well-known port
pub struct AlternatePort {
    pub from: u16,
    pub to: u16,
}

impl Default for AlternatePort {
    fn default() -> Self {
        Self { from: 8000, to: 9000 }
    }
}

impl ReconnectStrategy for AlternatePort {
    fn alternate(&self, url: &str) -> Option<String> {
        let from = format!(":{}", self.from);
        if url.contains(&from) {
            Some(url.replacen(&from, &format!(":{}", self.to), 1))
        } else {
            None
        }
    }
}

/// Decode one text frame into a status event
///
/// Frames the client does not understand are skipped, not fatal.
fn parse_event(text: &str) -> Option<StatusEvent> {
    match serde_json::from_str::<StatusEvent>(text) {
        Ok(ev) => Some(ev),
        Err(e) => {
            debug!("Skipping undecodable push frame: {}", e);
            None
        }
    }
}

/// Handle owning the push connection task
///
/// Dropping the handle tears the connection down; no events are buffered
/// or delivered after that.
pub struct PushHandle {
    task: JoinHandle<()>,
}

impl Drop for PushHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Open the push channel for the given REST base URL
///
/// Returns the owning handle and the receiving end of the event stream.
pub fn spawn(
    base: &str,
    strategy: Box<dyn ReconnectStrategy>,
) -> (PushHandle, mpsc::UnboundedReceiver<StatusEvent>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let url = status_url(base);
    let task = tokio::spawn(async move {
        let receiver_alive = read_stream(&url, &tx).await;
        if receiver_alive {
            if let Some(alt) = strategy.alternate(&url) {
                info!("Push channel lost, trying alternate endpoint {}", alt);
                read_stream(&alt, &tx).await;
            }
        }
        // Intentional silent degradation: the dashboard falls back to
        // fetch-only operation without surfacing a message.
        debug!("Push channel closed");
    });
    (PushHandle { task }, rx)
}

/// Read one connection until it closes
///
/// Returns false once the receiving side is gone, which means the dashboard
/// unmounted and no further attempt should be made.
async fn read_stream(url: &str, tx: &mpsc::UnboundedSender<StatusEvent>) -> bool {
    let (mut stream, _) = match connect_async(url).await {
        Ok(conn) => {
            info!("Push channel connected: {}", url);
            conn
        }
        Err(e) => {
            warn!("Push channel connect failed for {}: {}", url, e);
            return true;
        }
    };

    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => {
                if let Some(event) = parse_event(&text) {
                    if tx.send(event).is_err() {
                        return false;
                    }
                }
            }
            Ok(Message::Close(_)) => break,
            Ok(_) => {}
            Err(e) => {
                warn!("Push channel read error: {}", e);
                break;
            }
        }
    }
    !tx.is_closed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::job::models::JobStatus;

    #[test]
    fn status_url_upgrades_scheme_and_replaces_api_suffix() {
        assert_eq!(
            status_url("http://localhost:8000/api"),
            "ws://localhost:8000/ws/jobs/status/"
        );
        assert_eq!(
            status_url("https://jobs.example.com/api/"),
            "wss://jobs.example.com/ws/jobs/status/"
        );
    }

    #[test]
    fn status_url_without_api_suffix_keeps_host_path() {
        assert_eq!(
            status_url("http://170.9.234.156"),
            "ws://170.9.234.156/ws/jobs/status/"
        );
    }

    #[test]
    fn alternate_port_applies_only_to_the_primary_port() {
        let strategy = AlternatePort::default();
        assert_eq!(
            strategy.alternate("ws://localhost:8000/ws/jobs/status/"),
            Some("ws://localhost:9000/ws/jobs/status/".to_string())
        );
        assert_eq!(strategy.alternate("ws://localhost:9000/ws/jobs/status/"), None);
        assert_eq!(strategy.alternate("wss://jobs.example.com/ws/jobs/status/"), None);
    }

    #[test]
    fn parse_event_decodes_status_frames() {
        let ev = parse_event(r#"{"id": 12, "status": "failed", "result": {"error": "smtp"}}"#)
            .expect("frame should decode");
        assert_eq!(ev.id, 12);
        assert_eq!(ev.status, JobStatus::Failed);
        assert!(ev.result.is_some());
    }

    #[test]
    fn parse_event_skips_garbage_frames() {
        assert!(parse_event("not json").is_none());
        assert!(parse_event(r#"{"kind": "heartbeat"}"#).is_none());
    }
}
