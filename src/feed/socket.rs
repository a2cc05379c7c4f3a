//! Live WebSocket feed.
//!
//! Maintains a persistent, auto-reconnecting stream bound to one patient.
//! A background task decodes inbound frames and forwards samples over a
//! channel; dropping the feed aborts the task and closes the transport, so
//! a superseded feed can never surface a stale sample.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, warn};

use super::{FeedMessage, VitalsSample, VitalsSource};

/// Reconnection policy for the background task.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Delay before the first reconnect attempt.
    pub reconnect_min: Duration,
    /// Ceiling for the exponential backoff.
    pub reconnect_max: Duration,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            reconnect_min: Duration::from_secs(1),
            reconnect_max: Duration::from_secs(30),
        }
    }
}

/// A vitals source backed by the per-patient WebSocket stream.
///
/// One feed owns one connection. Switching patients means dropping this
/// feed and constructing a new one; the old transport is torn down before
/// the replacement opens.
///
/// # Example
///
/// ```no_run
/// use vitalwatch::{SocketFeed, VitalsSource};
///
/// # tokio_test::block_on(async {
/// let feed = SocketFeed::connect(
///     &tokio::runtime::Handle::current(),
///     "http://localhost:8000",
///     "7",
/// );
/// // false until the transport's open event fires
/// assert!(!feed.connected());
/// # });
/// ```
#[derive(Debug)]
pub struct SocketFeed {
    receiver: mpsc::Receiver<VitalsSample>,
    connected: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<String>>>,
    description: String,
    task: tokio::task::JoinHandle<()>,
}

impl SocketFeed {
    /// Open a feed for the given patient with the default reconnect policy.
    pub fn connect(handle: &tokio::runtime::Handle, base_url: &str, patient_id: &str) -> Self {
        Self::connect_with(handle, base_url, patient_id, FeedConfig::default())
    }

    /// Open a feed with an explicit reconnect policy.
    pub fn connect_with(
        handle: &tokio::runtime::Handle,
        base_url: &str,
        patient_id: &str,
        config: FeedConfig,
    ) -> Self {
        let url = feed_url(base_url, patient_id);
        let (tx, rx) = mpsc::channel(64);
        let connected = Arc::new(AtomicBool::new(false));
        let last_error = Arc::new(Mutex::new(None));

        let task = handle.spawn(run_feed(
            url.clone(),
            tx,
            connected.clone(),
            last_error.clone(),
            config,
        ));

        Self {
            receiver: rx,
            connected,
            last_error,
            description: format!("live: {}", url),
            task,
        }
    }
}

impl VitalsSource for SocketFeed {
    fn poll(&mut self) -> Option<VitalsSample> {
        match self.receiver.try_recv() {
            Ok(sample) => Some(sample),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => None,
        }
    }

    fn connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}

impl Drop for SocketFeed {
    fn drop(&mut self) {
        self.task.abort();
        self.connected.store(false, Ordering::SeqCst);
    }
}

/// Build the stream address from the backend base URL and a patient id.
fn feed_url(base_url: &str, patient_id: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let base = if let Some(rest) = base.strip_prefix("https://") {
        format!("wss://{}", rest)
    } else if let Some(rest) = base.strip_prefix("http://") {
        format!("ws://{}", rest)
    } else {
        base.to_string()
    };
    format!("{}/ws/patient/{}/", base, patient_id)
}

/// Connection loop: connect, drain frames, reconnect with backoff.
///
/// The task ends when the receiving side of the sample channel is dropped.
async fn run_feed(
    url: String,
    tx: mpsc::Sender<VitalsSample>,
    connected: Arc<AtomicBool>,
    last_error: Arc<Mutex<Option<String>>>,
    config: FeedConfig,
) {
    let mut delay = config.reconnect_min;

    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                debug!("connected to {}", url);
                connected.store(true, Ordering::SeqCst);
                *last_error.lock().unwrap() = None;
                delay = config.reconnect_min;

                let (_, mut read) = stream.split();
                while let Some(frame) = read.next().await {
                    match frame {
                        Ok(Message::Text(text)) => {
                            match serde_json::from_str::<FeedMessage>(&text) {
                                Ok(FeedMessage::VitalsUpdate { data }) => {
                                    if tx.send(data).await.is_err() {
                                        // Receiver dropped, stop delivering
                                        connected.store(false, Ordering::SeqCst);
                                        return;
                                    }
                                }
                                Ok(FeedMessage::ConnectionEstablished { message }) => {
                                    debug!("stream accepted: {}", message.unwrap_or_default());
                                }
                                Ok(FeedMessage::Unknown) => {}
                                Err(e) => {
                                    warn!("dropping malformed frame: {}", e);
                                }
                            }
                        }
                        Ok(Message::Close(_)) => break,
                        Ok(Message::Ping(_) | Message::Pong(_) | Message::Binary(_)) => {}
                        Ok(Message::Frame(_)) => {}
                        Err(e) => {
                            *last_error.lock().unwrap() = Some(format!("stream error: {}", e));
                            break;
                        }
                    }
                }

                debug!("disconnected from {}", url);
                connected.store(false, Ordering::SeqCst);
            }
            Err(e) => {
                *last_error.lock().unwrap() = Some(format!("connect error: {}", e));
            }
        }

        if tx.is_closed() {
            return;
        }

        tokio::time::sleep(delay).await;
        delay = (delay * 2).min(config.reconnect_max);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::RiskLevel;
    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    fn test_config() -> FeedConfig {
        FeedConfig {
            reconnect_min: Duration::from_millis(20),
            reconnect_max: Duration::from_millis(100),
        }
    }

    async fn bind_server() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        (listener, base)
    }

    fn vitals_frame(heart_rate: f64) -> Message {
        Message::Text(format!(
            r#"{{"type":"vitals_update","data":{{"heart_rate":{}}}}}"#,
            heart_rate
        ))
    }

    /// Drain until at least `n` samples arrive, with a deadline.
    async fn drain_until(feed: &mut SocketFeed, n: usize) -> Vec<VitalsSample> {
        let mut out = Vec::new();
        for _ in 0..100 {
            while let Some(sample) = feed.poll() {
                out.push(sample);
            }
            if out.len() >= n {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        out
    }

    #[test]
    fn test_feed_url_schemes() {
        assert_eq!(
            feed_url("http://host:8000", "7"),
            "ws://host:8000/ws/patient/7/"
        );
        assert_eq!(
            feed_url("https://host/", "12"),
            "wss://host/ws/patient/12/"
        );
        assert_eq!(
            feed_url("ws://host:9000", "3"),
            "ws://host:9000/ws/patient/3/"
        );
    }

    #[tokio::test]
    async fn test_socket_feed_delivers_samples() {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(Message::Text(
                r#"{"type":"connection_established","message":"ok"}"#.into(),
            ))
            .await
            .unwrap();
            ws.send(Message::Text(
                r#"{"type":"vitals_update","data":{"heart_rate":72,"spo2":98,"risk_level":"Low"}}"#
                    .into(),
            ))
            .await
            .unwrap();
            // Hold the session open while the client reads
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        let mut feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            &base,
            "7",
            test_config(),
        );

        let samples = drain_until(&mut feed, 1).await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].heart_rate, Some(72.0));
        assert_eq!(samples[0].spo2, Some(98.0));
        assert_eq!(samples[0].risk_level, Some(RiskLevel::Low));

        // The greeting frame is never surfaced as a sample
        assert!(feed.poll().is_none());
        assert!(feed.connected());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_frames_are_dropped() {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(Message::Text("not json at all".into())).await.unwrap();
            ws.send(Message::Text(r#"{"type":"future_kind","x":1}"#.into()))
                .await
                .unwrap();
            ws.send(vitals_frame(64.0)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        let mut feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            &base,
            "7",
            test_config(),
        );

        // Only the valid frame comes through; the garbage before it did not
        // kill the stream
        let samples = drain_until(&mut feed, 1).await;
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].heart_rate, Some(64.0));
        assert!(feed.connected());

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_samples_arrive_in_order() {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            for hr in [60.0, 61.0, 62.0] {
                ws.send(vitals_frame(hr)).await.unwrap();
            }
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        let mut feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            &base,
            "7",
            test_config(),
        );

        let samples = drain_until(&mut feed, 3).await;
        let rates: Vec<_> = samples.iter().map(|s| s.heart_rate).collect();
        assert_eq!(rates, vec![Some(60.0), Some(61.0), Some(62.0)]);

        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_reconnects_after_close() {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            // First session: one sample, then close
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(vitals_frame(60.0)).await.unwrap();
            ws.close(None).await.unwrap();

            // Second session after the client's backoff
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(vitals_frame(61.0)).await.unwrap();
            tokio::time::sleep(Duration::from_millis(300)).await;
        });

        let mut feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            &base,
            "7",
            test_config(),
        );

        let samples = drain_until(&mut feed, 2).await;
        let rates: Vec<_> = samples.iter().map(|s| s.heart_rate).collect();
        assert_eq!(rates, vec![Some(60.0), Some(61.0)]);
        assert!(feed.connected());

        server.await.unwrap();

        // Server gone: the connected flag drops once the stream ends
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!feed.connected());
    }

    #[tokio::test]
    async fn test_connected_false_before_open() {
        // Nothing is listening on this port
        let feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            "http://127.0.0.1:1",
            "7",
            test_config(),
        );

        assert!(!feed.connected());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!feed.connected());
        assert!(feed.error().is_some());
    }

    #[tokio::test]
    async fn test_drop_closes_transport() {
        let (listener, base) = bind_server().await;

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            ws.send(vitals_frame(70.0)).await.unwrap();
            // Wait for the peer to go away
            loop {
                match ws.next().await {
                    None | Some(Err(_)) => break,
                    Some(Ok(_)) => {}
                }
            }
        });

        let mut feed = SocketFeed::connect_with(
            &tokio::runtime::Handle::current(),
            &base,
            "7",
            test_config(),
        );
        let _ = drain_until(&mut feed, 1).await;

        drop(feed);

        // The server observes the close; no orphaned transport lingers
        tokio::time::timeout(Duration::from_secs(2), server)
            .await
            .expect("transport was not closed on drop")
            .unwrap();
    }
}
