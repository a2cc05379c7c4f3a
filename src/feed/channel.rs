//! Channel-based feed.
//!
//! Receives vitals samples via a tokio mpsc channel. This is useful for
//! embedding the dashboard in another application, for replaying recorded
//! sessions, and for tests.

use tokio::sync::mpsc;

use super::{VitalsSample, VitalsSource};

/// A feed that receives vitals samples via a channel.
///
/// The producer sends samples through the channel and this feed provides
/// them to the app in delivery order.
///
/// # Example
///
/// ```
/// use vitalwatch::ChannelFeed;
///
/// let (tx, feed) = ChannelFeed::create("synthetic");
/// ```
#[derive(Debug)]
pub struct ChannelFeed {
    receiver: mpsc::Receiver<VitalsSample>,
    description: String,
    closed: bool,
}

impl ChannelFeed {
    /// Create a new channel feed from an existing receiver.
    pub fn new(receiver: mpsc::Receiver<VitalsSample>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
            closed: false,
        }
    }

    /// Create a channel pair for sending samples to a ChannelFeed.
    ///
    /// Returns (sender, feed) where the sender pushes samples and the feed
    /// plugs into the app.
    pub fn create(source_description: &str) -> (mpsc::Sender<VitalsSample>, Self) {
        let (tx, rx) = mpsc::channel(64);
        (tx, Self::new(rx, source_description))
    }
}

impl VitalsSource for ChannelFeed {
    fn poll(&mut self) -> Option<VitalsSample> {
        match self.receiver.try_recv() {
            Ok(sample) => Some(sample),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.closed = true;
                None
            }
        }
    }

    fn connected(&self) -> bool {
        !self.closed
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        if self.closed {
            Some("channel closed".to_string())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(heart_rate: f64) -> VitalsSample {
        VitalsSample {
            heart_rate: Some(heart_rate),
            ..VitalsSample::default()
        }
    }

    #[test]
    fn test_channel_feed_poll_in_order() {
        let (tx, mut feed) = ChannelFeed::create("test");
        assert_eq!(feed.description(), "channel: test");

        // Nothing sent yet
        assert!(feed.poll().is_none());
        assert!(feed.connected());

        tx.try_send(sample(70.0)).unwrap();
        tx.try_send(sample(71.0)).unwrap();

        assert_eq!(feed.poll().unwrap().heart_rate, Some(70.0));
        assert_eq!(feed.poll().unwrap().heart_rate, Some(71.0));
        assert!(feed.poll().is_none());
    }

    #[test]
    fn test_channel_feed_disconnect() {
        let (tx, mut feed) = ChannelFeed::create("test");
        tx.try_send(sample(70.0)).unwrap();
        drop(tx);

        // The queued sample still drains, then the feed reports closed
        assert!(feed.poll().is_some());
        assert!(feed.poll().is_none());
        assert!(!feed.connected());
        assert!(feed.error().unwrap().contains("closed"));
    }
}
