use std::sync::Arc;

use tokio::sync::watch;

#[derive(Debug, Clone)]
/// Cooperative stop flag shared between a suite run and the script it is playing.
///
/// Setting it never interrupts an in-flight remote call; playback checks it
/// before dispatching each step, and a pause in progress wakes on it.
pub struct StopSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn request_stop(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_stop_requested(&self) -> bool {
        *self.sender.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::StopSignal;

    #[test]
    fn unit_clones_share_the_same_flag() {
        let signal = StopSignal::new();
        let forwarded = signal.clone();
        assert!(!forwarded.is_stop_requested());
        signal.request_stop();
        assert!(forwarded.is_stop_requested());
        signal.request_stop();
        assert!(forwarded.is_stop_requested());
    }

    #[tokio::test]
    async fn unit_subscribers_observe_stop_requests() {
        let signal = StopSignal::new();
        let mut receiver = signal.subscribe();
        signal.request_stop();
        receiver.changed().await.expect("sender alive");
        assert!(*receiver.borrow());
    }
}
