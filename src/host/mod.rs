use crate::protocol::HostMessage;
use crate::replay::constants::HOST_CHANNEL_CAPACITY;
use tokio::sync::broadcast;

/// Tells the page embedding the viewer which turn is on screen. Fire and
/// forget: nothing waits on it and nothing is retried.
pub trait HostNotifier: Send + Sync + 'static {
    fn notify(&self, turn: u32);
}

#[derive(Debug, Clone)]
pub struct BroadcastHost {
    sender: broadcast::Sender<HostMessage>,
}

impl BroadcastHost {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(HOST_CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<HostMessage> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastHost {
    fn default() -> Self {
        Self::new()
    }
}

impl HostNotifier for BroadcastHost {
    fn notify(&self, turn: u32) {
        // No subscribers just means no host page is attached yet.
        let _ = self.sender.send(HostMessage { turn });
    }
}
