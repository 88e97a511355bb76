// Stop signal shared between the daemon and the worker loop

use tokio::sync::watch;

/// Receiving half, held by the worker loop. Cloneable so a future
/// supervisor task can observe the same signal.
#[derive(Clone)]
pub struct ShutdownToken {
    rx: watch::Receiver<bool>,
}

impl ShutdownToken {
    /// Resolve once a stop has been requested.
    ///
    /// A dropped sender counts as a stop request, so a crashed daemon
    /// cannot leave the worker running forever.
    pub async fn wait(&mut self) {
        while !*self.rx.borrow() {
            if self.rx.changed().await.is_err() {
                return;
            }
        }
    }
}

/// Sending half, held by the daemon
pub struct ShutdownSender {
    tx: watch::Sender<bool>,
}

impl ShutdownSender {
    /// Ask the worker to stop; the item in flight finishes first
    pub fn shutdown(&self) {
        let _ = self.tx.send(true);
    }
}

pub fn shutdown_channel() -> (ShutdownSender, ShutdownToken) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSender { tx }, ShutdownToken { rx })
}
