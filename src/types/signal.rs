//! Abort signals attached to requests.
//!
//! The message model only stores the signal; transports observe it.

use tokio::sync::watch;

/// Owner side that can fire its [`AbortSignal`].
#[derive(Debug)]
pub struct AbortController {
    tx: watch::Sender<bool>,
    signal: AbortSignal,
}

/// Cloneable, observe-only handle to an abort flag.
#[derive(Debug, Clone)]
pub struct AbortSignal {
    rx: watch::Receiver<bool>,
}

impl AbortController {
    /// Create a controller whose signal has not fired.
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        AbortController {
            tx,
            signal: AbortSignal { rx },
        }
    }

    /// A handle to this controller's signal.
    pub fn signal(&self) -> AbortSignal {
        self.signal.clone()
    }

    /// Fire the signal. Idempotent.
    pub fn abort(&self) {
        self.tx.send_replace(true);
    }
}

impl Default for AbortController {
    fn default() -> Self {
        Self::new()
    }
}

impl AbortSignal {
    /// Whether the signal has fired.
    pub fn aborted(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once the signal fires.
    ///
    /// Never resolves if the controller is dropped without aborting.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if rx.wait_for(|aborted| *aborted).await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}
