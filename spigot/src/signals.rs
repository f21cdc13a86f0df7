//! Module to control shutdown in spigot.
//!
//! The producer runs until an operator interrupt arrives, at which point the
//! publish loop must be given the chance to finish its current iteration and
//! report its final count. Controlling that hand-off is the responsibility of
//! the code in this module, specifically [`Shutdown`].

use std::sync::Arc;

use tokio::{
    sync::broadcast,
    time::{Duration, interval, sleep},
};
use tracing::{error, info};

/// Errors produced by [`Shutdown`].
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The underlying broadcast mechanism failed.
    #[error("Shutdown signal could not be sent: {0}")]
    Send(#[from] broadcast::error::SendError<()>),
}

#[derive(Debug)]
/// Mechanism to control shutdown in spigot.
///
/// Everything that participates in controlled shutdown holds a clone of this
/// struct. The root instance -- the one created with [`Shutdown::new`] --
/// signals, clones listen.
pub struct Shutdown {
    /// The broadcast sender, a singleton for all `Shutdown` instances derived
    /// from the same root.
    sender: Arc<broadcast::Sender<()>>,
    /// The receive half of the channel, one per instance.
    notify: broadcast::Receiver<()>,
    /// `true` once the shutdown signal has been received by this instance.
    shutdown: bool,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    /// Create a new `Shutdown` instance. There should be only one call to
    /// this function per process; all other instances should be clones.
    #[must_use]
    pub fn new() -> Self {
        let (sender, notify) = broadcast::channel(1);

        Self {
            sender: Arc::new(sender),
            notify,
            shutdown: false,
        }
    }

    /// Receive the shutdown notice. Blocks until a notice is sent, returns
    /// immediately if one has already been received by this instance.
    pub async fn recv(&mut self) {
        if self.shutdown {
            return;
        }

        // Only one value is ever sent through the channel, so a lag error
        // cannot happen.
        let _ = self.notify.recv().await;

        self.shutdown = true;
    }

    /// Send the shutdown signal through to this and all derived `Shutdown`
    /// instances. Returns the number of listening instances, or error.
    ///
    /// # Errors
    ///
    /// Function will return an error if no instance remained to listen.
    pub fn signal(&self) -> Result<usize, Error> {
        Ok(self.sender.send(())?)
    }

    /// Wait for all derived `Shutdown` instances to drop, up to `max_delay`.
    ///
    /// Instances drop when their owning task completes, so this amounts to
    /// waiting for every participant to finish its current work.
    pub async fn wait(self, max_delay: Duration) {
        // Release our own receiver first or the count below never reaches
        // zero.
        drop(self.notify);

        let deadline = sleep(max_delay);
        tokio::pin!(deadline);
        let mut pulse = interval(Duration::from_millis(100));
        loop {
            tokio::select! {
                _ = pulse.tick() => {
                    let remaining = self.sender.receiver_count();
                    if remaining == 0 {
                        info!("all tasks shut down");
                        return;
                    }
                }
                () = &mut deadline => {
                    let remaining = self.sender.receiver_count();
                    error!("shutdown wait elapsed with {remaining} tasks still running");
                    return;
                }
            }
        }
    }
}

impl Clone for Shutdown {
    fn clone(&self) -> Self {
        let notify = self.sender.subscribe();

        Self {
            sender: Arc::clone(&self.sender),
            notify,
            shutdown: self.shutdown,
        }
    }
}
