use crate::bus::Event;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::warn;

/// Lag-tolerant receiving for broadcast receivers.
pub trait EventReceiverExt<T> {
    /// Waits for the next event, skipping over anything lost to lag.
    /// Returns `None` once the channel is closed.
    fn recv(&mut self) -> impl Future<Output = Option<Arc<T>>> + Send;
}

impl<T: Event> EventReceiverExt<T> for broadcast::Receiver<Arc<T>> {
    async fn recv(&mut self) -> Option<Arc<T>> {
        let mut skipped = 0u64;

        loop {
            match broadcast::Receiver::recv(self).await {
                Ok(event) => {
                    if skipped > 0 {
                        warn!(
                            event = std::any::type_name::<T>(),
                            skipped, "Receiver lagged; continuing from the oldest retained event"
                        );
                    }
                    return Some(event);
                },
                Err(broadcast::error::RecvError::Lagged(n)) => skipped = skipped.saturating_add(n),
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
