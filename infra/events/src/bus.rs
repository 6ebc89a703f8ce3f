use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId, type_name};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::trace;

/// Buffer size used by [`EventBus::subscribe`] and by channels created on publish.
pub const DEFAULT_CAPACITY: usize = 128;

/// Anything that can travel across the bus.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

type Sender<T> = broadcast::Sender<Arc<T>>;

/// Cloneable handle; all clones share the same channels.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, Box<dyn Any + Send + Sync>>>>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to `T` with the default buffer.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to `T`. `capacity` only applies when this call creates the channel.
    ///
    /// # Errors
    /// Returns [`EventBusError::InvalidCapacity`] when `capacity` is zero.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        if capacity == 0 {
            return Err(EventBusError::InvalidCapacity {
                message: "capacity must be greater than zero".into(),
                context: Some(type_name::<T>().into()),
            });
        }
        Ok(self.sender::<T>(capacity)?.subscribe())
    }

    /// Publishes `event` and returns how many subscribers received it.
    ///
    /// Publishing with no subscribers is not an error; the event is dropped.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes an already shared event.
    ///
    /// # Errors
    /// Returns [`EventBusError::TypeMismatch`] if the registry is corrupted.
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let sender = self.sender::<T>(DEFAULT_CAPACITY)?;
        match sender.send(event) {
            Ok(count) => {
                trace!(event = type_name::<T>(), count, "Event dispatched");
                Ok(count)
            },
            Err(_) => {
                trace!(event = type_name::<T>(), "Event dropped: no active subscribers");
                Ok(0)
            },
        }
    }

    /// Number of live receivers for `T`.
    #[must_use]
    pub fn subscriber_count<T: Event>(&self) -> usize {
        self.channels
            .read()
            .get(&TypeId::of::<T>())
            .and_then(|slot| slot.downcast_ref::<Sender<T>>())
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Drops every channel; pending receivers observe `Closed`.
    pub fn shutdown(&self) -> usize {
        let mut channels = self.channels.write();
        let count = channels.len();
        channels.clear();
        count
    }

    fn sender<T: Event>(&self, capacity: usize) -> Result<Sender<T>, EventBusError> {
        let id = TypeId::of::<T>();

        if let Some(slot) = self.channels.read().get(&id) {
            return downcast::<T>(slot.as_ref());
        }

        let mut channels = self.channels.write();
        let slot = channels.entry(id).or_insert_with(|| {
            trace!(event = type_name::<T>(), capacity, "Creating broadcast channel");
            Box::new(broadcast::channel::<Arc<T>>(capacity).0)
        });
        downcast::<T>(slot.as_ref())
    }
}

fn downcast<T: Event>(slot: &(dyn Any + Send + Sync)) -> Result<Sender<T>, EventBusError> {
    slot.downcast_ref::<Sender<T>>().cloned().ok_or_else(|| EventBusError::TypeMismatch {
        message: type_name::<T>().into(),
        context: Some("Registered sender has an unexpected type".into()),
    })
}
