//! # Event Bus
//!
//! Typed, in-process fan-out between feature slices. Each event type gets its own
//! `tokio` broadcast channel, created on first use and shared by every clone of the bus.
//!
//! ```rust
//! use dayqhi_event_bus::{EventBus, EventBusError, EventReceiverExt};
//!
//! #[derive(Debug)]
//! struct ReadingReceived { aqhi: u8 }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), EventBusError> {
//!     let bus = EventBus::new();
//!     let mut rx = bus.subscribe::<ReadingReceived>()?;
//!     bus.publish(ReadingReceived { aqhi: 7 })?;
//!
//!     let event = EventReceiverExt::recv(&mut rx).await.unwrap();
//!     assert_eq!(event.aqhi, 7);
//!     Ok(())
//! }
//! ```

mod bus;
mod error;
mod receiver;

pub use bus::{DEFAULT_CAPACITY, Event, EventBus};
pub use error::{EventBusError, EventBusErrorExt};
pub use receiver::EventReceiverExt;
