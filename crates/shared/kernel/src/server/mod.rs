//! HTTP building blocks shared by every slice.

pub mod error;
mod extract;
mod health;
mod hello;
pub mod limiter;
pub mod router;
pub mod state;

pub use extract::ApiJson;
pub use state::{ApiState, ApiStateBuilder, ApiStateError};
