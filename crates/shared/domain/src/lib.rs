//! # Domain Models
//!
//! Plain data shared across DayQHI crates: configuration, OpenAPI tags and the slice
//! registry. Only `serde` is allowed here; no I/O.

pub mod config;
pub mod constants;
pub mod registry;
