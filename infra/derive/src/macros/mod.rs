pub mod api;
pub mod attrs;
pub mod error;
pub mod runtime;
pub mod slice;
