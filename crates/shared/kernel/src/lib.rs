//! Kernel utilities shared across slices: config loading, application state, system routes,
//! the per-client rate limiter and ID generation.
//!
//! ## ID generation
//! Use `safe_nanoid!` for URL-safe, unambiguous IDs:
//! ```rust
//! # use dayqhi_kernel::safe_nanoid;
//! let id = safe_nanoid!();
//! assert_eq!(id.len(), 12);
//! ```
//!
//! ## Config loading
//! ```rust,no_run
//! use dayqhi_kernel::config::load_config;
//! use dayqhi_kernel::domain::config::ApiConfig;
//!
//! let cfg: ApiConfig = load_config(Some("server")).unwrap_or_default();
//! ```

pub mod config;
pub mod prelude;
pub mod security;
pub mod server;

// No visually ambiguous characters (I, O, l, 0, 1).
pub const SAFE_ALPHABET: &[char; 55] = &[
    '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K', 'L',
    'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'a', 'b', 'c', 'd', 'e', 'f',
    'g', 'h', 'j', 'k', 'm', 'n', 'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
];

pub use dayqhi_domain as domain;
pub use nanoid::nanoid;

/// Generates an unambiguous `NanoID`, 12 characters unless a size is given.
#[macro_export]
macro_rules! safe_nanoid {
    () => {
        $crate::nanoid!(12, $crate::SAFE_ALPHABET)
    };
    ($size:expr) => {
        $crate::nanoid!($size, $crate::SAFE_ALPHABET)
    };
}
