//! Common imports for feature slices.

pub use crate::domain::config::ApiConfig;
pub use crate::domain::constants::*;
pub use crate::domain::registry::{FeatureSlice, InitializedSlice};
pub use crate::safe_nanoid;
pub use crate::security::resource::ResourceGuard;
pub use crate::server::error::ErrorBody;
pub use crate::server::ApiJson;
pub use crate::server::state::{ApiState, ApiStateError};
pub use dayqhi_database::Database;
pub use dayqhi_event_bus::EventBus;
