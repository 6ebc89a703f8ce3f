//! Slice registry for feature crates.
//! Type-erased container for slice state built at startup.

use std::any::{Any, TypeId, type_name};
use std::fmt::Debug;

/// Shared state of one feature slice.
pub trait FeatureSlice: Any + Debug + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

/// A slice ready to be stored in the application state.
#[derive(Debug)]
pub struct InitializedSlice {
    pub id: TypeId,
    pub name: &'static str,
    pub state: Box<dyn FeatureSlice>,
}

impl InitializedSlice {
    pub fn new<T: FeatureSlice>(state: T) -> Self {
        Self { id: TypeId::of::<T>(), name: type_name::<T>(), state: Box::new(state) }
    }
}
