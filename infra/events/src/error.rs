use std::borrow::Cow;

/// Errors raised by [`crate::EventBus`].
#[dayqhi_derive::dayqhi_error]
pub enum EventBusError {
    /// The channel registered for a `TypeId` holds a different sender type.
    #[error("Type mismatch{}: {message}", format_context(.context))]
    TypeMismatch { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Broadcast buffers need room for at least one event.
    #[error("Invalid capacity{}: {message}", format_context(.context))]
    InvalidCapacity { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
