use std::borrow::Cow;

/// Errors raised while connecting to or migrating the database.
#[dayqhi_derive::dayqhi_error]
pub enum DatabaseError {
    /// Missing or malformed builder parameters.
    #[error("Validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Occurs when connectivity or health checks fail.
    #[error("Database connection failed{}: {message}", format_context(.context))]
    Connection { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Root sign-in was rejected.
    #[error("Authentication failed{}: {message}", format_context(.context))]
    Auth { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// A wrapper for underlying `SurrealDB` engine errors.
    #[error("SurrealDB error{}: {source}", format_context(.context))]
    Surreal {
        #[source]
        source: surrealdb::Error,
        context: Option<Cow<'static, str>>,
    },

    /// A migration failed to apply or was altered after being applied.
    #[error("Migration error{}: {message}", format_context(.context))]
    Migration { message: Cow<'static, str>, context: Option<Cow<'static, str>> },

    /// Unexpected failures.
    #[error("Internal database error{}: {message}", format_context(.context))]
    Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}
