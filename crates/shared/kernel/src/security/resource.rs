use crate::SAFE_ALPHABET;
use std::borrow::Cow;

#[dayqhi_derive::dayqhi_error]
pub enum ResourceGuardError {
    #[error("Resource validation error{}: {message}", format_context(.context))]
    Validation { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Checks record identifiers that arrive from clients before they reach a query.
#[derive(Debug)]
pub struct ResourceGuard;

impl ResourceGuard {
    /// Returns the bare record key of `id` for `table`.
    ///
    /// Accepts `"table:key"` or just `"key"`. The key must be non-empty and drawn from
    /// [`SAFE_ALPHABET`], which is what [`crate::safe_nanoid!`] produces.
    ///
    /// # Errors
    /// Returns an error on a table prefix mismatch or a malformed key.
    pub fn key<I, T>(id: I, expected_table: T) -> Result<String, ResourceGuardError>
    where
        I: AsRef<str>,
        T: AsRef<str>,
    {
        let id = id.as_ref();
        let expected = expected_table.as_ref();

        let key = match id.split_once(':') {
            Some((table, _)) if table != expected => {
                return Err(ResourceGuardError::Validation {
                    message: format!("Expected '{expected}', got '{table}'").into(),
                    context: Some("ID table mismatch".into()),
                });
            },
            Some((_, key)) => key,
            None => id,
        };

        if key.is_empty() || !key.chars().all(|c| SAFE_ALPHABET.contains(&c)) {
            return Err(ResourceGuardError::Validation {
                message: format!("Malformed {expected} id '{id}'").into(),
                context: None,
            });
        }

        Ok(key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_prefixed_and_bare_keys() {
        assert_eq!(ResourceGuard::key("alert:Ab3x9", "alert").unwrap(), "Ab3x9");
        assert_eq!(ResourceGuard::key("Ab3x9", "alert").unwrap(), "Ab3x9");
    }

    #[test]
    fn rejects_other_tables() {
        assert!(ResourceGuard::key("user:Ab3x9", "alert").is_err());
    }

    #[test]
    fn rejects_injection_attempts() {
        assert!(ResourceGuard::key("x; DELETE alert", "alert").is_err());
        assert!(ResourceGuard::key("", "alert").is_err());
        assert!(ResourceGuard::key("alert:", "alert").is_err());
    }
}
