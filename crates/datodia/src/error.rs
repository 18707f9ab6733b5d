//! Error types for the datodia runtime.

use thiserror::Error;

/// Result type for datodia operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while creating objects.
#[derive(Debug, Error)]
pub enum Error {
    /// No builder is registered for the requested type.
    #[error("no resolver registered for type '{type_name}'")]
    NotRegistered { type_name: &'static str },

    /// A registered builder produced a value of another type.
    #[error("builder registered for type '{type_name}' produced a value of another type")]
    TypeMismatch { type_name: &'static str },

    /// A custom builder failed.
    #[error("failed to build value: {0}")]
    Build(String),
}

impl Error {
    /// Shorthand for [`Error::NotRegistered`] naming `T`.
    pub fn not_registered<T: ?Sized>() -> Self {
        Self::NotRegistered {
            type_name: std::any::type_name::<T>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_registered_names_the_type() {
        let err = Error::not_registered::<Vec<u8>>();

        let message = err.to_string();
        assert!(message.starts_with("no resolver registered for type '"));
        assert!(message.contains("Vec<u8>"));
    }

    #[test]
    fn test_build_error_message() {
        let err = Error::Build("port exhausted".to_string());
        assert_eq!(err.to_string(), "failed to build value: port exhausted");
    }
}
