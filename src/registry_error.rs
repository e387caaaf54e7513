//! Error taxonomy for registration and construction.
//!
//! Lookups never produce these errors: a missing key is represented by `None`,
//! not an `Err`. Every variant here surfaces synchronously from the `register_*`
//! call that triggered it, and none of them leaves the store mutated.

use thiserror::Error;

/// Errors returned by registry registration and by constructor invocation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A `register_*` call targeted a key that already holds a provider.
    /// Checked before any other work; the existing entry is untouched.
    #[error("duplicate registration for {key}")]
    DuplicateRegistration {
        /// Description of the offending key, `[label]:Contract`.
        key: String,
    },

    /// No constructor in the table takes the requested number of arguments.
    /// Checked after the duplicate check and before any construction.
    #[error("no constructor taking {arg_count} argument(s) on {type_name}")]
    ConstructorNotFound {
        /// Implementation type the table was built for.
        type_name: &'static str,
        /// Number of arguments the registration supplied.
        arg_count: usize,
    },

    /// The resolved constructor itself failed when invoked.
    #[error("construction of {type_name} failed: {reason}")]
    ConstructionFailed {
        /// Implementation type being constructed.
        type_name: &'static str,
        /// Constructor-supplied failure reason.
        reason: String,
    },

    /// A stored argument did not downcast to the type the constructor expected.
    /// Argument types are only checked at invocation, never at resolution.
    #[error("constructor argument {index} is not a {expected}")]
    ArgumentMismatch {
        /// Zero-based position in the argument list.
        index: usize,
        /// Type the constructor asked for.
        expected: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_registration_display() {
        let err = RegistryError::DuplicateRegistration {
            key: "[console]:Logger".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate registration for [console]:Logger"
        );
    }

    #[test]
    fn test_constructor_not_found_display() {
        let err = RegistryError::ConstructorNotFound {
            type_name: "ConsoleLogger",
            arg_count: 2,
        };
        assert_eq!(
            err.to_string(),
            "no constructor taking 2 argument(s) on ConsoleLogger"
        );
    }

    #[test]
    fn test_construction_failed_display() {
        let err = RegistryError::ConstructionFailed {
            type_name: "ConsoleLogger",
            reason: "prefix must not be empty".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "construction of ConsoleLogger failed: prefix must not be empty"
        );
    }

    #[test]
    fn test_argument_mismatch_display() {
        let err = RegistryError::ArgumentMismatch {
            index: 1,
            expected: "alloc::string::String",
        };
        assert_eq!(
            err.to_string(),
            "constructor argument 1 is not a alloc::string::String"
        );
    }

    #[test]
    fn test_equality() {
        let a = RegistryError::ConstructorNotFound {
            type_name: "A",
            arg_count: 1,
        };
        let b = RegistryError::ConstructorNotFound {
            type_name: "A",
            arg_count: 1,
        };
        assert_eq!(a, b);
        assert_ne!(
            a,
            RegistryError::ConstructorNotFound {
                type_name: "A",
                arg_count: 2,
            }
        );
    }

    #[test]
    fn test_error_trait() {
        let err: &dyn std::error::Error = &RegistryError::DuplicateRegistration {
            key: "[]:String".to_string(),
        };
        assert_eq!(err.to_string(), "duplicate registration for []:String");
    }
}
