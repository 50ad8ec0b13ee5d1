//! Result and error types for Pagewright.

use thiserror::Error;

/// Result type for Pagewright operations
pub type PagewrightResult<T> = Result<T, PagewrightError>;

/// Errors that can occur while driving page objects
#[derive(Debug, Error)]
pub enum PagewrightError {
    /// Selector matched zero nodes at action time
    #[error("No element matches selector `{selector}`")]
    ElementNotFound {
        /// Selector that was resolved
        selector: String,
    },

    /// Selector matched several nodes where exactly one was required
    #[error("Selector `{selector}` matched {count} elements, expected exactly one")]
    AmbiguousElement {
        /// Selector that was resolved
        selector: String,
        /// Number of matching nodes
        count: usize,
    },

    /// A wait condition never became true within its budget
    #[error("Timed out after {timeout_ms}ms waiting for {condition}{}", last_error_suffix(.last_error))]
    WaitTimeout {
        /// Human-readable description of the condition
        condition: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
        /// Last error reported by a check, if any
        last_error: Option<String>,
    },

    /// Opaque fault reported by the driver layer
    #[error("Driver fault: {message}")]
    Driver {
        /// Error message
        message: String,
    },

    /// Invalid argument passed to an operation
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message
        message: String,
    },

    /// Settings could not be loaded or are invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// URL parsing error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

fn last_error_suffix(last_error: &Option<String>) -> String {
    last_error
        .as_ref()
        .map(|e| format!(" (last error: {e})"))
        .unwrap_or_default()
}

impl PagewrightError {
    /// Create a driver fault
    pub fn driver(message: impl Into<String>) -> Self {
        Self::Driver {
            message: message.into(),
        }
    }

    /// Create an invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Whether the error only signals that a target is absent or ambiguous.
    ///
    /// Workflows that treat a target as optionally present may swallow these.
    /// Timeouts and driver faults are never recoverable.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. } | Self::AmbiguousElement { .. }
        )
    }

    /// Whether this is a wait timeout
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::WaitTimeout { .. })
    }
}

/// Turns recoverable absence into a no-op for optional actions.
///
/// ```ignore
/// if sign_out.click().await.if_present()?.is_none() {
///     return Ok(()); // not signed in
/// }
/// ```
pub trait OptionalAction<T> {
    /// `Ok(Some(value))` on success, `Ok(None)` on a recoverable error,
    /// the error itself otherwise.
    fn optional(self) -> PagewrightResult<Option<T>>;

    /// Like [`optional`](Self::optional) but only zero matches count as
    /// absence; an ambiguous match still fails.
    fn if_present(self) -> PagewrightResult<Option<T>>;
}

impl<T> OptionalAction<T> for PagewrightResult<T> {
    fn optional(self) -> PagewrightResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(err) if err.is_recoverable() => {
                tracing::debug!(error = %err, "optional action skipped");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn if_present(self) -> PagewrightResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(PagewrightError::ElementNotFound { selector }) => {
                tracing::debug!(%selector, "target absent, action skipped");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    mod display_tests {
        use super::*;

        #[test]
        fn test_not_found_names_selector() {
            let err = PagewrightError::ElementNotFound {
                selector: ".missing".to_string(),
            };
            assert_eq!(err.to_string(), "No element matches selector `.missing`");
        }

        #[test]
        fn test_ambiguous_names_count() {
            let err = PagewrightError::AmbiguousElement {
                selector: "li".to_string(),
                count: 3,
            };
            assert!(err.to_string().contains("matched 3 elements"));
        }

        #[test]
        fn test_timeout_carries_description() {
            let err = PagewrightError::WaitTimeout {
                condition: "element `.x` to be visible".to_string(),
                timeout_ms: 200,
                last_error: None,
            };
            assert_eq!(
                err.to_string(),
                "Timed out after 200ms waiting for element `.x` to be visible"
            );
        }

        #[test]
        fn test_timeout_includes_last_error() {
            let err = PagewrightError::WaitTimeout {
                condition: "home".to_string(),
                timeout_ms: 10,
                last_error: Some("boom".to_string()),
            };
            assert!(err.to_string().ends_with("(last error: boom)"));
        }
    }

    mod recoverable_tests {
        use super::*;

        #[test]
        fn test_absence_is_recoverable() {
            assert!(PagewrightError::ElementNotFound {
                selector: "a".into()
            }
            .is_recoverable());
            assert!(PagewrightError::AmbiguousElement {
                selector: "a".into(),
                count: 2
            }
            .is_recoverable());
        }

        #[test]
        fn test_faults_are_not_recoverable() {
            assert!(!PagewrightError::driver("crash").is_recoverable());
            let timeout = PagewrightError::WaitTimeout {
                condition: "x".into(),
                timeout_ms: 1,
                last_error: None,
            };
            assert!(!timeout.is_recoverable());
            assert!(timeout.is_timeout());
        }
    }

    mod optional_tests {
        use super::*;

        #[test]
        fn test_optional_success() {
            let result: PagewrightResult<u8> = Ok(7);
            assert_eq!(result.optional().unwrap(), Some(7));
        }

        #[test]
        fn test_optional_swallows_not_found() {
            let result: PagewrightResult<()> = Err(PagewrightError::ElementNotFound {
                selector: ".signout".into(),
            });
            assert!(result.optional().unwrap().is_none());
        }

        #[test]
        fn test_optional_swallows_ambiguity() {
            let result: PagewrightResult<()> = Err(PagewrightError::AmbiguousElement {
                selector: ".signout".into(),
                count: 2,
            });
            assert!(result.optional().unwrap().is_none());
        }

        #[test]
        fn test_if_present_only_swallows_not_found() {
            let missing: PagewrightResult<()> = Err(PagewrightError::ElementNotFound {
                selector: ".signout".into(),
            });
            assert!(missing.if_present().unwrap().is_none());

            let ambiguous: PagewrightResult<()> = Err(PagewrightError::AmbiguousElement {
                selector: ".signout".into(),
                count: 2,
            });
            assert!(matches!(
                ambiguous.if_present(),
                Err(PagewrightError::AmbiguousElement { count: 2, .. })
            ));

            let present: PagewrightResult<u8> = Ok(1);
            assert_eq!(present.if_present().unwrap(), Some(1));
        }

        #[test]
        fn test_optional_propagates_driver_fault() {
            let result: PagewrightResult<()> = Err(PagewrightError::driver("socket closed"));
            assert!(matches!(
                result.optional(),
                Err(PagewrightError::Driver { .. })
            ));
        }
    }
}
