//! Status codes returned by the log pipeline.
//!
//! `Ok(())` is the OK status; every failure carries one of the variants below.
//! None of them is fatal: the worst outcome of a failed call is a lost record.

/// Failure status of a pipeline operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Internal formatting or resource creation failure
    Failed,
    /// Producer lock not acquired within the bounded wait
    Busy,
    /// Level value outside the defined enumeration
    InvalidArgument,
    /// Called from a context where logging is not allowed (interrupt)
    Unsupported,
    /// Logger used before a successful `init`
    NotInitialized,
}

/// Result of a pipeline operation.
pub type LogResult = Result<(), Status>;

impl Status {
    /// Short error code
    pub fn code(&self) -> &'static str {
        match self {
            Self::Failed => "FAILED",
            Self::Busy => "BUSY",
            Self::InvalidArgument => "INVALID_ARG",
            Self::Unsupported => "UNSUPPORTED",
            Self::NotInitialized => "NOT_INITIALIZED",
        }
    }

    /// Human readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Failed => "operation failed",
            Self::Busy => "lock timeout",
            Self::InvalidArgument => "invalid argument",
            Self::Unsupported => "not supported in this context",
            Self::NotInitialized => "logger not initialized",
        }
    }
}

impl core::fmt::Display for Status {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}: {}", self.code(), self.message())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_and_message() {
        let text = format!("{}", Status::Busy);
        assert_eq!(text, "BUSY: lock timeout");
    }
}
