//! Core Types - Shared Type Definitions
//!
//! Common types used throughout the link stack: the complex baseband
//! sample alias and the error taxonomy shared by the DSP layer and the
//! protocol state machines.
//!
//! Every error here is recoverable. A station or terminal that hits one
//! logs it, drops the offending frame and keeps polling.

use num_complex::Complex64;

/// An I/Q sample: complex float64 baseband representation.
pub type IQSample = Complex64;

/// Result alias for link operations.
pub type LinkResult<T> = Result<T, LinkError>;

/// Errors surfaced by the DSP primitives and protocol handlers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// A sample block did not have the length the operation requires.
    #[error("invalid block length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// A frame referenced a user that holds no bin allocation.
    #[error("user {0} has no bin allocation")]
    UnknownUser(u8),

    /// A control value outside the 2-bit code space.
    #[error("unknown control code {0}")]
    UnknownControlCode(u8),
}
