//! Generic error reporting utilities
//!
//! Lets the binary report fatal errors from any subsystem with a user-facing
//! line plus debug-level detail.

/// Errors that can tell a user-actionable problem from an internal failure
///
/// When `is_user_actionable()` returns `true`, `user_message()` should return
/// `Some(message)`; otherwise it should return `None`.
pub trait ContextualError: std::error::Error {
    /// True if the error carries a message the user can act on directly
    fn is_user_actionable(&self) -> bool;

    /// The actionable message, if any
    fn user_message(&self) -> Option<&str>;
}

/// Log an error at the right level of detail.
///
/// User-actionable errors print their message plus the full error text;
/// everything else prints only the operation context. The full error and
/// its debug form always go to the debug log.
pub fn log_error_with_context<E: ContextualError + std::fmt::Debug>(
    error: &E,
    operation_context: &str,
) {
    match error.user_message() {
        Some(user_msg) if error.is_user_actionable() => {
            log::error!("FATAL: {}: {}", user_msg, error);
        }
        _ => log::error!("FATAL: {}", operation_context),
    }
    log::debug!("DETAIL: {}", error);
    log::debug!("DEBUG_DETAILS: {:?}", error);
}
