//! Thread-local math-error status.
//!
//! Host callbacks and the Euclidean modulo routine report domain and range
//! errors through this single indicator, the moral equivalent of the C
//! library's `errno` protocol for math routines. The façade clears it before
//! every evaluation and inspects it afterwards; the constant folder does the
//! same around compile-time calls.

use std::cell::Cell;

/// Status a math routine or host callback may leave behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Errno {
    /// Argument outside the function's domain (`EDOM`).
    Domain,
    /// Result outside the representable range (`ERANGE`).
    Range,
    /// Any other host-side error number.
    Other(i32),
}

thread_local! {
    static MATH_STATUS: Cell<Option<Errno>> = const { Cell::new(None) };
}

/// Record a math error. An earlier unread status is kept so the first error
/// of an evaluation wins.
pub fn raise(errno: Errno) {
    MATH_STATUS.with(|status| {
        if status.get().is_none() {
            status.set(Some(errno));
        }
    });
}

/// Clear the status.
pub fn clear() {
    MATH_STATUS.with(|status| status.set(None));
}

/// Read and clear the status.
pub fn take() -> Option<Errno> {
    MATH_STATUS.with(|status| status.take())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_error_wins() {
        clear();
        raise(Errno::Domain);
        raise(Errno::Range);
        assert_eq!(take(), Some(Errno::Domain));
        assert_eq!(take(), None);
    }

    #[test]
    fn clear_discards() {
        raise(Errno::Range);
        clear();
        assert_eq!(take(), None);
    }
}
