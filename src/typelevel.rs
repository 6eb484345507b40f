//! Type-level helpers

/// Prevents downstream implementations of driver traits.
pub trait Sealed {}
