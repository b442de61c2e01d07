//! Utility traits and functions.

use std::any::Any;

/// Extension trait to allow downcasting trait objects to concrete types.
pub trait AsAny {
    /// Get a reference to self as Any.
    fn as_any(&self) -> &dyn Any;

    /// Get a mutable reference to self as Any.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
