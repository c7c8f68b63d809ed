//! Conversion error types.

use arcstr::ArcStr;

/// A helper trait for conversion tree-walkers.
///
/// Implementers carry some internal state to report upon failure,
/// which they inject in the required `err` method.
pub trait ErrorHelper {
    type Error;

    /// Creates and returns a [`Self::Error`] value.
    fn err(&self, msg: impl Into<String>) -> Self::Error;

    fn fail<T>(&self, msg: impl Into<String>) -> Result<T, Self::Error> {
        Err(self.err(msg))
    }

    /// Unwraps the [`Option`] `opt` if it is [`Some`] and returns an error if not.
    fn unwrap<T>(&self, opt: Option<T>, msg: impl Into<String>) -> Result<T, Self::Error> {
        match opt {
            Some(val) => Ok(val),
            None => self.fail(msg),
        }
    }

    /// Asserts boolean condition `b`. Returns through `self.fail` if not.
    fn assert(&self, b: bool, msg: impl Into<String>) -> Result<(), Self::Error> {
        match b {
            true => Ok(()),
            false => self.fail(msg),
        }
    }
}

/// A conversion context.
///
/// Used to report where in the layout hierarchy a conversion failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorContext {
    Library,
    Cell(ArcStr),
    Instance(ArcStr),
    Geometry,
    Annotations,
}
