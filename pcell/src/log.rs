//! Crate-internal logging macros.
//!
//! Unit tests print straight to stdout so that generator output
//! shows up in `cargo test -- --nocapture` without a logger.

#[cfg(test)]
#[allow(unused_imports)]
pub(crate) use std::{
    println as trace, println as debug, println as info, println as warn, println as error,
};

#[cfg(not(test))]
#[allow(unused_imports)]
pub(crate) use log::{debug, error, info, trace, warn};

/// Validation findings that know how to report themselves.
pub trait Log {
    fn log(&self);
}
