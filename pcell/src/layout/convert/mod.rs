//! Conversion of generated layouts to foreign formats.

pub mod error;
pub mod gds;
