//! Utilities for placing instances relative to one another.

pub mod pack;
