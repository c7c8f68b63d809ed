//! Reusable layout element generators.

pub mod via;
