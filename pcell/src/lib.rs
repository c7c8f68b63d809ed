//! A small parametric-cell layout framework.
//!
//! Components describe how to draw themselves into a [`layout::context::LayoutCtx`];
//! the [`data::PcellCtx`] memoizes generated cells, validates them, and exports
//! them to GDS.

pub mod component;
pub mod data;
pub mod error;
pub mod io;
pub mod layout;
pub mod pdk;
pub mod validation;
pub mod vlsir;

pub use arcstr;
pub use pcgeom as geom;

pub(crate) mod generation;
pub(crate) mod log;

#[cfg(test)]
pub(crate) mod tests;
