//! The `Selector` type for PDK layer selection.

use serde::Serialize;

use super::GdsLayerSpec;

/// An enumeration for selecting layers in a PDK.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
pub enum Selector<'a> {
    /// The n'th metal layer, starting from `Metal(1)`.
    Metal(usize),
    /// The via layer connecting metal `N + 1` to metal `N`.
    ///
    /// For example, `Via(1)` connects metal 2 to metal 1.
    /// `Via(0)` is the contact layer between diffusion and metal 1.
    Via(usize),
    /// The layer with the given name.
    Name(&'a str),
    /// The layer containing the given GDS spec.
    ///
    /// A layer may own several GDS specs,
    /// such as "metal1 drawing" and "metal1 label".
    Gds(GdsLayerSpec),
}
