//! The interface between the framework and a process design kit.

use crate::error::Result;
use crate::layout::layers::Layers;

/// A process design kit.
///
/// Provides the layer table and manufacturing grid that every
/// generated cell is drawn against.
pub trait Pdk: Send + Sync {
    fn name(&self) -> &'static str;

    fn process(&self) -> &'static str;

    /// Builds the PDK's layer table.
    fn layers(&self) -> Result<Layers>;

    /// The grid on which all layout geometry must lie, in nanometres.
    fn layout_grid(&self) -> i64;
}
