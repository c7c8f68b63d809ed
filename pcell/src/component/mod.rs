//! APIs for creating parametric cells.

use std::any::Any;
use std::fmt::Display;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::data::PcellCtx;
use crate::error::{ErrorSource, Result};
use crate::layout::context::LayoutCtx;

pub mod error;

/// A view of a [`Component`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum View {
    /// A physical layout.
    ///
    /// Can be translated to a GDSII library.
    Layout,
}

impl Display for View {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            View::Layout => write!(f, "layout"),
        }
    }
}

/// The trait that all parametric cells must implement.
pub trait Component: Any {
    /// The parameter type.
    type Params: Serialize;

    /// Creates a new instance of this component with the given parameters.
    ///
    /// Implementations should reject out-of-range parameters here,
    /// before any geometry is drawn.
    fn new(params: &Self::Params, ctx: &PcellCtx) -> Result<Self>
    where
        Self: Sized;

    /// Returns the desired name of this component.
    ///
    /// If two distinct cells request the same name, the second
    /// receives a numeric suffix.
    fn name(&self) -> ArcStr {
        arcstr::literal!("unnamed")
    }

    /// Creates a layout view of this component.
    #[allow(unused_variables)]
    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        Err(ErrorSource::Component(error::Error::ViewUnsupported(View::Layout)).into())
    }
}

/// An empty type for components that are not parametrized.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
pub struct NoParams;

/// Uses [`flexbuffers`] to serialize component parameters.
///
/// For caching purposes.
pub(crate) fn serialize_params<T>(x: &T) -> Result<Vec<u8>>
where
    T: Serialize,
{
    let mut s = flexbuffers::FlexbufferSerializer::new();
    x.serialize(&mut s)?;
    Ok(s.take_buffer())
}
