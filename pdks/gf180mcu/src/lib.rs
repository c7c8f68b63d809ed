//! Parametric cells for the GF180MCU process.
//!
//! Every generator is a [`Component`](pcell::component::Component) whose
//! parameters are given in micrometres and converted to nanometre
//! database units before any geometry is built.

use std::fmt::Display;
use std::str::FromStr;

use pcell::error::{ErrorSource, PcellError, Result};
use pcell::layout::layers::Layers;
use pcell::pdk::Pdk;
use serde::{Deserialize, Serialize};

pub mod all_cells;
pub mod constants;
pub mod diode;
pub mod guardring;
pub mod layers;
pub mod registry;
pub mod via;

pub(crate) mod params;

/// The GF180MCU process design kit.
#[derive(Debug, Default, Clone, Copy)]
pub struct Gf180Pdk;

impl Gf180Pdk {
    pub fn new() -> Self {
        Self
    }
}

impl Pdk for Gf180Pdk {
    fn name(&self) -> &'static str {
        "gf180mcu"
    }

    fn process(&self) -> &'static str {
        "gf180mcu"
    }

    fn layers(&self) -> Result<Layers> {
        Self::layer_table()
    }

    /// The grid resolution in GF180MCU is 5 nanometers.
    fn layout_grid(&self) -> i64 {
        5
    }
}

/// The operating-voltage class of a device.
///
/// Devices in the 5/6V class are covered by a dual-gate marker.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Voltage {
    #[default]
    #[serde(rename = "3.3V")]
    V3p3,
    #[serde(rename = "5/6V")]
    V5p6,
}

impl Voltage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::V3p3 => "3.3V",
            Self::V5p6 => "5/6V",
        }
    }

    #[inline]
    pub fn is_high(&self) -> bool {
        matches!(self, Self::V5p6)
    }
}

impl Display for Voltage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Voltage {
    type Err = PcellError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "3.3V" => Ok(Self::V3p3),
            "5/6V" => Ok(Self::V5p6),
            other => Err(ErrorSource::InvalidArgs(format!(
                "unknown voltage class `{other}`, expected \"3.3V\" or \"5/6V\""
            ))
            .into()),
        }
    }
}
