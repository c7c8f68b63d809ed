//! Circuit-simulation metadata attached to generated cells.
//!
//! A [`VlsirInfo`] tells a netlister which SPICE primitive a cell
//! stands for and how the cell's ports map onto the primitive's terminals.

use std::fmt;

use arcstr::ArcStr;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Geometric device parameters, tagged by device kind.
///
/// Lengths are in micrometres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DeviceParams {
    Diode { l: f64, w: f64, m: Option<u32> },
    Resistor { l: f64, w: f64 },
    Capacitor { l: f64, w: f64 },
    Mosfet { l: f64, w: f64, nf: u32, m: u32 },
    Bipolar { area: f64 },
}

impl DeviceParams {
    /// The SPICE device category.
    pub fn spice_type(&self) -> &'static str {
        match self {
            Self::Diode { .. } => "DIODE",
            Self::Resistor { .. } => "RESISTOR",
            Self::Capacitor { .. } => "CAPACITOR",
            Self::Mosfet { .. } => "MOS",
            Self::Bipolar { .. } => "BIPOLAR",
        }
    }

    /// The netlist instance prefix for this kind of device.
    pub fn spice_prefix(&self) -> char {
        match self {
            Self::Diode { .. } => 'D',
            Self::Resistor { .. } => 'R',
            Self::Capacitor { .. } => 'C',
            Self::Mosfet { .. } => 'M',
            Self::Bipolar { .. } => 'Q',
        }
    }

    fn to_json(&self) -> Value {
        match *self {
            Self::Diode { l, w, m } => {
                let mut params = json!({ "l": l, "w": w });
                if let (Some(m), Some(obj)) = (m, params.as_object_mut()) {
                    obj.insert("m".to_string(), json!(m));
                }
                params
            }
            Self::Resistor { l, w } | Self::Capacitor { l, w } => json!({ "l": l, "w": w }),
            Self::Mosfet { l, w, nf, m } => json!({ "l": l, "w": w, "nf": nf, "m": m }),
            Self::Bipolar { area } => json!({ "area": area }),
        }
    }

    fn from_json(spice_type: &str, params: &Map<String, Value>) -> Result<Self, VlsirError> {
        let length = |key: &'static str| -> Result<f64, VlsirError> {
            params
                .get(key)
                .and_then(Value::as_f64)
                .ok_or_else(|| VlsirError::invalid(key, "expected a number"))
        };
        let count = |key: &'static str| -> Result<Option<u32>, VlsirError> {
            match params.get(key) {
                None => Ok(None),
                Some(v) => v
                    .as_u64()
                    .and_then(|n| u32::try_from(n).ok())
                    .map(Some)
                    .ok_or_else(|| VlsirError::invalid(key, "expected a positive integer")),
            }
        };
        Ok(match spice_type {
            "DIODE" => Self::Diode {
                l: length("l")?,
                w: length("w")?,
                m: count("m")?,
            },
            "RESISTOR" => Self::Resistor {
                l: length("l")?,
                w: length("w")?,
            },
            "CAPACITOR" => Self::Capacitor {
                l: length("l")?,
                w: length("w")?,
            },
            "MOS" => Self::Mosfet {
                l: length("l")?,
                w: length("w")?,
                nf: count("nf")?.unwrap_or(1),
                m: count("m")?.unwrap_or(1),
            },
            "BIPOLAR" => Self::Bipolar {
                area: length("area")?,
            },
            other => return Err(VlsirError::UnknownSpiceType(other.to_string())),
        })
    }

    fn spice_params(&self) -> String {
        match *self {
            Self::Diode { l, w, m: Some(m) } => format!("l={l}u w={w}u m={m}"),
            Self::Diode { l, w, m: None } => format!("l={l}u w={w}u"),
            Self::Resistor { l, w } | Self::Capacitor { l, w } => format!("l={l}u w={w}u"),
            Self::Mosfet { l, w, nf, m } => format!("l={l}u w={w}u nf={nf} m={m}"),
            Self::Bipolar { area } => format!("area={area}"),
        }
    }
}

/// Simulation metadata for a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VlsirInfo {
    /// The device model name.
    pub model: ArcStr,
    /// The SPICE library section the model lives in.
    pub spice_lib: ArcStr,
    /// Port names in the order the simulator expects them.
    pub port_order: Vec<ArcStr>,
    /// An optional renaming from cell port names to simulator port names.
    pub port_map: Option<Vec<(ArcStr, ArcStr)>>,
    pub device: DeviceParams,
}

/// An inconsistency in a [`VlsirInfo`] record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VlsirError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("unknown `spice_type` {0:?}")]
    UnknownSpiceType(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("`port_order` is empty")]
    EmptyPortOrder,

    #[error("`port_order` entry {0:?} does not name a port of the cell")]
    DanglingPortOrder(ArcStr),

    #[error("`port_map` key {0:?} does not name a port of the cell")]
    DanglingPortMap(ArcStr),
}

impl VlsirError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this issue should not reject the cell.
    ///
    /// A `port_order` entry without a matching port is tolerated, since some
    /// devices only expose a terminal for certain parameter combinations.
    pub fn is_warning(&self) -> bool {
        matches!(self, Self::DanglingPortOrder(_))
    }
}

impl VlsirInfo {
    /// Creates metadata for a two-terminal diode with ports `anode` and `cathode`.
    pub fn diode(model: impl Into<ArcStr>, l: f64, w: f64) -> Self {
        Self {
            model: model.into(),
            spice_lib: arcstr::literal!("dio"),
            port_order: vec![arcstr::literal!("anode"), arcstr::literal!("cathode")],
            port_map: None,
            device: DeviceParams::Diode { l, w, m: None },
        }
    }

    #[inline]
    pub fn spice_type(&self) -> &'static str {
        self.device.spice_type()
    }

    /// Checks this record against the ports of a cell.
    ///
    /// Returns every issue found; an empty list means the record is consistent.
    pub fn validate<'a>(&self, port_names: impl IntoIterator<Item = &'a str>) -> Vec<VlsirError> {
        let port_names: Vec<&str> = port_names.into_iter().collect();
        let mut issues = Vec::new();
        if self.port_order.is_empty() {
            issues.push(VlsirError::EmptyPortOrder);
        }
        for name in self.port_order.iter() {
            if !port_names.contains(&name.as_str()) {
                issues.push(VlsirError::DanglingPortOrder(name.clone()));
            }
        }
        for (key, _) in self.port_map.iter().flatten() {
            if !port_names.contains(&key.as_str()) {
                issues.push(VlsirError::DanglingPortMap(key.clone()));
            }
        }
        issues
    }

    /// Like [`VlsirInfo::validate`], but fails on the first issue of any severity.
    pub fn check<'a>(&self, port_names: impl IntoIterator<Item = &'a str>) -> Result<(), VlsirError> {
        match self.validate(port_names).into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The simulator-side name of cell port `port`.
    pub fn mapped_name<'a>(&'a self, port: &'a ArcStr) -> &'a ArcStr {
        self.port_map
            .iter()
            .flatten()
            .find(|(k, _)| k == port)
            .map(|(_, v)| v)
            .unwrap_or(port)
    }

    /// Emits the mapping form of this record.
    pub fn to_json(&self) -> Value {
        let port_map: Map<String, Value> = self
            .port_map
            .iter()
            .flatten()
            .map(|(k, v)| (k.to_string(), json!(v.as_str())))
            .collect();
        json!({
            "model": self.model.as_str(),
            "spice_type": self.spice_type(),
            "spice_lib": self.spice_lib.as_str(),
            "port_order": self.port_order.iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "port_map": port_map,
            "params": self.device.to_json(),
        })
    }

    /// Parses the mapping form of a record.
    ///
    /// An empty `port_map` parses as no mapping at all.
    pub fn from_json(value: &Value) -> Result<Self, VlsirError> {
        let obj = value
            .as_object()
            .ok_or_else(|| VlsirError::invalid("vlsir", "expected a mapping"))?;

        let string = |key: &'static str| -> Result<ArcStr, VlsirError> {
            let v = obj.get(key).ok_or(VlsirError::MissingField(key))?;
            v.as_str()
                .map(ArcStr::from)
                .ok_or_else(|| VlsirError::invalid(key, "expected a string"))
        };

        let model = string("model")?;
        let spice_type = string("spice_type")?;
        let spice_lib = match obj.get("spice_lib") {
            Some(_) => string("spice_lib")?,
            None => ArcStr::new(),
        };

        let port_order = obj
            .get("port_order")
            .ok_or(VlsirError::MissingField("port_order"))?
            .as_array()
            .ok_or_else(|| VlsirError::invalid("port_order", "expected a list"))?
            .iter()
            .map(|v| {
                v.as_str()
                    .map(ArcStr::from)
                    .ok_or_else(|| VlsirError::invalid("port_order", "expected port names"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let port_map = match obj.get("port_map") {
            None | Some(Value::Null) => None,
            Some(Value::Object(map)) if map.is_empty() => None,
            Some(Value::Object(map)) => Some(
                map.iter()
                    .map(|(k, v)| {
                        v.as_str()
                            .map(|v| (ArcStr::from(k.as_str()), ArcStr::from(v)))
                            .ok_or_else(|| {
                                VlsirError::invalid("port_map", "expected port names as values")
                            })
                    })
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            Some(_) => return Err(VlsirError::invalid("port_map", "expected a mapping")),
        };

        let empty = Map::new();
        let params = match obj.get("params") {
            None => &empty,
            Some(Value::Object(params)) => params,
            Some(_) => return Err(VlsirError::invalid("params", "expected a mapping")),
        };
        let device = DeviceParams::from_json(&spice_type, params)?;

        Ok(Self {
            model,
            spice_lib,
            port_order,
            port_map,
            device,
        })
    }

    /// Emits a flat SPICE netlist wrapping one instance of this device.
    pub fn to_spice(&self, cell_name: &str, instance_name: &str) -> String {
        let nodes = self
            .port_order
            .iter()
            .map(|p| self.mapped_name(p).as_str())
            .join(" ");
        format!(
            "* {cell_name}\n.subckt {cell_name} {nodes}\n{}{instance_name} {nodes} {} {}\n.ends {cell_name}\n",
            self.device.spice_prefix(),
            self.model,
            self.device.spice_params(),
        )
    }
}

impl fmt::Display for VlsirInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.spice_type(), self.model)
    }
}
