//! The catalogue of generators exposed by this PDK.
//!
//! Cells are looked up by name and instantiated from a JSON object of
//! parameter overrides. Parameters missing from the overrides keep their
//! documented defaults.

use lazy_static::lazy_static;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::{ErrorSource, Result};
use pcell::layout::cell::Instance;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::all_cells::AllCells;
use crate::diode::{DiodeDw2ps, DiodeNd2ps, DiodeNw2ps, DiodePd2nw, DiodePw2dw, ScDiode};
use crate::guardring::PcmpgrGen;

type InstantiateFn = fn(&PcellCtx, &Value) -> Result<Instance>;
type DefaultsFn = fn() -> Result<Value>;

struct Entry {
    name: &'static str,
    instantiate: InstantiateFn,
    defaults: DefaultsFn,
}

impl Entry {
    fn of<T>(name: &'static str) -> Self
    where
        T: Component,
        T::Params: Default + DeserializeOwned,
    {
        Self {
            name,
            instantiate: instantiate_with::<T>,
            defaults: defaults_of::<T::Params>,
        }
    }
}

lazy_static! {
    static ref ENTRIES: Vec<Entry> = vec![
        Entry::of::<DiodeDw2ps>("diode_dw2ps"),
        Entry::of::<DiodeNd2ps>("diode_nd2ps"),
        Entry::of::<DiodeNw2ps>("diode_nw2ps"),
        Entry::of::<DiodePd2nw>("diode_pd2nw"),
        Entry::of::<DiodePw2dw>("diode_pw2dw"),
        Entry::of::<ScDiode>("sc_diode"),
        Entry::of::<PcmpgrGen>("pcmpgr_gen"),
        Entry::of::<AllCells>("all_cells"),
    ];
}

/// Name-based access to every cell generator in the PDK.
pub struct Registry;

impl Registry {
    /// The registered cell names, in registration order.
    pub fn names() -> impl Iterator<Item = &'static str> {
        ENTRIES.iter().map(|entry| entry.name)
    }

    pub fn contains(name: &str) -> bool {
        ENTRIES.iter().any(|entry| entry.name == name)
    }

    /// The default parameters of the named cell, as a JSON object.
    pub fn defaults(name: &str) -> Result<Value> {
        (Self::entry(name)?.defaults)()
    }

    /// Generates the named cell.
    ///
    /// `overrides` must be `null` or a JSON object whose keys are parameter
    /// names of the cell. Nested objects are merged key by key.
    pub fn instantiate(ctx: &PcellCtx, name: &str, overrides: &Value) -> Result<Instance> {
        (Self::entry(name)?.instantiate)(ctx, overrides)
    }

    fn entry(name: &str) -> Result<&'static Entry> {
        ENTRIES
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| ErrorSource::CellNotFound(name.into()).into())
    }
}

fn defaults_of<P>() -> Result<Value>
where
    P: Default + Serialize,
{
    Ok(serde_json::to_value(P::default())?)
}

fn instantiate_with<T>(ctx: &PcellCtx, overrides: &Value) -> Result<Instance>
where
    T: Component,
    T::Params: Default + DeserializeOwned,
{
    let mut params = defaults_of::<T::Params>()?;
    merge(&mut params, overrides, "")?;
    let params: T::Params = serde_json::from_value(params)
        .map_err(|e| ErrorSource::InvalidArgs(format!("invalid parameters: {e}")))?;
    ctx.instantiate_layout::<T>(&params)
}

/// Overlays `overrides` onto `base`, rejecting keys that `base` lacks.
fn merge(base: &mut Value, overrides: &Value, path: &str) -> Result<()> {
    let overrides = match overrides {
        Value::Null => return Ok(()),
        Value::Object(map) => map,
        other => {
            return Err(ErrorSource::InvalidArgs(format!(
                "expected a mapping of parameter overrides{}, found `{other}`",
                at(path)
            ))
            .into())
        }
    };
    let base = base.as_object_mut().ok_or_else(|| {
        ErrorSource::InvalidArgs(format!("parameter `{path}` does not take nested values"))
    })?;
    merge_map(base, overrides, path)
}

fn merge_map(
    base: &mut Map<String, Value>,
    overrides: &Map<String, Value>,
    path: &str,
) -> Result<()> {
    for (key, value) in overrides {
        let key_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        match base.get_mut(key) {
            None => {
                return Err(
                    ErrorSource::InvalidArgs(format!("unknown parameter `{key_path}`")).into(),
                )
            }
            Some(slot @ Value::Object(_)) if value.is_object() => merge(slot, value, &key_path)?,
            Some(slot) => *slot = value.clone(),
        }
    }
    Ok(())
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!(" at `{path}`")
    }
}
