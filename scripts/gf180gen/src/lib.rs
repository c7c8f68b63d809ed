use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use gf180mcu::registry::Registry;
use gf180mcu::Gf180Pdk;
use log::info;
use pcell::data::{PcellConfig, PcellCtx};
use pcell::layout::cell::Instance;
use serde::Deserialize;
use serde_json::{Map, Value};

pub const DEFAULT_CELL: &str = "all_cells";

/// Settings read from a TOML file.
///
/// ```toml
/// cell = "diode_nd2ps"
/// output = "build/nd2ps.gds"
///
/// [params]
/// volt = "5/6V"
/// wa = 0.5
/// ```
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub cell: Option<String>,
    pub output: Option<PathBuf>,
    pub params: toml::Table,
}

impl Config {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = pcell::io::read_to_string(path)?;
        toml::from_str(&contents).with_context(|| format!("failed to parse config {path:?}"))
    }
}

/// A fully resolved generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub cell: String,
    pub output: PathBuf,
    pub params: Value,
    pub vlsir_json: Option<PathBuf>,
    pub spice: Option<PathBuf>,
}

impl Job {
    /// Combines a config file with command-line values, which take precedence.
    pub fn resolve(
        config: Config,
        cell: Option<String>,
        output: Option<PathBuf>,
        draw_ports: bool,
    ) -> anyhow::Result<Self> {
        let cell = cell
            .or(config.cell)
            .unwrap_or_else(|| DEFAULT_CELL.to_string());
        let output = output
            .or(config.output)
            .unwrap_or_else(|| PathBuf::from(format!("build/{cell}.gds")));

        let mut params: Map<String, Value> = match serde_json::to_value(&config.params)? {
            Value::Object(map) => map,
            _ => bail!("`params` must be a table"),
        };
        if draw_ports {
            if cell != DEFAULT_CELL {
                bail!("--draw-ports only applies to {DEFAULT_CELL}, not {cell}");
            }
            params.insert("draw_ports".to_string(), Value::Bool(true));
        }

        Ok(Self {
            cell,
            output,
            params: Value::Object(params),
            vlsir_json: None,
            spice: None,
        })
    }
}

pub fn ctx() -> pcell::error::Result<PcellCtx> {
    let cfg = PcellConfig::builder().pdk(Gf180Pdk::new()).build()?;
    PcellCtx::from_config(cfg)
}

/// Generates the requested cell and writes every requested output.
pub fn run(ctx: &PcellCtx, job: &Job) -> anyhow::Result<Instance> {
    if !Registry::contains(&job.cell) {
        bail!(
            "unknown cell `{}`; available cells: {}",
            job.cell,
            Registry::names().collect::<Vec<_>>().join(", ")
        );
    }

    let inst = Registry::instantiate(ctx, &job.cell, &job.params)
        .with_context(|| format!("failed to generate {}", job.cell))?;
    info!("generated {}", inst.cell().name());

    if let Some(parent) = job.output.parent() {
        pcell::io::create_dir_all(parent)?;
    }
    ctx.to_gds_with_top(inst.cell().clone(), &job.output)?;
    println!("wrote layout of {} to {:?}", inst.cell().name(), job.output);

    if let Some(path) = &job.vlsir_json {
        let records = vlsir_records(ctx);
        pcell::io::write_string(path, &serde_json::to_string_pretty(&records)?)?;
        println!("wrote circuit metadata to {path:?}");
    }
    if let Some(path) = &job.spice {
        pcell::io::write_string(path, &netlist(ctx))?;
        println!("wrote netlist to {path:?}");
    }

    Ok(inst)
}

/// The circuit metadata of every generated cell that carries any, keyed by cell name.
pub fn vlsir_records(ctx: &PcellCtx) -> Value {
    let records: Map<String, Value> = ctx
        .cells()
        .iter()
        .filter_map(|cell| Some((cell.name().to_string(), cell.vlsir()?.to_json())))
        .collect();
    Value::Object(records)
}

/// A SPICE netlist with one subcircuit per generated device cell.
pub fn netlist(ctx: &PcellCtx) -> String {
    ctx.cells()
        .iter()
        .filter_map(|cell| Some(cell.vlsir()?.to_spice(cell.name(), "1")))
        .collect::<Vec<_>>()
        .join("\n")
}
