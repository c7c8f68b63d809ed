use std::path::PathBuf;

use clap::Parser;
use gf180gen::{Config, Job};
use gf180mcu::registry::Registry;

#[derive(Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Generate GF180MCU parametric cells and write them to GDS"
)]
pub struct Args {
    /// The cell to generate. Defaults to `all_cells`.
    #[arg(short, long)]
    cell: Option<String>,
    /// The output GDS file. Defaults to `build/<cell>.gds`.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// A TOML file providing the cell, output path and a `[params]` table.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Label every port in `all_cells` with its name.
    #[arg(long)]
    draw_ports: bool,
    /// Write the circuit metadata of the generated cells as JSON.
    #[arg(long)]
    vlsir_json: Option<PathBuf>,
    /// Write a SPICE netlist of the generated device cells.
    #[arg(long)]
    spice: Option<PathBuf>,
    /// List the available cells and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.list {
        for name in Registry::names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = match args.config {
        Some(ref path) => Config::from_file(path)?,
        None => Config::default(),
    };
    let mut job = Job::resolve(config, args.cell, args.output, args.draw_ports)?;
    job.vlsir_json = args.vlsir_json;
    job.spice = args.spice;

    let ctx = gf180gen::ctx()?;
    gf180gen::run(&ctx, &job)?;
    Ok(())
}
