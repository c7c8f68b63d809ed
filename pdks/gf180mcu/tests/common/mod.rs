#![allow(dead_code)]

use std::path::PathBuf;

use gf180mcu::layers::Gf180Layers;
use gf180mcu::Gf180Pdk;
use pcell::data::{PcellConfig, PcellCtx};
use pcgeom::ring::Ring;
use pcgeom::{Rect, Shape};

pub const BUILD_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/build");

pub fn out_path(test_name: &str, file_name: &str) -> PathBuf {
    PathBuf::from(BUILD_DIR).join(format!("tests/{test_name}/{file_name}"))
}

pub fn setup_ctx() -> PcellCtx {
    let cfg = PcellConfig::builder().pdk(Gf180Pdk::new()).build().unwrap();
    PcellCtx::from_config(cfg).unwrap()
}

pub fn layers(ctx: &PcellCtx) -> Gf180Layers {
    Gf180Layers::new(&ctx.layers()).unwrap()
}

pub fn rects(shapes: impl Iterator<Item = Shape>) -> Vec<Rect> {
    shapes.filter_map(|shape| shape.as_rect()).collect()
}

pub fn rings(shapes: impl Iterator<Item = Shape>) -> Vec<Ring> {
    shapes.filter_map(|shape| shape.as_ring()).collect()
}
