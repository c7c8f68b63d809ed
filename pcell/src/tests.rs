//! Shared fixtures for unit tests.

use std::sync::Arc;

use arcstr::ArcStr;
use pcgeom::ring::Ring;
use pcgeom::{Point, Rect};
use serde::{Deserialize, Serialize};

use crate::component::Component;
use crate::data::{PcellConfig, PcellCtx};
use crate::error::{ErrorSource, Result};
use crate::layout::cell::{Orientation, Port};
use crate::layout::context::LayoutCtx;
use crate::layout::layers::selector::Selector;
use crate::layout::layers::{LayerInfo, LayerType, Layers};
use crate::pdk::Pdk;
use crate::vlsir::VlsirInfo;

const LAYERS: &str = "layernum,datatype,name,purpose
22,0,comp,drawing
33,0,contact,drawing
34,0,metal1,drawing
34,10,metal1,label
";

pub(crate) struct TestPdk;

impl Pdk for TestPdk {
    fn name(&self) -> &'static str {
        "test"
    }

    fn process(&self) -> &'static str {
        "test"
    }

    fn layers(&self) -> Result<Layers> {
        Layers::from_csv(LAYERS, |name| {
            let builder = LayerInfo::builder();
            let builder = match name {
                "metal1" => builder.metal_idx(1).layer_type(LayerType::Metal),
                "contact" => builder.via_idx(0).layer_type(LayerType::Via),
                _ => builder.layer_type(LayerType::Diffusion),
            };
            Ok(builder.build()?)
        })
    }

    fn layout_grid(&self) -> i64 {
        5
    }
}

pub(crate) fn setup_ctx() -> PcellCtx {
    let cfg = PcellConfig::builder()
        .pdk(TestPdk)
        .build()
        .expect("failed to build config");
    PcellCtx::from_config(cfg).expect("failed to create context")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct PadParams {
    pub(crate) w: i64,
    pub(crate) h: i64,
}

/// A metal pad over a comp ring, with one port.
pub(crate) struct Pad(PadParams);

impl Component for Pad {
    type Params = PadParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        if params.w <= 0 || params.h <= 0 {
            return Err(ErrorSource::InvalidArgs(format!(
                "pad must have positive dimensions, got {}x{}",
                params.w, params.h
            ))
            .into());
        }
        Ok(Self(params.clone()))
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("pad")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = ctx.layers();
        let metal1 = layers.get(Selector::Metal(1))?;
        let comp = layers.get(Selector::Name("comp"))?;
        let rect = Rect::new(Point::zero(), Point::new(self.0.w, self.0.h));
        ctx.draw_rect(metal1, rect);
        ctx.draw_ring(comp, Ring::difference(rect.expand(200), rect.expand(100))?);
        ctx.add_label("pad", rect.center(), metal1);
        ctx.add_port(Port::new(
            "pad",
            rect.center(),
            self.0.w,
            Orientation::R90,
            metal1,
        ))?;
        let mut info = VlsirInfo::diode("test_diode", 1.0, 1.0);
        info.port_order = vec![arcstr::literal!("pad")];
        ctx.set_vlsir(info);
        Ok(())
    }
}

/// Two pads side by side.
pub(crate) struct PadPair;

impl Component for PadPair {
    type Params = PadParams;

    fn new(_params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self)
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("pad_pair")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let params = PadParams { w: 1_000, h: 500 };
        let left = ctx.instantiate::<Pad>(&params)?;
        let mut right = ctx.instantiate::<Pad>(&params)?;
        right.set_loc(Point::new(2_000, 0));
        ctx.add_instance(left);
        ctx.add_instance(right);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct FlakyParams {
    pub(crate) fail: bool,
}

/// A pad-named cell whose layout fails on request.
pub(crate) struct FlakyPad(bool);

impl Component for FlakyPad {
    type Params = FlakyParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self(params.fail))
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("pad")
    }

    fn layout(&self, _ctx: &mut LayoutCtx) -> Result<()> {
        if self.0 {
            return Err(ErrorSource::Internal("pad layout failed".to_string()).into());
        }
        Ok(())
    }
}

#[test]
fn test_failed_layout_releases_name() {
    let ctx = setup_ctx();
    assert!(ctx
        .instantiate_layout::<FlakyPad>(&FlakyParams { fail: true })
        .is_err());
    let pad = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 1_000, h: 500 })
        .expect("failed to generate pad");
    assert_eq!(pad.cell().name(), "pad");
    let flaky = ctx
        .instantiate_layout::<FlakyPad>(&FlakyParams { fail: false })
        .expect("failed to generate flaky pad");
    assert_eq!(flaky.cell().name(), "pad_1");
}

#[test]
fn test_layout_is_memoized() {
    let ctx = setup_ctx();
    let a = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 1_000, h: 500 })
        .expect("failed to generate pad");
    let b = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 1_000, h: 500 })
        .expect("failed to generate pad");
    let c = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 500, h: 500 })
        .expect("failed to generate pad");

    assert!(Arc::ptr_eq(a.cell(), b.cell()));
    assert!(!Arc::ptr_eq(a.cell(), c.cell()));
    assert_eq!(a.cell().name(), "pad");
    assert_eq!(c.cell().name(), "pad_1");
    assert_eq!(ctx.cells().len(), 2);
    assert_eq!(a.cell().settings()["w"], 1_000);
}

#[test]
fn test_hierarchy_reuses_definitions() {
    let ctx = setup_ctx();
    let pair = ctx
        .instantiate_layout::<PadPair>(&PadParams { w: 0, h: 0 })
        .expect("failed to generate pad pair");
    let insts: Vec<_> = pair.cell().insts().collect();
    assert_eq!(insts.len(), 2);
    assert!(Arc::ptr_eq(insts[0].cell(), insts[1].cell()));

    let bbox = pair.cell().bbox();
    assert_eq!(bbox.p0, Point::new(-200, -200));
    assert_eq!(bbox.p1, Point::new(3_200, 700));

    let metal1 = ctx
        .layers()
        .get(Selector::Metal(1))
        .expect("metal1 should exist");
    assert_eq!(pair.cell().shapes_on(metal1).count(), 2);
}

#[test]
fn test_invalid_params_are_rejected() {
    let ctx = setup_ctx();
    let err = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 0, h: 500 })
        .expect_err("zero-width pad should be rejected");
    assert!(matches!(err.source(), ErrorSource::InvalidArgs(_)));
    assert!(ctx.cells().is_empty());
}

#[test]
fn test_write_gds() {
    let ctx = setup_ctx();
    let dir = tempdir::TempDir::new("pcell").expect("failed to create temporary directory");
    let path = dir.path().join("pad_pair.gds");
    ctx.write_layout::<PadPair>(&PadParams { w: 0, h: 0 }, &path)
        .expect("failed to write GDS");

    let lib = gds21::GdsLibrary::load(&path).expect("failed to read GDS back");
    assert_eq!(lib.structs.len(), 2);
    let pad = lib
        .structs
        .iter()
        .find(|s| s.name == "pad")
        .expect("pad cell should be exported");
    // One metal rectangle, four ring sides and one label.
    assert_eq!(pad.elems.len(), 6);
    let label = pad.elems.iter().find_map(|e| match e {
        gds21::GdsElement::GdsTextElem(t) => Some(t),
        _ => None,
    });
    let label = label.expect("pad should carry a label");
    assert_eq!((label.layer, label.texttype), (34, 10));
}

#[test]
fn test_to_dict() {
    let ctx = setup_ctx();
    let pad = ctx
        .instantiate_layout::<Pad>(&PadParams { w: 1_000, h: 500 })
        .expect("failed to generate pad");
    let dict = pad
        .cell()
        .to_dict(&ctx.layers())
        .expect("failed to describe cell");
    assert_eq!(dict["ports"]["pad"]["layer"], "metal1");
    assert_eq!(dict["ports"]["pad"]["orientation"], 90);
    assert_eq!(dict["info"]["vlsir"]["model"], "test_diode");
}
