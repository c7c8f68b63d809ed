use arcstr::ArcStr;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::{ErrorSource, Result};
use pcell::layout::cell::{Instance, Orientation, Port};
use pcell::layout::context::LayoutCtx;
use pcell::vlsir::{DeviceParams, VlsirInfo};
use pcgeom::bbox::BoundBox;
use pcgeom::{Dims, Point, Rect};
use serde::{Deserialize, Serialize};

use super::{contact_stack, guard_ring, Labels, Sizes};
use crate::constants::*;
use crate::layers::Gf180Layers;
use crate::params::{finger_count, positive_length};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScDiodeParams {
    pub la: f64,
    pub wa: f64,
    pub cw: f64,
    /// Number of anode fingers.
    pub m: u32,
    pub pcmpgr: bool,
    pub label: bool,
    pub p_label: String,
    pub n_label: String,
}

impl Default for ScDiodeParams {
    fn default() -> Self {
        Self {
            la: 0.1,
            wa: 0.1,
            cw: 0.1,
            m: 1,
            pcmpgr: false,
            label: false,
            p_label: String::new(),
            n_label: String::new(),
        }
    }
}

/// A Schottky diode with interdigitated fingers.
///
/// `m + 1` n+ cathode straps alternate with `m` anode straps. Metal1 bars
/// below the array short the cathode straps together; for `m > 1`, bars
/// above the array do the same for the anode straps.
pub struct ScDiode {
    sizes: Sizes,
    m: i64,
    pcmpgr: bool,
    labels: Option<Labels>,
    strap_params: (ScStrapParams, ScStrapParams),
    vlsir: VlsirInfo,
}

impl Component for ScDiode {
    type Params = ScDiodeParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        let sizes = Sizes::new(params.la, params.wa, params.cw)?;
        let m = finger_count("m", params.m)?;
        let mut vlsir = VlsirInfo::diode("sc_diode", params.la, params.wa);
        vlsir.device = DeviceParams::Diode {
            l: params.la,
            w: params.wa,
            m: Some(params.m),
        };
        Ok(Self {
            sizes,
            m,
            pcmpgr: params.pcmpgr,
            labels: Labels::new(params.label, &params.p_label, &params.n_label),
            strap_params: (
                ScStrapParams {
                    size: (params.cw, params.la),
                },
                ScStrapParams {
                    size: (params.wa, params.la),
                },
            ),
            vlsir,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("sc_diode")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let Sizes { wa, cw, .. } = self.sizes;
        let m = self.m;
        let pitch = cw + wa + 2 * SC_COMP_SPACE;
        let metal1 = layers.metal1();

        let cathode = ctx.instantiate::<ScCathodeStrap>(&self.strap_params.0)?;
        let cath_insts: Vec<Instance> = (0..=m)
            .map(|i| {
                let mut inst = cathode.clone();
                inst.set_loc(Point::new(i * pitch, 0));
                inst
            })
            .collect();
        let cath = array_rect(&cath_insts)?;
        for inst in cath_insts {
            ctx.add_instance(inst);
        }

        let bar = Dims::new(cath.width(), SC_BAR_WIDTH);
        for i in 0..=m {
            let p0 = Point::new(cath.left() + i * pitch, cath.bottom() - SC_BAR_WIDTH);
            ctx.draw_rect(metal1, Rect::from_corner_and_dims(p0, bar));
        }
        let cath_bar = Rect::from_corner_and_dims(
            Point::new(cath.left(), cath.bottom() - 2 * SC_BAR_WIDTH),
            Dims::new(cath.width() + m * pitch, SC_BAR_WIDTH),
        );
        ctx.draw_rect(metal1, cath_bar);
        if let Some(labels) = &self.labels {
            ctx.add_label(labels.n.clone(), cath_bar.center(), metal1);
        }

        let anode = ctx.instantiate::<ScAnodeStrap>(&self.strap_params.1)?;
        let anode_cell = cell_rect(&anode)?;
        let x0 = cath.left() + cw + SC_COMP_SPACE - anode_cell.left();
        let an_insts: Vec<Instance> = (0..m)
            .map(|j| {
                let mut inst = anode.clone();
                inst.set_loc(Point::new(x0 + j * pitch, 0));
                inst
            })
            .collect();
        let an = array_rect(&an_insts)?;
        for inst in an_insts {
            ctx.add_instance(inst);
        }

        let an_bar = if m > 1 {
            let riser = Dims::new(
                an.width(),
                cath.bottom() - anode_cell.bottom() + SC_BAR_WIDTH,
            );
            for j in 0..m {
                let p0 = Point::new(an.left() + j * pitch, an.top());
                ctx.draw_rect(metal1, Rect::from_corner_and_dims(p0, riser));
            }
            let an_bar = Rect::from_corner_and_dims(
                Point::new(an.left(), an.top() + riser.h()),
                Dims::new(an.width() + (m - 1) * pitch, SC_BAR_WIDTH),
            );
            ctx.draw_rect(metal1, an_bar);
            Some(an_bar)
        } else {
            None
        };
        if let Some(labels) = &self.labels {
            let at = an_bar.unwrap_or(an).center();
            ctx.add_label(labels.p.clone(), at, metal1);
        }

        ctx.draw_rect(layers.schottky_diode, cath.expand(SC_MARKER_ENCLOSURE));
        let dnwell = an.expand(DNWELL_SC_ANODE_ENCLOSURE);
        ctx.draw_rect(layers.dnwell, dnwell);
        if self.pcmpgr {
            guard_ring(ctx, &layers, dnwell, cw)?;
        }

        ctx.add_port(Port::new(
            "anode",
            cath_bar.center(),
            cath_bar.width(),
            Orientation::R270,
            metal1,
        ))?;
        let (at, width) = match an_bar {
            Some(an_bar) => (an_bar.center(), an_bar.width()),
            None => (an.center(), wa),
        };
        ctx.add_port(Port::new("cathode", at, width, Orientation::R90, metal1))?;

        ctx.set_vlsir(self.vlsir.clone());
        Ok(())
    }
}

/// The bounding rectangle of a placed strap array.
fn array_rect(insts: &[Instance]) -> Result<Rect> {
    insts
        .bbox()
        .into_rect()
        .ok_or_else(|| ErrorSource::Internal("strap array is empty".to_string()).into())
}

/// The bounding rectangle of an instance's cell, in the cell's own coordinates.
fn cell_rect(inst: &Instance) -> Result<Rect> {
    inst.cell()
        .bbox()
        .into_rect()
        .ok_or_else(|| ErrorSource::Internal(format!("cell {} is empty", inst.name())).into())
}

/// The size of one Schottky strap, `(width, length)` in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScStrapParams {
    pub size: (f64, f64),
}

impl ScStrapParams {
    fn rect(&self) -> Result<Rect> {
        let w = positive_length("size.0", self.size.0)?;
        let l = positive_length("size.1", self.size.1)?;
        Ok(Rect::new(Point::zero(), Point::new(w, l)))
    }
}

/// One n+ cathode finger of a Schottky diode.
pub struct ScCathodeStrap {
    comp: Rect,
}

impl Component for ScCathodeStrap {
    type Params = ScStrapParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self {
            comp: params.rect()?,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("sc_cathode_strap")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        ctx.draw_rect(layers.comp, self.comp);
        ctx.draw_rect(layers.nplus, self.comp.expand(SC_NPLUS_ENCLOSURE));
        contact_stack(ctx, &layers, self.comp)?;
        Ok(())
    }
}

/// One anode finger of a Schottky diode.
pub struct ScAnodeStrap {
    comp: Rect,
}

impl Component for ScAnodeStrap {
    type Params = ScStrapParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self {
            comp: params.rect()?,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("sc_anode_strap")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        ctx.draw_rect(layers.comp, self.comp);
        contact_stack(ctx, &layers, self.comp)?;
        Ok(())
    }
}
