use arcstr::ArcStr;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::Result;
use pcell::layout::cell::Orientation;
use pcell::layout::context::LayoutCtx;
use pcell::vlsir::VlsirInfo;
use pcgeom::{Point, Rect};
use serde::{Deserialize, Serialize};

use super::{contacted_comp, guard_ring, terminal_port, Labels, Sizes};
use crate::constants::*;
use crate::layers::Gf180Layers;
use crate::Voltage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiodePw2dwParams {
    pub la: f64,
    pub wa: f64,
    pub cw: f64,
    pub volt: Voltage,
    pub pcmpgr: bool,
    pub label: bool,
    pub p_label: String,
    pub n_label: String,
}

impl Default for DiodePw2dwParams {
    fn default() -> Self {
        Self {
            la: 0.1,
            wa: 0.1,
            cw: 0.1,
            volt: Voltage::V3p3,
            pcmpgr: false,
            label: false,
            p_label: String::new(),
            n_label: String::new(),
        }
    }
}

/// An lvpwell to deep n-well diode.
///
/// The anode is a p+ tap into an lvpwell at the origin, with the n+
/// deep n-well tap to its left. Both sit inside the deep n-well.
pub struct DiodePw2dw {
    sizes: Sizes,
    volt: Voltage,
    pcmpgr: bool,
    labels: Option<Labels>,
    vlsir: VlsirInfo,
}

impl Component for DiodePw2dw {
    type Params = DiodePw2dwParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self {
            sizes: Sizes::new(params.la, params.wa, params.cw)?,
            volt: params.volt,
            pcmpgr: params.pcmpgr,
            labels: Labels::new(params.label, &params.p_label, &params.n_label),
            vlsir: VlsirInfo::diode("dnwpw", params.la, params.wa),
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("diode_pw2dw")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let Sizes { la, wa, cw } = self.sizes;

        let pcmp = Rect::new(Point::zero(), Point::new(wa, la));
        ctx.draw_rect(layers.diode_mk, pcmp);
        let lvpwell = pcmp.expand(WELL_COMP_ENCLOSURE);
        ctx.draw_rect(layers.lvpwell, lvpwell);
        let p_con = contacted_comp(ctx, &layers, pcmp, layers.pplus)?;

        let ncmp_right = pcmp.left() - COMP_SPACE;
        let ncmp = Rect::new(Point::new(ncmp_right - cw, 0), Point::new(ncmp_right, la));
        let n_con = contacted_comp(ctx, &layers, ncmp, layers.nplus)?;

        Labels::place(self.labels.as_ref(), ctx, &layers, n_con.center(), p_con.center());

        let dnwell = lvpwell.expand(DNWELL_LVPWELL_ENCLOSURE);
        ctx.draw_rect(layers.dnwell, dnwell);
        if self.pcmpgr {
            guard_ring(ctx, &layers, dnwell, cw)?;
        }

        if self.volt.is_high() {
            ctx.draw_rect(layers.dualgate, dnwell.expand(DUALGATE_DNWELL_ENCLOSURE));
        }

        ctx.add_port(terminal_port(&layers, "anode", p_con, wa, Orientation::R0))?;
        ctx.add_port(terminal_port(&layers, "cathode", n_con, cw, Orientation::R180))?;

        ctx.set_vlsir(self.vlsir.clone());
        Ok(())
    }
}
