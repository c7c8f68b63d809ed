use arcstr::ArcStr;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::Result;
use pcell::layout::cell::Orientation;
use pcell::layout::context::LayoutCtx;
use pcell::vlsir::VlsirInfo;
use pcgeom::{Point, Rect};
use serde::{Deserialize, Serialize};

use super::{contacted_comp, guard_ring, terminal_port, Isolation, Labels, Sizes};
use crate::constants::*;
use crate::layers::Gf180Layers;
use crate::Voltage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiodeNd2psParams {
    pub la: f64,
    pub wa: f64,
    pub cw: f64,
    pub volt: Voltage,
    pub deepnwell: bool,
    pub pcmpgr: bool,
    pub label: bool,
    pub p_label: String,
    pub n_label: String,
}

impl Default for DiodeNd2psParams {
    fn default() -> Self {
        Self {
            la: 0.1,
            wa: 0.1,
            cw: 0.1,
            volt: Voltage::V3p3,
            deepnwell: false,
            pcmpgr: false,
            label: false,
            p_label: String::new(),
            n_label: String::new(),
        }
    }
}

/// An n+ comp to p-substrate diode.
///
/// The n+ anode sits at the origin with the p+ substrate tap to its left.
pub struct DiodeNd2ps {
    sizes: Sizes,
    volt: Voltage,
    isolation: Isolation,
    labels: Option<Labels>,
    vlsir: VlsirInfo,
}

impl Component for DiodeNd2ps {
    type Params = DiodeNd2psParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        Ok(Self {
            sizes: Sizes::new(params.la, params.wa, params.cw)?,
            volt: params.volt,
            isolation: Isolation::new(params.deepnwell, params.pcmpgr),
            labels: Labels::new(params.label, &params.p_label, &params.n_label),
            vlsir: VlsirInfo::diode(model(params.volt), params.la, params.wa),
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("diode_nd2ps")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let Sizes { la, wa, cw } = self.sizes;

        let ncmp = Rect::new(Point::zero(), Point::new(wa, la));
        ctx.draw_rect(layers.diode_mk, ncmp);
        let n_con = contacted_comp(ctx, &layers, ncmp, layers.nplus)?;

        let pcmp_right = ncmp.left() - COMP_SPACE;
        let pcmp = Rect::new(Point::new(pcmp_right - cw, 0), Point::new(pcmp_right, la));
        let p_con = contacted_comp(ctx, &layers, pcmp, layers.pplus)?;

        Labels::place(self.labels.as_ref(), ctx, &layers, n_con.center(), p_con.center());

        if self.volt.is_high() {
            let dg = Rect::new(
                Point::new(pcmp.left(), ncmp.bottom()),
                Point::new(ncmp.right(), ncmp.top()),
            )
            .expand(DUALGATE_COMP_ENCLOSURE);
            ctx.draw_rect(layers.dualgate, dg);
        }

        if self.isolation != Isolation::None {
            let lvpwell = Rect::new(
                Point::new(
                    pcmp.left() - LVPWELL_PCMP_ENCLOSURE,
                    ncmp.bottom() - LVPWELL_NCMP_ENCLOSURE,
                ),
                Point::new(
                    ncmp.right() + LVPWELL_NCMP_ENCLOSURE,
                    ncmp.top() + LVPWELL_NCMP_ENCLOSURE,
                ),
            );
            ctx.draw_rect(layers.lvpwell, lvpwell);
            let dnwell = lvpwell.expand(DNWELL_LVPWELL_ENCLOSURE);
            ctx.draw_rect(layers.dnwell, dnwell);
            if self.isolation == Isolation::GuardedDeepNwell {
                guard_ring(ctx, &layers, dnwell, cw)?;
            }
        }

        ctx.add_port(terminal_port(&layers, "anode", n_con, wa, Orientation::R0))?;
        ctx.add_port(terminal_port(&layers, "cathode", p_con, cw, Orientation::R180))?;

        ctx.set_vlsir(self.vlsir.clone());
        Ok(())
    }
}

fn model(volt: Voltage) -> &'static str {
    match volt {
        Voltage::V3p3 => "np_3p3",
        Voltage::V5p6 => "np_6p0",
    }
}
