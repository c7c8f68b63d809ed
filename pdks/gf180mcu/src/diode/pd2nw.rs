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
pub struct DiodePd2nwParams {
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

impl Default for DiodePd2nwParams {
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

/// A p+ comp to n-well diode.
///
/// The p+ anode sits at the origin with the n+ well tap to its left,
/// both inside an n-well.
pub struct DiodePd2nw {
    sizes: Sizes,
    volt: Voltage,
    isolation: Isolation,
    labels: Option<Labels>,
    vlsir: VlsirInfo,
}

impl Component for DiodePd2nw {
    type Params = DiodePd2nwParams;

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
        arcstr::literal!("diode_pd2nw")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let Sizes { la, wa, cw } = self.sizes;

        let pcmp = Rect::new(Point::zero(), Point::new(wa, la));
        ctx.draw_rect(layers.diode_mk, pcmp);
        let p_con = contacted_comp(ctx, &layers, pcmp, layers.pplus)?;

        let ncmp_right = pcmp.left() - COMP_SPACE;
        let ncmp = Rect::new(Point::new(ncmp_right - cw, 0), Point::new(ncmp_right, la));
        let n_con = contacted_comp(ctx, &layers, ncmp, layers.nplus)?;

        Labels::place(self.labels.as_ref(), ctx, &layers, n_con.center(), p_con.center());

        if self.volt.is_high() {
            let dg = Rect::new(
                Point::new(ncmp.left(), pcmp.bottom()),
                Point::new(pcmp.right(), pcmp.top()),
            )
            .expand(DUALGATE_COMP_ENCLOSURE);
            ctx.draw_rect(layers.dualgate, dg);
        }

        let nwell = Rect::new(
            Point::new(
                ncmp.left() - NWELL_NCMP_ENCLOSURE,
                pcmp.bottom() - NWELL_PCMP_ENCLOSURE,
            ),
            Point::new(
                pcmp.right() + NWELL_PCMP_ENCLOSURE,
                pcmp.top() + NWELL_PCMP_ENCLOSURE,
            ),
        );
        ctx.draw_rect(layers.nwell, nwell);

        if self.isolation != Isolation::None {
            let dnwell = nwell.expand(DNWELL_NWELL_ENCLOSURE);
            ctx.draw_rect(layers.dnwell, dnwell);
            if self.isolation == Isolation::GuardedDeepNwell {
                guard_ring(ctx, &layers, dnwell, cw)?;
            }
        }

        ctx.add_port(terminal_port(&layers, "anode", p_con, wa, Orientation::R0))?;
        ctx.add_port(terminal_port(&layers, "cathode", n_con, cw, Orientation::R180))?;

        ctx.set_vlsir(self.vlsir.clone());
        Ok(())
    }
}

fn model(volt: Voltage) -> &'static str {
    match volt {
        Voltage::V3p3 => "pn_3p3",
        Voltage::V5p6 => "pn_6p0",
    }
}
