use arcstr::ArcStr;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::Result;
use pcell::layout::cell::Orientation;
use pcell::layout::context::LayoutCtx;
use pcell::vlsir::VlsirInfo;
use pcgeom::bbox::BoundBox;
use pcgeom::{Point, Rect, Side};
use serde::{Deserialize, Serialize};

use super::{contacted_comp, guard_ring, terminal_port, Labels, Sizes};
use crate::constants::*;
use crate::guardring::{RingFrame, RingFrameParams};
use crate::layers::Gf180Layers;
use crate::Voltage;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiodeDw2psParams {
    pub la: f64,
    pub wa: f64,
    pub cw: f64,
    pub volt: Voltage,
    pub pcmpgr: bool,
    pub label: bool,
    pub p_label: String,
    pub n_label: String,
}

impl Default for DiodeDw2psParams {
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

/// How the n+ deep n-well tap is drawn.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TapShape {
    /// A single `wa × la` rectangle.
    Plate,
    /// A ring of width `cw` with outer dimensions `wa × la`, contacted on all four sides.
    Ring,
}

impl TapShape {
    /// Rings are used once both sides can fit two ring widths plus the comp spacing.
    pub(crate) fn for_sizes(sizes: Sizes) -> Self {
        let min = 2 * sizes.cw + DW2PS_RING_MARGIN;
        if sizes.wa < min || sizes.la < min {
            Self::Plate
        } else {
            Self::Ring
        }
    }
}

/// A deep n-well to p-substrate diode.
///
/// The anode is an n+ tap into the deep n-well. The p-substrate cathode is
/// only contacted through the optional guard ring, so without `pcmpgr`
/// the cell has no `cathode` port.
pub struct DiodeDw2ps {
    sizes: Sizes,
    tap: TapShape,
    volt: Voltage,
    pcmpgr: bool,
    labels: Option<Labels>,
    vlsir: VlsirInfo,
}

impl DiodeDw2ps {
    #[inline]
    pub fn tap_shape(&self) -> TapShape {
        self.tap
    }
}

impl Component for DiodeDw2ps {
    type Params = DiodeDw2psParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        let sizes = Sizes::new(params.la, params.wa, params.cw)?;
        Ok(Self {
            sizes,
            tap: TapShape::for_sizes(sizes),
            volt: params.volt,
            pcmpgr: params.pcmpgr,
            labels: Labels::new(params.label, &params.p_label, &params.n_label),
            vlsir: VlsirInfo::diode("dnwps", params.la, params.wa),
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("diode_dw2ps")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let Sizes { la, wa, cw } = self.sizes;

        let (ncmp, n_con) = match self.tap {
            TapShape::Plate => {
                let ncmp = Rect::new(Point::zero(), Point::new(wa, la));
                (ncmp, contacted_comp(ctx, &layers, ncmp, layers.nplus)?)
            }
            TapShape::Ring => {
                let frame = RingFrame::new(
                    &layers,
                    RingFrameParams {
                        footprint: Rect::new(Point::zero(), Point::new(wa - 2 * cw, la - 2 * cw)),
                        enclosure: 0,
                        width: cw,
                        implant: layers.nplus,
                    },
                )?;
                let n_con: Rect = frame.contacts(Side::Left).bbox().into();
                let ncmp = frame.outer();
                ctx.draw(frame)?;
                (ncmp, n_con)
            }
        };
        if let Some(labels) = &self.labels {
            ctx.add_label(labels.n.clone(), n_con.center(), layers.metal1());
        }

        let dn_enclosure = if self.volt.is_high() {
            DNWELL_NCMP_ENCLOSURE_HV
        } else {
            DNWELL_NCMP_ENCLOSURE
        };
        let dnwell = ncmp.expand(dn_enclosure);
        ctx.draw_rect(layers.dnwell, dnwell);
        ctx.draw_rect(layers.diode_mk, dnwell);

        let p_con = if self.pcmpgr {
            let frame = guard_ring(ctx, &layers, dnwell, cw)?;
            let p_con: Rect = frame.contacts(Side::Left).bbox().into();
            if let Some(labels) = &self.labels {
                ctx.add_label(labels.p.clone(), p_con.center(), layers.metal1());
            }
            Some(p_con)
        } else {
            None
        };

        if self.volt.is_high() {
            ctx.draw_rect(layers.dualgate, dnwell.expand(DUALGATE_DNWELL_ENCLOSURE));
        }

        ctx.add_port(terminal_port(&layers, "anode", n_con, wa, Orientation::R0))?;
        if let Some(p_con) = p_con {
            ctx.add_port(terminal_port(&layers, "cathode", p_con, cw, Orientation::R180))?;
        }

        ctx.set_vlsir(self.vlsir.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizes(la: i64, wa: i64, cw: i64) -> Sizes {
        Sizes { la, wa, cw }
    }

    #[test]
    fn test_tap_shape_threshold() {
        assert_eq!(TapShape::for_sizes(sizes(100, 100, 100)), TapShape::Plate);
        assert_eq!(TapShape::for_sizes(sizes(50, 50, 100)), TapShape::Plate);
        assert_eq!(TapShape::for_sizes(sizes(1_000, 1_000, 100)), TapShape::Ring);
        // Exactly at the threshold the ring is used.
        assert_eq!(TapShape::for_sizes(sizes(520, 520, 100)), TapShape::Ring);
        assert_eq!(TapShape::for_sizes(sizes(519, 1_000, 100)), TapShape::Plate);
        assert_eq!(TapShape::for_sizes(sizes(1_000, 519, 100)), TapShape::Plate);
    }
}
