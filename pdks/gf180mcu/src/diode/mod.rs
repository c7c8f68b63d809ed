//! Diode generators.
//!
//! Each junction diode places an anode comp of `wa × la` at the origin and
//! a cathode comp of `cw × la` beside it, then derives implants, wells and
//! markers by enclosing those rectangles. The Schottky diode instead
//! interdigitates `m` anode fingers between `m + 1` cathode fingers.

use arcstr::ArcStr;
use pcell::error::Result;
use pcell::layout::cell::{Orientation, Port};
use pcell::layout::context::LayoutCtx;
use pcell::layout::layers::LayerKey;
use pcell::layout::DrawRef;
use pcgeom::bbox::BoundBox;
use pcgeom::{Point, Rect};

use crate::constants::{COMP_IMPLANT_ENCLOSURE, PCMPGR_DNWELL_ENCLOSURE};
use crate::guardring::{RingFrame, RingFrameParams};
use crate::layers::Gf180Layers;
use crate::params::positive_length;
use crate::via::{via_stack, StackBase};

pub mod dw2ps;
pub mod nd2ps;
pub mod nw2ps;
pub mod pd2nw;
pub mod pw2dw;
pub mod sc;

pub use dw2ps::{DiodeDw2ps, DiodeDw2psParams};
pub use nd2ps::{DiodeNd2ps, DiodeNd2psParams};
pub use nw2ps::{DiodeNw2ps, DiodeNw2psParams};
pub use pd2nw::{DiodePd2nw, DiodePd2nwParams};
pub use pw2dw::{DiodePw2dw, DiodePw2dwParams};
pub use sc::{ScDiode, ScDiodeParams};

/// Terminal dimensions in nanometres.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct Sizes {
    /// Anode length.
    pub(crate) la: i64,
    /// Anode width.
    pub(crate) wa: i64,
    /// Cathode width.
    pub(crate) cw: i64,
}

impl Sizes {
    pub(crate) fn new(la: f64, wa: f64, cw: f64) -> Result<Self> {
        Ok(Self {
            la: positive_length("la", la)?,
            wa: positive_length("wa", wa)?,
            cw: positive_length("cw", cw)?,
        })
    }
}

/// Text placed over the terminals when labelling is enabled.
#[derive(Debug, Clone, Eq, PartialEq)]
pub(crate) struct Labels {
    pub(crate) p: ArcStr,
    pub(crate) n: ArcStr,
}

impl Labels {
    pub(crate) fn new(label: bool, p_label: &str, n_label: &str) -> Option<Self> {
        label.then(|| Self {
            p: p_label.into(),
            n: n_label.into(),
        })
    }

    pub(crate) fn place(
        labels: Option<&Self>,
        ctx: &mut LayoutCtx,
        layers: &Gf180Layers,
        n_at: Point,
        p_at: Point,
    ) {
        if let Some(labels) = labels {
            ctx.add_label(labels.n.clone(), n_at, layers.metal1());
            ctx.add_label(labels.p.clone(), p_at, layers.metal1());
        }
    }
}

/// The optional deep n-well structures around a diode.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) enum Isolation {
    None,
    DeepNwell,
    /// Deep n-well inside a p+ guard ring.
    GuardedDeepNwell,
}

impl Isolation {
    /// A guard ring is only drawn around a deep n-well.
    pub(crate) fn new(deepnwell: bool, pcmpgr: bool) -> Self {
        match (deepnwell, pcmpgr) {
            (false, _) => Self::None,
            (true, false) => Self::DeepNwell,
            (true, true) => Self::GuardedDeepNwell,
        }
    }
}

/// Draws `comp`, its implant and a contact stack over it.
///
/// Returns the bounding box of the contact stack.
pub(crate) fn contacted_comp(
    ctx: &mut LayoutCtx,
    layers: &Gf180Layers,
    comp: Rect,
    implant: LayerKey,
) -> Result<Rect> {
    ctx.draw_rect(layers.comp, comp);
    ctx.draw_rect(implant, comp.expand(COMP_IMPLANT_ENCLOSURE));
    contact_stack(ctx, layers, comp)
}

/// Draws a contact stack over `comp` and returns its bounding box.
pub(crate) fn contact_stack(
    ctx: &mut LayoutCtx,
    layers: &Gf180Layers,
    comp: Rect,
) -> Result<Rect> {
    let stack = via_stack(layers, comp.hspan(), comp.vspan(), StackBase::Comp, 1)?;
    let bbox = stack.bbox();
    ctx.draw(stack)?;
    Ok(bbox.into())
}

/// Draws the p+ guard ring around a deep n-well with a ring width of `cw`.
pub(crate) fn guard_ring(
    ctx: &mut LayoutCtx,
    layers: &Gf180Layers,
    dnwell: Rect,
    cw: i64,
) -> Result<RingFrame> {
    let frame = RingFrame::new(
        layers,
        RingFrameParams {
            footprint: dnwell,
            enclosure: PCMPGR_DNWELL_ENCLOSURE,
            width: cw,
            implant: layers.pplus,
        },
    )?;
    ctx.draw(frame.draw_ref()?)?;
    Ok(frame)
}

/// A metal1 port centred on `at`.
pub(crate) fn terminal_port(
    layers: &Gf180Layers,
    name: &'static str,
    at: Rect,
    width: i64,
    orientation: Orientation,
) -> Port {
    Port::new(name, at.center(), width, orientation, layers.metal1())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isolation_requires_deepnwell() {
        assert_eq!(Isolation::new(false, true), Isolation::None);
        assert_eq!(Isolation::new(true, false), Isolation::DeepNwell);
        assert_eq!(Isolation::new(true, true), Isolation::GuardedDeepNwell);
    }

    #[test]
    fn test_labels_only_when_enabled() {
        assert_eq!(Labels::new(false, "p", "n"), None);
        let labels = Labels::new(true, "gnd", "vdd").unwrap();
        assert_eq!(labels.p, "gnd");
        assert_eq!(labels.n, "vdd");
    }
}
