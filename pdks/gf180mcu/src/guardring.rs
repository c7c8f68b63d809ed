//! Guard rings.
//!
//! [`RingFrame`] builds the contacted comp ring that every deep-well device
//! wraps itself in when its `pcmpgr` flag is set. [`PcmpgrGen`] exposes the
//! same ring around a reference rectangle, without drawing the rectangle.

use arcstr::ArcStr;
use pcell::component::Component;
use pcell::data::PcellCtx;
use pcell::error::Result;
use pcell::layout::cell::{Element, Orientation, Port};
use pcell::layout::context::LayoutCtx;
use pcell::layout::group::elements::ElementGroup;
use pcell::layout::group::Group;
use pcell::layout::layers::{LayerKey, LayerSpec};
use pcell::layout::elements::via::via_generator;
use pcell::layout::{Draw, DrawRef};
use pcgeom::ring::Ring;
use pcgeom::units::um_to_nm;
use pcgeom::{Point, Rect, Shape, Side, Span};
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::layers::Gf180Layers;
use crate::params::positive_length;
use crate::via::CONTACT_RULES;

/// Inputs to [`RingFrame::new`].
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct RingFrameParams {
    /// The region the ring surrounds.
    pub footprint: Rect,
    /// Gap between the footprint and the inner edge of the ring.
    pub enclosure: i64,
    /// Width of the comp ring.
    pub width: i64,
    /// The implant covering the ring, nplus or pplus.
    pub implant: LayerKey,
}

/// A contacted comp ring with its implant and metal1 cap.
#[derive(Debug, Clone)]
pub struct RingFrame {
    bulk: Ring,
    implant: Shape,
    comp_layer: LayerKey,
    implant_layer: LayerKey,
    metal_layer: LayerKey,
    /// Contact arrays in the order of [`Side::ALL`].
    contacts: [ElementGroup; 4],
}

impl RingFrame {
    pub fn new(layers: &Gf180Layers, params: RingFrameParams) -> Result<Self> {
        let inner = params.footprint.expand(params.enclosure);
        let outer = inner.expand(params.width);
        let bulk = Ring::difference(outer, inner)?;
        let implant = bulk.grow(COMP_IMPLANT_ENCLOSURE)?;

        let across = Span::new(inner.left() + CONTACT_SIZE, inner.right() - CONTACT_SIZE);
        let along = Span::new(inner.bottom() + CONTACT_SIZE, inner.top() - CONTACT_SIZE);
        let contacts = Side::ALL.map(|side| {
            let (x, y) = match side {
                Side::Bot => (across, Span::new(outer.bottom(), inner.bottom())),
                Side::Top => (across, Span::new(inner.top(), outer.top())),
                Side::Left => (Span::new(outer.left(), inner.left()), along),
                Side::Right => (Span::new(inner.right(), outer.right()), along),
            };
            via_generator(x, y, CONTACT_RULES, layers.contact)
        });

        Ok(Self {
            bulk,
            implant,
            comp_layer: layers.comp,
            implant_layer: params.implant,
            metal_layer: layers.metal1(),
            contacts,
        })
    }

    /// The comp ring. The metal1 cap has the same outline.
    #[inline]
    pub fn bulk(&self) -> Ring {
        self.bulk
    }

    /// The implant over the ring. It is a solid rectangle when the ring's
    /// opening is too small to survive the implant enclosure.
    #[inline]
    pub fn implant(&self) -> &Shape {
        &self.implant
    }

    #[inline]
    pub fn outer(&self) -> Rect {
        self.bulk.outer()
    }

    #[inline]
    pub fn inner(&self) -> Rect {
        self.bulk.inner()
    }

    /// The contact array along the given side of the ring.
    pub fn contacts(&self, side: Side) -> &ElementGroup {
        let idx = match side {
            Side::Bot => 0,
            Side::Top => 1,
            Side::Left => 2,
            Side::Right => 3,
        };
        &self.contacts[idx]
    }

    /// The connection port at the bottom centre of the ring, facing down.
    pub fn port(&self) -> Port {
        let outer = self.outer();
        Port::new(
            "guardring",
            Point::new(outer.center().x, outer.bottom()),
            outer.width(),
            Orientation::R270,
            self.metal_layer,
        )
    }
}

impl Draw for RingFrame {
    fn draw(self) -> Result<Group> {
        let mut group = Group::new();
        group.add_element(Element::new(LayerSpec::drawing(self.comp_layer), self.bulk));
        group.add_element(Element::new(
            LayerSpec::drawing(self.implant_layer),
            self.implant,
        ));
        for contacts in self.contacts {
            for elem in contacts {
                group.add_element(elem);
            }
        }
        group.add_element(Element::new(LayerSpec::drawing(self.metal_layer), self.bulk));
        Ok(group)
    }
}

impl DrawRef for RingFrame {
    fn draw_ref(&self) -> Result<Group> {
        self.clone().draw()
    }
}

/// The reference rectangle of a standalone guard ring, in micrometres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DnRect {
    pub size: (f64, f64),
    pub origin: (f64, f64),
}

impl Default for DnRect {
    fn default() -> Self {
        Self {
            size: (4.0, 2.0),
            origin: (0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PcmpgrParams {
    pub dn_rect: DnRect,
    /// Guard ring width.
    pub grw: f64,
}

impl Default for PcmpgrParams {
    fn default() -> Self {
        Self {
            dn_rect: DnRect::default(),
            grw: 0.36,
        }
    }
}

/// A p+ guard ring around a deep n-well footprint.
///
/// The footprint only positions the ring and is not drawn.
pub struct PcmpgrGen {
    dn_rect: Rect,
    grw: i64,
}

impl Component for PcmpgrGen {
    type Params = PcmpgrParams;

    fn new(params: &Self::Params, _ctx: &PcellCtx) -> Result<Self> {
        let w = positive_length("dn_rect.size.0", params.dn_rect.size.0)?;
        let h = positive_length("dn_rect.size.1", params.dn_rect.size.1)?;
        let (x, y) = params.dn_rect.origin;
        let p0 = Point::new(um_to_nm(x), um_to_nm(y));
        Ok(Self {
            dn_rect: Rect::new(p0, Point::new(p0.x + w, p0.y + h)),
            grw: positive_length("grw", params.grw)?,
        })
    }

    fn name(&self) -> ArcStr {
        arcstr::literal!("pcmpgr_gen")
    }

    fn layout(&self, ctx: &mut LayoutCtx) -> Result<()> {
        let layers = Gf180Layers::new(&ctx.layers())?;
        let frame = RingFrame::new(
            &layers,
            RingFrameParams {
                footprint: self.dn_rect,
                enclosure: PCMPGR_DNWELL_ENCLOSURE,
                width: self.grw,
                implant: layers.pplus,
            },
        )?;
        ctx.add_port(frame.port())?;
        ctx.draw(frame)?;
        Ok(())
    }
}
