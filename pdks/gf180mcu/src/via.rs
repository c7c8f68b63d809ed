//! Contact and via stacks.

use pcell::error::{ErrorSource, Result};
use pcell::layout::elements::via::{via_generator, ViaRules};
use pcell::layout::group::elements::ElementGroup;
use pcgeom::bbox::BoundBox;
use pcgeom::{Rect, Span};

use crate::constants::*;
use crate::layers::Gf180Layers;

pub const CONTACT_RULES: ViaRules =
    ViaRules::new(CONTACT_SIZE, CONTACT_COMP_ENCLOSURE, CONTACT_SPACE);
pub const VIA_RULES: ViaRules = ViaRules::new(VIA_SIZE, METAL_VIA_ENCLOSURE, VIA_SPACE);

/// The layer a via stack lands on.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StackBase {
    Comp,
    Poly2,
    /// An existing metal, starting from 1.
    Metal(usize),
}

/// Connects the region spanned by `x_range` and `y_range` up to `metal_level`.
///
/// On comp or poly2 the stack starts with a contact array covered by metal1.
/// Every further level adds a via array over the metal below and a metal
/// plate enclosing it. The base layer itself is not drawn.
pub fn via_stack(
    layers: &Gf180Layers,
    x_range: Span,
    y_range: Span,
    base: StackBase,
    metal_level: usize,
) -> Result<ElementGroup> {
    let mut group = ElementGroup::new();

    let (mut level, mut below) = match base {
        StackBase::Comp | StackBase::Poly2 => {
            let cuts = via_generator(x_range, y_range, CONTACT_RULES, layers.contact);
            let m1 = enclose(&cuts, M1_CONTACT_ENCLOSURE)?;
            group.extend(cuts);
            group.add_rect(layers.metal1(), m1);
            (1, m1)
        }
        StackBase::Metal(n) => (n, Rect::from_spans(x_range, y_range)),
    };

    while level < metal_level {
        let cuts = via_generator(below.hspan(), below.vspan(), VIA_RULES, layers.via(level)?);
        let metal = enclose(&cuts, METAL_VIA_ENCLOSURE)?;
        group.extend(cuts);
        level += 1;
        group.add_rect(layers.metal(level)?, metal);
        below = metal;
    }

    Ok(group)
}

/// The bounding rectangle of `cuts` grown by `enclosure`,
/// widened about its centre to the minimum metal width where needed.
fn enclose(cuts: &ElementGroup, enclosure: i64) -> Result<Rect> {
    let rect = cuts
        .bbox()
        .into_rect()
        .ok_or_else(|| ErrorSource::Internal("via array is empty".to_string()))?
        .expand(enclosure);
    Ok(Rect::from_spans(
        min_width(rect.hspan()),
        min_width(rect.vspan()),
    ))
}

fn min_width(span: Span) -> Span {
    if span.length() >= M1_MIN_WIDTH {
        span
    } else {
        let start = span.center() - M1_MIN_WIDTH / 2;
        Span::new(start, start + M1_MIN_WIDTH)
    }
}

#[cfg(test)]
mod tests {
    use pcell::layout::layers::LayerBoundBox;

    use super::*;
    use crate::tests::setup_layers;

    #[test]
    fn test_contact_stack_on_small_comp() {
        let layers = setup_layers();
        let stack = via_stack(
            &layers,
            Span::new(0, 100),
            Span::new(0, 100),
            StackBase::Comp,
            1,
        )
        .unwrap();

        // One contact centred on the comp, overhanging it.
        assert_eq!(stack.elements_on(layers.contact).count(), 1);
        assert_eq!(
            stack.layer_bbox(layers.contact).into_rect(),
            Some(Rect::new((-60, -60).into(), (160, 160).into()))
        );
        assert_eq!(
            stack.layer_bbox(layers.metal1()).into_rect(),
            Some(Rect::new((-120, -120).into(), (220, 220).into()))
        );
    }

    #[test]
    fn test_contact_stack_on_wide_comp() {
        let layers = setup_layers();
        let stack = via_stack(
            &layers,
            Span::new(0, 1_500),
            Span::new(0, 500),
            StackBase::Comp,
            1,
        )
        .unwrap();
        assert_eq!(stack.elements_on(layers.contact).count(), 3);
        let m1 = stack.layer_bbox(layers.metal1()).into_rect().unwrap();
        assert_eq!(m1.width(), 1_220 + 2 * M1_CONTACT_ENCLOSURE);
        assert_eq!(m1.height(), 220 + 2 * M1_CONTACT_ENCLOSURE);
    }

    #[test]
    fn test_stack_to_metal3() {
        let layers = setup_layers();
        let stack = via_stack(
            &layers,
            Span::new(0, 1_000),
            Span::new(0, 1_000),
            StackBase::Comp,
            3,
        )
        .unwrap();
        let via1 = layers.via(1).unwrap();
        let via2 = layers.via(2).unwrap();
        assert!(stack.elements_on(via1).count() >= 1);
        assert!(stack.elements_on(via2).count() >= 1);

        let m2 = stack.layer_bbox(layers.metal(2).unwrap()).into_rect().unwrap();
        let m3 = stack.layer_bbox(layers.metal(3).unwrap()).into_rect().unwrap();
        let v2 = stack.layer_bbox(via2).into_rect().unwrap();
        assert!(m2.contains_rect(&v2));
        assert_eq!(m3, v2.expand(METAL_VIA_ENCLOSURE));
    }

    #[test]
    fn test_metal_base_draws_no_contacts() {
        let layers = setup_layers();
        let stack = via_stack(
            &layers,
            Span::new(0, 600),
            Span::new(0, 600),
            StackBase::Metal(1),
            2,
        )
        .unwrap();
        assert_eq!(stack.elements_on(layers.contact).count(), 0);
        assert_eq!(stack.elements_on(layers.metal1()).count(), 0);
        assert_eq!(stack.elements_on(layers.via(1).unwrap()).count(), 1);
    }
}
