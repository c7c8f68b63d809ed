//! Rectangular ring geometry.
//!
//! A ring is the boolean difference of two concentric rectangles,
//! as used for guard rings and ring-shaped diffusion.

use array_map::ArrayMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::bbox::{Bbox, BoundBox};
use super::transform::{Translate, TranslateOwned};
use super::{Dir, Point, Rect, Shape, ShapeTrait, Side, Sign, Span};

/// A rectangular ring surrounding an enclosed rectangle.
#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ring {
    /// Vertical span of top segment.
    topv: Span,
    /// Vertical span of bottom segment.
    botv: Span,
    /// Horizontal span of left segment.
    lefth: Span,
    /// Horizontal span of right segment.
    righth: Span,
}

/// An error constructing a [`Ring`].
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RingError {
    /// The inner rectangle does not lie strictly within the outer rectangle.
    #[error("inner rectangle {inner:?} is not strictly contained in outer rectangle {outer:?}")]
    NotContained { outer: Rect, inner: Rect },

    /// Shrinking the inner boundary would invert it.
    #[error("cannot shrink inner rectangle {inner:?} by {amount}")]
    InnerTooSmall { inner: Rect, amount: i64 },

    /// Ring widths must be strictly positive.
    #[error("ring width on the {side} side must be positive, got {width}")]
    InvalidWidth { side: Side, width: i64 },

    /// Neither the inner nor outer rectangle was specified.
    #[error("ring builder requires an inner or outer rectangle")]
    MissingContents,
}

/// Represents all ways [`Ring`] geometry can be specified.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum RingContents {
    /// The ring must fit within the given rectangle.
    Outer(Rect),
    /// The ring must enclose the given rectangle.
    Inner(Rect),
}

impl RingContents {
    pub fn rect(&self) -> Rect {
        match self {
            Self::Outer(r) => *r,
            Self::Inner(r) => *r,
        }
    }

    pub fn is_outer(&self) -> bool {
        matches!(self, Self::Outer(_))
    }
}

#[derive(Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RingBuilder {
    contents: Option<RingContents>,
    widths: ArrayMap<Side, i64, 4>,
}

impl Ring {
    #[inline]
    pub fn builder() -> RingBuilder {
        RingBuilder::new()
    }

    /// Creates the ring `outer - inner`.
    ///
    /// The inner rectangle must be strictly contained in the outer rectangle.
    /// The inner rectangle may have zero width or height.
    pub fn difference(outer: Rect, inner: Rect) -> Result<Self, RingError> {
        if !outer.strictly_contains(&inner) {
            return Err(RingError::NotContained { outer, inner });
        }
        Ok(Self {
            topv: Span::new(inner.top(), outer.top()),
            botv: Span::new(outer.bottom(), inner.bottom()),
            lefth: Span::new(outer.left(), inner.left()),
            righth: Span::new(inner.right(), outer.right()),
        })
    }

    /// Expands the outer boundary and shrinks the inner boundary by `amount`.
    ///
    /// Fails if the inner boundary would shrink to nothing.
    pub fn expand(&self, amount: i64) -> Result<Self, RingError> {
        let inner = self.inner();
        if 2 * amount >= inner.width() || 2 * amount >= inner.height() {
            return Err(RingError::InnerTooSmall { inner, amount });
        }
        Self::difference(self.outer().expand(amount), inner.shrink(amount))
    }

    /// Like [`Ring::expand`], but fills the ring into its expanded outer
    /// rectangle once the inner boundary shrinks to nothing.
    pub fn grow(&self, amount: i64) -> Result<Shape, RingError> {
        match self.expand(amount) {
            Ok(ring) => Ok(Shape::Ring(ring)),
            Err(RingError::InnerTooSmall { .. }) => Ok(Shape::Rect(self.outer().expand(amount))),
            Err(err) => Err(err),
        }
    }

    pub fn outer_hspan(&self) -> Span {
        Span::new(self.lefth.start(), self.righth.stop())
    }

    pub fn inner_hspan(&self) -> Span {
        Span::new(self.lefth.stop(), self.righth.start())
    }

    pub fn outer_vspan(&self) -> Span {
        Span::new(self.botv.start(), self.topv.stop())
    }

    pub fn inner_vspan(&self) -> Span {
        Span::new(self.botv.stop(), self.topv.start())
    }

    pub fn outer(&self) -> Rect {
        Rect::from_spans(self.outer_hspan(), self.outer_vspan())
    }

    pub fn inner(&self) -> Rect {
        Rect::from_spans(self.inner_hspan(), self.inner_vspan())
    }

    /// The thickness of the ring on the given side.
    pub fn width(&self, side: Side) -> i64 {
        match side {
            Side::Top => self.topv.length(),
            Side::Bot => self.botv.length(),
            Side::Left => self.lefth.length(),
            Side::Right => self.righth.length(),
        }
    }

    /// The segment of the ring on the given side.
    ///
    /// Top and bottom segments span the full outer width;
    /// left and right segments span only the inner height,
    /// so that the four segments do not overlap.
    #[inline]
    pub fn rect(&self, side: Side) -> Rect {
        match side {
            Side::Top => Rect::from_spans(self.outer_hspan(), self.topv),
            Side::Right => Rect::from_spans(self.righth, self.inner_vspan()),
            Side::Bot => Rect::from_spans(self.outer_hspan(), self.botv),
            Side::Left => Rect::from_spans(self.lefth, self.inner_vspan()),
        }
    }

    #[inline]
    pub fn top(&self) -> Rect {
        self.rect(Side::Top)
    }

    #[inline]
    pub fn bot(&self) -> Rect {
        self.rect(Side::Bot)
    }

    #[inline]
    pub fn left(&self) -> Rect {
        self.rect(Side::Left)
    }

    #[inline]
    pub fn right(&self) -> Rect {
        self.rect(Side::Right)
    }

    /// Decomposes the ring into four non-overlapping rectangles.
    #[inline]
    pub fn rects(&self) -> [Rect; 4] {
        [self.top(), self.bot(), self.left(), self.right()]
    }
}

impl BoundBox for Ring {
    #[inline]
    fn bbox(&self) -> Bbox {
        self.outer().bbox()
    }
}

impl ShapeTrait for Ring {
    fn point0(&self) -> Point {
        self.outer().p0
    }

    fn orientation(&self) -> Dir {
        self.outer().orientation()
    }

    fn contains(&self, pt: Point) -> bool {
        self.rects().into_iter().any(move |r| r.contains(pt))
    }

    fn area(&self) -> i64 {
        self.outer().area() - self.inner().area()
    }
}

impl Translate for Ring {
    fn translate(&mut self, p: Point) {
        *self = self.translate_owned(p);
    }
}

impl TranslateOwned for Ring {
    fn translate_owned(self, p: Point) -> Self {
        Self {
            lefth: self.lefth.translate(p.x),
            righth: self.righth.translate(p.x),
            topv: self.topv.translate(p.y),
            botv: self.botv.translate(p.y),
        }
    }
}

impl TryFrom<RingBuilder> for Ring {
    type Error = RingError;

    fn try_from(value: RingBuilder) -> Result<Self, Self::Error> {
        let contents = value.contents.ok_or(RingError::MissingContents)?;
        for side in Side::ALL {
            let width = value.widths[side];
            if width <= 0 {
                return Err(RingError::InvalidWidth { side, width });
            }
        }

        let r = contents.rect();
        let sign = if contents.is_outer() {
            Sign::Neg
        } else {
            Sign::Pos
        };

        let topv = Span::with_point_and_length(sign, r.top(), value.widths[Side::Top]);
        let righth = Span::with_point_and_length(sign, r.right(), value.widths[Side::Right]);
        let lefth = Span::with_point_and_length(!sign, r.left(), value.widths[Side::Left]);
        let botv = Span::with_point_and_length(!sign, r.bottom(), value.widths[Side::Bot]);

        let outer = Rect::from_spans(
            Span::new(lefth.start(), righth.stop()),
            Span::new(botv.start(), topv.stop()),
        );
        let inner = Rect::from_spans(
            Span::new(lefth.stop(), righth.start()),
            Span::new(botv.stop(), topv.start()),
        );
        Self::difference(outer, inner)
    }
}

impl RingBuilder {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn build(&self) -> Result<Ring, RingError> {
        Ring::try_from(*self)
    }

    pub fn outer(&mut self, rect: Rect) -> &mut Self {
        self.contents = Some(RingContents::Outer(rect));
        self
    }

    pub fn inner(&mut self, rect: Rect) -> &mut Self {
        self.contents = Some(RingContents::Inner(rect));
        self
    }

    pub fn side_width(&mut self, side: Side, value: i64) -> &mut Self {
        self.widths[side] = value;
        self
    }

    /// Sets the width of all ring edges to the given value.
    pub fn uniform_width(&mut self, value: i64) -> &mut Self {
        for side in Side::ALL {
            self.side_width(side, value);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Dims;

    #[test]
    fn test_ring_difference() {
        let outer = Rect::from_corner_and_dims(Point::new(-100, -100), Dims::new(1000, 1000));
        let inner = Rect::from_corner_and_dims(Point::new(0, 0), Dims::new(800, 800));
        let ring = Ring::difference(outer, inner).expect("failed to create ring");
        assert_eq!(ring.outer(), outer);
        assert_eq!(ring.inner(), inner);
        for side in Side::ALL {
            assert_eq!(ring.width(side), 100);
        }
        let total: i64 = ring.rects().iter().map(|r| r.area()).sum();
        assert_eq!(total, ring.area());
        assert_eq!(ring.left().height(), 800);
        assert_eq!(ring.top().width(), 1000);
    }

    #[test]
    fn test_ring_rejects_touching_inner() {
        let outer = Rect::new(Point::new(0, 0), Point::new(100, 100));
        let inner = Rect::new(Point::new(0, 10), Point::new(90, 90));
        assert!(matches!(
            Ring::difference(outer, inner),
            Err(RingError::NotContained { .. })
        ));
    }

    #[test]
    fn test_ring_builder_inner() {
        let inner = Rect::new(Point::new(0, 0), Point::new(500, 300));
        let ring = Ring::builder()
            .inner(inner)
            .uniform_width(100)
            .build()
            .expect("failed to build ring");
        assert_eq!(ring.inner(), inner);
        assert_eq!(ring.outer(), inner.expand(100));
    }

    #[test]
    fn test_ring_builder_outer() {
        let outer = Rect::new(Point::new(0, 0), Point::new(500, 300));
        let ring = Ring::builder()
            .outer(outer)
            .uniform_width(100)
            .build()
            .expect("failed to build ring");
        assert_eq!(ring.outer(), outer);
        assert_eq!(ring.inner(), outer.shrink(100));
    }

    #[test]
    fn test_ring_builder_requires_width() {
        let inner = Rect::new(Point::new(0, 0), Point::new(500, 300));
        assert!(matches!(
            Ring::builder().inner(inner).build(),
            Err(RingError::InvalidWidth { .. })
        ));
        assert_eq!(Ring::builder().build(), Err(RingError::MissingContents));
    }

    #[test]
    fn test_ring_expand() {
        let inner = Rect::new(Point::new(0, 0), Point::new(1000, 1000));
        let ring = Ring::difference(inner.expand(100), inner).expect("failed to create ring");
        let implant = ring.expand(160).expect("failed to expand ring");
        assert_eq!(implant.outer(), inner.expand(260));
        assert_eq!(implant.inner(), inner.shrink(160));
        assert!(ring.expand(600).is_err());
        assert!(ring.expand(500).is_err());
    }

    #[test]
    fn test_ring_grow_fills_collapsed_inner() {
        let inner = Rect::new(Point::new(0, 0), Point::new(1000, 320));
        let ring = Ring::difference(inner.expand(100), inner).expect("failed to create ring");

        let implant = ring.grow(150).expect("failed to grow ring");
        assert!(matches!(implant, Shape::Ring(r) if r.inner() == inner.shrink(150)));

        let implant = ring.grow(160).expect("failed to grow ring");
        assert_eq!(implant, Shape::Rect(inner.expand(260)));
        assert!(implant.rects().iter().all(|r| r.area() > 0));
    }

    #[test]
    fn test_ring_translate() {
        let inner = Rect::new(Point::new(0, 0), Point::new(10, 10));
        let ring = Ring::difference(inner.expand(5), inner).expect("failed to create ring");
        let moved = ring.translate_owned(Point::new(100, -100));
        assert_eq!(
            moved.inner(),
            Rect::new(Point::new(100, -100), Point::new(110, -90))
        );
    }
}
