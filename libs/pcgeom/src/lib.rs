//! Core geometric types and their operations/attributes.
//!
//! All coordinates are integer nanometres.

use std::fmt::Display;
use std::str::FromStr;

use array_map::Indexable;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use self::bbox::{Bbox, BoundBox};
use self::ring::Ring;
use self::transform::{Translate, TranslateOwned};

pub mod bbox;
pub mod ring;
pub mod transform;
pub mod units;

/// Snaps `pos` to the nearest multiple of `grid`.
pub fn snap_to_grid(pos: i64, grid: i64) -> i64 {
    assert!(grid > 0);

    let rem = pos.rem_euclid(grid);
    if rem <= grid / 2 {
        pos - rem
    } else {
        pos + grid - rem
    }
}

/// A point in two-dimensional layout-space.
#[derive(
    Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    /// Creates a new [`Point`] from (x,y) coordinates.
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Returns the origin, (0, 0).
    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0, y: 0 }
    }

    /// Creates a new [`Point`] shifted by `p.x` in the x-dimension and by `p.y` in the y-dimension.
    #[inline]
    pub fn translated(&self, p: Point) -> Self {
        let mut pt = *self;
        pt.translate(p);
        pt
    }

    #[inline]
    pub fn snap_to_grid(&self, grid: i64) -> Self {
        Self::new(snap_to_grid(self.x, grid), snap_to_grid(self.y, grid))
    }
}

impl std::ops::Add<Point> for Point {
    type Output = Self;
    fn add(self, rhs: Point) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl std::ops::AddAssign<Point> for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl std::ops::Sub<Point> for Point {
    type Output = Self;
    fn sub(self, rhs: Point) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl std::ops::Neg for Point {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl From<(i64, i64)> for Point {
    fn from(value: (i64, i64)) -> Self {
        Self {
            x: value.0,
            y: value.1,
        }
    }
}

impl Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A one-dimensional span.
#[derive(
    Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq,
)]
pub struct Span {
    start: i64,
    stop: i64,
}

impl Span {
    /// Creates a new [`Span`] between two integers.
    ///
    /// The endpoints may be given in either order.
    pub fn new(start: i64, stop: i64) -> Self {
        Self {
            start: start.min(stop),
            stop: start.max(stop),
        }
    }

    /// Creates a new [`Span`] between two integers.
    ///
    /// The caller must ensure that `start` is less
    /// than or equal to `stop`.
    pub const fn new_unchecked(start: i64, stop: i64) -> Self {
        Self { start, stop }
    }

    /// Creates a zero-length span at the given point.
    #[inline]
    pub fn from_point(x: i64) -> Self {
        Self { start: x, stop: x }
    }

    /// Creates a span starting at `start` with length `length`.
    #[inline]
    pub fn with_start_and_length(start: i64, length: i64) -> Self {
        Self::new(start, start + length)
    }

    /// Creates a span ending at `stop` with length `length`.
    #[inline]
    pub fn with_stop_and_length(stop: i64, length: i64) -> Self {
        Self::new(stop - length, stop)
    }

    /// Creates a span with the given endpoint and length.
    ///
    /// If `sign` is [`Sign::Pos`], `point` is the start of the span.
    /// Otherwise, `point` is the stop.
    pub fn with_point_and_length(sign: Sign, point: i64, length: i64) -> Self {
        match sign {
            Sign::Pos => Self::with_start_and_length(point, length),
            Sign::Neg => Self::with_stop_and_length(point, length),
        }
    }

    /// Gets the center of the span.
    #[inline]
    pub fn center(&self) -> i64 {
        (self.start + self.stop) / 2
    }

    /// Gets the length of the span.
    #[inline]
    pub fn length(&self) -> i64 {
        self.stop - self.start
    }

    /// Gets the start of the span.
    #[inline]
    pub fn start(&self) -> i64 {
        self.start
    }

    /// Gets the stop of the span.
    #[inline]
    pub fn stop(&self) -> i64 {
        self.stop
    }

    /// Returns the smallest span containing both `self` and `other`.
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            stop: self.stop.max(other.stop),
        }
    }

    /// Returns `true` if `other` lies within `self`, endpoints included.
    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.start <= other.start && self.stop >= other.stop
    }

    /// Returns `true` if `other` lies within `self` without touching either endpoint.
    #[inline]
    pub fn strictly_contains(self, other: Self) -> bool {
        self.start < other.start && self.stop > other.stop
    }

    /// Shifts the span by `amount`.
    #[inline]
    pub fn translate(self, amount: i64) -> Self {
        Self {
            start: self.start + amount,
            stop: self.stop + amount,
        }
    }
}

impl From<(i64, i64)> for Span {
    #[inline]
    fn from(tup: (i64, i64)) -> Self {
        Self::new(tup.0, tup.1)
    }
}

/// An enumeration of axis-aligned directions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq, Default)]
pub enum Dir {
    /// The horizontal, or x-aligned, direction.
    #[default]
    Horiz,
    /// The vertical, or y-aligned, direction.
    Vert,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
#[error("error parsing direction `{original}`; expected horizontal or vertical")]
pub struct DirParseError {
    original: String,
}

impl FromStr for Dir {
    type Err = DirParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowercase = s.to_lowercase();
        match lowercase.trim() {
            "vertical" | "vert" | "v" => Ok(Self::Vert),
            "horizontal" | "horiz" | "h" => Ok(Self::Horiz),
            _ => Err(DirParseError {
                original: s.to_string(),
            }),
        }
    }
}

impl Dir {
    /// Returns the perpendicular direction.
    pub fn other(self) -> Self {
        match self {
            Self::Horiz => Self::Vert,
            Self::Vert => Self::Horiz,
        }
    }
}

impl Display for Dir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Horiz => write!(f, "horizontal"),
            Self::Vert => write!(f, "vertical"),
        }
    }
}

impl std::ops::Not for Dir {
    type Output = Self;
    fn not(self) -> Self::Output {
        self.other()
    }
}

/// Enumeration over possible signs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Sign {
    /// Positive.
    Pos,
    /// Negative.
    Neg,
}

impl std::ops::Not for Sign {
    type Output = Self;
    /// Flips the [`Sign`].
    fn not(self) -> Self::Output {
        match self {
            Self::Pos => Self::Neg,
            Self::Neg => Self::Pos,
        }
    }
}

/// An enumeration of the sides of a axis-aligned rectangle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Hash, PartialEq, Eq)]
#[repr(u8)]
#[derive(Indexable)]
pub enum Side {
    Top,
    Right,
    Bot,
    Left,
}

impl Side {
    /// All four sides, in the order bottom, top, left, right.
    pub const ALL: [Side; 4] = [Side::Bot, Side::Top, Side::Left, Side::Right];

    /// Returns the opposite side.
    pub fn other(&self) -> Self {
        match self {
            Side::Top => Side::Bot,
            Side::Right => Side::Left,
            Side::Bot => Side::Top,
            Side::Left => Side::Right,
        }
    }

    /// Returns the sign corresponding to moving towards this side.
    pub fn sign(&self) -> Sign {
        match self {
            Side::Top | Side::Right => Sign::Pos,
            Side::Bot | Side::Left => Sign::Neg,
        }
    }
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Top => write!(f, "top"),
            Side::Right => write!(f, "right"),
            Side::Bot => write!(f, "bottom"),
            Side::Left => write!(f, "left"),
        }
    }
}

/// An axis-aligned rectangle, specified by lower-left and upper-right corners.
#[derive(
    Debug, Default, Copy, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
pub struct Rect {
    /// The lower-left corner.
    pub p0: Point,
    /// The upper-right corner.
    pub p1: Point,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(p0: Point, p1: Point) -> Self {
        Self {
            p0: Point::new(p0.x.min(p1.x), p0.y.min(p1.y)),
            p1: Point::new(p0.x.max(p1.x), p0.y.max(p1.y)),
        }
    }

    /// Creates a rectangle with points `(0, 0), (dims.w(), dims.h())`.
    ///
    /// The caller should ensure that `dims.w()` and `dims.h()` are non-negative.
    pub fn with_dims(dims: Dims) -> Self {
        Self::new(Point::zero(), Point::new(dims.w(), dims.h()))
    }

    /// Creates a rectangle whose lower-left corner is `p0` and whose size is `dims`.
    pub fn from_corner_and_dims(p0: Point, dims: Dims) -> Self {
        Self::new(p0, Point::new(p0.x + dims.w(), p0.y + dims.h()))
    }

    /// Creates a rectangle from horizontal and vertical [`Span`]s.
    pub fn from_spans(h: Span, v: Span) -> Self {
        Self {
            p0: Point::new(h.start(), v.start()),
            p1: Point::new(h.stop(), v.stop()),
        }
    }

    /// Returns the center point of the rectangle.
    pub fn center(&self) -> Point {
        Point::new((self.p0.x + self.p1.x) / 2, (self.p0.y + self.p1.y) / 2)
    }

    /// Returns the bottom y-coordinate of the rectangle.
    #[inline]
    pub fn bottom(&self) -> i64 {
        self.p0.y
    }

    /// Returns the top y-coordinate of the rectangle.
    #[inline]
    pub fn top(&self) -> i64 {
        self.p1.y
    }

    /// Returns the left x-coordinate of the rectangle.
    #[inline]
    pub fn left(&self) -> i64 {
        self.p0.x
    }

    /// Returns the right x-coordinate of the rectangle.
    #[inline]
    pub fn right(&self) -> i64 {
        self.p1.x
    }

    /// Returns the coordinate of the given side.
    pub fn side(&self, side: Side) -> i64 {
        match side {
            Side::Top => self.top(),
            Side::Right => self.right(),
            Side::Bot => self.bottom(),
            Side::Left => self.left(),
        }
    }

    /// Returns the horizontal span of the rectangle.
    #[inline]
    pub fn hspan(&self) -> Span {
        Span::new_unchecked(self.p0.x, self.p1.x)
    }

    /// Returns the vertical span of the rectangle.
    #[inline]
    pub fn vspan(&self) -> Span {
        Span::new_unchecked(self.p0.y, self.p1.y)
    }

    /// Returns the span of the rectangle in the given direction.
    pub fn span(&self, dir: Dir) -> Span {
        match dir {
            Dir::Horiz => self.hspan(),
            Dir::Vert => self.vspan(),
        }
    }

    /// Returns the horizontal width of the rectangle.
    #[inline]
    pub fn width(&self) -> i64 {
        self.p1.x - self.p0.x
    }

    /// Returns the vertical height of the rectangle.
    #[inline]
    pub fn height(&self) -> i64 {
        self.p1.y - self.p0.y
    }

    /// Returns the area of the rectangle.
    #[inline]
    pub fn area(&self) -> i64 {
        self.width() * self.height()
    }

    /// Returns the dimensions of the rectangle.
    #[inline]
    pub fn dims(&self) -> Dims {
        Dims::new(self.width(), self.height())
    }

    /// Expands the rectangle by `amount` on all sides.
    #[inline]
    pub fn expand(&self, amount: i64) -> Self {
        Self::new(
            Point::new(self.p0.x - amount, self.p0.y - amount),
            Point::new(self.p1.x + amount, self.p1.y + amount),
        )
    }

    /// Shrinks the rectangle by `amount` on all sides.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle is not large enough to be shrunk by `amount`.
    #[inline]
    pub fn shrink(&self, amount: i64) -> Self {
        assert!(2 * amount <= self.width());
        assert!(2 * amount <= self.height());
        Self::new(
            Point::new(self.p0.x + amount, self.p0.y + amount),
            Point::new(self.p1.x - amount, self.p1.y - amount),
        )
    }

    /// Returns `true` if `other` lies strictly inside this rectangle on all four sides.
    pub fn strictly_contains(&self, other: &Rect) -> bool {
        self.hspan().strictly_contains(other.hspan())
            && self.vspan().strictly_contains(other.vspan())
    }

    /// Returns `true` if `other` lies inside this rectangle, edges included.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        self.hspan().contains(other.hspan()) && self.vspan().contains(other.vspan())
    }

    /// Returns the smallest rectangle containing both `self` and `other`.
    pub fn union_rect(&self, other: &Rect) -> Rect {
        Self::from_spans(
            self.hspan().union(other.hspan()),
            self.vspan().union(other.vspan()),
        )
    }

    /// Snaps both corners of the rectangle to the given grid.
    #[inline]
    pub fn snap_to_grid(&self, grid: i64) -> Self {
        Self::new(self.p0.snap_to_grid(grid), self.p1.snap_to_grid(grid))
    }
}

impl From<Bbox> for Rect {
    fn from(r: Bbox) -> Self {
        debug_assert!(r.p0.x <= r.p1.x);
        debug_assert!(r.p0.y <= r.p1.y);
        Self { p0: r.p0, p1: r.p1 }
    }
}

/// A two-dimensional size.
#[derive(
    Debug, Default, Clone, Copy, Hash, Ord, PartialOrd, Serialize, Deserialize, PartialEq, Eq,
)]
pub struct Dims {
    w: i64,
    h: i64,
}

impl Dims {
    /// Creates a new [`Dims`] from a width and height.
    pub const fn new(w: i64, h: i64) -> Self {
        Self { w, h }
    }

    /// Creates a new [`Dims`] with equal width and height.
    pub const fn square(value: i64) -> Self {
        Self { w: value, h: value }
    }

    /// Returns the width.
    #[inline]
    pub fn w(&self) -> i64 {
        self.w
    }

    /// Returns the height.
    #[inline]
    pub fn h(&self) -> i64 {
        self.h
    }

    /// Converts the dimensions to a rectangle with its lower-left corner at the origin.
    #[inline]
    pub fn into_rect(self) -> Rect {
        Rect::with_dims(self)
    }
}

/// The primary geometric primitive comprising raw layout.
///
/// A [`Ring`] is always the difference of two concentric rectangles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[enum_dispatch(ShapeTrait)]
pub enum Shape {
    Rect(Rect),
    Ring(Ring),
}

impl Translate for Shape {
    fn translate(&mut self, p: Point) {
        match self {
            Self::Rect(s) => s.translate(p),
            Self::Ring(s) => s.translate(p),
        }
    }
}

impl TranslateOwned for Shape {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

impl Shape {
    pub fn as_rect(&self) -> Option<Rect> {
        if let Shape::Rect(rect) = self {
            Some(*rect)
        } else {
            None
        }
    }

    pub fn as_ring(&self) -> Option<Ring> {
        if let Shape::Ring(ring) = self {
            Some(*ring)
        } else {
            None
        }
    }

    /// Returns the rectangles covering this shape without overlap.
    ///
    /// Ring segments of zero area are omitted.
    pub fn rects(&self) -> Vec<Rect> {
        match self {
            Shape::Rect(r) => vec![*r],
            Shape::Ring(r) => r.rects().into_iter().filter(|r| r.area() > 0).collect(),
        }
    }
}

/// Common shape operations, dispatched from the [`Shape`] enum to its variants by [mod@enum_dispatch].
#[enum_dispatch]
pub trait ShapeTrait {
    /// Returns our "origin", an arbitrary [`Point`] on the shape.
    fn point0(&self) -> Point;
    /// Returns the direction along which the shape is primarily oriented.
    fn orientation(&self) -> Dir;
    /// Returns `true` if the shape contains [`Point`] `pt`.
    ///
    /// Containment is *inclusive*; points on the boundary are regarded as inside the shape.
    fn contains(&self, pt: Point) -> bool;
    /// Returns the area covered by the shape.
    fn area(&self) -> i64;
}

impl ShapeTrait for Rect {
    fn point0(&self) -> Point {
        self.p0
    }
    fn orientation(&self) -> Dir {
        if self.width() < self.height() {
            return Dir::Vert;
        }
        Dir::Horiz
    }
    fn contains(&self, pt: Point) -> bool {
        self.p0.x <= pt.x && self.p1.x >= pt.x && self.p0.y <= pt.y && self.p1.y >= pt.y
    }
    fn area(&self) -> i64 {
        Rect::area(self)
    }
}

impl BoundBox for Shape {
    fn bbox(&self) -> Bbox {
        match self {
            Shape::Rect(r) => r.bbox(),
            Shape::Ring(r) => r.bbox(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snap_to_grid() {
        assert_eq!(snap_to_grid(12, 5), 10);
        assert_eq!(snap_to_grid(13, 5), 15);
        assert_eq!(snap_to_grid(-12, 5), -10);
        assert_eq!(snap_to_grid(-13, 5), -15);
    }

    #[test]
    fn test_rect_expand_shrink() {
        let r = Rect::from_corner_and_dims(Point::new(0, 0), Dims::new(100, 200));
        let e = r.expand(160);
        assert_eq!(e, Rect::new(Point::new(-160, -160), Point::new(260, 360)));
        assert_eq!(e.shrink(160), r);
        assert_eq!(e.width(), r.width() + 320);
        assert!(e.strictly_contains(&r));
        assert!(!r.strictly_contains(&r));
        assert!(r.contains_rect(&r));
    }

    #[test]
    fn test_span_with_stop_and_length() {
        let s = Span::with_stop_and_length(-480, 100);
        assert_eq!(s.start(), -580);
        assert_eq!(s.stop(), -480);
        assert_eq!(s.length(), 100);
    }

    #[test]
    fn test_rect_union() {
        let a = Rect::new(Point::new(0, 0), Point::new(10, 10));
        let b = Rect::new(Point::new(-5, 2), Point::new(4, 20));
        assert_eq!(
            a.union_rect(&b),
            Rect::new(Point::new(-5, 0), Point::new(10, 20))
        );
    }
}
