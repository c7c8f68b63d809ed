//! Translation traits.
//!
//! Parametric cells are only ever placed by translation,
//! so no rotation or reflection is modelled.

use super::bbox::Bbox;
use super::{Point, Rect};

/// A trait for specifying how an object is translated by a [`Point`].
pub trait Translate {
    /// Translates the shape by [`Point`], altering it in place.
    fn translate(&mut self, p: Point);
}

/// A trait for translating an owned object and returning the result.
pub trait TranslateOwned {
    /// Translates the shape by [`Point`], returning the moved value.
    fn translate_owned(self, p: Point) -> Self;
}

impl Translate for Point {
    fn translate(&mut self, p: Point) {
        self.x += p.x;
        self.y += p.y;
    }
}

impl TranslateOwned for Point {
    fn translate_owned(self, p: Point) -> Self {
        self + p
    }
}

impl Translate for Rect {
    fn translate(&mut self, p: Point) {
        self.p0.translate(p);
        self.p1.translate(p);
    }
}

impl TranslateOwned for Rect {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

impl Translate for Bbox {
    fn translate(&mut self, p: Point) {
        if !self.is_empty() {
            self.p0.translate(p);
            self.p1.translate(p);
        }
    }
}

impl TranslateOwned for Bbox {
    fn translate_owned(mut self, p: Point) -> Self {
        self.translate(p);
        self
    }
}

impl<T> Translate for Vec<T>
where
    T: Translate,
{
    fn translate(&mut self, p: Point) {
        for item in self.iter_mut() {
            item.translate(p);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::BoundBox;

    #[test]
    fn test_translate_rect() {
        let r = Rect::new(Point::new(0, 0), Point::new(100, 50));
        let moved = r.translate_owned(Point::new(-480, 20));
        assert_eq!(moved, Rect::new(Point::new(-480, 20), Point::new(-380, 70)));
    }

    #[test]
    fn test_translate_empty_bbox() {
        let bbox = Bbox::empty().translate_owned(Point::new(10, 10));
        assert!(bbox.is_empty());
        let bbox = Rect::new(Point::new(0, 0), Point::new(1, 1))
            .bbox()
            .translate_owned(Point::new(10, 10));
        assert_eq!(bbox.p0, Point::new(10, 10));
    }
}
